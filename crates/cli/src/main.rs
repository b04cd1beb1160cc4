use chrono::Local;
use fahrplan::{
    addresses::AddressBook,
    config::Config,
    connections::ConnectionIndex,
    gtfs::Gtfs,
    router::{Journey, Router, Segment, TransitSegment, TransportMode, WalkingSegment},
    shared::time::{Duration, Time},
    timetable::Timetable,
};
use std::{
    env,
    io::{self, Write},
    process,
};
use tracing::{error, warn};

const DEFAULT_GTFS_PATH: &str = "google_transit";
const DEFAULT_ADDRESS_PATH: &str = "karlsruhe_addresses.csv";

fn main() {
    tracing_subscriber::fmt().init();

    println!("=== Karlsruhe ÖPNV-Router ===");
    println!("Initialisiere System...");

    let config = Config::default();
    let gtfs_path = env::var("GTFS_DATA_PATH").unwrap_or_else(|_| DEFAULT_GTFS_PATH.to_string());
    let address_path =
        env::var("ADDRESS_CSV_PATH").unwrap_or_else(|_| DEFAULT_ADDRESS_PATH.to_string());

    let gtfs = match load_gtfs(&gtfs_path) {
        Ok(gtfs) => gtfs,
        Err(err) => {
            error!("Fehler beim Öffnen der GTFS-Daten: {err}");
            process::exit(1);
        }
    };
    let timetable = match Timetable::load_gtfs(gtfs) {
        Ok(timetable) => timetable,
        Err(err) => {
            error!("Fehler beim Laden der GTFS-Daten: {err}");
            process::exit(1);
        }
    };
    let today = Local::now().date_naive();
    let index = ConnectionIndex::build(&timetable, today, &config);
    let addresses = match AddressBook::from_csv_path(&address_path) {
        Ok(addresses) => addresses,
        Err(err) => {
            // Stop search keeps working without the address table.
            warn!("Adressdatenbank nicht verfügbar: {err}");
            AddressBook::new()
        }
    };
    let router = Router::new(&timetable, &index, &addresses, &config);

    println!("\n{}", "=".repeat(50));
    println!("Willkommen beim Karlsruhe ÖPNV-Router!");
    println!("{}", "=".repeat(50));

    loop {
        let Some(mode) = prompt_transport_mode() else {
            break;
        };
        let Some(origin) = prompt_location("Start (Adresse oder Haltestelle)") else {
            break;
        };
        let Some(destination) = prompt_location("Ziel (Adresse oder Haltestelle)") else {
            break;
        };
        let Some(departure) = prompt_departure_time() else {
            break;
        };

        let journeys = router.find_routes(&origin, &destination, departure, mode, 1);
        display_results(&journeys);

        if !ask_continue() {
            break;
        }
    }
}

fn load_gtfs(path: &str) -> Result<Gtfs, fahrplan::gtfs::Error> {
    if path.ends_with(".zip") {
        Gtfs::new().from_zip_cache(path)
    } else {
        Ok(Gtfs::new().from_directory(path))
    }
}

/// Reads one trimmed line, `None` on closed stdin.
fn read_line(prompt: &str) -> Option<String> {
    print!("{prompt}");
    io::stdout().flush().ok()?;
    let mut line = String::new();
    match io::stdin().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

fn prompt_transport_mode() -> Option<TransportMode> {
    loop {
        println!("\nModusauswahl:");
        println!("1 - Nur Bahn (S-Bahn, Straßenbahn)");
        println!("2 - Bus und Bahn");
        println!("0 - Beenden");
        let choice = read_line("Geben Sie 1, 2 oder 0 ein: ")?;
        if choice == "0" {
            println!("Auf Wiedersehen!");
            process::exit(0);
        }
        match choice.parse().ok().and_then(TransportMode::from_choice) {
            Some(mode) => return Some(mode),
            None => println!("Ungültige Eingabe. Bitte 1, 2 oder 0 eingeben."),
        }
    }
}

fn prompt_location(prompt: &str) -> Option<String> {
    loop {
        let location = read_line(&format!("{prompt}: "))?;
        if location.is_empty() {
            println!("Bitte geben Sie einen Ort ein.");
            continue;
        }
        return Some(location);
    }
}

fn prompt_departure_time() -> Option<Time> {
    loop {
        let input =
            read_line("Bitte Startzeit angeben (HH:MM) oder (HH:MM:SS), Enter für jetzt: ")?;
        if input.is_empty() {
            return Some(Time::now());
        }
        match Time::parse_hms(&input) {
            Ok(time) => return Some(time),
            Err(err) => {
                println!("Ungültige Zeitangabe: {err}");
                println!("Bitte verwenden Sie das Format HH:MM oder HH:MM:SS");
            }
        }
    }
}

fn ask_continue() -> bool {
    match read_line("\nWeitere Suche? (j/n): ") {
        Some(choice) => matches!(choice.to_lowercase().as_str(), "j" | "ja" | "y" | "yes" | ""),
        None => false,
    }
}

fn display_results(journeys: &[Journey]) {
    if journeys.is_empty() {
        println!("\nKeine Route gefunden.");
        println!("Versuchen Sie es mit anderen Eingaben oder einem späteren Zeitpunkt.");
        return;
    }

    println!("\nGefundene Routen ({}):", journeys.len());
    println!("{}", "=".repeat(60));
    for (i, journey) in journeys.iter().enumerate() {
        println!("\n--- Route {} ---", i + 1);
        display_journey(journey);
    }
}

fn display_journey(journey: &Journey) {
    println!("Gesamtdauer: {}", format_duration(journey.total_duration));
    println!("Umstiege: {}", journey.transfers);
    if journey.total_walking_distance.as_meters() > 0.0 {
        println!(
            "Fußweg gesamt: {:.0}m",
            journey.total_walking_distance.as_meters()
        );
    }
    println!("\nVerbindungen:");
    for segment in &journey.segments {
        match segment {
            Segment::Walking(walking) => display_walking_segment(walking),
            Segment::Transit(transit) => display_transit_segment(transit),
        }
    }
}

fn display_walking_segment(segment: &WalkingSegment) {
    println!("Fußweg ({:.0}m)", segment.distance.as_meters());
    for direction in &segment.directions {
        println!("   → {direction}");
    }
    if let Some(to_stop) = &segment.to_stop_name {
        println!("   → zur Haltestelle: {to_stop}");
    } else if let Some(from_stop) = &segment.from_stop_name {
        println!("   → von Haltestelle: {from_stop}");
    }
}

fn display_transit_segment(segment: &TransitSegment) {
    let route_name = if segment.route_name.is_empty() {
        "Unbekannte Linie"
    } else {
        segment.route_name.as_ref()
    };
    let direction = if segment.headsign.is_empty() {
        "Unbekannte Richtung"
    } else {
        segment.headsign.as_ref()
    };
    println!("{route_name} Richtung {direction}");
    println!("{} → {}", segment.from_stop_name, segment.to_stop_name);
    println!(
        "Abfahrt: {}, Ankunft: {}",
        segment.departure.to_hms_string(),
        segment.arrival.to_hms_string()
    );
}

fn format_duration(duration: Duration) -> String {
    let total_minutes = duration.as_minutes();
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours > 0 {
        format!("{hours}h {minutes}min")
    } else {
        format!("{minutes}min")
    }
}
