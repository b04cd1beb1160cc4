mod common;

use fahrplan::{
    addresses::{self, AddressBook, AddressRecord},
    config::Config,
    shared::geo::Coordinate,
};

fn record(full_address: &str, lat: f64, lon: f64) -> AddressRecord {
    AddressRecord {
        full_address: full_address.to_string(),
        lat,
        lon,
    }
}

fn sample_book() -> AddressBook {
    AddressBook::from_records(vec![
        record("Kaiserstraße 12, 76133 Karlsruhe", 49.0090, 8.3980),
        record("Waldstraße 3, 76133 Karlsruhe", 49.0102, 8.3955),
        record("Moltkestraße 30, 76133 Karlsruhe", 49.0180, 8.3850),
    ])
}

#[test]
fn normalize_is_idempotent() {
    for input in ["Kaiser Straße 12", "Wald Str. 3", "MOLTKESTRASSE 30"] {
        let once = addresses::normalize(input);
        assert_eq!(addresses::normalize(&once), once);
    }
}

#[test]
fn normalize_folds_street_suffix_spellings() {
    assert_eq!(
        addresses::normalize("Kaiser Strasse 12"),
        addresses::normalize("Kaiser Str. 12")
    );
    assert_eq!(
        addresses::normalize("Kaiser Str. 12"),
        addresses::normalize("Kaiser Str 12")
    );
}

#[test]
fn normalize_strips_umlauts_to_ascii() {
    assert_eq!(addresses::normalize("Gärtnerweg"), "gartnerweg");
}

#[test]
fn normalize_removes_spaces() {
    assert_eq!(addresses::normalize("Am Alten Bahnhof"), "amaltenbahnhof");
}

#[test]
fn find_matches_street_substring() {
    let book = sample_book();
    let matches = book.find("Waldstraße");
    assert_eq!(matches.len(), 1);
    assert!(matches[0].full_address.starts_with("Waldstraße 3"));
}

#[test]
fn find_ignores_city_part_of_query() {
    let book = sample_book();
    let matches = book.find("Moltkestraße 30, 76133 Karlsruhe");
    assert_eq!(matches.len(), 1);
}

#[test]
fn find_unknown_street_is_empty() {
    let book = sample_book();
    assert!(book.find("Unbekannter Weg 99").is_empty());
}

#[test]
fn nearest_stops_filters_by_radius_and_sorts() {
    // Origin, one stop 150m north, one 300m north, one far away.
    let origin = Coordinate::new(49.0, 8.4);
    let timetable = common::timetable(
        vec![
            common::stop("far", "Weit weg", Some((49.2, 8.4))),
            common::stop("near", "Nah", Some((49.00135, 8.4))),
            common::stop("mid", "Mittel", Some((49.0027, 8.4))),
        ],
        vec![],
        vec![],
        vec![],
        vec![],
        vec![],
    );
    let config = Config::default();
    let nearby = addresses::nearest_stops(&origin, &timetable, &config);
    let ids: Vec<&str> = nearby.iter().map(|stop| stop.stop_id.as_ref()).collect();
    assert_eq!(ids, vec!["near", "mid"]);
}

#[test]
fn nearest_stops_caps_at_three() {
    let origin = Coordinate::new(49.0, 8.4);
    let stops = (0..5)
        .map(|i| {
            let name = format!("Halt {i}");
            let id = format!("s{i}");
            common::stop(&id, &name, Some((49.0 + 0.0002 * f64::from(i), 8.4)))
        })
        .collect();
    let timetable = common::timetable(stops, vec![], vec![], vec![], vec![], vec![]);
    let config = Config::default();
    let nearby = addresses::nearest_stops(&origin, &timetable, &config);
    assert_eq!(nearby.len(), 3);
    assert_eq!(nearby[0].stop_id.as_ref(), "s0");
}

#[test]
fn nearest_stops_skips_unlocated_stops() {
    let origin = Coordinate::new(49.0, 8.4);
    let timetable = common::timetable(
        vec![common::stop("nowhere", "Ohne Koordinaten", None)],
        vec![],
        vec![],
        vec![],
        vec![],
        vec![],
    );
    let config = Config::default();
    assert!(addresses::nearest_stops(&origin, &timetable, &config).is_empty());
}

#[test]
fn nearest_stops_reports_walking_time() {
    let origin = Coordinate::new(49.0, 8.4);
    let timetable = common::timetable(
        vec![common::stop("mid", "Mittel", Some((49.0027, 8.4)))],
        vec![],
        vec![],
        vec![],
        vec![],
        vec![],
    );
    let config = Config::default();
    let nearby = addresses::nearest_stops(&origin, &timetable, &config);
    // 300m at 1.5m/s is 200 seconds.
    assert_eq!(nearby[0].walking_time.as_seconds(), 200);
}
