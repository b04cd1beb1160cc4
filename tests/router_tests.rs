mod common;

use fahrplan::{
    addresses::{AddressBook, AddressRecord},
    config::Config,
    connections::ConnectionIndex,
    gtfs::models::{GtfsCalendar, GtfsCalendarDate, GtfsRoute, GtfsStop, GtfsStopTime, GtfsTrip},
    router::{Journey, Router, Segment, TransportMode},
    shared::time::Time,
    timetable::Timetable,
};

struct Fixture {
    timetable: Timetable,
    index: ConnectionIndex,
    addresses: AddressBook,
    config: Config,
}

impl Fixture {
    fn new(
        stops: Vec<GtfsStop>,
        routes: Vec<GtfsRoute>,
        trips: Vec<GtfsTrip>,
        stop_times: Vec<GtfsStopTime>,
        calendar: Vec<GtfsCalendar>,
        calendar_dates: Vec<GtfsCalendarDate>,
        addresses: Vec<AddressRecord>,
    ) -> Self {
        let config = Config::default();
        let timetable = common::timetable(stops, routes, trips, stop_times, calendar, calendar_dates);
        let index = ConnectionIndex::build(&timetable, common::monday(), &config);
        Self {
            timetable,
            index,
            addresses: AddressBook::from_records(addresses),
            config,
        }
    }

    fn find(
        &self,
        origin: &str,
        destination: &str,
        departure: &str,
        mode: TransportMode,
    ) -> Vec<Journey> {
        let router = Router::new(&self.timetable, &self.index, &self.addresses, &self.config);
        router.find_routes(
            origin,
            destination,
            Time::parse_hms(departure).unwrap(),
            mode,
            1,
        )
    }
}

fn transit_segments(journey: &Journey) -> Vec<&fahrplan::router::TransitSegment> {
    journey
        .segments
        .iter()
        .filter_map(|segment| match segment {
            Segment::Transit(transit) => Some(transit),
            Segment::Walking(_) => None,
        })
        .collect()
}

fn address(full_address: &str, lat: f64, lon: f64) -> AddressRecord {
    AddressRecord {
        full_address: full_address.to_string(),
        lat,
        lon,
    }
}

fn direct_trip_fixture() -> Fixture {
    Fixture::new(
        vec![
            common::stop("a", "Stop A", None),
            common::stop("b", "Stop B", None),
            common::stop("c", "Stop C", None),
        ],
        vec![common::route("r1", "S1", 2)],
        vec![common::trip("t1", "r1", "weekdays", "Stop C")],
        vec![
            common::stop_time("t1", 1, "a", "08:00:00", "08:00:00"),
            common::stop_time("t1", 2, "b", "08:05:00", "08:05:00"),
            common::stop_time("t1", 3, "c", "08:12:00", "08:12:00"),
        ],
        vec![common::daily_service("weekdays")],
        vec![],
        vec![],
    )
}

#[test]
fn direct_trip_is_one_merged_segment() {
    let fixture = direct_trip_fixture();
    let journeys = fixture.find("Stop A", "Stop C", "07:55", TransportMode::All);
    assert_eq!(journeys.len(), 1);

    let journey = &journeys[0];
    assert_eq!(journey.transfers, 0);
    assert_eq!(journey.departure.to_hms_string(), "08:00:00");
    assert_eq!(journey.arrival.to_hms_string(), "08:12:00");

    let segments = transit_segments(journey);
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].from_stop_name.as_ref(), "Stop A");
    assert_eq!(segments[0].to_stop_name.as_ref(), "Stop C");
    assert_eq!(segments[0].route_name.as_ref(), "S1");
}

#[test]
fn journey_segment_times_are_ordered() {
    let fixture = direct_trip_fixture();
    let journeys = fixture.find("Stop A", "Stop C", "07:55", TransportMode::All);
    let journey = &journeys[0];
    for segment in transit_segments(journey) {
        assert!(segment.departure <= segment.arrival);
    }
    assert_eq!(
        (journey.arrival - journey.departure).as_seconds(),
        journey.total_duration.as_seconds()
    );
}

#[test]
fn unresolvable_destination_finds_nothing() {
    let fixture = direct_trip_fixture();
    let journeys = fixture.find("Stop A", "Nirgendwo", "07:55", TransportMode::All);
    assert!(journeys.is_empty());
}

fn transfer_fixture(second_departure: &str) -> Fixture {
    Fixture::new(
        vec![
            common::stop("a", "Stop A", None),
            common::stop("b", "Stop B", None),
            common::stop("c", "Stop C", None),
        ],
        vec![
            common::route("r1", "S1", 2),
            common::route("r2", "S2", 2),
        ],
        vec![
            common::trip("t1", "r1", "weekdays", "Stop B"),
            common::trip("t2", "r2", "weekdays", "Stop C"),
        ],
        vec![
            common::stop_time("t1", 1, "a", "08:00:00", "08:00:00"),
            common::stop_time("t1", 2, "b", "08:10:00", "08:10:00"),
            common::stop_time("t2", 1, "b", second_departure, second_departure),
            common::stop_time("t2", 2, "c", "08:20:00", "08:20:00"),
        ],
        vec![common::daily_service("weekdays")],
        vec![],
        vec![],
    )
}

#[test]
fn transfer_with_enough_dwell_is_found() {
    let fixture = transfer_fixture("08:12:00");
    let journeys = fixture.find("Stop A", "Stop C", "07:55", TransportMode::All);
    assert_eq!(journeys.len(), 1);

    let journey = &journeys[0];
    assert_eq!(journey.transfers, 1);
    assert_eq!(journey.arrival.to_hms_string(), "08:20:00");
    assert_eq!(transit_segments(journey).len(), 2);
}

#[test]
fn transfer_below_minimum_dwell_is_rejected() {
    // 30 seconds between arrival and the connecting departure is below
    // the 60 second minimum, and no widening offset helps either.
    let fixture = transfer_fixture("08:10:30");
    let journeys = fixture.find("Stop A", "Stop C", "07:55", TransportMode::All);
    assert!(journeys.is_empty());
}

fn mode_fixture(routes: Vec<GtfsRoute>, trips: Vec<GtfsTrip>, stop_times: Vec<GtfsStopTime>) -> Fixture {
    Fixture::new(
        vec![
            common::stop("a", "Stop A", None),
            common::stop("b", "Stop B", None),
        ],
        routes,
        trips,
        stop_times,
        vec![common::daily_service("weekdays")],
        vec![],
        vec![],
    )
}

#[test]
fn rail_mode_prefers_the_rail_route() {
    let fixture = mode_fixture(
        vec![
            common::route("rail", "S1", 2),
            common::route("bus", "42", 3),
        ],
        vec![
            common::trip("t-rail", "rail", "weekdays", "Stop B"),
            common::trip("t-bus", "bus", "weekdays", "Stop B"),
        ],
        vec![
            common::stop_time("t-rail", 1, "a", "08:05:00", "08:05:00"),
            common::stop_time("t-rail", 2, "b", "08:15:00", "08:15:00"),
            common::stop_time("t-bus", 1, "a", "08:00:00", "08:00:00"),
            common::stop_time("t-bus", 2, "b", "08:10:00", "08:10:00"),
        ],
    );
    let journeys = fixture.find("Stop A", "Stop B", "07:55", TransportMode::RailOnly);
    assert_eq!(journeys.len(), 1);
    let segments = transit_segments(&journeys[0]);
    assert_eq!(segments[0].route_name.as_ref(), "S1");
}

#[test]
fn rail_mode_finds_nothing_on_a_bus_only_feed() {
    let fixture = mode_fixture(
        vec![common::route("bus", "42", 3)],
        vec![common::trip("t-bus", "bus", "weekdays", "Stop B")],
        vec![
            common::stop_time("t-bus", 1, "a", "08:00:00", "08:00:00"),
            common::stop_time("t-bus", 2, "b", "08:10:00", "08:10:00"),
        ],
    );
    let journeys = fixture.find("Stop A", "Stop B", "07:55", TransportMode::RailOnly);
    assert!(journeys.is_empty());
}

#[test]
fn walking_overlay_connects_tripless_stops() {
    // 300m apart, nothing scheduled.
    let fixture = Fixture::new(
        vec![
            common::stop("x", "Stop X", Some((49.0, 8.4))),
            common::stop("y", "Stop Y", Some((49.0027, 8.4))),
        ],
        vec![],
        vec![],
        vec![],
        vec![],
        vec![],
        vec![],
    );
    let journeys = fixture.find("Stop X", "Stop Y", "10:00", TransportMode::All);
    assert_eq!(journeys.len(), 1);

    let journey = &journeys[0];
    assert_eq!(journey.total_duration.as_seconds(), 200);
    assert_eq!(journey.transfers, 0);
    assert!(transit_segments(journey).is_empty());
    assert!(matches!(journey.segments[0], Segment::Walking(_)));
    assert!((journey.total_walking_distance.as_meters() - 300.0).abs() < 2.0);
}

#[test]
fn station_search_reaches_the_departing_platform() {
    // Only platform 2 of the station has departures; resolving the
    // parent must surface it.
    let fixture = Fixture::new(
        vec![
            common::stop("p", "Hauptplatz", None),
            common::child_stop("p1", "Hauptplatz Gleis 1", None, "p"),
            common::child_stop("p2", "Hauptplatz Gleis 2", None, "p"),
            common::stop("q", "Zielweg", None),
        ],
        vec![common::route("r1", "S1", 2)],
        vec![common::trip("t1", "r1", "weekdays", "Zielweg")],
        vec![
            common::stop_time("t1", 1, "p2", "08:00:00", "08:00:00"),
            common::stop_time("t1", 2, "q", "08:07:00", "08:07:00"),
        ],
        vec![common::daily_service("weekdays")],
        vec![],
        vec![],
    );
    let journeys = fixture.find("Hauptplatz", "Zielweg", "07:55", TransportMode::All);
    assert_eq!(journeys.len(), 1);
    let segments = transit_segments(&journeys[0]);
    assert_eq!(segments[0].from_stop_name.as_ref(), "Hauptplatz Gleis 2");
}

#[test]
fn missed_departure_is_recovered_by_widening() {
    // The only trip leaves at 09:00, the query comes at 09:10. The
    // fallback offset of minus 15 minutes finds it.
    let fixture = Fixture::new(
        vec![
            common::stop("a", "Stop A", None),
            common::stop("b", "Stop B", None),
        ],
        vec![common::route("r1", "S1", 2)],
        vec![common::trip("t1", "r1", "weekdays", "Stop B")],
        vec![
            common::stop_time("t1", 1, "a", "09:00:00", "09:00:00"),
            common::stop_time("t1", 2, "b", "09:10:00", "09:10:00"),
        ],
        vec![common::daily_service("weekdays")],
        vec![],
        vec![],
    );
    let journeys = fixture.find("Stop A", "Stop B", "09:10", TransportMode::All);
    assert_eq!(journeys.len(), 1);
    assert_eq!(journeys[0].departure.to_hms_string(), "09:00:00");
}

#[test]
fn marktplatz_destination_prefers_kaiserstrasse_platforms() {
    // Pyramide comes first in the feed, the disambiguation still routes
    // to the Kaiserstraße platform.
    let fixture = Fixture::new(
        vec![
            common::stop("a", "Startplatz", None),
            common::stop("mp", "KA Marktplatz (Pyramide U)", None),
            common::stop("mk", "KA Marktplatz (Kaiserstraße U)", None),
        ],
        vec![
            common::route("r1", "S1", 2),
            common::route("r2", "S2", 2),
        ],
        vec![
            common::trip("to-pyramide", "r1", "weekdays", "Pyramide"),
            common::trip("to-kaiser", "r2", "weekdays", "Kaiserstraße"),
            common::trip("from-pyramide", "r1", "weekdays", "Startplatz"),
            common::trip("from-kaiser", "r2", "weekdays", "Startplatz"),
        ],
        vec![
            common::stop_time("to-pyramide", 1, "a", "08:00:00", "08:00:00"),
            common::stop_time("to-pyramide", 2, "mp", "08:03:00", "08:03:00"),
            common::stop_time("to-kaiser", 1, "a", "08:00:00", "08:00:00"),
            common::stop_time("to-kaiser", 2, "mk", "08:05:00", "08:05:00"),
            common::stop_time("from-pyramide", 1, "mp", "09:00:00", "09:00:00"),
            common::stop_time("from-pyramide", 2, "a", "09:03:00", "09:03:00"),
            common::stop_time("from-kaiser", 1, "mk", "09:00:00", "09:00:00"),
            common::stop_time("from-kaiser", 2, "a", "09:05:00", "09:05:00"),
        ],
        vec![common::daily_service("weekdays")],
        vec![],
        vec![],
    );
    let journeys = fixture.find("Startplatz", "Marktplatz", "07:55", TransportMode::All);
    assert_eq!(journeys.len(), 1);
    let segments = transit_segments(&journeys[0]);
    assert!(segments[0].to_stop_name.contains("Kaiserstraße"));
}

#[test]
fn address_origin_prepends_a_walking_segment() {
    // An address 300m south of Stop X, which has a scheduled departure.
    let fixture = Fixture::new(
        vec![
            common::stop("x", "Stop X", Some((49.0027, 8.4))),
            common::stop("z", "Stop Z", Some((49.05, 8.5))),
        ],
        vec![common::route("r1", "S1", 2)],
        vec![common::trip("t1", "r1", "weekdays", "Stop Z")],
        vec![
            common::stop_time("t1", 1, "x", "10:05:00", "10:05:00"),
            common::stop_time("t1", 2, "z", "10:15:00", "10:15:00"),
        ],
        vec![common::daily_service("weekdays")],
        vec![],
        vec![address("Beispielstraße 1, 76133 Karlsruhe", 49.0, 8.4)],
    );
    let journeys = fixture.find("Beispielstraße 1", "Stop Z", "10:00", TransportMode::All);
    assert_eq!(journeys.len(), 1);

    let journey = &journeys[0];
    let Segment::Walking(walking) = &journey.segments[0] else {
        panic!("expected a leading walking segment");
    };
    assert_eq!(walking.to_stop_name.as_deref(), Some("Stop X"));
    assert!(!walking.directions.is_empty());
    assert!(journey.total_walking_distance.as_meters() > 0.0);
    assert_eq!(journey.transfers, 0);
}

#[test]
fn same_place_is_a_zero_duration_journey() {
    // The address resolves to Stop X, the destination is Stop X itself.
    let fixture = Fixture::new(
        vec![
            common::stop("x", "Stop X", Some((49.0, 8.4))),
            common::stop("y", "Stop Y", Some((49.0027, 8.4))),
        ],
        vec![],
        vec![],
        vec![],
        vec![],
        vec![],
        vec![address("Beispielstraße 1, 76133 Karlsruhe", 49.0001, 8.4)],
    );
    let journeys = fixture.find("Beispielstraße 1", "Stop X", "10:00", TransportMode::All);
    assert_eq!(journeys.len(), 1);

    let journey = &journeys[0];
    assert_eq!(journey.total_duration.as_seconds(), 0);
    assert_eq!(journey.transfers, 0);
    let Segment::Walking(walking) = &journey.segments[0] else {
        panic!("expected a walking segment");
    };
    assert_eq!(walking.directions, vec!["Sie sind bereits am Ziel".to_string()]);
}
