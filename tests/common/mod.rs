#![allow(dead_code)]

use chrono::NaiveDate;
use fahrplan::gtfs::models::{
    GtfsCalendar, GtfsCalendarDate, GtfsRoute, GtfsStop, GtfsStopTime, GtfsTrip,
};
use fahrplan::timetable::Timetable;

/// 2026-01-05 is a Monday.
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
}

/// 2026-01-06 is a Tuesday.
pub fn tuesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 6).unwrap()
}

pub fn stop(id: &str, name: &str, coordinate: Option<(f64, f64)>) -> GtfsStop {
    GtfsStop {
        stop_id: id.to_string(),
        stop_name: name.to_string(),
        stop_lat: coordinate.map(|(lat, _)| lat),
        stop_lon: coordinate.map(|(_, lon)| lon),
        parent_station: None,
    }
}

pub fn child_stop(
    id: &str,
    name: &str,
    coordinate: Option<(f64, f64)>,
    parent: &str,
) -> GtfsStop {
    GtfsStop {
        parent_station: Some(parent.to_string()),
        ..stop(id, name, coordinate)
    }
}

pub fn route(id: &str, short_name: &str, route_type: i32) -> GtfsRoute {
    GtfsRoute {
        route_id: id.to_string(),
        route_short_name: Some(short_name.to_string()),
        route_long_name: None,
        route_type,
    }
}

pub fn trip(id: &str, route_id: &str, service_id: &str, headsign: &str) -> GtfsTrip {
    GtfsTrip {
        trip_id: id.to_string(),
        route_id: route_id.to_string(),
        service_id: service_id.to_string(),
        trip_headsign: Some(headsign.to_string()),
    }
}

pub fn stop_time(
    trip_id: &str,
    sequence: u32,
    stop_id: &str,
    arrival: &str,
    departure: &str,
) -> GtfsStopTime {
    GtfsStopTime {
        trip_id: trip_id.to_string(),
        stop_sequence: sequence,
        stop_id: stop_id.to_string(),
        arrival_time: arrival.to_string(),
        departure_time: departure.to_string(),
    }
}

/// A service running every day of the week for a wide date range.
pub fn daily_service(service_id: &str) -> GtfsCalendar {
    GtfsCalendar {
        service_id: service_id.to_string(),
        monday: 1,
        tuesday: 1,
        wednesday: 1,
        thursday: 1,
        friday: 1,
        saturday: 1,
        sunday: 1,
        start_date: "20200101".to_string(),
        end_date: "20301231".to_string(),
    }
}

/// A service bound to a single weekday, Monday = 0.
pub fn weekday_service(service_id: &str, weekday: usize) -> GtfsCalendar {
    let mut service = daily_service(service_id);
    let flags = [
        &mut service.monday,
        &mut service.tuesday,
        &mut service.wednesday,
        &mut service.thursday,
        &mut service.friday,
        &mut service.saturday,
        &mut service.sunday,
    ];
    for (i, flag) in flags.into_iter().enumerate() {
        *flag = u8::from(i == weekday);
    }
    service
}

pub fn exception(service_id: &str, date: &str, exception_type: u8) -> GtfsCalendarDate {
    GtfsCalendarDate {
        service_id: service_id.to_string(),
        date: date.to_string(),
        exception_type,
    }
}

pub fn timetable(
    stops: Vec<GtfsStop>,
    routes: Vec<GtfsRoute>,
    trips: Vec<GtfsTrip>,
    stop_times: Vec<GtfsStopTime>,
    calendar: Vec<GtfsCalendar>,
    calendar_dates: Vec<GtfsCalendarDate>,
) -> Timetable {
    Timetable::from_records(stops, routes, trips, stop_times, calendar, calendar_dates)
}
