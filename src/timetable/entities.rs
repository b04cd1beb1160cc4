use crate::{
    gtfs::models::{
        GtfsCalendar, GtfsCalendarDate, GtfsRoute, GtfsStop, GtfsStopTime, GtfsTrip,
    },
    shared::{geo::Coordinate, time::Time},
};
use std::sync::Arc;

/// A platform or station as the feed records it.
#[derive(Debug, Default, Clone)]
pub struct Stop {
    pub id: Arc<str>,
    pub name: Arc<str>,
    /// Lowercased name used for case-insensitive search.
    pub normalized_name: Arc<str>,
    /// `None` when the feed carries no position or a zeroed one.
    pub coordinate: Option<Coordinate>,
    pub parent_station: Option<Arc<str>>,
}

impl From<GtfsStop> for Stop {
    fn from(value: GtfsStop) -> Self {
        let coordinate = match (value.stop_lat, value.stop_lon) {
            (Some(lat), Some(lon)) if lat != 0.0 && lon != 0.0 => {
                Some(Coordinate::new(lat, lon))
            }
            _ => None,
        };
        let parent_station = value
            .parent_station
            .filter(|parent| !parent.is_empty())
            .map(Arc::from);
        Self {
            id: value.stop_id.into(),
            name: value.stop_name.clone().into(),
            normalized_name: value.stop_name.to_lowercase().into(),
            coordinate,
            parent_station,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct Route {
    pub id: Arc<str>,
    pub short_name: Arc<str>,
    pub long_name: Arc<str>,
    pub route_type: i32,
}

impl From<GtfsRoute> for Route {
    fn from(value: GtfsRoute) -> Self {
        Self {
            id: value.route_id.into(),
            short_name: value.route_short_name.unwrap_or_default().into(),
            long_name: value.route_long_name.unwrap_or_default().into(),
            route_type: value.route_type,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct Trip {
    pub id: Arc<str>,
    pub route_id: Arc<str>,
    pub service_id: Arc<str>,
    pub headsign: Arc<str>,
}

impl From<GtfsTrip> for Trip {
    fn from(value: GtfsTrip) -> Self {
        Self {
            id: value.trip_id.into(),
            route_id: value.route_id.into(),
            service_id: value.service_id.into(),
            headsign: value.trip_headsign.unwrap_or_default().into(),
        }
    }
}

/// One scheduled call of a trip at a stop. Times are parsed leniently,
/// a broken time string becomes zero and the edge is dropped later by
/// the connection builder's sanity filter.
#[derive(Debug, Default, Clone)]
pub struct StopTime {
    pub trip_id: Arc<str>,
    pub sequence: u32,
    pub stop_id: Arc<str>,
    pub arrival: Time,
    pub departure: Time,
}

impl From<GtfsStopTime> for StopTime {
    fn from(value: GtfsStopTime) -> Self {
        Self {
            trip_id: value.trip_id.into(),
            sequence: value.stop_sequence,
            stop_id: value.stop_id.into(),
            arrival: Time::parse_gtfs(&value.arrival_time),
            departure: Time::parse_gtfs(&value.departure_time),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct Calendar {
    pub service_id: Arc<str>,
    /// Monday through Sunday.
    pub weekdays: [bool; 7],
    /// `YYYYMMDD`, compared lexicographically.
    pub start_date: Arc<str>,
    pub end_date: Arc<str>,
}

impl From<GtfsCalendar> for Calendar {
    fn from(value: GtfsCalendar) -> Self {
        Self {
            service_id: value.service_id.into(),
            weekdays: [
                value.monday == 1,
                value.tuesday == 1,
                value.wednesday == 1,
                value.thursday == 1,
                value.friday == 1,
                value.saturday == 1,
                value.sunday == 1,
            ],
            start_date: value.start_date.into(),
            end_date: value.end_date.into(),
        }
    }
}

pub const EXCEPTION_SERVICE_ADDED: u8 = 1;
pub const EXCEPTION_SERVICE_REMOVED: u8 = 2;

#[derive(Debug, Default, Clone)]
pub struct CalendarDate {
    pub service_id: Arc<str>,
    pub date: Arc<str>,
    pub exception_type: u8,
}

impl From<GtfsCalendarDate> for CalendarDate {
    fn from(value: GtfsCalendarDate) -> Self {
        Self {
            service_id: value.service_id.into(),
            date: value.date.into(),
            exception_type: value.exception_type,
        }
    }
}
