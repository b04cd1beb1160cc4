use serde::{Deserialize, Serialize};

/// Raw GTFS rows as they appear in the feed files. Unknown columns are
/// ignored so feeds richer than the core column set still load. Numeric
/// schedule times stay strings here, parsing happens downstream.

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct GtfsStop {
    pub stop_id: String,
    pub stop_name: String,
    #[serde(default)]
    pub stop_lat: Option<f64>,
    #[serde(default)]
    pub stop_lon: Option<f64>,
    #[serde(default)]
    pub parent_station: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct GtfsRoute {
    pub route_id: String,
    #[serde(default)]
    pub route_short_name: Option<String>,
    #[serde(default)]
    pub route_long_name: Option<String>,
    pub route_type: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct GtfsTrip {
    pub trip_id: String,
    pub route_id: String,
    pub service_id: String,
    #[serde(default)]
    pub trip_headsign: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct GtfsStopTime {
    pub trip_id: String,
    pub stop_sequence: u32,
    pub stop_id: String,
    pub arrival_time: String,
    pub departure_time: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct GtfsCalendar {
    pub service_id: String,
    pub monday: u8,
    pub tuesday: u8,
    pub wednesday: u8,
    pub thursday: u8,
    pub friday: u8,
    pub saturday: u8,
    pub sunday: u8,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct GtfsCalendarDate {
    pub service_id: String,
    pub date: String,
    pub exception_type: u8,
}
