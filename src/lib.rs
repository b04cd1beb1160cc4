pub mod addresses;
pub mod config;
pub mod connections;
pub mod gtfs;
pub mod router;
pub mod shared;
pub mod timetable;
