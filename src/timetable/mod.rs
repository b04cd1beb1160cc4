pub mod calendar;
mod entities;

pub use entities::*;

use crate::gtfs::{
    Gtfs,
    models::{GtfsCalendar, GtfsCalendarDate, GtfsRoute, GtfsStop, GtfsStopTime, GtfsTrip},
};
use std::{collections::HashMap, sync::Arc, time::Instant};
use tracing::debug;

/// The in-memory GTFS tables with the lookups the planner needs: id maps,
/// per-trip schedules and the station parent/child closure. Built once at
/// startup, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Timetable {
    pub stops: Vec<Stop>,
    pub routes: Vec<Route>,
    pub trips: Vec<Trip>,
    pub calendar: Vec<Calendar>,
    pub calendar_dates: Vec<CalendarDate>,

    stop_lookup: HashMap<Arc<str>, usize>,
    route_lookup: HashMap<Arc<str>, usize>,
    /// Schedule of each trip, sorted by stop_sequence.
    stop_times_by_trip: HashMap<Arc<str>, Vec<StopTime>>,
    /// Station hierarchy. Stops without a parent are their own
    /// representative, stops with one are grouped under it.
    parent_to_children: HashMap<Arc<str>, Vec<Arc<str>>>,
}

impl Timetable {
    /// Streams a whole feed out of `gtfs` and builds the tables.
    pub fn load_gtfs(mut gtfs: Gtfs) -> Result<Self, crate::gtfs::Error> {
        let now = Instant::now();

        let mut stops: Vec<GtfsStop> = Vec::new();
        gtfs.stream_stops(|stop| stops.push(stop))?;
        let mut routes: Vec<GtfsRoute> = Vec::new();
        gtfs.stream_routes(|route| routes.push(route))?;
        let mut trips: Vec<GtfsTrip> = Vec::new();
        gtfs.stream_trips(|trip| trips.push(trip))?;
        let mut stop_times: Vec<GtfsStopTime> = Vec::new();
        gtfs.stream_stop_times(|stop_time| stop_times.push(stop_time))?;
        let mut calendar: Vec<GtfsCalendar> = Vec::new();
        gtfs.stream_calendar(|service| calendar.push(service))?;
        let mut calendar_dates: Vec<GtfsCalendarDate> = Vec::new();
        gtfs.stream_calendar_dates(|exception| calendar_dates.push(exception))?;

        let timetable = Self::from_records(
            stops,
            routes,
            trips,
            stop_times,
            calendar,
            calendar_dates,
        );
        debug!(
            "Loaded {} stops, {} routes, {} trips in {:?}",
            timetable.stops.len(),
            timetable.routes.len(),
            timetable.trips.len(),
            now.elapsed()
        );
        Ok(timetable)
    }

    /// Builds the tables from raw rows. This is the whole construction
    /// path, `load_gtfs` is only the file-feeding wrapper around it.
    pub fn from_records(
        stops: Vec<GtfsStop>,
        routes: Vec<GtfsRoute>,
        trips: Vec<GtfsTrip>,
        stop_times: Vec<GtfsStopTime>,
        calendar: Vec<GtfsCalendar>,
        calendar_dates: Vec<GtfsCalendarDate>,
    ) -> Self {
        let stops: Vec<Stop> = stops.into_iter().map(Stop::from).collect();
        let routes: Vec<Route> = routes.into_iter().map(Route::from).collect();
        let trips: Vec<Trip> = trips.into_iter().map(Trip::from).collect();
        let calendar: Vec<Calendar> = calendar.into_iter().map(Calendar::from).collect();
        let calendar_dates: Vec<CalendarDate> =
            calendar_dates.into_iter().map(CalendarDate::from).collect();

        let mut stop_lookup: HashMap<Arc<str>, usize> = HashMap::with_capacity(stops.len());
        for (i, stop) in stops.iter().enumerate() {
            stop_lookup.insert(stop.id.clone(), i);
        }
        let mut route_lookup: HashMap<Arc<str>, usize> = HashMap::with_capacity(routes.len());
        for (i, route) in routes.iter().enumerate() {
            route_lookup.insert(route.id.clone(), i);
        }

        let mut stop_times_by_trip: HashMap<Arc<str>, Vec<StopTime>> = HashMap::new();
        for stop_time in stop_times {
            let stop_time: StopTime = stop_time.into();
            stop_times_by_trip
                .entry(stop_time.trip_id.clone())
                .or_default()
                .push(stop_time);
        }
        for schedule in stop_times_by_trip.values_mut() {
            schedule.sort_by_key(|stop_time| stop_time.sequence);
        }

        // Large stations come as one parent with a child stop per
        // platform. Schedules reference the platforms while riders search
        // for the station, so group every stop under its representative.
        let mut parent_to_children: HashMap<Arc<str>, Vec<Arc<str>>> = HashMap::new();
        for stop in &stops {
            let parent = stop.parent_station.clone().unwrap_or_else(|| stop.id.clone());
            parent_to_children.entry(parent).or_default().push(stop.id.clone());
        }

        Self {
            stops,
            routes,
            trips,
            calendar,
            calendar_dates,
            stop_lookup,
            route_lookup,
            stop_times_by_trip,
            parent_to_children,
        }
    }

    pub fn stop_by_id(&self, id: &str) -> Option<&Stop> {
        let index = self.stop_lookup.get(id)?;
        Some(&self.stops[*index])
    }

    /// Display name for a stop id, falling back to the id itself for
    /// references the feed never declared.
    pub fn stop_name(&self, id: &str) -> Arc<str> {
        match self.stop_by_id(id) {
            Some(stop) => stop.name.clone(),
            None => Arc::from(id),
        }
    }

    pub fn route_by_id(&self, id: &str) -> Option<&Route> {
        let index = self.route_lookup.get(id)?;
        Some(&self.routes[*index])
    }

    pub fn stop_times_for_trip(&self, trip_id: &str) -> Option<&[StopTime]> {
        self.stop_times_by_trip
            .get(trip_id)
            .map(|schedule| schedule.as_slice())
    }

    /// All stop ids that belong to the same logical station as `stop_id`:
    /// the stop itself, its children when it is a parent, its siblings and
    /// parent when it is a child. First-seen order, deduplicated.
    pub fn expand(&self, stop_id: &str) -> Vec<Arc<str>> {
        let own: Arc<str> = match self.stop_by_id(stop_id) {
            Some(stop) => stop.id.clone(),
            None => Arc::from(stop_id),
        };
        let mut related: Vec<Arc<str>> = vec![own.clone()];
        if let Some(children) = self.parent_to_children.get(stop_id) {
            related.extend(children.iter().cloned());
        } else {
            for (parent, children) in &self.parent_to_children {
                if children.iter().any(|child| child.as_ref() == stop_id) {
                    related.extend(children.iter().cloned());
                    related.push(parent.clone());
                    break;
                }
            }
        }
        let mut seen: Vec<Arc<str>> = Vec::with_capacity(related.len());
        for id in related {
            if !seen.contains(&id) {
                seen.push(id);
            }
        }
        seen
    }

    /// Case-insensitive stop search: exact name match first, substring
    /// fallback when nothing matches exactly.
    pub fn stops_by_name(&self, name: &str) -> Vec<&Stop> {
        let needle = name.to_lowercase();
        let exact: Vec<&Stop> = self
            .stops
            .iter()
            .filter(|stop| stop.normalized_name.as_ref() == needle)
            .collect();
        if !exact.is_empty() {
            return exact;
        }
        self.stops
            .iter()
            .filter(|stop| stop.normalized_name.contains(&needle))
            .collect()
    }
}
