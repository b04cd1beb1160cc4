use crate::{
    config::{Config, TransportCategory},
    shared::{
        geo::{Coordinate, Distance},
        time::{Duration, Time},
    },
    timetable::{Timetable, calendar},
};
use chrono::NaiveDate;
use rayon::prelude::*;
use std::{collections::HashMap, sync::Arc, time::Instant};
use tracing::{debug, info};

/// Route id carried by walking edges, never used by a feed route.
pub const WALK_ROUTE_ID: &str = "WALK";

/// Floor for walking edges so that near-coincident platforms never
/// produce zero-length hops.
pub const MIN_WALK_DURATION: Duration = Duration::from_seconds(30);

const MAX_TRAVEL_DURATION: Duration = Duration::from_hours(3);

/// One ride between two consecutive stops of a trip on the service day.
#[derive(Debug, Clone)]
pub struct TransitEdge {
    pub trip_id: Arc<str>,
    pub route_id: Arc<str>,
    pub route_short_name: Arc<str>,
    pub route_long_name: Arc<str>,
    pub route_type: i32,
    pub from_stop: Arc<str>,
    pub to_stop: Arc<str>,
    pub departure: Time,
    pub arrival: Time,
    pub headsign: Arc<str>,
    pub priority: u8,
}

/// A walkable hop between two nearby stops. Carries only the duration,
/// the router binds absolute times when it relaxes the edge.
#[derive(Debug, Clone)]
pub struct WalkEdge {
    pub from_stop: Arc<str>,
    pub to_stop: Arc<str>,
    pub distance: Distance,
    pub duration: Duration,
    pub priority: u8,
}

#[derive(Debug, Clone)]
pub enum Connection {
    Transit(TransitEdge),
    Walk(WalkEdge),
}

impl Connection {
    pub fn from_stop(&self) -> &Arc<str> {
        match self {
            Self::Transit(edge) => &edge.from_stop,
            Self::Walk(edge) => &edge.from_stop,
        }
    }

    pub fn to_stop(&self) -> &Arc<str> {
        match self {
            Self::Transit(edge) => &edge.to_stop,
            Self::Walk(edge) => &edge.to_stop,
        }
    }

    pub fn route_id(&self) -> &str {
        match self {
            Self::Transit(edge) => &edge.route_id,
            Self::Walk(_) => WALK_ROUTE_ID,
        }
    }

    pub fn priority(&self) -> u8 {
        match self {
            Self::Transit(edge) => edge.priority,
            Self::Walk(edge) => edge.priority,
        }
    }

    pub const fn is_walk(&self) -> bool {
        matches!(self, Self::Walk(_))
    }
}

/// The day-specific time-expanded edge set, indexed by departure stop.
/// Owns every edge, the router only ever borrows them.
#[derive(Debug, Clone, Default)]
pub struct ConnectionIndex {
    by_stop: HashMap<Arc<str>, Vec<Connection>>,
    transit_count: usize,
    walk_count: usize,
}

impl ConnectionIndex {
    /// Compiles the edge set for `date`: expands every active trip into
    /// stop-to-stop rides, indexes them by departure stop and lays the
    /// walking overlay between nearby stops on top.
    pub fn build(timetable: &Timetable, date: NaiveDate, config: &Config) -> Self {
        let now = Instant::now();
        let mut index = Self::default();

        let edges = expand_trips(timetable, date, config);
        index.transit_count = edges.len();
        for edge in edges {
            index
                .by_stop
                .entry(edge.from_stop.clone())
                .or_default()
                .push(Connection::Transit(edge));
        }
        debug!(
            "Indexed {} transit connections for {} stops",
            index.transit_count,
            index.by_stop.len()
        );

        let walks = walking_overlay(timetable, config);
        index.walk_count = walks.len();
        for edge in walks {
            index
                .by_stop
                .entry(edge.from_stop.clone())
                .or_default()
                .push(Connection::Walk(edge));
        }

        info!(
            "Connection graph for {date}: {} transit, {} walking, {} stops with departures, built in {:?}",
            index.transit_count,
            index.walk_count,
            index.by_stop.len(),
            now.elapsed()
        );
        index
    }

    /// Outgoing edges of a stop. Stops without any departure yield an
    /// empty slice.
    pub fn connections_from(&self, stop_id: &str) -> &[Connection] {
        self.by_stop
            .get(stop_id)
            .map(|connections| connections.as_slice())
            .unwrap_or_default()
    }

    /// Whether any edge departs from this stop.
    pub fn contains_stop(&self, stop_id: &str) -> bool {
        self.by_stop.contains_key(stop_id)
    }

    /// Every edge in the index, in no particular order.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.by_stop.values().flatten()
    }

    pub fn stop_count(&self) -> usize {
        self.by_stop.len()
    }

    pub fn transit_len(&self) -> usize {
        self.transit_count
    }

    pub fn walking_len(&self) -> usize {
        self.walk_count
    }
}

/// Phase A: one transit edge per consecutive stop_time pair of every
/// trip whose service runs on the target date.
fn expand_trips(timetable: &Timetable, date: NaiveDate, config: &Config) -> Vec<TransitEdge> {
    let active = calendar::active_services(timetable, date);
    let mut edges: Vec<TransitEdge> = Vec::new();

    let fallback_route = (Arc::<str>::from("N/A"), Arc::<str>::from(""), 3);
    for trip in &timetable.trips {
        if !active.contains(&trip.service_id) {
            continue;
        }
        let Some(schedule) = timetable.stop_times_for_trip(&trip.id) else {
            continue;
        };
        if schedule.len() < 2 {
            continue;
        }
        // Trips referencing an unknown route still run, they just lose
        // their display name.
        let (short_name, long_name, route_type) = match timetable.route_by_id(&trip.route_id) {
            Some(route) => (route.short_name.clone(), route.long_name.clone(), route.route_type),
            None => fallback_route.clone(),
        };
        let priority = config.priority_for_route_type(route_type);

        for pair in schedule.windows(2) {
            let departure = pair[0].departure;
            let mut arrival = pair[1].arrival;
            // Midnight wrap: GTFS feeds that do not use the 24+ hour
            // convention jump backwards at day boundaries.
            if arrival < departure {
                arrival += Duration::from_hours(24);
            }
            let travel = arrival - departure;
            if travel == Duration::ZERO || travel > MAX_TRAVEL_DURATION {
                continue;
            }
            edges.push(TransitEdge {
                trip_id: trip.id.clone(),
                route_id: trip.route_id.clone(),
                route_short_name: short_name.clone(),
                route_long_name: long_name.clone(),
                route_type,
                from_stop: pair[0].stop_id.clone(),
                to_stop: pair[1].stop_id.clone(),
                departure,
                arrival,
                headsign: trip.headsign.clone(),
                priority,
            });
        }
    }
    edges
}

/// Phase C: two directed walking edges for every pair of located stops
/// within walking range. Both endpoints inside the local region double
/// the accepted radius.
fn walking_overlay(timetable: &Timetable, config: &Config) -> Vec<WalkEdge> {
    let located: Vec<(&Arc<str>, Coordinate)> = timetable
        .stops
        .iter()
        .filter_map(|stop| stop.coordinate.map(|coordinate| (&stop.id, coordinate)))
        .collect();
    debug!("Scanning {} located stops for walkable pairs", located.len());

    let walk_priority = config.priority_for(TransportCategory::Bus);
    let doubled = config.max_walking_distance.doubled();

    let pairs: Vec<(usize, usize, Distance)> = (0..located.len())
        .into_par_iter()
        .flat_map_iter(|i| {
            let (id_a, coord_a) = located[i];
            let located = &located;
            let prefix = config.local_region_prefix.as_str();
            let both_local_base = id_a.starts_with(prefix);
            (i + 1..located.len()).filter_map(move |j| {
                let (id_b, coord_b) = located[j];
                let max_distance = if both_local_base && id_b.starts_with(prefix) {
                    doubled
                } else {
                    config.max_walking_distance
                };
                let distance = coord_a.haversine_distance(&coord_b);
                (distance <= max_distance).then_some((i, j, distance))
            })
        })
        .collect();

    let mut walks: Vec<WalkEdge> = Vec::with_capacity(pairs.len() * 2);
    for (i, j, distance) in pairs {
        let duration = Duration::from_seconds(
            ((distance.as_meters() / config.walking_speed).round() as u32)
                .max(MIN_WALK_DURATION.as_seconds()),
        );
        let (id_a, _) = located[i];
        let (id_b, _) = located[j];
        for (from, to) in [(id_a, id_b), (id_b, id_a)] {
            walks.push(WalkEdge {
                from_stop: from.clone(),
                to_stop: to.clone(),
                distance,
                duration,
                priority: walk_priority,
            });
        }
    }
    walks
}
