use crate::{
    config::Config,
    connections::{TransitEdge, WALK_ROUTE_ID, WalkEdge},
    shared::{
        geo::{self, Coordinate, Distance},
        time::{Duration, Time},
    },
    timetable::Timetable,
};
use std::sync::Arc;

/// One traversed edge with its times bound, as recorded on the search
/// path. Walking legs get their absolute times from the moment the
/// search relaxed them.
#[derive(Debug, Clone)]
pub(crate) struct Leg {
    pub route_id: Arc<str>,
    pub route_name: Arc<str>,
    pub headsign: Arc<str>,
    pub from_stop: Arc<str>,
    pub to_stop: Arc<str>,
    pub departure: Time,
    pub arrival: Time,
    pub priority: u8,
    pub walk_distance: Option<Distance>,
}

impl Leg {
    pub fn transit(edge: &TransitEdge) -> Self {
        let route_name = if edge.route_short_name.is_empty() {
            edge.route_long_name.clone()
        } else {
            edge.route_short_name.clone()
        };
        Self {
            route_id: edge.route_id.clone(),
            route_name,
            headsign: edge.headsign.clone(),
            from_stop: edge.from_stop.clone(),
            to_stop: edge.to_stop.clone(),
            departure: edge.departure,
            arrival: edge.arrival,
            priority: edge.priority,
            walk_distance: None,
        }
    }

    pub fn walk(
        edge: &WalkEdge,
        departure: Time,
        arrival: Time,
        route_id: Arc<str>,
        route_name: Arc<str>,
    ) -> Self {
        Self {
            route_id,
            route_name,
            headsign: Arc::from(""),
            from_stop: edge.from_stop.clone(),
            to_stop: edge.to_stop.clone(),
            departure,
            arrival,
            priority: edge.priority,
            walk_distance: Some(edge.distance),
        }
    }
}

/// A ride on one route between boarding and alighting stop, possibly
/// spanning many intermediate stops.
#[derive(Debug, Clone)]
pub struct TransitSegment {
    pub from_stop: Arc<str>,
    pub to_stop: Arc<str>,
    pub from_stop_name: Arc<str>,
    pub to_stop_name: Arc<str>,
    pub departure: Time,
    pub arrival: Time,
    pub route_name: Arc<str>,
    pub headsign: Arc<str>,
    pub priority: u8,
}

/// A stretch on foot, either between two stops or between an address
/// and a stop.
#[derive(Debug, Clone)]
pub struct WalkingSegment {
    pub from_stop_name: Option<Arc<str>>,
    pub to_stop_name: Option<Arc<str>>,
    pub distance: Distance,
    pub directions: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum Segment {
    Walking(WalkingSegment),
    Transit(TransitSegment),
}

impl Segment {
    pub fn priority(&self) -> u8 {
        match self {
            Self::Transit(segment) => segment.priority,
            Self::Walking(_) => 3,
        }
    }
}

/// A complete reconstructed trip from origin to destination.
#[derive(Debug, Clone)]
pub struct Journey {
    pub segments: Vec<Segment>,
    pub total_duration: Duration,
    pub total_walking_distance: Distance,
    pub departure: Time,
    pub arrival: Time,
    pub transfers: u32,
}

impl Journey {
    /// Priority of the leading segment, used as the final ranking tie
    /// breaker. Walking counts as bus priority.
    pub fn first_priority(&self) -> u8 {
        self.segments.first().map(Segment::priority).unwrap_or(3)
    }
}

/// Turns a search path into a rider-facing journey: legs of the same
/// route merge into one segment, anchor walks are attached at the ends.
pub(crate) fn build_journey(
    timetable: &Timetable,
    path: &[Leg],
    start_anchor: Option<Coordinate>,
    end_anchor: Option<Coordinate>,
    departure: Time,
    config: &Config,
) -> Option<Journey> {
    if path.is_empty() {
        if start_anchor.is_none() && end_anchor.is_none() {
            return None;
        }
        // Origin and destination resolved to the same stop.
        return Some(Journey {
            segments: vec![Segment::Walking(WalkingSegment {
                from_stop_name: None,
                to_stop_name: None,
                distance: Distance::ZERO,
                directions: vec!["Sie sind bereits am Ziel".to_string()],
            })],
            total_duration: Duration::ZERO,
            total_walking_distance: Distance::ZERO,
            departure,
            arrival: departure,
            transfers: 0,
        });
    }

    let mut legs: Vec<&Leg> = path.iter().collect();
    legs.sort_by_key(|leg| leg.departure);

    let mut segments: Vec<Segment> = Vec::new();
    let mut total_walking = Distance::ZERO;

    if let Some(anchor) = &start_anchor {
        let first = legs[0];
        let (directions, distance) =
            anchor_walk(timetable, anchor, &first.from_stop, config, true);
        total_walking = total_walking + distance;
        segments.push(Segment::Walking(WalkingSegment {
            from_stop_name: None,
            to_stop_name: Some(timetable.stop_name(&first.from_stop)),
            distance,
            directions,
        }));
    }

    let mut run_start = 0;
    for i in 0..legs.len() {
        let is_last = i + 1 == legs.len();
        if !is_last && legs[i + 1].route_id == legs[i].route_id {
            continue;
        }
        let first = legs[run_start];
        let last = legs[i];
        if first.route_id.as_ref() == WALK_ROUTE_ID {
            let distance: Distance = legs[run_start..=i]
                .iter()
                .filter_map(|leg| leg.walk_distance)
                .sum();
            total_walking = total_walking + distance;
            segments.push(Segment::Walking(WalkingSegment {
                from_stop_name: Some(timetable.stop_name(&first.from_stop)),
                to_stop_name: Some(timetable.stop_name(&last.to_stop)),
                distance,
                directions: stop_walk_directions(timetable, &first.from_stop, &last.to_stop, config),
            }));
        } else {
            segments.push(Segment::Transit(TransitSegment {
                from_stop: first.from_stop.clone(),
                to_stop: last.to_stop.clone(),
                from_stop_name: timetable.stop_name(&first.from_stop),
                to_stop_name: timetable.stop_name(&last.to_stop),
                departure: first.departure,
                arrival: last.arrival,
                route_name: first.route_name.clone(),
                headsign: first.headsign.clone(),
                priority: first.priority,
            }));
        }
        run_start = i + 1;
    }

    if let Some(anchor) = &end_anchor {
        let last = legs[legs.len() - 1];
        let (directions, distance) =
            anchor_walk(timetable, anchor, &last.to_stop, config, false);
        total_walking = total_walking + distance;
        segments.push(Segment::Walking(WalkingSegment {
            from_stop_name: Some(timetable.stop_name(&last.to_stop)),
            to_stop_name: None,
            distance,
            directions,
        }));
    }

    let journey_departure = legs[0].departure;
    let journey_arrival = legs[legs.len() - 1].arrival;
    let transit_count = segments
        .iter()
        .filter(|segment| matches!(segment, Segment::Transit(_)))
        .count() as u32;

    Some(Journey {
        segments,
        total_duration: journey_arrival - journey_departure,
        total_walking_distance: total_walking,
        departure: journey_departure,
        arrival: journey_arrival,
        transfers: transit_count.saturating_sub(1),
    })
}

/// Directions between an address anchor and a stop, in walking order.
fn anchor_walk(
    timetable: &Timetable,
    anchor: &Coordinate,
    stop_id: &str,
    config: &Config,
    anchor_first: bool,
) -> (Vec<String>, Distance) {
    match timetable.stop_by_id(stop_id).and_then(|stop| stop.coordinate) {
        Some(stop_coordinate) => {
            let (from, to) = if anchor_first {
                (*anchor, stop_coordinate)
            } else {
                (stop_coordinate, *anchor)
            };
            let directions = geo::walking_directions(&from, &to, config.walking_speed);
            (directions.to_vec(), from.haversine_distance(&to))
        }
        None => (Vec::new(), Distance::ZERO),
    }
}

fn stop_walk_directions(
    timetable: &Timetable,
    from_stop: &str,
    to_stop: &str,
    config: &Config,
) -> Vec<String> {
    let from = timetable.stop_by_id(from_stop).and_then(|stop| stop.coordinate);
    let to = timetable.stop_by_id(to_stop).and_then(|stop| stop.coordinate);
    match (from, to) {
        (Some(from), Some(to)) => geo::walking_directions(&from, &to, config.walking_speed).to_vec(),
        _ => Vec::new(),
    }
}
