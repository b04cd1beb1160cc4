mod itinerary;

pub use itinerary::{Journey, Segment, TransitSegment, WalkingSegment};

use crate::{
    addresses::{self, AddressBook},
    config::Config,
    connections::{Connection, ConnectionIndex, WALK_ROUTE_ID},
    shared::{
        geo::Coordinate,
        time::{Duration, Time},
    },
    timetable::Timetable,
};
use itinerary::{Leg, build_journey};
use std::{
    cmp::{Ordering, Reverse},
    collections::{BinaryHeap, HashMap, hash_map::Entry},
    sync::Arc,
};
use tracing::{debug, info, warn};

/// Hard ceiling on relaxation steps per search, keeps worst-case queries
/// bounded on slow machines.
pub const MAX_ITERATIONS: usize = 10_000;

const MAX_RESULTS_PER_SEARCH: usize = 3;
const MAX_TRANSFERS: u32 = 3;
const TRANSFER_PENALTY: Duration = Duration::from_minutes(1);

const MAX_NAME_MATCHES: usize = 3;
const MAX_STATION_CHILDREN: usize = 3;
const MAX_RESOLVED_STOPS: usize = 5;

const WIDENING_OFFSETS_MINUTES: [i32; 3] = [-15, 15, 30];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// S-Bahn, U-Bahn and trams only.
    RailOnly,
    /// Everything including buses.
    All,
}

impl TransportMode {
    pub fn from_choice(choice: u8) -> Option<Self> {
        match choice {
            1 => Some(Self::RailOnly),
            2 => Some(Self::All),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct ResolvedStop {
    id: Arc<str>,
    name: Arc<str>,
}

/// What a free-text origin or destination resolved to. The anchor is
/// present only for address input and carries the coordinate the start
/// or end walking leg is rendered from.
struct ResolvedLocation {
    stops: Vec<ResolvedStop>,
    anchor: Option<Coordinate>,
}

/// A single expansion step on the priority queue. Ordered by accumulated
/// cost (elapsed travel time plus one minute per transfer), then
/// transfers, then insertion order for FIFO stability.
#[derive(Debug, Clone)]
struct SearchNode {
    cost: Duration,
    transfers: u32,
    sequence: u64,
    stop: Arc<str>,
    time: Time,
    last_route: Option<Arc<str>>,
    path: Vec<Leg>,
}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SearchNode {}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.cost, self.transfers, self.sequence).cmp(&(
            other.cost,
            other.transfers,
            other.sequence,
        ))
    }
}

/// The query engine. Borrows the immutable indices built at startup,
/// every query allocates its own queue and visited map.
pub struct Router<'a> {
    timetable: &'a Timetable,
    index: &'a ConnectionIndex,
    addresses: &'a AddressBook,
    config: &'a Config,
}

impl<'a> Router<'a> {
    pub fn new(
        timetable: &'a Timetable,
        index: &'a ConnectionIndex,
        addresses: &'a AddressBook,
        config: &'a Config,
    ) -> Self {
        Self {
            timetable,
            index,
            addresses,
            config,
        }
    }

    /// Up to `max_routes` journeys from `origin` to `destination`, best
    /// first. Unresolvable input and an exhausted search both come back
    /// as an empty list.
    pub fn find_routes(
        &self,
        origin: &str,
        destination: &str,
        departure: Time,
        mode: TransportMode,
        max_routes: usize,
    ) -> Vec<Journey> {
        info!(
            "Routing from '{origin}' to '{destination}' at {}",
            departure.to_hms_string()
        );

        let origin_location = self.resolve_location(origin);
        let mut destination_location = self.resolve_location(destination);
        if origin_location.stops.is_empty() || destination_location.stops.is_empty() {
            return Vec::new();
        }

        // The Marktplatz station exists twice in the Karlsruhe feed;
        // prefer the Kaiserstraße platforms over the Pyramide ones.
        if destination.to_lowercase().contains("marktplatz") {
            destination_location.stops.sort_by_key(|stop| {
                u8::from(!stop.name.to_lowercase().contains("kaiserstraße"))
            });
        }

        for offset in std::iter::once(None).chain(WIDENING_OFFSETS_MINUTES.into_iter().map(Some)) {
            let Some(time) = shift(departure, offset.unwrap_or(0)) else {
                continue;
            };
            if let Some(minutes) = offset {
                debug!("Widening search with a {minutes} minute offset");
            }
            for start in &origin_location.stops {
                for goal in &destination_location.stops {
                    let mut journeys = self.search(
                        start,
                        goal,
                        time,
                        mode,
                        origin_location.anchor,
                        destination_location.anchor,
                    );
                    if journeys.is_empty() {
                        continue;
                    }
                    journeys.sort_by_key(|journey| {
                        (
                            journey.transfers,
                            journey.total_duration,
                            journey.first_priority(),
                        )
                    });
                    journeys.truncate(max_routes);
                    return journeys;
                }
            }
        }
        Vec::new()
    }

    /// Maps free text to concrete stops: stop-name lookup expanded over
    /// the station hierarchy first, address lookup with a walking anchor
    /// second.
    fn resolve_location(&self, input: &str) -> ResolvedLocation {
        let matches = self.timetable.stops_by_name(input);
        if !matches.is_empty() {
            let mut stops: Vec<ResolvedStop> = Vec::new();
            for stop in matches.iter().take(MAX_NAME_MATCHES) {
                push_candidate(&mut stops, stop.id.clone(), stop.name.clone());
                for related in self
                    .timetable
                    .expand(&stop.id)
                    .into_iter()
                    .take(MAX_STATION_CHILDREN)
                {
                    if related.as_ref() != stop.id.as_ref() {
                        let name = self.timetable.stop_name(&related);
                        push_candidate(&mut stops, related, name);
                    }
                }
            }
            // Only stops with outgoing edges can take part in a search;
            // fall back to the best name match when none qualify.
            let connected: Vec<ResolvedStop> = stops
                .iter()
                .filter(|stop| self.index.contains_stop(&stop.id))
                .cloned()
                .collect();
            let stops = if connected.is_empty() {
                stops.truncate(1);
                stops
            } else {
                connected
            };
            return ResolvedLocation {
                stops,
                anchor: None,
            };
        }

        let addresses = self.addresses.find(input);
        let Some(best) = addresses.first() else {
            warn!("Could not resolve location: '{input}'");
            return ResolvedLocation {
                stops: Vec::new(),
                anchor: None,
            };
        };
        debug!("Resolved '{input}' to address '{}'", best.full_address);
        let nearby = addresses::nearest_stops(&best.coordinate, self.timetable, self.config);
        ResolvedLocation {
            stops: nearby
                .into_iter()
                .map(|stop| ResolvedStop {
                    id: stop.stop_id,
                    name: stop.stop_name,
                })
                .collect(),
            anchor: Some(best.coordinate),
        }
    }

    /// Dijkstra over the time-expanded graph, minimizing travel time with
    /// a one minute penalty per transfer. Collects up to three journeys
    /// and keeps going until the queue or the iteration budget runs out.
    fn search(
        &self,
        start: &ResolvedStop,
        goal: &ResolvedStop,
        departure: Time,
        mode: TransportMode,
        start_anchor: Option<Coordinate>,
        end_anchor: Option<Coordinate>,
    ) -> Vec<Journey> {
        let mut heap: BinaryHeap<Reverse<SearchNode>> = BinaryHeap::new();
        let mut visited: HashMap<Arc<str>, Time> = HashMap::new();
        let mut results: Vec<Journey> = Vec::new();
        let mut sequence: u64 = 0;
        let walk_route: Arc<str> = Arc::from(WALK_ROUTE_ID);
        let walk_name: Arc<str> = Arc::from("Fußweg");

        heap.push(Reverse(SearchNode {
            cost: Duration::ZERO,
            transfers: 0,
            sequence,
            stop: start.id.clone(),
            time: departure,
            last_route: None,
            path: Vec::new(),
        }));

        let mut iterations: usize = 0;
        while results.len() < MAX_RESULTS_PER_SEARCH && iterations < MAX_ITERATIONS {
            let Some(Reverse(node)) = heap.pop() else {
                break;
            };
            iterations += 1;

            if node.stop == goal.id {
                if let Some(journey) = build_journey(
                    self.timetable,
                    &node.path,
                    start_anchor,
                    end_anchor,
                    departure,
                    self.config,
                ) {
                    debug!(
                        "Reached {} after {} transfers",
                        goal.name, node.transfers
                    );
                    results.push(journey);
                }
                continue;
            }

            match visited.entry(node.stop.clone()) {
                Entry::Occupied(mut entry) => {
                    if *entry.get() <= node.time {
                        continue;
                    }
                    entry.insert(node.time);
                }
                Entry::Vacant(entry) => {
                    entry.insert(node.time);
                }
            }

            if node.transfers >= MAX_TRANSFERS {
                continue;
            }

            for connection in self.index.connections_from(&node.stop) {
                if let Connection::Transit(edge) = connection {
                    if mode == TransportMode::RailOnly
                        && !self
                            .config
                            .category_for_route_type(edge.route_type)
                            .is_rail_family()
                    {
                        continue;
                    }
                }

                // Walking departs the moment we arrive, transit has a
                // fixed schedule we must not have missed.
                let (edge_departure, edge_arrival) = match connection {
                    Connection::Walk(walk) => (node.time, node.time + walk.duration),
                    Connection::Transit(edge) => {
                        if edge.departure < node.time {
                            continue;
                        }
                        (edge.departure, edge.arrival)
                    }
                };

                let transfers = match &node.last_route {
                    Some(last_route) if last_route.as_ref() != connection.route_id() => {
                        if edge_departure - node.time < self.config.transfer_time {
                            continue;
                        }
                        node.transfers + 1
                    }
                    _ => node.transfers,
                };

                if edge_arrival <= edge_departure {
                    continue;
                }
                if edge_arrival <= departure {
                    continue;
                }
                if visited
                    .get(connection.to_stop())
                    .is_some_and(|best| *best <= edge_arrival)
                {
                    continue;
                }

                let cost = (edge_arrival - departure)
                    + Duration::from_seconds(transfers * TRANSFER_PENALTY.as_seconds());
                sequence += 1;
                let mut path = node.path.clone();
                path.push(match connection {
                    Connection::Transit(edge) => Leg::transit(edge),
                    Connection::Walk(walk) => Leg::walk(
                        walk,
                        edge_departure,
                        edge_arrival,
                        walk_route.clone(),
                        walk_name.clone(),
                    ),
                });
                heap.push(Reverse(SearchNode {
                    cost,
                    transfers,
                    sequence,
                    stop: connection.to_stop().clone(),
                    time: edge_arrival,
                    last_route: Some(match connection {
                        Connection::Transit(edge) => edge.route_id.clone(),
                        Connection::Walk(_) => walk_route.clone(),
                    }),
                    path,
                }));
            }
        }
        debug!(
            "Search {} -> {} finished after {iterations} iterations with {} routes",
            start.name,
            goal.name,
            results.len()
        );
        results
    }
}

fn push_candidate(stops: &mut Vec<ResolvedStop>, id: Arc<str>, name: Arc<str>) {
    if stops.len() < MAX_RESOLVED_STOPS && !stops.iter().any(|stop| stop.id == id) {
        stops.push(ResolvedStop { id, name });
    }
}

/// Departure time shifted by whole minutes, `None` when the shift would
/// cross below midnight.
fn shift(time: Time, minutes: i32) -> Option<Time> {
    let total = i64::from(time.as_seconds()) + i64::from(minutes) * 60;
    u32::try_from(total).ok().map(Time::from_seconds)
}
