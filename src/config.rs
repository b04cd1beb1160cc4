use crate::shared::{geo::Distance, time::Duration};
use std::collections::HashMap;

/// Vehicle classes the planner distinguishes. GTFS route-type codes are
/// collapsed onto these four via [`Config::route_types`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportCategory {
    Tram,
    Subway,
    Rail,
    Bus,
}

impl TransportCategory {
    /// Rail-family categories admitted by the rail-only transport mode.
    pub const fn is_rail_family(&self) -> bool {
        matches!(self, Self::Rail | Self::Subway | Self::Tram)
    }
}

/// Immutable planner configuration, built once at startup and passed by
/// reference into the calendar evaluator, the connection builder and the
/// router.
#[derive(Debug, Clone)]
pub struct Config {
    /// Radius for the walking overlay between stops and for the
    /// nearest-stop search around an address.
    pub max_walking_distance: Distance,
    /// Walking speed in meters per second.
    pub walking_speed: f64,
    /// Minimum dwell when changing from one route to another.
    pub transfer_time: Duration,
    /// Category to priority, lower is preferred.
    pub transport_priorities: HashMap<TransportCategory, u8>,
    /// GTFS route-type code to category.
    pub route_types: HashMap<i32, TransportCategory>,
    /// Stop-id prefix of the local region. When both endpoints of a
    /// candidate walking edge carry it the walking radius is doubled.
    pub local_region_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_walking_distance: Distance::from_meters(500.0),
            walking_speed: 1.5,
            transfer_time: Duration::from_seconds(60),
            transport_priorities: HashMap::from([
                (TransportCategory::Rail, 1),
                (TransportCategory::Subway, 1),
                (TransportCategory::Tram, 2),
                (TransportCategory::Bus, 3),
            ]),
            route_types: HashMap::from([
                (0, TransportCategory::Tram),
                (1, TransportCategory::Subway),
                (2, TransportCategory::Rail),
                (3, TransportCategory::Bus),
                (100, TransportCategory::Rail),
                (109, TransportCategory::Rail),
                (400, TransportCategory::Subway),
                (700, TransportCategory::Bus),
                (900, TransportCategory::Tram),
                (1000, TransportCategory::Rail),
                (1100, TransportCategory::Tram),
                (1200, TransportCategory::Bus),
            ]),
            local_region_prefix: "de:08212:".into(),
        }
    }
}

impl Config {
    /// Unknown route-type codes fall back to bus.
    pub fn category_for_route_type(&self, route_type: i32) -> TransportCategory {
        self.route_types
            .get(&route_type)
            .copied()
            .unwrap_or(TransportCategory::Bus)
    }

    pub fn priority_for(&self, category: TransportCategory) -> u8 {
        self.transport_priorities.get(&category).copied().unwrap_or(3)
    }

    pub fn priority_for_route_type(&self, route_type: i32) -> u8 {
        self.priority_for(self.category_for_route_type(route_type))
    }
}
