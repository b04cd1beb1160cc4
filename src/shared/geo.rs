use std::{cmp, fmt::Display, iter::Sum, ops::Add};

#[derive(Debug, Clone, Copy, Default)]
pub struct Distance(f64);

impl PartialEq for Distance {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl Add for Distance {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Distance {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|distance| distance.0).sum())
    }
}

impl Distance {
    pub const ZERO: Distance = Distance(0.0);

    pub const fn from_meters(distance: f64) -> Self {
        Self(distance)
    }

    pub const fn from_kilometers(distance: f64) -> Self {
        Self(distance * 1000.0)
    }

    pub const fn as_meters(&self) -> f64 {
        self.0
    }

    pub const fn as_kilometers(&self) -> f64 {
        self.0 / 1000.0
    }

    pub fn doubled(&self) -> Self {
        Self(self.0 * 2.0)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}, {}", self.latitude, self.longitude))
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from(value: (f64, f64)) -> Self {
        Self {
            latitude: value.0,
            longitude: value.1,
        }
    }
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance between two coordinates.
    pub fn haversine_distance(&self, coord: &Self) -> Distance {
        const R: f64 = 6_371_000.0;
        let dist_lat = f64::to_radians(coord.latitude - self.latitude);
        let dist_lon = f64::to_radians(coord.longitude - self.longitude);
        let a = f64::powi(f64::sin(dist_lat / 2.0), 2)
            + f64::cos(f64::to_radians(self.latitude))
                * f64::cos(f64::to_radians(coord.latitude))
                * f64::sin(dist_lon / 2.0)
                * f64::sin(dist_lon / 2.0);
        let c = 2.0 * f64::atan2(f64::sqrt(a), f64::sqrt(1.0 - a));
        Distance::from_meters(R * c)
    }

    /// Eight-way compass direction towards `coord`, treating the
    /// coordinate deltas as planar. Good enough for walking distances.
    pub fn compass_direction_to(&self, coord: &Self) -> CompassDirection {
        let delta_lat = coord.latitude - self.latitude;
        let delta_lon = coord.longitude - self.longitude;
        let mut degrees = f64::atan2(delta_lon, delta_lat).to_degrees();
        if degrees < 0.0 {
            degrees += 360.0;
        }
        CompassDirection::from_degrees(degrees)
    }
}

/// Compass rose labels as presented to the rider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompassDirection {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
}

impl CompassDirection {
    /// Buckets a bearing in `[0, 360)` at 22.5 degree boundaries. North
    /// wraps around zero.
    pub fn from_degrees(degrees: f64) -> Self {
        match degrees {
            d if !(22.5..337.5).contains(&d) => Self::North,
            d if d < 67.5 => Self::Northeast,
            d if d < 112.5 => Self::East,
            d if d < 157.5 => Self::Southeast,
            d if d < 202.5 => Self::South,
            d if d < 247.5 => Self::Southwest,
            d if d < 292.5 => Self::West,
            _ => Self::Northwest,
        }
    }
}

impl Display for CompassDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::North => "Norden",
            Self::Northeast => "Nordosten",
            Self::East => "Osten",
            Self::Southeast => "Südosten",
            Self::South => "Süden",
            Self::Southwest => "Südwesten",
            Self::West => "Westen",
            Self::Northwest => "Nordwesten",
        };
        f.write_str(label)
    }
}

/// Two-line walking directive for a leg between two coordinates.
pub fn walking_directions(from: &Coordinate, to: &Coordinate, walking_speed: f64) -> [String; 2] {
    let distance = from.haversine_distance(to);
    let direction = from.compass_direction_to(to);
    let minutes = (distance.as_meters() / walking_speed / 60.0) as u32;
    [
        format!("Gehen Sie {:.0}m in Richtung {}", distance.as_meters(), direction),
        format!("Gehzeit: ca. {} Minuten", minutes),
    ]
}

#[test]
fn haversine_zero_for_identical_points() {
    let coord = Coordinate::new(49.009, 8.417);
    assert_eq!(coord.haversine_distance(&coord), Distance::ZERO);
}

#[test]
fn haversine_marktplatz_to_hauptbahnhof() {
    // Karlsruhe Marktplatz to Hauptbahnhof, roughly 1.6km apart.
    let marktplatz = Coordinate::new(49.0094, 8.4044);
    let hauptbahnhof = Coordinate::new(48.9937, 8.4021);
    let distance = marktplatz.haversine_distance(&hauptbahnhof);
    assert!((distance.as_meters() - 1750.0).abs() < 60.0);
}

#[test]
fn compass_bucket_north() {
    assert_eq!(CompassDirection::from_degrees(10.0), CompassDirection::North);
}

#[test]
fn compass_bucket_north_wraps() {
    assert_eq!(CompassDirection::from_degrees(350.0), CompassDirection::North);
}

#[test]
fn compass_bucket_east() {
    assert_eq!(CompassDirection::from_degrees(90.0), CompassDirection::East);
}

#[test]
fn compass_bucket_southwest_boundary() {
    assert_eq!(
        CompassDirection::from_degrees(202.5),
        CompassDirection::Southwest
    );
}

#[test]
fn compass_points_east_for_positive_longitude_delta() {
    let from = Coordinate::new(49.0, 8.4);
    let to = Coordinate::new(49.0, 8.5);
    assert_eq!(from.compass_direction_to(&to), CompassDirection::East);
}

#[test]
fn walking_directions_format() {
    let from = Coordinate::new(49.0, 8.4);
    let to = Coordinate::new(49.0027, 8.4);
    let [line, time_line] = walking_directions(&from, &to, 1.5);
    assert!(line.starts_with("Gehen Sie 300m in Richtung Norden"));
    assert_eq!(time_line, "Gehzeit: ca. 3 Minuten");
}
