use crate::{
    config::Config,
    shared::{
        geo::{Coordinate, Distance},
        time::Duration,
    },
    timetable::Timetable,
};
use rayon::prelude::*;
use regex::Regex;
use serde::Deserialize;
use std::{
    io,
    path::Path,
    sync::{Arc, OnceLock},
};
use thiserror::Error;
use tracing::{info, warn};
use unicode_normalization::UnicodeNormalization;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Deserialize, Debug, Clone)]
pub struct AddressRecord {
    pub full_address: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone)]
pub struct Address {
    pub full_address: Arc<str>,
    pub coordinate: Coordinate,
}

impl From<AddressRecord> for Address {
    fn from(value: AddressRecord) -> Self {
        Self {
            full_address: value.full_address.into(),
            coordinate: Coordinate::new(value.lat, value.lon),
        }
    }
}

/// The address table extracted from OSM building data, one row per
/// `full_address, lat, lon`.
#[derive(Debug, Clone, Default)]
pub struct AddressBook {
    addresses: Vec<Address>,
}

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, self::Error> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut records: Vec<AddressRecord> = Vec::new();
        for result in reader.deserialize::<AddressRecord>() {
            match result {
                Ok(record) => records.push(record),
                Err(err) => warn!("Skipping malformed address row: {err}"),
            }
        }
        info!("Loaded {} addresses", records.len());
        Ok(Self::from_records(records))
    }

    pub fn from_records(records: Vec<AddressRecord>) -> Self {
        Self {
            addresses: records.into_iter().map(Address::from).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Substring search over normalized street names. Only the part
    /// before the first comma takes part on either side, house numbers
    /// match as part of the street text.
    pub fn find(&self, query: &str) -> Vec<&Address> {
        let needle = normalize(street_part(query));
        self.addresses
            .iter()
            .filter(|address| normalize(street_part(&address.full_address)).contains(&needle))
            .collect()
    }
}

fn street_part(address: &str) -> &str {
    address.split(',').next().unwrap_or(address)
}

fn street_suffix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\bstrasse\b|\bstr\.|\bstr\b").unwrap())
}

/// Canonical form of a street name for matching: NFKD-decomposed with
/// everything non-ASCII dropped, lowercased, the suffix spellings
/// `strasse`/`str.`/`str` collapsed to `str`, all spaces removed.
/// Idempotent, so user input and table rows go through the same path.
pub fn normalize(s: &str) -> String {
    let ascii: String = s.nfkd().filter(char::is_ascii).collect();
    let lowered = ascii.to_lowercase();
    let folded = street_suffix_pattern().replace_all(lowered.trim(), "str");
    folded.replace(' ', "")
}

/// A stop within walking range of a coordinate.
#[derive(Debug, Clone)]
pub struct NearbyStop {
    pub stop_id: Arc<str>,
    pub stop_name: Arc<str>,
    pub coordinate: Coordinate,
    pub walking_distance: Distance,
    pub walking_time: Duration,
}

const MAX_NEARBY_STOPS: usize = 3;

/// The closest stops around `coordinate` within the configured walking
/// radius, nearest first, at most three. Stops without a usable position
/// never qualify.
pub fn nearest_stops(
    coordinate: &Coordinate,
    timetable: &Timetable,
    config: &Config,
) -> Vec<NearbyStop> {
    let mut nearby: Vec<NearbyStop> = timetable
        .stops
        .par_iter()
        .filter_map(|stop| {
            let stop_coordinate = stop.coordinate?;
            let walking_distance = coordinate.haversine_distance(&stop_coordinate);
            if walking_distance > config.max_walking_distance {
                return None;
            }
            let walking_time = Duration::from_seconds(
                (walking_distance.as_meters() / config.walking_speed).round() as u32,
            );
            Some(NearbyStop {
                stop_id: stop.id.clone(),
                stop_name: stop.name.clone(),
                coordinate: stop_coordinate,
                walking_distance,
                walking_time,
            })
        })
        .collect();
    nearby.sort_by(|a, b| {
        a.walking_distance
            .as_meters()
            .total_cmp(&b.walking_distance.as_meters())
    });
    nearby.truncate(MAX_NEARBY_STOPS);
    nearby
}
