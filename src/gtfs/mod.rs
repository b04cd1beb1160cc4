pub mod models;

use models::*;
use serde::de::DeserializeOwned;
use std::{
    fs::{self, File},
    io::{self, BufReader},
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{info, warn};
use zip::{ZipArchive, read::ZipFile};

pub const STOPS_FILE: &str = "stops.txt";
pub const ROUTES_FILE: &str = "routes.txt";
pub const TRIPS_FILE: &str = "trips.txt";
pub const STOP_TIMES_FILE: &str = "stop_times.txt";
pub const CALENDAR_FILE: &str = "calendar.txt";
pub const CALENDAR_DATES_FILE: &str = "calendar_dates.txt";

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Missing mandatory GTFS file: {0}")]
    MissingFile(String),
    #[error("Missing any source to pull data from")]
    MissingSource,
}

#[derive(Default)]
pub enum Source {
    #[default]
    None,
    Zip(ZipArchive<File>),
    Directory(PathBuf),
}

/// Handle on a GTFS feed. Rows are streamed table by table into whatever
/// the caller builds from them, the feed itself is never held in memory
/// twice.
#[derive(Default)]
pub struct Gtfs {
    storage: Source,
}

impl Gtfs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_zip<P: AsRef<Path>>(mut self, path: P) -> Result<Self, self::Error> {
        let zip_file = File::open(path)?;
        let archive = ZipArchive::new(zip_file)?;
        self.storage = Source::Zip(archive);
        Ok(self)
    }

    pub fn from_zip_cache<P: AsRef<Path>>(mut self, path: P) -> Result<Self, self::Error> {
        let directory = Gtfs::get_or_create_cache_dir(&path)?;
        self.storage = Source::Directory(directory);
        Ok(self)
    }

    pub fn from_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.storage = Source::Directory(path.as_ref().to_path_buf());
        self
    }

    pub fn get_or_create_cache_dir<P: AsRef<Path>>(zip_path: P) -> Result<PathBuf, self::Error> {
        let zip_path = zip_path.as_ref();

        let mut target_dir = PathBuf::from(zip_path);
        target_dir.set_extension("");

        if !target_dir.exists() {
            info!("Extracting GTFS to {:?}...", target_dir);
            fs::create_dir_all(&target_dir)?;

            let file = fs::File::open(zip_path)?;
            let mut archive = zip::ZipArchive::new(file)?;
            archive.extract(&target_dir)?;
        } else {
            info!("Using existing GTFS cache at {:?}", target_dir);
        }

        Ok(target_dir)
    }

    pub fn stream_stops<F>(&mut self, f: F) -> Result<(), self::Error>
    where
        F: FnMut(GtfsStop),
    {
        self.stream_mandatory(STOPS_FILE, f)
    }

    pub fn stream_routes<F>(&mut self, f: F) -> Result<(), self::Error>
    where
        F: FnMut(GtfsRoute),
    {
        self.stream_mandatory(ROUTES_FILE, f)
    }

    pub fn stream_trips<F>(&mut self, f: F) -> Result<(), self::Error>
    where
        F: FnMut(GtfsTrip),
    {
        self.stream_mandatory(TRIPS_FILE, f)
    }

    pub fn stream_stop_times<F>(&mut self, f: F) -> Result<(), self::Error>
    where
        F: FnMut(GtfsStopTime),
    {
        self.stream_mandatory(STOP_TIMES_FILE, f)
    }

    pub fn stream_calendar<F>(&mut self, f: F) -> Result<(), self::Error>
    where
        F: FnMut(GtfsCalendar),
    {
        self.stream_mandatory(CALENDAR_FILE, f)
    }

    /// calendar_dates.txt is optional, a feed without exceptions is fine.
    pub fn stream_calendar_dates<F>(&mut self, f: F) -> Result<(), self::Error>
    where
        F: FnMut(GtfsCalendarDate),
    {
        match &mut self.storage {
            Source::None => Err(self::Error::MissingSource),
            Source::Zip(archive) => {
                if archive.index_for_name(CALENDAR_DATES_FILE).is_none() {
                    return Ok(());
                }
                stream_from_zip(archive, CALENDAR_DATES_FILE, f)
            }
            Source::Directory(path) => {
                if !path.join(CALENDAR_DATES_FILE).exists() {
                    return Ok(());
                }
                stream_from_dir(path, CALENDAR_DATES_FILE, f)
            }
        }
    }

    fn stream_mandatory<T, F>(&mut self, file_name: &str, f: F) -> Result<(), self::Error>
    where
        T: DeserializeOwned,
        F: FnMut(T),
    {
        match &mut self.storage {
            Source::None => Err(self::Error::MissingSource),
            Source::Zip(archive) => stream_from_zip(archive, file_name, f),
            Source::Directory(path) => {
                if !path.join(file_name).exists() {
                    return Err(self::Error::MissingFile(file_name.to_string()));
                }
                stream_from_dir(path, file_name, f)
            }
        }
    }
}

fn stream_from_zip<T, F>(
    archive: &mut ZipArchive<File>,
    file_name: &str,
    f: F,
) -> Result<(), self::Error>
where
    T: DeserializeOwned,
    F: FnMut(T),
{
    let file = get_file_from_zip(archive, file_name)?;
    let mut reader = csv::Reader::from_reader(file);
    stream_records(&mut reader, file_name, f)
}

fn stream_from_dir<T, F>(dir_path: &Path, file_name: &str, f: F) -> Result<(), self::Error>
where
    T: DeserializeOwned,
    F: FnMut(T),
{
    let file_path = dir_path.join(file_name);
    let file = fs::File::open(file_path)?;

    // BufReader is critical here for speed
    let reader = BufReader::with_capacity(128 * 1024, file);
    let mut csv_reader = csv::Reader::from_reader(reader);
    stream_records(&mut csv_reader, file_name, f)
}

/// Rows that fail to deserialize are logged and skipped, a single broken
/// line must not sink the whole feed.
fn stream_records<R, T, F>(
    reader: &mut csv::Reader<R>,
    file_name: &str,
    mut f: F,
) -> Result<(), self::Error>
where
    R: io::Read,
    T: DeserializeOwned,
    F: FnMut(T),
{
    for result in reader.deserialize() {
        match result {
            Ok(record) => f(record),
            Err(err) => warn!("Skipping malformed row in {file_name}: {err}"),
        }
    }
    Ok(())
}

fn get_file_from_zip<'a>(
    archive: &'a mut ZipArchive<File>,
    name: &'a str,
) -> Result<ZipFile<'a, File>, self::Error> {
    let index = archive
        .index_for_name(name)
        .ok_or(self::Error::MissingFile(name.to_string()))?;
    let file = archive.by_index(index)?;
    Ok(file)
}
