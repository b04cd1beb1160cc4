use chrono::{Local, Timelike};
use std::ops::{Add, AddAssign, Sub, SubAssign};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseTimeError {
    #[error("expected HH:MM or HH:MM:SS, got: {0}")]
    InvalidFormat(String),
    #[error("time out of range: {0}")]
    OutOfRange(String),
}

/// A point in time measured in seconds from midnight of the service day.
///
/// GTFS allows hours of 24 and beyond for trips that run past midnight,
/// so a `Time` is not bounded to one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(u32);

impl From<u32> for Time {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl Sub<Time> for Time {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Self::Output {
        Duration(self.0 - rhs.0)
    }
}

impl Add<Duration> for Time {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign<Duration> for Time {
    fn add_assign(&mut self, rhs: Duration) {
        self.0 += rhs.0
    }
}

impl Time {
    pub const ZERO: Time = Time(0);

    pub fn now() -> Self {
        let now = Local::now();
        Self(now.num_seconds_from_midnight())
    }

    pub const fn from_seconds(secs: u32) -> Self {
        Self(secs)
    }

    pub const fn as_seconds(&self) -> u32 {
        self.0
    }

    /// Whole service days contained in this time. Non-zero exactly for the
    /// GTFS "hours >= 24" convention.
    pub const fn days(&self) -> u32 {
        self.0 / 86_400
    }

    pub const fn hours(&self) -> u32 {
        (self.0 % 86_400) / 3600
    }

    pub const fn minutes(&self) -> u32 {
        (self.0 % 3600) / 60
    }

    pub const fn seconds(&self) -> u32 {
        self.0 % 60
    }

    /// Lenient schedule-time parser: `H[H]:MM[:SS]`, hours 24 and above
    /// accepted. Anything unparseable collapses to zero.
    pub fn parse_gtfs(time: &str) -> Self {
        let mut hms = [0u32; 3];
        let mut count = 0;
        for part in time.split(':') {
            if count == 3 {
                return Self::ZERO;
            }
            match part.trim().parse() {
                Ok(value) => hms[count] = value,
                Err(_) => return Self::ZERO,
            }
            count += 1;
        }
        if count < 2 {
            return Self::ZERO;
        }
        Self(hms[0] * 3600 + hms[1] * 60 + hms[2])
    }

    /// Strict wall-clock parser for user input: `HH:MM` or `HH:MM:SS`
    /// within a single day.
    pub fn parse_hms(time: &str) -> Result<Self, ParseTimeError> {
        let parts: Vec<&str> = time.split(':').collect();
        if parts.len() != 2 && parts.len() != 3 {
            return Err(ParseTimeError::InvalidFormat(time.to_string()));
        }
        let mut hms = [0u32; 3];
        for (i, part) in parts.iter().enumerate() {
            hms[i] = part
                .parse()
                .map_err(|_| ParseTimeError::InvalidFormat(time.to_string()))?;
        }
        if hms[0] > 23 || hms[1] > 59 || hms[2] > 59 {
            return Err(ParseTimeError::OutOfRange(time.to_string()));
        }
        Ok(Self(hms[0] * 3600 + hms[1] * 60 + hms[2]))
    }

    pub fn to_hms_string(&self) -> String {
        let h = self.0 / 3600;
        let m = (self.0 % 3600) / 60;
        let s = self.0 % 60;
        format!("{:02}:{:02}:{:02}", h, m, s)
    }

    pub fn to_hm_string(&self) -> String {
        let h = self.0 / 3600;
        let m = (self.0 % 3600) / 60;
        format!("{:02}:{:02}", h, m)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration(u32);

impl From<u32> for Duration {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl Duration {
    pub const ZERO: Duration = Duration(0);

    pub const fn from_seconds(secs: u32) -> Self {
        Self(secs)
    }

    pub const fn from_minutes(minutes: u32) -> Self {
        Self(minutes * 60)
    }

    pub const fn from_hours(hours: u32) -> Self {
        Self(hours * 60 * 60)
    }

    pub const fn as_seconds(&self) -> u32 {
        self.0
    }

    pub const fn as_minutes(&self) -> u32 {
        self.0 / 60
    }
}

impl Sub for Duration {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Duration {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0
    }
}

impl Add for Duration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0
    }
}

#[test]
fn parse_unparse_1() {
    let time = "00:00:00";
    let stime = Time::parse_hms(time).unwrap();
    assert_eq!(time, stime.to_hms_string())
}

#[test]
fn parse_unparse_2() {
    let time = "00:00:30";
    let stime = Time::parse_hms(time).unwrap();
    assert_eq!(time, stime.to_hms_string())
}

#[test]
fn parse_unparse_3() {
    let time = "12:30:30";
    let stime = Time::parse_hms(time).unwrap();
    assert_eq!(time, stime.to_hms_string())
}

#[test]
fn parse_unparse_4() {
    let time = "23:59:59";
    let stime = Time::parse_hms(time).unwrap();
    assert_eq!(time, stime.to_hms_string())
}

#[test]
fn strict_accepts_hh_mm() {
    assert_eq!(Time::parse_hms("08:15").unwrap().as_seconds(), 29700);
}

#[test]
fn strict_rejects_hour_24() {
    assert!(Time::parse_hms("24:00:00").is_err())
}

#[test]
fn strict_rejects_garbage() {
    assert!(Time::parse_hms("8 Uhr").is_err())
}

#[test]
fn lenient_parses_plain_time() {
    assert_eq!(Time::parse_gtfs("01:01:30").as_seconds(), 3690);
}

#[test]
fn lenient_accepts_missing_seconds() {
    assert_eq!(Time::parse_gtfs("08:15").as_seconds(), 29700);
}

#[test]
fn lenient_collapses_garbage_to_zero() {
    assert_eq!(Time::parse_gtfs("00:00:0a"), Time::ZERO);
}

#[test]
fn lenient_collapses_missing_minutes_to_zero() {
    assert_eq!(Time::parse_gtfs("8"), Time::ZERO);
}

#[test]
fn lenient_accepts_late_night_hours() {
    let time = Time::parse_gtfs("25:10:00");
    assert_eq!(time.as_seconds(), 25 * 3600 + 600);
}

#[test]
fn late_night_hours_have_day_component() {
    let time = Time::parse_gtfs("26:05:09");
    assert_eq!(
        (time.days(), time.hours(), time.minutes(), time.seconds()),
        (1, 2, 5, 9)
    );
}
