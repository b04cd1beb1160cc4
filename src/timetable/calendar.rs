use super::{EXCEPTION_SERVICE_ADDED, EXCEPTION_SERVICE_REMOVED, Timetable};
use chrono::{Datelike, NaiveDate};
use std::{collections::HashSet, sync::Arc};
use tracing::warn;

/// The set of service ids running on `date`: weekday flag set and the
/// date inside the service's validity range, then corrected by the
/// calendar_dates exceptions.
pub fn active_services(timetable: &Timetable, date: NaiveDate) -> HashSet<Arc<str>> {
    let weekday = date.weekday().num_days_from_monday() as usize;
    let date_str = date.format("%Y%m%d").to_string();

    let mut active: HashSet<Arc<str>> = timetable
        .calendar
        .iter()
        .filter(|service| service.weekdays[weekday])
        .filter(|service| {
            service.start_date.as_ref() <= date_str.as_str()
                && date_str.as_str() <= service.end_date.as_ref()
        })
        .map(|service| service.service_id.clone())
        .collect();

    if active.is_empty() && !timetable.calendar.is_empty() {
        // Degraded mode: an empty day would mean no routing at all, so
        // fall back to every known service. Trips may show up on days
        // they do not actually run.
        warn!("No services active on {date_str}, falling back to all {} services", timetable.calendar.len());
        active = timetable
            .calendar
            .iter()
            .map(|service| service.service_id.clone())
            .collect();
    }

    for exception in &timetable.calendar_dates {
        if exception.date.as_ref() != date_str.as_str() {
            continue;
        }
        match exception.exception_type {
            EXCEPTION_SERVICE_ADDED => {
                active.insert(exception.service_id.clone());
            }
            EXCEPTION_SERVICE_REMOVED => {
                active.remove(&exception.service_id);
            }
            other => warn!(
                "Unknown exception_type {other} for service {}",
                exception.service_id
            ),
        }
    }

    active
}
