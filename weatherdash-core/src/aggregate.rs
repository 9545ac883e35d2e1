//! Collapses the 3-hourly forecast into one summary per calendar day.
//!
//! Days are keyed by the UTC date of each sample, while the representative
//! sample is picked by its hour in the caller's local timezone. Near the UTC
//! date line this can attribute a reading to a neighbouring day.

use chrono::{NaiveDate, TimeZone, Timelike};
use std::collections::HashMap;

use crate::{
    DashError,
    model::{DaySummary, RawForecastSample},
};

/// Upper bound on the number of days in the forecast strip.
pub const MAX_FORECAST_DAYS: usize = 6;

const NOON: i64 = 12;

/// Group samples by UTC date in order of first appearance and summarize each
/// of the first [`MAX_FORECAST_DAYS`] groups.
pub fn group_forecast_to_days<Tz: TimeZone>(
    samples: &[RawForecastSample],
    local: &Tz,
) -> Result<Vec<DaySummary>, DashError> {
    let mut order: Vec<NaiveDate> = Vec::new();
    let mut by_day: HashMap<NaiveDate, Vec<&RawForecastSample>> = HashMap::new();

    for sample in samples {
        sample.validate()?;

        let key = sample.timestamp.date_naive();
        by_day
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(sample);
    }

    let days = order
        .into_iter()
        .take(MAX_FORECAST_DAYS)
        .filter_map(|date| by_day.remove(&date).map(|group| summarize(date, &group, local)))
        .collect();

    Ok(days)
}

fn summarize<Tz: TimeZone>(
    date: NaiveDate,
    group: &[&RawForecastSample],
    local: &Tz,
) -> DaySummary {
    let total: f64 = group.iter().map(|s| s.temperature).sum();
    let average_temperature = total / group.len() as f64;

    let distance = |s: &RawForecastSample| {
        let hour = i64::from(s.timestamp.with_timezone(local).hour());
        (hour - NOON).abs()
    };

    // Strict comparison keeps the earliest sample on ties.
    let mut representative = group[0];
    for &candidate in &group[1..] {
        if distance(candidate) < distance(representative) {
            representative = candidate;
        }
    }

    DaySummary {
        date,
        average_temperature,
        icon: representative.icon.clone(),
        description: representative.description.clone(),
    }
}
