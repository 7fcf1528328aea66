use crate::models::Observation;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Aligns two series on exact date matches (inner join).
///
/// A date present in only one of the series contributes nothing, so the result is
/// never longer than the shorter input. Output is ascending by date regardless of
/// input order; if a series repeats a date, its last value wins.
///
/// Returns a vector of tuples (date, value_a, value_b).
pub fn align_series(series_a: &[Observation], series_b: &[Observation]) -> Vec<(NaiveDate, f64, f64)> {
    let map_a: BTreeMap<NaiveDate, f64> = series_a.iter().map(|o| (o.date, o.value)).collect();
    let map_b: BTreeMap<NaiveDate, f64> = series_b.iter().map(|o| (o.date, o.value)).collect();

    map_a
        .into_iter()
        .filter_map(|(date, val_a)| map_b.get(&date).map(|val_b| (date, val_a, *val_b)))
        .collect()
}

/// Keeps the items dated on or after `start`. `None` keeps everything.
pub fn trim_from<T, F>(items: Vec<T>, start: Option<NaiveDate>, date_of: F) -> Vec<T>
where
    F: Fn(&T) -> NaiveDate,
{
    match start {
        Some(start) => items.into_iter().filter(|item| date_of(item) >= start).collect(),
        None => items,
    }
}
