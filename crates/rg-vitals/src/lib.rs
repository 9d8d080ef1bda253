#![forbid(unsafe_code)]

//! Death and age analytics: age-at-death derivation, grouped mean ages,
//! histogram bucketing, and calendar (month/season/weekday) bucketing.
//!
//! Age is days-between-dates divided by 365 — a deliberate approximation
//! the published dashboard numbers are calibrated to, kept as-is rather
//! than made calendar-aware. Rows with an unparseable date or a negative
//! age are dropped silently, like every other row-level anomaly.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rg_agg::{YEAR_COLUMN, GENDER_COLUMN};
use rg_frame::{FrameError, Table};
use rg_types::{repair::canonical_gender, Scalar};
use thiserror::Error;

/// Birth-date column of the death dataset.
pub const BIRTH_DATE_COLUMN: &str = "date_naissance";
/// Death-date column of the death dataset.
pub const DEATH_DATE_COLUMN: &str = "date_deces";
/// Derived age column appended by [`age_at_death`].
pub const AGE_COLUMN: &str = "age_deces";

/// Month names in calendar order.
pub const MONTHS: [&str; 12] = [
    "Janvier",
    "Février",
    "Mars",
    "Avril",
    "Mai",
    "Juin",
    "Juillet",
    "Août",
    "Septembre",
    "Octobre",
    "Novembre",
    "Décembre",
];

/// Seasons in canonical order: Dec–Feb, Mar–May, Jun–Aug, Sep–Nov.
/// `Ete` keeps the source data's unaccented spelling.
pub const SEASONS: [&str; 4] = ["Hiver", "Printemps", "Ete", "Automne"];

/// Weekdays, Monday first.
pub const WEEKDAYS: [&str; 7] = [
    "Lundi", "Mardi", "Mercredi", "Jeudi", "Vendredi", "Samedi", "Dimanche",
];

/// Day-first formats tried in order, plus ISO for re-derived tables.
const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"];

#[derive(Debug, Error)]
pub enum VitalsError {
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Ordered bucket counts (months, seasons, weekdays, histogram bins).
/// Zero-count buckets are present, in canonical order.
pub type BucketCounts = Vec<(String, u64)>;

/// Parses a registry date, day-first convention.
#[must_use]
pub fn parse_date_dayfirst(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

fn cell_date(cell: &Scalar) -> Option<NaiveDate> {
    cell.as_str().and_then(parse_date_dayfirst)
}

/// Derives age at death for every row with a usable date pair.
///
/// Age is `floor(days / 365)` — Euclidean division, so a death recorded
/// shortly *before* the birth gives −1, not 0, and the row is dropped with
/// the other negatives. Kept rows come back with both date columns
/// normalized to ISO text and an Int64 [`AGE_COLUMN`] appended.
pub fn age_at_death(table: &Table) -> Result<Table, VitalsError> {
    let births = table.require_column(BIRTH_DATE_COLUMN)?;
    let deaths = table.require_column(DEATH_DATE_COLUMN)?;

    let mut keep = Vec::new();
    let mut birth_dates = Vec::new();
    let mut death_dates = Vec::new();
    let mut ages = Vec::new();
    for (position, (birth_cell, death_cell)) in births.iter().zip(deaths).enumerate() {
        let (Some(birth), Some(death)) = (cell_date(birth_cell), cell_date(death_cell)) else {
            continue;
        };
        let age = (death - birth).num_days().div_euclid(365);
        if age < 0 {
            continue;
        }
        keep.push(position);
        birth_dates.push(Scalar::Utf8(birth.format("%Y-%m-%d").to_string()));
        death_dates.push(Scalar::Utf8(death.format("%Y-%m-%d").to_string()));
        ages.push(Scalar::Int64(age));
    }

    let mut derived = table.take_rows(&keep);
    derived.set_column(BIRTH_DATE_COLUMN, birth_dates)?;
    derived.set_column(DEATH_DATE_COLUMN, death_dates)?;
    derived.push_column(AGE_COLUMN.to_owned(), ages)?;
    Ok(derived)
}

/// Mean age at death per valid year.
pub fn average_age_by_year(table: &Table) -> Result<BTreeMap<i64, f64>, VitalsError> {
    let derived = age_at_death(table)?;
    let years = derived.require_column(YEAR_COLUMN)?;
    let ages = derived.require_column(AGE_COLUMN)?;

    let mut sums: BTreeMap<i64, (f64, u64)> = BTreeMap::new();
    for (year_cell, age_cell) in years.iter().zip(ages) {
        let Some(year) = year_cell.to_year().filter(|&y| y > 0) else {
            continue;
        };
        let Ok(age) = age_cell.to_f64() else {
            continue;
        };
        let entry = sums.entry(year).or_insert((0.0, 0));
        entry.0 += age;
        entry.1 += 1;
    }

    Ok(sums
        .into_iter()
        .map(|(year, (sum, count))| (year, sum / count as f64))
        .collect())
}

/// Mean age at death per (year, gender), long form: one row per pair with
/// `annee`, canonical `genre`, and a Float64 mean [`AGE_COLUMN`].
pub fn average_age_by_year_and_gender(table: &Table) -> Result<Table, VitalsError> {
    let derived = age_at_death(table)?;
    let years = derived.require_column(YEAR_COLUMN)?;
    let genders = derived.require_column(GENDER_COLUMN)?;
    let ages = derived.require_column(AGE_COLUMN)?;

    let mut sums: BTreeMap<(i64, String), (f64, u64)> = BTreeMap::new();
    for ((year_cell, gender_cell), age_cell) in years.iter().zip(genders).zip(ages) {
        let Some(year) = year_cell.to_year().filter(|&y| y > 0) else {
            continue;
        };
        let Some(gender) = gender_cell.group_label() else {
            continue;
        };
        let Ok(age) = age_cell.to_f64() else {
            continue;
        };
        let entry = sums
            .entry((year, canonical_gender(&gender)))
            .or_insert((0.0, 0));
        entry.0 += age;
        entry.1 += 1;
    }

    let mut year_column = Vec::with_capacity(sums.len());
    let mut gender_column = Vec::with_capacity(sums.len());
    let mut age_column = Vec::with_capacity(sums.len());
    for ((year, gender), (sum, count)) in sums {
        year_column.push(Scalar::Int64(year));
        gender_column.push(Scalar::Utf8(gender));
        age_column.push(Scalar::Float64(sum / count as f64));
    }

    Table::from_columns([
        (YEAR_COLUMN.to_owned(), year_column),
        (GENDER_COLUMN.to_owned(), gender_column),
        (AGE_COLUMN.to_owned(), age_column),
    ])
    .map_err(VitalsError::from)
}

/// Equal-width age histogram over the derived ages, optionally restricted
/// to an inclusive year range first. Without a range every derived age is
/// binned, whatever the year column holds.
///
/// Buckets are labelled `"{low}-{high}"` with the edge values truncated to
/// integers; the lowest edge is nudged down by 0.1% of the range so the
/// minimum age falls inside the first bucket. Zero-count buckets are
/// present, in bin order. Empty input or zero `bins` yields no buckets.
pub fn age_histogram(
    table: &Table,
    bins: usize,
    year_range: Option<(i64, i64)>,
) -> Result<BucketCounts, VitalsError> {
    let derived = age_at_death(table)?;

    let ages: Vec<i64> = match year_range {
        None => all_ages(&derived)?,
        Some((low, high)) => ages_in_year_range(&derived, low, high)?,
    };
    if ages.is_empty() || bins == 0 {
        return Ok(Vec::new());
    }

    let min = *ages.iter().min().unwrap_or(&0) as f64;
    let max = *ages.iter().max().unwrap_or(&0) as f64;
    let (mut low_edge, high_edge) = if min == max {
        // Degenerate range: widen both sides like the reference binning.
        let pad = if min == 0.0 { 0.001 } else { 0.001 * min.abs() };
        (min - pad, max + pad)
    } else {
        (min, max)
    };
    let width = (high_edge - low_edge) / bins as f64;
    let edges: Vec<f64> = (0..=bins)
        .map(|i| low_edge + width * i as f64)
        .collect();
    if min < max {
        low_edge -= (high_edge - low_edge) * 0.001;
    }

    let mut counts = vec![0u64; bins];
    for &age in &ages {
        let value = age as f64;
        // Right-closed intervals; the nudged lowest edge admits the min.
        let bucket = (0..bins)
            .find(|&i| {
                let left = if i == 0 { low_edge } else { edges[i] };
                value > left && value <= edges[i + 1]
            })
            .unwrap_or(bins - 1);
        counts[bucket] += 1;
    }

    Ok(counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let left = if i == 0 { low_edge } else { edges[i] };
            (format!("{}-{}", left as i64, edges[i + 1] as i64), count)
        })
        .collect())
}

fn all_ages(derived: &Table) -> Result<Vec<i64>, VitalsError> {
    let ages = derived.require_column(AGE_COLUMN)?;
    Ok(ages
        .iter()
        .filter_map(|cell| match cell {
            Scalar::Int64(age) => Some(*age),
            _ => None,
        })
        .collect())
}

fn ages_in_year_range(derived: &Table, low: i64, high: i64) -> Result<Vec<i64>, VitalsError> {
    let ages = derived.require_column(AGE_COLUMN)?;
    let years = derived.require_column(YEAR_COLUMN)?;
    let mut out = Vec::with_capacity(ages.len());
    for (position, age_cell) in ages.iter().enumerate() {
        match years[position].to_year() {
            Some(year) if (low..=high).contains(&year) => {}
            _ => continue,
        }
        if let Scalar::Int64(age) = age_cell {
            out.push(*age);
        }
    }
    Ok(out)
}

/// Events per calendar month of `date_column`, Janvier..Décembre,
/// zero-filled.
pub fn events_by_month(table: &Table, date_column: &str) -> Result<BucketCounts, VitalsError> {
    let counts = calendar_counts::<12>(table, date_column, |date| date.month0() as usize)?;
    Ok(labelled(&MONTHS, &counts))
}

/// Events per season of `date_column`: Dec–Feb Hiver, Mar–May Printemps,
/// Jun–Aug Ete, Sep–Nov Automne. Zero-filled, canonical order.
pub fn events_by_season(table: &Table, date_column: &str) -> Result<BucketCounts, VitalsError> {
    let counts = calendar_counts::<4>(table, date_column, |date| match date.month() {
        12 | 1 | 2 => 0,
        3..=5 => 1,
        6..=8 => 2,
        _ => 3,
    })?;
    Ok(labelled(&SEASONS, &counts))
}

/// Events per weekday of `date_column`, Monday first, zero-filled.
pub fn events_by_weekday(table: &Table, date_column: &str) -> Result<BucketCounts, VitalsError> {
    let counts = calendar_counts::<7>(table, date_column, |date| {
        date.weekday().num_days_from_monday() as usize
    })?;
    Ok(labelled(&WEEKDAYS, &counts))
}

/// Deaths per calendar month.
pub fn deaths_by_month(table: &Table) -> Result<BucketCounts, VitalsError> {
    events_by_month(table, DEATH_DATE_COLUMN)
}

/// Deaths per season.
pub fn deaths_by_season(table: &Table) -> Result<BucketCounts, VitalsError> {
    events_by_season(table, DEATH_DATE_COLUMN)
}

/// Deaths per weekday.
pub fn deaths_by_weekday(table: &Table) -> Result<BucketCounts, VitalsError> {
    events_by_weekday(table, DEATH_DATE_COLUMN)
}

fn calendar_counts<const N: usize>(
    table: &Table,
    date_column: &str,
    bucket_of: impl Fn(NaiveDate) -> usize,
) -> Result<[u64; N], VitalsError> {
    let dates = table.require_column(date_column)?;
    let mut counts = [0u64; N];
    for cell in dates {
        if let Some(date) = cell_date(cell) {
            counts[bucket_of(date)] += 1;
        }
    }
    Ok(counts)
}

fn labelled(labels: &[&str], counts: &[u64]) -> BucketCounts {
    labels
        .iter()
        .zip(counts)
        .map(|(label, &count)| ((*label).to_owned(), count))
        .collect()
}
