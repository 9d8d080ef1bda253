#![forbid(unsafe_code)]

//! Aggregation engine: grouped counts and derived metrics over registry
//! tables.
//!
//! Every function is a pure transform from a caller-owned [`Table`] to a
//! fresh result. Row-level anomalies (unparseable year, missing category)
//! drop the row from the result; only a missing column is a hard error.
//!
//! Group keys come back in `BTreeMap` order, so year mappings are sorted
//! ascending and category mappings lexicographically — the stable sorts
//! built on top of them inherit a lexicographic tie-break.

use std::collections::{BTreeMap, BTreeSet};

use rg_frame::{FrameError, Table};
use rg_types::{
    repair::{canonical_gender, FEMININ, MASCULIN},
    Scalar,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Year column shared by all three datasets.
pub const YEAR_COLUMN: &str = "annee";
/// Gender column of the birth and death datasets.
pub const GENDER_COLUMN: &str = "genre";

/// Count of rows per valid year, sorted ascending by year.
pub type YearCounts = BTreeMap<i64, u64>;

#[derive(Debug, Error)]
pub enum AggError {
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Raw row count, before any validity filtering.
#[must_use]
pub fn count_rows(table: &Table) -> usize {
    table.row_count()
}

/// Groups rows by coerced year and counts them.
///
/// Non-numeric years and years ≤ 0 are dropped silently; the sum of the
/// returned counts equals the number of rows with a valid positive year.
pub fn count_rows_by_year(table: &Table) -> Result<YearCounts, AggError> {
    let years = table.require_column(YEAR_COLUMN)?;
    let mut counts = YearCounts::new();
    for cell in years {
        if let Some(year) = cell.to_year() {
            if year > 0 {
                *counts.entry(year).or_insert(0) += 1;
            }
        }
    }
    Ok(counts)
}

/// Computes [`count_rows_by_year`] per labelled input and joins on year.
///
/// The output has one row per year present in **any** input, sorted
/// ascending, with an `annee` column followed by one Int64 count column
/// per input in the given order; a year absent from an input counts 0
/// there, not a gap.
pub fn merge_yearly_counts(datasets: &[(&str, &Table)]) -> Result<Table, AggError> {
    let mut per_dataset = Vec::with_capacity(datasets.len());
    let mut years = BTreeSet::new();
    for (label, table) in datasets {
        let counts = count_rows_by_year(table)?;
        years.extend(counts.keys().copied());
        per_dataset.push((*label, counts));
    }

    let mut merged = Table::new();
    merged.push_column(
        YEAR_COLUMN.to_owned(),
        years.iter().map(|&y| Scalar::Int64(y)).collect(),
    )?;
    for (label, counts) in per_dataset {
        let column = years
            .iter()
            .map(|year| Scalar::Int64(counts.get(year).copied().unwrap_or(0) as i64))
            .collect();
        merged.push_column(label.to_owned(), column)?;
    }
    Ok(merged)
}

/// Groups rows by the raw values of `column` and counts them.
///
/// No normalization is applied to the category values; missing cells are
/// dropped. Fails when the column is absent.
pub fn count_rows_by_category(
    table: &Table,
    column: &str,
) -> Result<BTreeMap<String, u64>, AggError> {
    let cells = table.require_column(column)?;
    let mut counts = BTreeMap::new();
    for cell in cells {
        if let Some(label) = cell.group_label() {
            *counts.entry(label).or_insert(0) += 1;
        }
    }
    Ok(counts)
}

/// Top `limit` values of `column` by frequency.
///
/// Sorted by count descending; ties break lexicographically ascending on
/// the value (the stable sort runs over an already-sorted category map).
pub fn rank_by_frequency(
    table: &Table,
    column: &str,
    limit: usize,
) -> Result<Vec<(String, u64)>, AggError> {
    let mut ranked: Vec<(String, u64)> = count_rows_by_category(table, column)?
        .into_iter()
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(limit);
    Ok(ranked)
}

/// (year, gender) pivot: one row per valid year, one Int64 count column
/// per gender category, zero-filled.
///
/// Labels are canonicalised before counting (`F_minin` and `Féminin`
/// merge into one `Féminin` column), columns ordered by canonical label;
/// rows with a missing gender are dropped.
pub fn count_by_year_and_gender(table: &Table) -> Result<Table, AggError> {
    let years = table.require_column(YEAR_COLUMN)?;
    let genders = table.require_column(GENDER_COLUMN)?;

    let mut counts: BTreeMap<(i64, String), u64> = BTreeMap::new();
    let mut year_set = BTreeSet::new();
    let mut gender_set = BTreeSet::new();
    for (year_cell, gender_cell) in years.iter().zip(genders) {
        let Some(year) = year_cell.to_year().filter(|&y| y > 0) else {
            continue;
        };
        let Some(gender) = gender_cell.group_label() else {
            continue;
        };
        let gender = canonical_gender(&gender);
        year_set.insert(year);
        gender_set.insert(gender.clone());
        *counts.entry((year, gender)).or_insert(0) += 1;
    }

    let mut pivot = Table::new();
    pivot.push_column(
        YEAR_COLUMN.to_owned(),
        year_set.iter().map(|&y| Scalar::Int64(y)).collect(),
    )?;
    for gender in &gender_set {
        let column = year_set
            .iter()
            .map(|&year| {
                let count = counts
                    .get(&(year, gender.clone()))
                    .copied()
                    .unwrap_or(0);
                Scalar::Int64(count as i64)
            })
            .collect();
        pivot.push_column(gender.clone(), column)?;
    }
    Ok(pivot)
}

/// Highest/lowest entry of a year→count mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearExtreme {
    pub year: i64,
    pub value: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearExtremes {
    pub highest: YearExtreme,
    pub lowest: YearExtreme,
}

/// Argmax/argmin over a year→count mapping; ties resolve to the earliest
/// year. `None` on an empty mapping.
#[must_use]
pub fn extreme_years(counts: &YearCounts) -> Option<YearExtremes> {
    let mut iter = counts.iter();
    let (&first_year, &first_value) = iter.next()?;
    let mut highest = YearExtreme {
        year: first_year,
        value: first_value,
    };
    let mut lowest = highest;
    for (&year, &value) in iter {
        if value > highest.value {
            highest = YearExtreme { year, value };
        }
        if value < lowest.value {
            lowest = YearExtreme { year, value };
        }
    }
    Some(YearExtremes { highest, lowest })
}

/// Extreme years overall and per primary gender, for the metric cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderedExtremes {
    pub all: YearExtremes,
    pub female: YearExtremes,
    pub male: YearExtremes,
}

/// Highest/lowest year for all genders combined and for each primary
/// gender, over the zero-filled per-year counts.
///
/// The per-gender series are zero-filled over every valid year of the
/// table, so a year with no recorded women can legitimately be the female
/// minimum. `None` when no row has a valid year and gender.
pub fn gendered_extremes(table: &Table) -> Result<Option<GenderedExtremes>, AggError> {
    let years = table.require_column(YEAR_COLUMN)?;
    let genders = table.require_column(GENDER_COLUMN)?;

    let mut total = YearCounts::new();
    let mut female = YearCounts::new();
    let mut male = YearCounts::new();
    for (year_cell, gender_cell) in years.iter().zip(genders) {
        let Some(year) = year_cell.to_year().filter(|&y| y > 0) else {
            continue;
        };
        let Some(gender) = gender_cell.group_label() else {
            continue;
        };
        *total.entry(year).or_insert(0) += 1;
        let canonical = canonical_gender(&gender);
        if canonical == FEMININ {
            *female.entry(year).or_insert(0) += 1;
        } else if canonical == MASCULIN {
            *male.entry(year).or_insert(0) += 1;
        }
    }

    // Zero-fill the gendered series over the full valid-year index.
    for &year in total.keys() {
        female.entry(year).or_insert(0);
        male.entry(year).or_insert(0);
    }

    let Some(all) = extreme_years(&total) else {
        return Ok(None);
    };
    let female = extreme_years(&female).unwrap_or(all);
    let male = extreme_years(&male).unwrap_or(all);
    Ok(Some(GenderedExtremes { all, female, male }))
}
