#![forbid(unsafe_code)]

//! First-name analytics over the birth dataset.
//!
//! Birth rows carry up to four name slots (`pr1`..`pr4`); `pr1` is the
//! primary name. Name text goes through the display repair of
//! [`rg_types::repair`] before any grouping or matching, so corrupted
//! spellings like `Jos_phine` count together with their repaired form.
//!
//! Wherever a single winning name is selected, ties break to the
//! lexicographically smallest name among the tied counts.

use std::collections::{BTreeMap, BTreeSet};

use rg_agg::{YearCounts, GENDER_COLUMN, YEAR_COLUMN};
use rg_frame::{FrameError, Table};
use rg_types::{
    repair::{canonical_gender, restore_text, FEMININ, MASCULIN},
    Scalar,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The four name slots of a birth row, in recording order.
pub const NAME_SLOTS: &[&str] = &["pr1", "pr2", "pr3", "pr4"];
/// Primary name slot.
pub const PRIMARY_NAME_SLOT: &str = "pr1";

#[derive(Debug, Error)]
pub enum NameError {
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Most frequent primary name per (year, gender), pivoted to one row per
/// year with one name column per primary gender.
///
/// Restricted to the two primary gender categories; other and missing
/// genders are dropped, as are rows without a valid year or primary name.
/// Output columns are `annee` then the canonical gender spellings in
/// lexicographic order; a (year, gender) pair with no rows pivots to a
/// missing cell.
pub fn top_name_by_year_and_gender(table: &Table) -> Result<Table, NameError> {
    let years = table.require_column(YEAR_COLUMN)?;
    let genders = table.require_column(GENDER_COLUMN)?;
    let names = table.require_column(PRIMARY_NAME_SLOT)?;

    let mut counts: BTreeMap<(i64, String, String), u64> = BTreeMap::new();
    for ((year_cell, gender_cell), name_cell) in years.iter().zip(genders).zip(names) {
        let Some(year) = year_cell.to_year().filter(|&y| y > 0) else {
            continue;
        };
        let Some(gender) = primary_gender(gender_cell) else {
            continue;
        };
        let Some(name) = repaired_name(name_cell) else {
            continue;
        };
        *counts.entry((year, gender, name)).or_insert(0) += 1;
    }

    // BTreeMap order is (year, gender, name) ascending, so keeping a win
    // only on a strictly greater count leaves the lexicographically
    // smallest name in place on ties.
    let mut winners: BTreeMap<(i64, String), (String, u64)> = BTreeMap::new();
    let mut year_set = BTreeSet::new();
    let mut gender_set = BTreeSet::new();
    for ((year, gender, name), count) in counts {
        year_set.insert(year);
        gender_set.insert(gender.clone());
        let slot = winners.entry((year, gender)).or_insert((name.clone(), 0));
        if count > slot.1 {
            *slot = (name, count);
        }
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
                winners
                    .get(&(year, gender.clone()))
                    .map_or(Scalar::Null, |(name, _)| Scalar::Utf8(name.clone()))
            })
            .collect();
        pivot.push_column(gender.clone(), column)?;
    }
    Ok(pivot)
}

/// Most frequent primary name per primary gender, all years combined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopNames {
    pub male: Option<String>,
    pub female: Option<String>,
}

pub fn top_name_overall(table: &Table) -> Result<TopNames, NameError> {
    let genders = table.require_column(GENDER_COLUMN)?;
    let names = table.require_column(PRIMARY_NAME_SLOT)?;

    let mut counts: BTreeMap<(String, String), u64> = BTreeMap::new();
    for (gender_cell, name_cell) in genders.iter().zip(names) {
        let Some(gender) = primary_gender(gender_cell) else {
            continue;
        };
        let Some(name) = repaired_name(name_cell) else {
            continue;
        };
        *counts.entry((gender, name)).or_insert(0) += 1;
    }

    let mut best: BTreeMap<String, (String, u64)> = BTreeMap::new();
    for ((gender, name), count) in counts {
        let slot = best.entry(gender).or_insert((name.clone(), 0));
        if count > slot.1 {
            *slot = (name, count);
        }
    }

    Ok(TopNames {
        male: best.get(MASCULIN).map(|(name, _)| name.clone()),
        female: best.get(FEMININ).map(|(name, _)| name.clone()),
    })
}

/// Occurrences of one queried name across all four name slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameSearch {
    pub total_occurrences: u64,
    pub occurrences_by_year: YearCounts,
}

/// Reshapes the name slots into one long name column and filters to an
/// exact, case-insensitive match against `query`.
///
/// The total counts every match; the year breakdown only the matches with
/// a valid year. Slots absent from the table are skipped, but a table with
/// no name slot at all is an error.
pub fn search_name(table: &Table, query: &str) -> Result<NameSearch, NameError> {
    let years = table.require_column(YEAR_COLUMN)?;
    let slots: Vec<&[Scalar]> = NAME_SLOTS
        .iter()
        .filter_map(|slot| table.column(slot))
        .collect();
    if slots.is_empty() {
        return Err(FrameError::MissingColumn {
            name: PRIMARY_NAME_SLOT.to_owned(),
        }
        .into());
    }

    let needle = query.to_lowercase();
    let mut total = 0u64;
    let mut by_year = YearCounts::new();
    for slot in slots {
        for (year_cell, name_cell) in years.iter().zip(slot) {
            let Some(name) = repaired_name(name_cell) else {
                continue;
            };
            if name.to_lowercase() != needle {
                continue;
            }
            total += 1;
            if let Some(year) = year_cell.to_year().filter(|&y| y > 0) {
                *by_year.entry(year).or_insert(0) += 1;
            }
        }
    }

    Ok(NameSearch {
        total_occurrences: total,
        occurrences_by_year: by_year,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ComparisonOutcome {
    Winner(String),
    Tie,
}

/// Head-to-head result of [`compare_names`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameComparison {
    pub name_a: String,
    pub name_b: String,
    pub count_a: u64,
    pub count_b: u64,
    pub outcome: ComparisonOutcome,
}

/// Runs [`search_name`] for both names; the winner needs strictly more
/// total occurrences, an exact tie is reported as such rather than picking
/// either name.
pub fn compare_names(table: &Table, name_a: &str, name_b: &str) -> Result<NameComparison, NameError> {
    let result_a = search_name(table, name_a)?;
    let result_b = search_name(table, name_b)?;

    let outcome = if result_a.total_occurrences > result_b.total_occurrences {
        ComparisonOutcome::Winner(name_a.to_owned())
    } else if result_b.total_occurrences > result_a.total_occurrences {
        ComparisonOutcome::Winner(name_b.to_owned())
    } else {
        ComparisonOutcome::Tie
    };

    Ok(NameComparison {
        name_a: name_a.to_owned(),
        name_b: name_b.to_owned(),
        count_a: result_a.total_occurrences,
        count_b: result_b.total_occurrences,
        outcome,
    })
}

/// Canonical gender when the raw cell is one of the two primary
/// categories, `None` otherwise.
fn primary_gender(cell: &Scalar) -> Option<String> {
    let raw = cell.as_str()?;
    let canonical = canonical_gender(raw);
    (canonical == MASCULIN || canonical == FEMININ).then_some(canonical)
}

/// Display-repaired, trimmed name; `None` for missing or blank cells.
fn repaired_name(cell: &Scalar) -> Option<String> {
    let raw = cell.as_str()?;
    let repaired = restore_text(raw.trim());
    (!repaired.is_empty()).then_some(repaired)
}
