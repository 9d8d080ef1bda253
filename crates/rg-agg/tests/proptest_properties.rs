#![forbid(unsafe_code)]

//! Property tests for the aggregation invariants.
//!
//! Generators produce year columns the way the registry files actually
//! look: numeric text, the occasional `0`, free text, and blanks mixed in
//! one column. Properties must hold for ALL such inputs, not just the
//! hand-picked fixtures in the unit tests.

use proptest::prelude::*;

use rg_agg::{count_rows_by_year, extreme_years, merge_yearly_counts, rank_by_frequency};
use rg_frame::Table;
use rg_types::Scalar;

/// A single `annee` cell: mostly valid years, some invalid by each route.
fn arb_year_cell() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        4 => (1891i64..2017).prop_map(|y| Scalar::Utf8(y.to_string())),
        1 => Just(Scalar::Utf8("0".to_owned())),
        1 => (-50i64..1).prop_map(Scalar::Int64),
        1 => "[a-z ]{1,8}".prop_map(Scalar::Utf8),
        1 => Just(Scalar::Null),
    ]
}

fn arb_year_table(max_rows: usize) -> impl Strategy<Value = Table> {
    proptest::collection::vec(arb_year_cell(), 0..max_rows)
        .prop_map(|cells| Table::from_columns([("annee".to_owned(), cells)]).expect("one column"))
}

fn arb_name_cell() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        5 => "[A-Z][a-z]{1,4}".prop_map(Scalar::Utf8),
        1 => Just(Scalar::Null),
    ]
}

fn valid_year_count(table: &Table) -> u64 {
    table
        .column("annee")
        .expect("annee")
        .iter()
        .filter(|cell| cell.to_year().is_some_and(|y| y > 0))
        .count() as u64
}

proptest! {
    #[test]
    fn year_counts_exclude_invalid_years_and_preserve_totals(table in arb_year_table(60)) {
        let counts = count_rows_by_year(&table).expect("aggregate");
        prop_assert!(counts.keys().all(|&year| year > 0));
        prop_assert_eq!(counts.values().sum::<u64>(), valid_year_count(&table));
    }

    #[test]
    fn merged_counts_cover_the_union_with_zero_fill(
        a in arb_year_table(40),
        b in arb_year_table(40),
        c in arb_year_table(40),
    ) {
        let merged = merge_yearly_counts(&[("a", &a), ("b", &b), ("c", &c)])
            .expect("merge");

        let years: Vec<i64> = merged
            .column("annee")
            .expect("annee")
            .iter()
            .map(|cell| cell.to_year().expect("merged years are integers"))
            .collect();

        // Strictly ascending, hence also duplicate-free.
        prop_assert!(years.windows(2).all(|w| w[0] < w[1]));

        // Each dataset column sums to that dataset's valid row count: every
        // valid row lands in exactly one (zero-filled) output cell.
        for (label, table) in [("a", &a), ("b", &b), ("c", &c)] {
            let column_total: i64 = merged
                .column(label)
                .expect("dataset column")
                .iter()
                .map(|cell| cell.to_year().expect("counts are integers"))
                .sum();
            prop_assert_eq!(column_total as u64, valid_year_count(table));
        }
    }

    #[test]
    fn ranking_is_bounded_and_non_increasing(
        names in proptest::collection::vec(arb_name_cell(), 0..80),
        limit in 0usize..10,
    ) {
        let table = Table::from_columns([("pr1".to_owned(), names)]).expect("one column");
        let ranked = rank_by_frequency(&table, "pr1", limit).expect("rank");
        prop_assert!(ranked.len() <= limit);
        prop_assert!(ranked.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn extremes_bracket_every_count(table in arb_year_table(60)) {
        let counts = count_rows_by_year(&table).expect("aggregate");
        match extreme_years(&counts) {
            None => prop_assert!(counts.is_empty()),
            Some(extremes) => {
                prop_assert_eq!(counts.get(&extremes.highest.year), Some(&extremes.highest.value));
                prop_assert_eq!(counts.get(&extremes.lowest.year), Some(&extremes.lowest.value));
                for &value in counts.values() {
                    prop_assert!(value <= extremes.highest.value);
                    prop_assert!(value >= extremes.lowest.value);
                }
            }
        }
    }
}
