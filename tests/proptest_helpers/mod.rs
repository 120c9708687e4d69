#![allow(dead_code)]

use std::collections::BTreeSet;

use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Image stems shaped like the dataset's file names.
pub fn stem_strategy() -> BoxedStrategy<String> {
    "[a-z0-9]{1,6}(_[A-Z0-9]{1,4}){0,2}".boxed()
}

/// A sorted, duplicate-free stem list.
pub fn arb_sorted_stems(max_len: usize) -> BoxedStrategy<Vec<String>> {
    prop::collection::btree_set(stem_strategy(), 0..=max_len)
        .prop_map(|set: BTreeSet<String>| set.into_iter().collect())
        .boxed()
}

/// A `(train, val)` ratio pair whose sum stays within 1.
pub fn arb_ratios() -> BoxedStrategy<(f64, f64)> {
    (0.0f64..=1.0, 0.0f64..=1.0)
        .prop_map(|(train, share)| (train, (1.0 - train) * share))
        .boxed()
}

/// One CSV cell: usually a number, sometimes junk.
pub fn csv_cell_strategy() -> BoxedStrategy<String> {
    prop_oneof![
        6 => (-50.0f64..500.0).prop_map(|v| format!("{v}")),
        3 => (-5i64..500).prop_map(|v| v.to_string()),
        1 => Just(String::new()),
        1 => Just("nan".to_string()),
        1 => Just("inf".to_string()),
        1 => "[a-z]{1,3}",
    ]
    .boxed()
}

/// Body rows for a box CSV, each with 0 to 7 cells.
pub fn arb_csv_rows(max_rows: usize) -> BoxedStrategy<Vec<Vec<String>>> {
    prop::collection::vec(
        prop::collection::vec(csv_cell_strategy(), 0..=7),
        0..=max_rows,
    )
    .boxed()
}

/// Renders a box CSV with the standard header.
pub fn render_box_csv(rows: &[Vec<String>]) -> String {
    let mut text = String::from("#item,x,y,width,height,label\n");
    for row in rows {
        text.push_str(&row.join(","));
        text.push('\n');
    }
    text
}
