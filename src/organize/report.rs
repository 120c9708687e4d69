//! Report types for the organizer.

use std::fmt;
use std::ops::AddAssign;

use serde::Serialize;

use crate::taxonomy::{Subcategory, Variant};

/// File counts for one subcategory variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct VariantCounts {
    /// Images copied into `images/`.
    pub images: usize,
    /// Source JSON files copied into `json/`.
    pub json: usize,
    /// CSV files translated from a source JSON.
    pub csv: usize,
    /// Header-only CSV files written for unannotated images.
    pub empty_csv: usize,
}

impl AddAssign for VariantCounts {
    fn add_assign(&mut self, other: Self) {
        self.images += other.images;
        self.json += other.json;
        self.csv += other.csv;
        self.empty_csv += other.empty_csv;
    }
}

/// Per-variant outcome for one subcategory.
#[derive(Clone, Debug, Serialize)]
pub struct SubcategoryReport {
    pub raw_name: String,
    pub subcategory: Subcategory,
    /// Only variants that copied at least one image.
    pub variants: Vec<(Variant, VariantCounts)>,
    /// Source JSON files skipped because they failed to parse.
    pub unreadable_json: usize,
}

impl SubcategoryReport {
    pub fn new(raw_name: impl Into<String>, subcategory: Subcategory) -> Self {
        Self {
            raw_name: raw_name.into(),
            subcategory,
            variants: Vec::new(),
            unreadable_json: 0,
        }
    }

    pub fn totals(&self) -> VariantCounts {
        let mut totals = VariantCounts::default();
        for (_, counts) in &self.variants {
            totals += *counts;
        }
        totals
    }

    pub fn variant(&self, variant: Variant) -> Option<VariantCounts> {
        self.variants
            .iter()
            .find(|(v, _)| *v == variant)
            .map(|(_, counts)| *counts)
    }
}

/// Outcome of one organizer run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct OrganizeReport {
    pub subcategories: Vec<SubcategoryReport>,
}

impl OrganizeReport {
    pub fn subcategory(&self, subcategory: Subcategory) -> Option<&SubcategoryReport> {
        self.subcategories
            .iter()
            .find(|report| report.subcategory == subcategory)
    }

    pub fn totals(&self) -> VariantCounts {
        let mut totals = VariantCounts::default();
        for report in &self.subcategories {
            totals += report.totals();
        }
        totals
    }
}

impl fmt::Display for SubcategoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Organized {} -> {}", self.raw_name, self.subcategory)?;
        for (variant, counts) in &self.variants {
            writeln!(
                f,
                "  {}: {} images, {} JSON files, {} CSV files",
                variant, counts.images, counts.json, counts.csv
            )?;
        }
        let totals = self.totals();
        writeln!(
            f,
            "  Total: {} images, {} JSON files, {} CSV files",
            totals.images, totals.json, totals.csv
        )
    }
}

impl fmt::Display for OrganizeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for report in &self.subcategories {
            write!(f, "{}", report)?;
        }

        let unreadable: usize = self.subcategories.iter().map(|r| r.unreadable_json).sum();
        if unreadable > 0 {
            writeln!(f, "Skipped {} unreadable annotation JSON file(s)", unreadable)?;
        }
        Ok(())
    }
}
