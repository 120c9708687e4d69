//! Report types for split derivation.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::taxonomy::{Split, Subcategory, Variant};

/// How a variant's split lists were derived.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMethod {
    /// Reference stems matched the variant's own stems.
    Reference,
    /// Sorted stems sliced by ratio.
    Proportional,
}

impl fmt::Display for SplitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitMethod::Reference => f.write_str("reference"),
            SplitMethod::Proportional => f.write_str("proportional"),
        }
    }
}

/// One list file written under `sets/`.
#[derive(Clone, Debug, Serialize)]
pub struct WrittenList {
    /// `train`, `val`, `test` or `all`.
    pub name: String,
    pub path: PathBuf,
    pub count: usize,
}

/// Lists written for one subcategory variant.
#[derive(Clone, Debug, Serialize)]
pub struct VariantSplits {
    pub subcategory: Subcategory,
    pub variant: Variant,
    pub method: SplitMethod,
    pub lists: Vec<WrittenList>,
}

impl VariantSplits {
    /// Entry count of the named list, if it was written.
    pub fn count(&self, name: &str) -> Option<usize> {
        self.lists
            .iter()
            .find(|list| list.name == name)
            .map(|list| list.count)
    }
}

/// Outcome of split derivation.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SplitReport {
    /// Reference directory used, or `None` when the step was skipped.
    pub reference_dir: Option<PathBuf>,
    /// Entries read from each reference list that exists.
    pub reference_counts: Vec<(Split, usize)>,
    pub variants: Vec<VariantSplits>,
}

impl SplitReport {
    pub fn skipped(&self) -> bool {
        self.reference_dir.is_none()
    }

    pub fn variant(&self, subcategory: Subcategory, variant: Variant) -> Option<&VariantSplits> {
        self.variants
            .iter()
            .find(|v| v.subcategory == subcategory && v.variant == variant)
    }
}

impl fmt::Display for SplitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.skipped() {
            return writeln!(
                f,
                "Warning: all/ directory does not exist, skipping splits creation"
            );
        }

        writeln!(f, "Created dataset splits:")?;
        for (split, count) in &self.reference_counts {
            writeln!(f, "  Read {} files from {}.txt", count, split)?;
        }
        for variant in &self.variants {
            for list in &variant.lists {
                writeln!(
                    f,
                    "  Created {} with {} files",
                    list.path.display(),
                    list.count
                )?;
            }
        }
        Ok(())
    }
}
