//! Report types for the COCO converter.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::taxonomy::Split;

/// One generated COCO file.
#[derive(Clone, Debug, Serialize)]
pub struct GeneratedFile {
    pub split: Split,
    pub path: PathBuf,
    pub images: usize,
    pub annotations: usize,
    /// Candidate stems with no image file in any selected subcategory.
    pub unresolved_stems: usize,
    /// CSV rows dropped as malformed or degenerate.
    pub skipped_rows: usize,
    /// True when no split list existed and every image was taken.
    pub used_all_images: bool,
}

/// Outcome of one converter run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CocoReport {
    pub files: Vec<GeneratedFile>,
}

impl CocoReport {
    pub fn file(&self, split: Split) -> Option<&GeneratedFile> {
        self.files.iter().find(|f| f.split == split)
    }
}

impl fmt::Display for CocoReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for file in &self.files {
            writeln!(
                f,
                "Generated: {} ({} images, {} annotations)",
                file.path.display(),
                file.images,
                file.annotations
            )?;
        }
        Ok(())
    }
}
