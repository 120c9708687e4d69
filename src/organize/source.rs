//! Raw per-image annotation JSON files and their lookup index.
//!
//! The raw dataset ships one JSON file per annotated image. The JSON's own
//! file name does not always match its image; when `images[0].pvc_filename`
//! is present it names the real image and takes priority over the file stem.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Number, Value};
use tracing::debug;

use crate::boxes::BoxRow;
use crate::error::LeafcocoError;
use crate::layout::{files_with_extension, stem_of};

/// A box from a source JSON, with numbers kept as written.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceBox {
    pub item: String,
    pub x: Number,
    pub y: Number,
    pub width: Number,
    pub height: Number,
}

impl SourceBox {
    /// Returns true when both width and height are strictly positive.
    pub fn has_area(&self) -> bool {
        let positive = |n: &Number| n.as_f64().map(|v| v > 0.0).unwrap_or(false);
        positive(&self.width) && positive(&self.height)
    }

    /// Converts to a CSV row labelled with `category_id`.
    pub fn to_row(&self, category_id: u32) -> BoxRow {
        BoxRow {
            item: self.item.clone(),
            x: self.x.to_string(),
            y: self.y.to_string(),
            width: self.width.to_string(),
            height: self.height.to_string(),
            label: category_id,
        }
    }
}

/// A parsed source annotation file.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceAnnotation {
    pub path: PathBuf,
    /// Stem of `images[0].pvc_filename`, when present.
    pub pvc_stem: Option<String>,
    pub boxes: Vec<SourceBox>,
}

impl SourceAnnotation {
    /// Parses a source annotation document.
    pub fn from_value(path: &Path, value: &Value) -> Self {
        Self {
            path: path.to_path_buf(),
            pvc_stem: pvc_stem(value),
            boxes: source_boxes(value),
        }
    }

    /// CSV rows for every box with a positive area.
    pub fn rows(&self, category_id: u32) -> Vec<BoxRow> {
        self.boxes
            .iter()
            .filter(|b| b.has_area())
            .map(|b| b.to_row(category_id))
            .collect()
    }
}

fn pvc_stem(value: &Value) -> Option<String> {
    let name = value
        .get("images")?
        .as_array()?
        .first()?
        .get("pvc_filename")?
        .as_str()?;
    if name.is_empty() {
        return None;
    }
    stem_of(Path::new(name))
}

fn source_boxes(value: &Value) -> Vec<SourceBox> {
    let Some(entries) = value.get("annotations").and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let bbox = entry.get("bbox")?.as_array()?;
            if bbox.len() < 4 {
                return None;
            }
            let number = |i: usize| bbox[i].as_number().cloned();
            let item = match entry.get("id") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => (index + 1).to_string(),
            };
            Some(SourceBox {
                item,
                x: number(0)?,
                y: number(1)?,
                width: number(2)?,
                height: number(3)?,
            })
        })
        .collect()
}

/// Lookup from image stem to its source annotation.
#[derive(Debug, Default)]
pub struct AnnotationIndex {
    annotations: Vec<SourceAnnotation>,
    by_pvc: HashMap<String, usize>,
    by_stem: HashMap<String, usize>,
    unreadable: usize,
}

impl AnnotationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes every `*.json` file in `dir`. A missing directory adds nothing.
    ///
    /// Files that fail to parse are skipped and counted. Later files overwrite
    /// earlier ones that map to the same stem.
    pub fn add_dir(&mut self, dir: &Path) -> Result<(), LeafcocoError> {
        for path in files_with_extension(dir, "json")? {
            let Some(stem) = stem_of(&path) else {
                continue;
            };
            let bytes = fs::read(&path)?;
            let value: Value = match serde_json::from_slice(&bytes) {
                Ok(value) => value,
                Err(err) => {
                    debug!("skipping unreadable annotation {}: {err}", path.display());
                    self.unreadable += 1;
                    continue;
                }
            };
            self.insert(stem, SourceAnnotation::from_value(&path, &value));
        }
        Ok(())
    }

    /// Adds one parsed annotation under `stem` (and its pvc stem, if any).
    pub fn insert(&mut self, stem: String, annotation: SourceAnnotation) {
        let slot = self.annotations.len();
        if let Some(pvc) = &annotation.pvc_stem {
            self.by_pvc.insert(pvc.clone(), slot);
        }
        self.by_stem.insert(stem, slot);
        self.annotations.push(annotation);
    }

    /// Resolves an image stem, preferring the pvc cross-reference.
    pub fn resolve(&self, stem: &str) -> Option<&SourceAnnotation> {
        self.by_pvc
            .get(stem)
            .or_else(|| self.by_stem.get(stem))
            .map(|&slot| &self.annotations[slot])
    }

    /// Number of JSON files skipped because they failed to parse.
    pub fn unreadable(&self) -> usize {
        self.unreadable
    }

    pub fn len(&self) -> usize {
        self.by_stem.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_stem.is_empty()
    }
}
