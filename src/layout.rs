//! Filesystem layout of the raw dataset and of the canonical tree.
//!
//! The canonical tree is `{root}/{category}/{subcategory}/{variant}/` with the
//! `images`, `json`, `csv` and `sets` subdirectories. The raw dataset lives
//! either under `{root}/data/origin/` or directly under `{root}/`.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::LeafcocoError;
use crate::taxonomy::{Subcategory, Variant};

/// Candidate raw dataset roots, relative to the dataset root, in priority order.
const RAW_ROOTS: [&[&str]; 2] = [&["data", "origin"], &[]];

/// Directory holding the reference `train/val/test` lists.
const REFERENCE_DIR: &str = "all";

/// Paths inside one `{subcategory}/{variant}` directory of the canonical tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantDir {
    root: PathBuf,
}

impl VariantDir {
    pub fn new(category_root: &Path, subcategory: Subcategory, variant: Variant) -> Self {
        Self {
            root: category_root
                .join(subcategory.as_str())
                .join(variant.as_str()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn images(&self) -> PathBuf {
        self.root.join("images")
    }

    pub fn json(&self) -> PathBuf {
        self.root.join("json")
    }

    pub fn csv(&self) -> PathBuf {
        self.root.join("csv")
    }

    pub fn sets(&self) -> PathBuf {
        self.root.join("sets")
    }

    pub fn csv_file(&self, stem: &str) -> PathBuf {
        self.csv().join(format!("{stem}.csv"))
    }

    pub fn json_file(&self, stem: &str) -> PathBuf {
        self.json().join(format!("{stem}.json"))
    }

    pub fn split_file(&self, split_name: &str) -> PathBuf {
        self.sets().join(format!("{split_name}.txt"))
    }

    /// Creates the `images`, `json` and `csv` directories.
    pub fn create_data_dirs(&self) -> Result<(), LeafcocoError> {
        for dir in [self.images(), self.json(), self.csv()] {
            fs::create_dir_all(&dir)?;
        }
        Ok(())
    }
}

/// Locates the raw source directory for one subcategory variant.
///
/// Tries `{root}/data/origin/{raw}/{variant}` then `{root}/{raw}/{variant}`.
pub fn resolve_source_variant_dir(root: &Path, raw_name: &str, variant: Variant) -> Option<PathBuf> {
    RAW_ROOTS
        .iter()
        .map(|parts| {
            parts
                .iter()
                .fold(root.to_path_buf(), |acc, part| acc.join(part))
                .join(raw_name)
                .join(variant.as_str())
        })
        .find(|candidate| candidate.is_dir())
}

/// Locates the reference split directory (`data/origin/all` or `all`).
pub fn resolve_reference_dir(root: &Path) -> Option<PathBuf> {
    RAW_ROOTS
        .iter()
        .map(|parts| {
            parts
                .iter()
                .fold(root.to_path_buf(), |acc, part| acc.join(part))
                .join(REFERENCE_DIR)
        })
        .find(|candidate| candidate.is_dir())
}

/// Returns the file stem of a path as an owned string.
pub fn stem_of(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
}

/// Lists the regular files directly inside `dir`, sorted by file name.
///
/// Symlinks to files count as files. A missing directory yields an empty list.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>, LeafcocoError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| LeafcocoError::Traversal {
            path: dir.to_path_buf(),
            message: source.to_string(),
        })?;
        if entry.path().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Lists files in `dir` whose extension matches exactly (case-sensitive).
pub fn files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, LeafcocoError> {
    Ok(list_files(dir)?
        .into_iter()
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(extension))
        .collect())
}

/// Collects image files keyed by stem, walking extensions in the given order.
///
/// When two files share a stem the one with the later extension wins.
pub fn images_by_stem(
    dir: &Path,
    extensions: &[&str],
) -> Result<BTreeMap<String, PathBuf>, LeafcocoError> {
    let files = list_files(dir)?;
    let mut images = BTreeMap::new();
    for extension in extensions {
        for path in &files {
            if path.extension().and_then(|e| e.to_str()) != Some(*extension) {
                continue;
            }
            if let Some(stem) = stem_of(path) {
                images.insert(stem, path.clone());
            }
        }
    }
    Ok(images)
}

/// Finds `{dir}/{stem}.{ext}` for the first extension that exists.
pub fn find_image(dir: &Path, stem: &str, extensions: &[&str]) -> Option<PathBuf> {
    extensions
        .iter()
        .map(|extension| dir.join(format!("{stem}.{extension}")))
        .find(|candidate| candidate.is_file())
}

/// Reads a newline-delimited stem list, ignoring blank lines.
///
/// A missing file reads as an empty list.
pub fn read_split_list(path: &Path) -> Result<Vec<String>, LeafcocoError> {
    if !path.is_file() {
        return Ok(Vec::new());
    }
    let text = fs::read_to_string(path)?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Writes stems one per line, newline-terminated, in the given order.
pub fn write_split_list<S: AsRef<str>>(path: &Path, stems: &[S]) -> Result<(), LeafcocoError> {
    let mut file = fs::File::create(path)?;
    let mut body = String::new();
    for stem in stems {
        body.push_str(stem.as_ref());
        body.push('\n');
    }
    file.write_all(body.as_bytes())?;
    Ok(())
}

/// Copies `from` to `to`, overwriting the destination.
pub fn copy_file(from: &Path, to: &Path) -> Result<(), LeafcocoError> {
    fs::copy(from, to).map_err(|source| LeafcocoError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })?;
    Ok(())
}
