//! Train/val/test list derivation for the canonical tree.
//!
//! A global reference listing (`all/{train,val,test}.txt`) assigns stems to
//! splits. Each stem is attributed to the subcategory whose `color` images
//! contain it (`without_augmentation` when a subcategory has no `color`
//! variant), and every variant then gets its own `sets/{split}.txt` lists.
//!
//! Variants whose file names don't line up with the reference fall back to
//! slicing their own sorted stems by ratio. `with_augmentation` always does.

mod report;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

pub use report::{SplitMethod, SplitReport, VariantSplits, WrittenList};

use crate::error::LeafcocoError;
use crate::layout::{
    list_files, read_split_list, resolve_reference_dir, stem_of, write_split_list, VariantDir,
};
use crate::taxonomy::{Split, Subcategory, Variant, CANONICAL_CATEGORY};

/// Segmentation output suffix with a trailing index.
pub const MASKED_SUFFIX_INDEXED: &str = "_final_masked_1";
/// Segmentation output suffix.
pub const MASKED_SUFFIX: &str = "_final_masked";

// Fixed character counts of the suffixes above, leading underscore included.
const MASKED_SUFFIX_INDEXED_LEN: usize = 15;
const MASKED_SUFFIX_LEN: usize = 13;

/// Stems per split.
pub type SplitLists = BTreeMap<Split, Vec<String>>;

/// Train and validation fractions; test takes the remainder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitRatios {
    pub train: f64,
    pub val: f64,
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            train: 0.7,
            val: 0.15,
        }
    }
}

impl SplitRatios {
    /// Ratios observed in a subcategory's reference lists, or the defaults
    /// when the reference is empty.
    pub fn from_reference(reference: &SplitLists) -> Self {
        let count = |split: Split| reference.get(&split).map(Vec::len).unwrap_or(0);
        let total = count(Split::Train) + count(Split::Val) + count(Split::Test);
        if total == 0 {
            return Self::default();
        }
        Self {
            train: count(Split::Train) as f64 / total as f64,
            val: count(Split::Val) as f64 / total as f64,
        }
    }
}

/// Slices sorted stems into contiguous train/val/test ranges.
///
/// Sizes are `floor(n * train)` and `floor(n * val)`; test gets the rest.
pub fn proportional_split(sorted_stems: &[String], ratios: SplitRatios) -> SplitLists {
    let total = sorted_stems.len();
    let train_size = ((total as f64 * ratios.train).floor() as usize).min(total);
    let val_size = ((total as f64 * ratios.val).floor() as usize).min(total - train_size);

    let (train, rest) = sorted_stems.split_at(train_size);
    let (val, test) = rest.split_at(val_size);

    let mut lists = SplitLists::new();
    lists.insert(Split::Train, train.to_vec());
    lists.insert(Split::Val, val.to_vec());
    lists.insert(Split::Test, test.to_vec());
    lists
}

/// Maps a base stem to the segmented stems derived from it.
pub fn masked_stem_index<'a, I>(stems: I) -> HashMap<String, Vec<String>>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut index: HashMap<String, Vec<String>> = HashMap::new();
    for stem in stems {
        let base = if stem.ends_with(MASKED_SUFFIX_INDEXED) {
            &stem[..stem.len() - MASKED_SUFFIX_INDEXED_LEN]
        } else if stem.ends_with(MASKED_SUFFIX) {
            &stem[..stem.len() - MASKED_SUFFIX_LEN]
        } else {
            continue;
        };
        index.entry(base.to_string()).or_default().push(stem.clone());
    }
    index
}

/// Matches reference stems against a variant's stems.
///
/// A stem matches directly, or through `masked` (every masked stem of the
/// base is taken). Output lists are sorted and deduplicated.
pub fn match_reference(
    reference: &SplitLists,
    variant_stems: &BTreeSet<String>,
    masked: Option<&HashMap<String, Vec<String>>>,
) -> SplitLists {
    let mut matched = SplitLists::new();
    for (split, stems) in reference {
        let mut hits = BTreeSet::new();
        for stem in stems {
            if variant_stems.contains(stem) {
                hits.insert(stem.clone());
            } else if let Some(masked_stems) = masked.and_then(|m| m.get(stem)) {
                hits.extend(masked_stems.iter().cloned());
            } else {
                debug!("reference stem {stem} has no {split} match");
            }
        }
        if !hits.is_empty() {
            matched.insert(*split, hits.into_iter().collect());
        }
    }
    matched
}

/// Derives split lists for every variant of every subcategory.
///
/// Skipped with a warning when no reference directory exists.
pub fn create_splits(root: &Path) -> Result<SplitReport, LeafcocoError> {
    info!("Creating dataset splits...");

    let mut report = SplitReport::default();
    let Some(reference_dir) = resolve_reference_dir(root) else {
        warn!("all/ directory does not exist, skipping splits creation");
        return Ok(report);
    };

    let mut reference = SplitLists::new();
    for split in Split::ALL {
        let path = reference_dir.join(format!("{split}.txt"));
        if !path.is_file() {
            continue;
        }
        let entries = read_split_list(&path)?;
        debug!("  Read {} files from {split}.txt", entries.len());
        report.reference_counts.push((split, entries.len()));
        reference.insert(split, entries);
    }
    report.reference_dir = Some(reference_dir);

    let category_root = root.join(CANONICAL_CATEGORY);
    let owners = stem_owners(&category_root)?;

    for (_, subcategory) in Subcategory::RAW_ALIASES {
        let subcategory_reference = reference_for(&reference, &owners, subcategory);
        for variant in Variant::ALL {
            if let Some(splits) =
                derive_variant_splits(&category_root, subcategory, variant, &subcategory_reference)?
            {
                report.variants.push(splits);
            }
        }
    }

    Ok(report)
}

/// Maps every reference-variant stem to its subcategory.
fn stem_owners(category_root: &Path) -> Result<HashMap<String, Subcategory>, LeafcocoError> {
    let mut owners = HashMap::new();
    for (_, subcategory) in Subcategory::RAW_ALIASES {
        let color = VariantDir::new(category_root, subcategory, Variant::Color).images();
        let images_dir = if color.is_dir() {
            color
        } else {
            VariantDir::new(category_root, subcategory, Variant::WithoutAugmentation).images()
        };
        for path in list_files(&images_dir)? {
            if let Some(stem) = stem_of(&path) {
                owners.insert(stem, subcategory);
            }
        }
    }
    Ok(owners)
}

/// Filters the reference lists down to one subcategory's stems.
fn reference_for(
    reference: &SplitLists,
    owners: &HashMap<String, Subcategory>,
    subcategory: Subcategory,
) -> SplitLists {
    let mut filtered = SplitLists::new();
    for (split, entries) in reference {
        let stems: Vec<String> = entries
            .iter()
            .filter_map(|entry| stem_of(Path::new(entry)))
            .filter(|stem| owners.get(stem) == Some(&subcategory))
            .collect();
        if !stems.is_empty() {
            filtered.insert(*split, stems);
        }
    }
    filtered
}

/// Writes the split lists of one variant.
///
/// Returns `None` when the variant directory is absent or has no images.
fn derive_variant_splits(
    category_root: &Path,
    subcategory: Subcategory,
    variant: Variant,
    reference: &SplitLists,
) -> Result<Option<VariantSplits>, LeafcocoError> {
    let dir = VariantDir::new(category_root, subcategory, variant);
    if !dir.path().is_dir() {
        return Ok(None);
    }
    fs::create_dir_all(dir.sets())?;

    let stems: BTreeSet<String> = list_files(&dir.images())?
        .iter()
        .filter_map(|path| stem_of(path))
        .collect();
    if stems.is_empty() {
        return Ok(None);
    }

    let masked = (variant == Variant::Segmented).then(|| masked_stem_index(&stems));
    let mut lists = match_reference(reference, &stems, masked.as_ref());
    let mut method = SplitMethod::Reference;

    if lists.values().all(Vec::is_empty) || variant == Variant::WithAugmentation {
        let sorted: Vec<String> = stems.iter().cloned().collect();
        lists = proportional_split(&sorted, SplitRatios::from_reference(reference));
        method = SplitMethod::Proportional;
    }

    let mut splits = VariantSplits {
        subcategory,
        variant,
        method,
        lists: Vec::new(),
    };

    for split in Split::ALL {
        let path = dir.split_file(split.as_str());
        match lists.get(&split).filter(|stems| !stems.is_empty()) {
            Some(stems) => {
                write_split_list(&path, stems.as_slice())?;
                debug!("  Created {} with {} files", path.display(), stems.len());
                splits.lists.push(WrittenList {
                    name: split.as_str().to_string(),
                    path,
                    count: stems.len(),
                });
            }
            None if path.is_file() => {
                debug!("removing stale split list {}", path.display());
                fs::remove_file(&path)?;
            }
            None => {}
        }
    }

    let all: Vec<&String> = stems.iter().collect();
    let all_path = dir.split_file(Split::ALL_LIST);
    write_split_list(&all_path, all.as_slice())?;
    debug!("  Created {} with {} files", all_path.display(), all.len());
    splits.lists.push(WrittenList {
        name: Split::ALL_LIST.to_string(),
        path: all_path,
        count: all.len(),
    });

    Ok(Some(splits))
}
