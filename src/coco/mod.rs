//! COCO JSON export of the canonical tree.
//!
//! For each requested split the converter gathers candidate stems from the
//! `sets/{split}.txt` lists of the selected subcategories, resolves each stem
//! to an image file, reads the real pixel size and turns the image's box CSV
//! into annotations.
//!
//! # ID Assignment Policy
//!
//! - **Images**: 1-based, in sorted stem order.
//! - **Annotations**: 1-based, one counter across the whole document, in
//!   image order then CSV row order.
//!
//! A stem present in several subcategories belongs to the first one in the
//! selection order.

mod ids;
mod report;
mod schema;

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

pub use ids::{AnnotationId, ImageId};
pub use report::{CocoReport, GeneratedFile};
pub use schema::{
    CocoAnnotation, CocoCategory, CocoDocument, CocoImage, CocoInfo, INFO_URL, INFO_VERSION,
    INFO_YEAR, SUPERCATEGORY,
};

use crate::boxes::read_box_csv;
use crate::error::LeafcocoError;
use crate::layout::{find_image, images_by_stem, read_split_list, VariantDir};
use crate::taxonomy::{Split, Subcategory, Variant, CANONICAL_CATEGORY, LOOKUP_EXTENSIONS};

/// Options for a converter run.
#[derive(Clone, Debug)]
pub struct CocoOptions {
    /// Dataset root; the canonical tree is `{root}/{category}`.
    pub root: PathBuf,
    /// Directory receiving the JSON files.
    pub out_dir: PathBuf,
    pub category: String,
    /// Selection, in priority order.
    pub subcategories: Vec<Subcategory>,
    pub splits: Vec<Split>,
    /// Name the outputs `combined_*` instead of `{category}_*`.
    pub combined: bool,
    pub variant: Variant,
}

impl CocoOptions {
    /// Defaults for a dataset root: every subcategory and split, `color`
    /// variant, output to `{root}/annotations`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            out_dir: root.join("annotations"),
            root,
            category: CANONICAL_CATEGORY.to_string(),
            subcategories: Subcategory::ALL.to_vec(),
            splits: Split::ALL.to_vec(),
            combined: false,
            variant: Variant::Color,
        }
    }
}

/// Images and annotations gathered for one split.
#[derive(Clone, Debug, Default)]
pub struct SplitCollection {
    pub images: Vec<CocoImage>,
    pub annotations: Vec<CocoAnnotation>,
    pub unresolved_stems: usize,
    pub skipped_rows: usize,
    pub used_all_images: bool,
}

/// Converts every requested split and writes one JSON file per split.
pub fn convert(opts: &CocoOptions) -> Result<CocoReport, LeafcocoError> {
    fs::create_dir_all(&opts.out_dir)?;
    let category_root = opts.root.join(&opts.category);

    let mut report = CocoReport::default();
    for &split in &opts.splits {
        let collection = collect_split(
            &category_root,
            split,
            &opts.subcategories,
            opts.variant,
        )?;

        let description = document_description(&opts.category, opts.variant, split, opts.combined);
        let out_path = opts.out_dir.join(output_file_name(
            &opts.category,
            opts.variant,
            split,
            opts.combined,
        ));

        let generated = GeneratedFile {
            split,
            path: out_path.clone(),
            images: collection.images.len(),
            annotations: collection.annotations.len(),
            unresolved_stems: collection.unresolved_stems,
            skipped_rows: collection.skipped_rows,
            used_all_images: collection.used_all_images,
        };

        let document = CocoDocument::new(description, collection.images, collection.annotations);
        write_coco_json(&out_path, &document)?;
        debug!(
            "Generated: {} ({} images, {} annotations)",
            out_path.display(),
            generated.images,
            generated.annotations
        );
        report.files.push(generated);
    }
    Ok(report)
}

/// Output file name for one split.
pub fn output_file_name(category: &str, variant: Variant, split: Split, combined: bool) -> String {
    if combined {
        format!("combined_{variant}_instances_{split}.json")
    } else {
        format!("{category}_{variant}_instances_{split}.json")
    }
}

/// `info.description` for one split.
pub fn document_description(category: &str, variant: Variant, split: Split, combined: bool) -> String {
    if combined {
        format!("Plant Village Apple {category} {variant} combined {split} split")
    } else {
        format!("Plant Village Apple {category} {variant} {split} split")
    }
}

/// Candidate stems for a split.
///
/// The union of the selected subcategories' `sets/{split}.txt`; when that is
/// empty, every image present. The flag reports whether the fallback ran.
pub fn candidate_stems(
    category_root: &Path,
    split: Split,
    subcategories: &[Subcategory],
    variant: Variant,
) -> Result<(BTreeSet<String>, bool), LeafcocoError> {
    let mut stems = BTreeSet::new();
    for &subcategory in subcategories {
        let dir = VariantDir::new(category_root, subcategory, variant);
        stems.extend(read_split_list(&dir.split_file(split.as_str()))?);
    }
    if !stems.is_empty() {
        return Ok((stems, false));
    }

    debug!("no {split} list found, taking every {variant} image");
    for &subcategory in subcategories {
        let dir = VariantDir::new(category_root, subcategory, variant);
        stems.extend(images_by_stem(&dir.images(), &LOOKUP_EXTENSIONS)?.into_keys());
    }
    Ok((stems, true))
}

/// Builds the images and annotations of one split.
///
/// `file_name` always uses the `apples/` prefix, whichever category
/// directory the images were read from.
pub fn collect_split(
    category_root: &Path,
    split: Split,
    subcategories: &[Subcategory],
    variant: Variant,
) -> Result<SplitCollection, LeafcocoError> {
    let (stems, used_all_images) = candidate_stems(category_root, split, subcategories, variant)?;

    let mut collection = SplitCollection {
        used_all_images,
        ..Default::default()
    };
    let mut next_image = ImageId::FIRST;
    let mut next_annotation = AnnotationId::FIRST;

    for stem in &stems {
        let Some((subcategory, image_path)) =
            resolve_stem(category_root, stem, subcategories, variant)
        else {
            debug!("no {variant} image for stem {stem}");
            collection.unresolved_stems += 1;
            continue;
        };

        let (width, height) = read_image_dimensions(&image_path)?;
        let image_id = next_image.bump();
        let file_name = image_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        collection.images.push(CocoImage {
            id: image_id,
            file_name: format!("{CANONICAL_CATEGORY}/{subcategory}/{variant}/images/{file_name}"),
            width,
            height,
        });

        let dir = VariantDir::new(category_root, subcategory, variant);
        let parsed = read_box_csv(&dir.csv_file(stem))?;
        collection.skipped_rows += parsed.skipped_rows;
        for parsed_box in parsed.boxes {
            collection.annotations.push(CocoAnnotation {
                id: next_annotation.bump(),
                image_id,
                category_id: parsed_box.category_id,
                bbox: parsed_box.bbox,
                area: parsed_box.area,
                iscrowd: 0,
            });
        }
    }

    Ok(collection)
}

/// Finds the image for `stem` in the first subcategory that has one.
fn resolve_stem(
    category_root: &Path,
    stem: &str,
    subcategories: &[Subcategory],
    variant: Variant,
) -> Option<(Subcategory, PathBuf)> {
    subcategories.iter().find_map(|&subcategory| {
        let dir = VariantDir::new(category_root, subcategory, variant);
        find_image(&dir.images(), stem, &LOOKUP_EXTENSIONS).map(|path| (subcategory, path))
    })
}

/// Reads the pixel size of an image from its header.
pub fn read_image_dimensions(path: &Path) -> Result<(u32, u32), LeafcocoError> {
    let size = imagesize::size(path).map_err(|source| LeafcocoError::ImageDimensionRead {
        path: path.to_path_buf(),
        source,
    })?;

    let width: u32 = size
        .width
        .try_into()
        .map_err(|_| LeafcocoError::ImageDimensionInvalid {
            path: path.to_path_buf(),
            message: format!("image width {} does not fit in u32", size.width),
        })?;
    let height: u32 = size
        .height
        .try_into()
        .map_err(|_| LeafcocoError::ImageDimensionInvalid {
            path: path.to_path_buf(),
            message: format!("image height {} does not fit in u32", size.height),
        })?;

    Ok((width, height))
}

/// Writes a COCO document as pretty-printed JSON (2-space indent).
pub fn write_coco_json(path: &Path, document: &CocoDocument) -> Result<(), LeafcocoError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, document).map_err(|source| {
        LeafcocoError::CocoJsonWrite {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer.flush()?;
    Ok(())
}
