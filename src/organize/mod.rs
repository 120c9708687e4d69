//! Dataset organizer.
//!
//! Copies the raw Plant Village apple folders into the canonical
//! `apples/{subcategory}/{variant}/{images,json,csv}` tree. Every copied
//! image gets exactly one CSV: translated from its source annotation JSON
//! when one can be found, header-only otherwise.
//!
//! Re-running overwrites the same files with the same content.

mod report;
pub mod source;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

pub use report::{OrganizeReport, SubcategoryReport, VariantCounts};
pub use source::{AnnotationIndex, SourceAnnotation, SourceBox};

use crate::boxes::write_box_csv;
use crate::error::LeafcocoError;
use crate::layout::{copy_file, images_by_stem, resolve_source_variant_dir, VariantDir};
use crate::taxonomy::{Subcategory, Variant, CANONICAL_CATEGORY, DISCOVERY_EXTENSIONS};

/// Options for an organizer run.
#[derive(Clone, Debug)]
pub struct OrganizeOptions {
    /// Dataset root holding the raw folders; the canonical tree is written
    /// to `{root}/apples`.
    pub root: PathBuf,
}

/// Organizes every known raw subcategory folder.
pub fn organize_dataset(opts: &OrganizeOptions) -> Result<OrganizeReport, LeafcocoError> {
    info!("Organizing Plant Village apple dataset under {}", opts.root.display());

    let mut report = OrganizeReport::default();
    for (raw_name, subcategory) in Subcategory::RAW_ALIASES {
        report
            .subcategories
            .push(organize_subcategory(&opts.root, raw_name, subcategory)?);
    }
    Ok(report)
}

/// Organizes all variants of one raw subcategory folder.
///
/// Annotation JSON lives next to the `without_augmentation` images and is
/// shared by every variant of the subcategory.
pub fn organize_subcategory(
    root: &Path,
    raw_name: &str,
    subcategory: Subcategory,
) -> Result<SubcategoryReport, LeafcocoError> {
    debug!("Organizing {raw_name} -> {subcategory}");

    let mut index = AnnotationIndex::new();
    if let Some(json_dir) =
        resolve_source_variant_dir(root, raw_name, Variant::WithoutAugmentation)
    {
        index.add_dir(&json_dir)?;
    }

    let mut report = SubcategoryReport::new(raw_name, subcategory);
    report.unreadable_json = index.unreadable();

    for variant in Variant::ALL {
        let counts = organize_variant(root, raw_name, subcategory, variant, &index)?;
        if counts.images > 0 {
            debug!(
                "  {variant}: {} images, {} JSON files, {} CSV files",
                counts.images, counts.json, counts.csv
            );
            report.variants.push((variant, counts));
        }
    }

    let totals = report.totals();
    debug!(
        "  Total: {} images, {} JSON files, {} CSV files",
        totals.images, totals.json, totals.csv
    );
    Ok(report)
}

/// Organizes one variant of one subcategory.
///
/// A missing source directory contributes nothing.
pub fn organize_variant(
    root: &Path,
    raw_name: &str,
    subcategory: Subcategory,
    variant: Variant,
    index: &AnnotationIndex,
) -> Result<VariantCounts, LeafcocoError> {
    let mut counts = VariantCounts::default();

    let Some(source_dir) = resolve_source_variant_dir(root, raw_name, variant) else {
        debug!("no source directory for {raw_name}/{variant}");
        return Ok(counts);
    };

    let target = VariantDir::new(&root.join(CANONICAL_CATEGORY), subcategory, variant);
    target.create_data_dirs()?;

    let images = images_by_stem(&source_dir, &DISCOVERY_EXTENSIONS)?;
    let category_id = subcategory.category_id();
    let images_dir = target.images();

    for (stem, image_path) in &images {
        let Some(file_name) = image_path.file_name() else {
            continue;
        };
        copy_file(image_path, &images_dir.join(file_name))?;
        counts.images += 1;

        let csv_path = target.csv_file(stem);
        match index.resolve(stem) {
            Some(annotation) => {
                copy_file(&annotation.path, &target.json_file(stem))?;
                counts.json += 1;

                write_box_csv(&csv_path, &annotation.rows(category_id))?;
                counts.csv += 1;
            }
            None => {
                write_box_csv(&csv_path, &[])?;
                counts.empty_csv += 1;
            }
        }
    }

    Ok(counts)
}
