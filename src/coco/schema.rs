//! COCO JSON document types.
//!
//! Field order matches the emitted JSON: `info`, `images`, `annotations`,
//! `categories`, `licenses`.

use serde::{Deserialize, Serialize};

use super::{AnnotationId, ImageId};
use crate::taxonomy::Subcategory;

/// Fixed `info.year`.
pub const INFO_YEAR: u32 = 2025;
/// Fixed `info.version`.
pub const INFO_VERSION: &str = "1.0.0";
/// Fixed `info.url`.
pub const INFO_URL: &str = "https://www.kaggle.com/datasets/abdallahalidev/plantvillage-dataset";
/// Supercategory of every category.
pub const SUPERCATEGORY: &str = "apple";

/// Top-level COCO document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CocoDocument {
    pub info: CocoInfo,
    pub images: Vec<CocoImage>,
    pub annotations: Vec<CocoAnnotation>,
    pub categories: Vec<CocoCategory>,
    #[serde(default)]
    pub licenses: Vec<serde_json::Value>,
}

impl CocoDocument {
    /// Builds a document with the fixed info block and category list.
    pub fn new(
        description: impl Into<String>,
        images: Vec<CocoImage>,
        annotations: Vec<CocoAnnotation>,
    ) -> Self {
        Self {
            info: CocoInfo::new(description),
            images,
            annotations,
            categories: CocoCategory::all(),
            licenses: Vec::new(),
        }
    }
}

/// COCO dataset info block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CocoInfo {
    pub year: u32,
    pub version: String,
    pub description: String,
    pub url: String,
}

impl CocoInfo {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            year: INFO_YEAR,
            version: INFO_VERSION.to_string(),
            description: description.into(),
            url: INFO_URL.to_string(),
        }
    }
}

/// COCO image entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CocoImage {
    pub id: ImageId,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

/// COCO annotation entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CocoAnnotation {
    pub id: AnnotationId,
    pub image_id: ImageId,
    pub category_id: i64,
    /// `[x, y, width, height]` with `(x, y)` the top-left corner.
    pub bbox: [f64; 4],
    pub area: f64,
    pub iscrowd: u8,
}

/// COCO category entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CocoCategory {
    pub id: u32,
    pub name: String,
    pub supercategory: String,
}

impl CocoCategory {
    /// The full category list, in id order.
    pub fn all() -> Vec<CocoCategory> {
        Subcategory::ALL
            .iter()
            .map(|subcategory| CocoCategory {
                id: subcategory.category_id(),
                name: subcategory.as_str().to_string(),
                supercategory: SUPERCATEGORY.to_string(),
            })
            .collect()
    }
}
