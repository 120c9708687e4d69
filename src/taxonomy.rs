//! Fixed dataset tables shared by the organizer and the COCO converter.
//!
//! Subcategories, variants, splits and extension orders never change at
//! runtime, so they are plain enums and constants rather than loaded
//! configuration.

use std::fmt;

use clap::ValueEnum;
use serde::Serialize;

/// Name of the canonical tree directory under the dataset root.
pub const CANONICAL_CATEGORY: &str = "apples";

/// Extensions the organizer picks up from raw variant folders.
///
/// Order matters: when two files share a stem the later extension wins.
pub const DISCOVERY_EXTENSIONS: [&str; 6] = ["JPG", "jpg", "png", "PNG", "jpeg", "JPEG"];

/// Extensions the converter tries, in preference order, when resolving a stem.
pub const LOOKUP_EXTENSIONS: [&str; 6] = ["png", "jpg", "JPG", "PNG", "jpeg", "JPEG"];

/// Disease (or background) class of a leaf image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Subcategory {
    #[value(name = "healthy")]
    Healthy,
    #[value(name = "scab")]
    Scab,
    #[value(name = "black_rot")]
    BlackRot,
    #[value(name = "cedar_apple_rust")]
    CedarAppleRust,
    #[value(name = "background_without_leaves")]
    BackgroundWithoutLeaves,
}

impl Subcategory {
    /// All subcategories in category id order. This is also the default
    /// priority order used when a stem exists in more than one subcategory.
    pub const ALL: [Subcategory; 5] = [
        Subcategory::Healthy,
        Subcategory::Scab,
        Subcategory::BlackRot,
        Subcategory::CedarAppleRust,
        Subcategory::BackgroundWithoutLeaves,
    ];

    /// Raw dataset folder names, in the order the organizer walks them.
    pub const RAW_ALIASES: [(&'static str, Subcategory); 5] = [
        ("Apple___Apple_scab", Subcategory::Scab),
        ("Apple___healthy", Subcategory::Healthy),
        ("Apple___Black_rot", Subcategory::BlackRot),
        ("Apple___Cedar_apple_rust", Subcategory::CedarAppleRust),
        ("Background_without_leaves", Subcategory::BackgroundWithoutLeaves),
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Subcategory::Healthy => "healthy",
            Subcategory::Scab => "scab",
            Subcategory::BlackRot => "black_rot",
            Subcategory::CedarAppleRust => "cedar_apple_rust",
            Subcategory::BackgroundWithoutLeaves => "background_without_leaves",
        }
    }

    /// COCO category id (1-based, fixed).
    pub fn category_id(self) -> u32 {
        match self {
            Subcategory::Healthy => 1,
            Subcategory::Scab => 2,
            Subcategory::BlackRot => 3,
            Subcategory::CedarAppleRust => 4,
            Subcategory::BackgroundWithoutLeaves => 5,
        }
    }
}

impl fmt::Display for Subcategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the parallel renderings of the same image set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    #[value(name = "color")]
    Color,
    #[value(name = "grayscale")]
    Grayscale,
    #[value(name = "segmented")]
    Segmented,
    #[value(name = "with_augmentation")]
    WithAugmentation,
    #[value(name = "without_augmentation")]
    WithoutAugmentation,
}

impl Variant {
    pub const ALL: [Variant; 5] = [
        Variant::Color,
        Variant::Grayscale,
        Variant::Segmented,
        Variant::WithAugmentation,
        Variant::WithoutAugmentation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Color => "color",
            Variant::Grayscale => "grayscale",
            Variant::Segmented => "segmented",
            Variant::WithAugmentation => "with_augmentation",
            Variant::WithoutAugmentation => "without_augmentation",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named dataset partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Split {
    #[value(name = "train")]
    Train,
    #[value(name = "val")]
    Val,
    #[value(name = "test")]
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];

    /// Name of the synthetic list covering every image of a variant.
    pub const ALL_LIST: &'static str = "all";

    pub fn as_str(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
