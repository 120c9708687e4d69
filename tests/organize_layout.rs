//! Integration tests for the dataset organizer.

use std::fs;

use leafcoco::organize::{organize_dataset, OrganizeOptions};
use leafcoco::taxonomy::{Subcategory, Variant};
use serde_json::json;

mod common;
use common::{RawTree, HEADER_ONLY};

fn organize(tree: &RawTree) -> leafcoco::organize::OrganizeReport {
    organize_dataset(&OrganizeOptions {
        root: tree.root().to_path_buf(),
    })
    .expect("organize dataset")
}

#[test]
fn copies_images_and_translates_annotations() {
    let tree = RawTree::new();
    tree.image("Apple___Apple_scab", "color", "leaf_a.JPG");
    tree.image("Apple___Apple_scab", "color", "leaf_b.JPG");
    tree.image("Apple___Apple_scab", "without_augmentation", "leaf_a.JPG");
    tree.annotation(
        "Apple___Apple_scab",
        "leaf_a.json",
        &json!({
            "images": [{"file_name": "leaf_a.JPG"}],
            "annotations": [{"id": 1, "bbox": [10, 20, 30, 40], "category_id": 9}]
        }),
    );

    let report = organize(&tree);

    let color = tree.canonical("scab", "color");
    assert!(color.join("images/leaf_a.JPG").is_file());
    assert!(color.join("images/leaf_b.JPG").is_file());
    assert!(color.join("json/leaf_a.json").is_file());
    assert!(!color.join("json/leaf_b.json").exists());

    // Label comes from the subcategory, not from the source JSON.
    assert_eq!(
        tree.read("apples/scab/color/csv/leaf_a.csv"),
        "#item,x,y,width,height,label\n1,10,20,30,40,2\n"
    );
    assert_eq!(tree.read("apples/scab/color/csv/leaf_b.csv"), HEADER_ONLY);

    let scab = report.subcategory(Subcategory::Scab).expect("scab report");
    let counts = scab.variant(Variant::Color).expect("color counts");
    assert_eq!(counts.images, 2);
    assert_eq!(counts.json, 1);
    assert_eq!(counts.csv, 1);
    assert_eq!(counts.empty_csv, 1);
}

#[test]
fn every_image_gets_exactly_one_csv() {
    let tree = RawTree::new();
    for name in ["a.JPG", "b.png", "c.jpeg", "d.JPEG"] {
        tree.image("Apple___healthy", "grayscale", name);
    }
    tree.image("Apple___healthy", "grayscale", "ignored.gif");

    organize(&tree);

    let dir = tree.canonical("healthy", "grayscale");
    let images = fs::read_dir(dir.join("images")).unwrap().count();
    let csvs = fs::read_dir(dir.join("csv")).unwrap().count();
    assert_eq!(images, 4);
    assert_eq!(csvs, 4);
    for stem in ["a", "b", "c", "d"] {
        assert!(dir.join(format!("csv/{stem}.csv")).is_file());
    }
}

#[test]
fn pvc_filename_takes_priority_over_stem() {
    let tree = RawTree::new();
    tree.image("Apple___Black_rot", "color", "real_image.JPG");
    tree.annotation(
        "Apple___Black_rot",
        "real_image.json",
        &json!({"annotations": [{"id": 1, "bbox": [1, 1, 1, 1]}]}),
    );
    tree.annotation(
        "Apple___Black_rot",
        "uuid-1234.json",
        &json!({
            "images": [{"pvc_filename": "real_image.JPG"}],
            "annotations": [{"id": 5, "bbox": [2, 3, 4, 5]}]
        }),
    );

    organize(&tree);

    assert_eq!(
        tree.read("apples/black_rot/color/csv/real_image.csv"),
        "#item,x,y,width,height,label\n5,2,3,4,5,3\n"
    );
    let copied = tree.read("apples/black_rot/color/json/real_image.json");
    assert!(copied.contains("pvc_filename"));
}

#[test]
fn degenerate_boxes_are_not_written() {
    let tree = RawTree::new();
    tree.image("Apple___Cedar_apple_rust", "color", "leaf.JPG");
    tree.annotation(
        "Apple___Cedar_apple_rust",
        "leaf.json",
        &json!({"annotations": [
            {"id": 1, "bbox": [0, 0, 0, 5]},
            {"id": 2, "bbox": [0, 0, 5, -1]},
            {"id": 3, "bbox": [1.5, 2.5, 3.5, 4.5]}
        ]}),
    );

    organize(&tree);

    let csv = tree.read("apples/cedar_apple_rust/color/csv/leaf.csv");
    assert_eq!(csv, "#item,x,y,width,height,label\n3,1.5,2.5,3.5,4.5,4\n");
}

#[test]
fn malformed_json_means_no_annotation() {
    let tree = RawTree::new();
    tree.image("Apple___healthy", "color", "leaf.JPG");
    common::write_file(
        &tree
            .root()
            .join("Apple___healthy/without_augmentation/leaf.json"),
        "{ this is not json",
    );

    let report = organize(&tree);

    assert_eq!(tree.read("apples/healthy/color/csv/leaf.csv"), HEADER_ONLY);
    assert!(!tree.canonical("healthy", "color").join("json/leaf.json").exists());
    let healthy = report.subcategory(Subcategory::Healthy).unwrap();
    assert_eq!(healthy.unreadable_json, 1);
}

#[test]
fn data_origin_is_preferred_over_root() {
    let tree = RawTree::new();
    tree.image("Apple___healthy", "color", "from_root.JPG");
    common::write_image(
        &tree
            .root()
            .join("data/origin/Apple___healthy/color/from_origin.JPG"),
        10,
        10,
    );

    organize(&tree);

    let images = tree.canonical("healthy", "color").join("images");
    assert!(images.join("from_origin.JPG").is_file());
    assert!(!images.join("from_root.JPG").exists());
}

#[test]
fn missing_sources_contribute_nothing() {
    let tree = RawTree::new();
    let report = organize(&tree);

    assert_eq!(report.totals().images, 0);
    assert_eq!(report.subcategories.len(), 5);
    assert!(report.subcategories.iter().all(|s| s.variants.is_empty()));
    assert!(!tree.root().join("apples").exists());
}

#[test]
fn rerun_is_byte_identical() {
    let tree = RawTree::new();
    tree.image("Apple___Apple_scab", "color", "leaf_a.JPG");
    tree.image("Apple___Apple_scab", "segmented", "leaf_a_final_masked.jpg");
    tree.annotation(
        "Apple___Apple_scab",
        "leaf_a.json",
        &json!({"annotations": [{"id": 1, "bbox": [10, 20, 30, 40]}]}),
    );

    organize(&tree);
    let first_csv = tree.read("apples/scab/color/csv/leaf_a.csv");
    let first_json = tree.read("apples/scab/color/json/leaf_a.json");
    let first_masked = tree.read("apples/scab/segmented/csv/leaf_a_final_masked.csv");

    organize(&tree);
    assert_eq!(tree.read("apples/scab/color/csv/leaf_a.csv"), first_csv);
    assert_eq!(tree.read("apples/scab/color/json/leaf_a.json"), first_json);
    assert_eq!(
        tree.read("apples/scab/segmented/csv/leaf_a_final_masked.csv"),
        first_masked
    );
}

#[cfg(unix)]
#[test]
fn symlinked_raw_images_are_copied() {
    let tree = RawTree::new();
    let real = tree.root().join("store/leaf.JPG");
    common::write_image(&real, 20, 10);
    let link_dir = tree.root().join("Apple___healthy/color");
    fs::create_dir_all(&link_dir).unwrap();
    std::os::unix::fs::symlink(&real, link_dir.join("leaf.JPG")).unwrap();

    let report = organize(&tree);

    let healthy = report.subcategory(Subcategory::Healthy).unwrap();
    assert_eq!(healthy.variant(Variant::Color).unwrap().images, 1);
    let copied = tree.canonical("healthy", "color").join("images/leaf.JPG");
    assert!(copied.is_file());
    assert!(!fs::symlink_metadata(&copied).unwrap().file_type().is_symlink());
    assert_eq!(tree.read("apples/healthy/color/csv/leaf.csv"), HEADER_ONLY);
}
