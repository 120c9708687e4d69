#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    let row_stride = (width * 3).div_ceil(4) * 4;
    let pixel_array_size = row_stride * height;
    let file_size = 54 + pixel_array_size;

    let mut bytes = Vec::with_capacity(file_size as usize);
    bytes.extend_from_slice(b"BM");
    bytes.extend_from_slice(&file_size.to_le_bytes());
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&54u32.to_le_bytes());

    bytes.extend_from_slice(&40u32.to_le_bytes());
    bytes.extend_from_slice(&(width as i32).to_le_bytes());
    bytes.extend_from_slice(&(height as i32).to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&24u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&pixel_array_size.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());

    bytes.resize(file_size as usize, 0);
    bytes
}

/// PNG signature plus an IHDR chunk; enough for header-based size probing.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(33);
    bytes.extend_from_slice(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    bytes.extend_from_slice(&13u32.to_be_bytes());
    bytes.extend_from_slice(b"IHDR");
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&height.to_be_bytes());
    bytes.extend_from_slice(&[8, 2, 0, 0, 0]);
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes
}

pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, contents).expect("write file");
}

/// Writes an image whose header encodes `width` x `height`: PNG bytes for a
/// `.png` extension, BMP bytes otherwise.
pub fn write_image(path: &Path, width: u32, height: u32) {
    let is_png = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("png"))
        .unwrap_or(false);
    if is_png {
        write_file(path, png_bytes(width, height));
    } else {
        write_file(path, bmp_bytes(width, height));
    }
}

/// A throwaway dataset root holding raw folders.
pub struct RawTree {
    dir: TempDir,
}

impl RawTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// `{root}/{raw}/{variant}/{file_name}` as a 64x48 image.
    pub fn image(&self, raw: &str, variant: &str, file_name: &str) -> PathBuf {
        let path = self.root().join(raw).join(variant).join(file_name);
        write_image(&path, 64, 48);
        path
    }

    /// `{root}/{raw}/without_augmentation/{file_name}` holding `value`.
    pub fn annotation(&self, raw: &str, file_name: &str, value: &Value) -> PathBuf {
        let path = self
            .root()
            .join(raw)
            .join("without_augmentation")
            .join(file_name);
        write_file(&path, serde_json::to_vec_pretty(value).expect("serialize json"));
        path
    }

    /// `{root}/all/{split}.txt`.
    pub fn reference(&self, split: &str, entries: &[&str]) {
        let mut body = entries.join("\n");
        body.push('\n');
        write_file(&self.root().join("all").join(format!("{split}.txt")), body);
    }

    /// `{root}/apples/{subcategory}/{variant}`.
    pub fn canonical(&self, subcategory: &str, variant: &str) -> PathBuf {
        self.root().join("apples").join(subcategory).join(variant)
    }

    pub fn read(&self, relative: impl AsRef<Path>) -> String {
        fs::read_to_string(self.root().join(relative)).expect("read file")
    }
}

/// A throwaway canonical tree for converter tests.
pub struct CanonicalTree {
    dir: TempDir,
}

impl CanonicalTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn variant_dir(&self, subcategory: &str, variant: &str) -> PathBuf {
        self.root().join("apples").join(subcategory).join(variant)
    }

    /// Adds an image plus its CSV (`None` leaves the CSV out).
    pub fn image(
        &self,
        subcategory: &str,
        variant: &str,
        file_name: &str,
        size: (u32, u32),
        csv: Option<&str>,
    ) {
        let dir = self.variant_dir(subcategory, variant);
        write_image(&dir.join("images").join(file_name), size.0, size.1);
        if let Some(csv) = csv {
            let stem = Path::new(file_name)
                .file_stem()
                .and_then(|s| s.to_str())
                .expect("file stem");
            write_file(&dir.join("csv").join(format!("{stem}.csv")), csv);
        }
    }

    pub fn split_list(&self, subcategory: &str, variant: &str, split: &str, stems: &[&str]) {
        let mut body = stems.join("\n");
        body.push('\n');
        write_file(
            &self
                .variant_dir(subcategory, variant)
                .join("sets")
                .join(format!("{split}.txt")),
            body,
        );
    }
}

pub const HEADER_ONLY: &str = "#item,x,y,width,height,label\n";
