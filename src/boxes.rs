//! Per-image bounding-box CSV reader and writer.
//!
//! # Format
//!
//! Every image in the canonical tree has exactly one CSV file with the fixed
//! header `#item,x,y,width,height,label` and one row per box. Coordinates are
//! absolute pixels in `[x, y, width, height]` form and `label` is the integer
//! category id. A file holding only the header means "no boxes".
//!
//! Reading is lenient: a row that is short, non-numeric, or has a
//! non-positive width or height is dropped and the rest of the file is kept.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use tracing::debug;

use crate::error::LeafcocoError;

/// Header row written at the top of every box CSV.
pub const CSV_HEADER: [&str; 6] = ["#item", "x", "y", "width", "height", "label"];

/// One row as written by the organizer.
///
/// Coordinates are kept in their source textual form so that `10` stays `10`
/// and `10.5` stays `10.5`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoxRow {
    pub item: String,
    pub x: String,
    pub y: String,
    pub width: String,
    pub height: String,
    pub label: u32,
}

/// One box as read back by the converter.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedBox {
    /// `[x, y, width, height]` in pixels.
    pub bbox: [f64; 4],
    pub area: f64,
    /// The row's own `label`, trusted as the category id.
    pub category_id: i64,
}

/// Outcome of reading one CSV file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedBoxes {
    pub boxes: Vec<ParsedBox>,
    pub skipped_rows: usize,
}

/// Writes a box CSV (header plus rows) to `path`.
pub fn write_box_csv(path: &Path, rows: &[BoxRow]) -> Result<(), LeafcocoError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_box_rows(&mut writer, rows).map_err(|source| LeafcocoError::BoxCsvWrite {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush()?;
    Ok(())
}

/// Renders a box CSV to a string.
pub fn to_box_csv_string(rows: &[BoxRow]) -> Result<String, csv::Error> {
    let mut bytes = Vec::new();
    write_box_rows(&mut bytes, rows)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn write_box_rows<W: Write>(out: W, rows: &[BoxRow]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);

    csv_writer.write_record(CSV_HEADER)?;
    for row in rows {
        let label = row.label.to_string();
        csv_writer.write_record([
            row.item.as_str(),
            row.x.as_str(),
            row.y.as_str(),
            row.width.as_str(),
            row.height.as_str(),
            label.as_str(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Reads a box CSV. A missing file reads as no boxes.
pub fn read_box_csv(path: &Path) -> Result<ParsedBoxes, LeafcocoError> {
    if !path.is_file() {
        return Ok(ParsedBoxes::default());
    }
    let file = File::open(path)?;
    Ok(parse_box_csv(file))
}

/// Parses box CSV text.
pub fn from_box_csv_str(text: &str) -> ParsedBoxes {
    parse_box_csv(text.as_bytes())
}

/// Column positions resolved from the header row.
struct Columns {
    x: Option<usize>,
    y: Option<usize>,
    width: Option<usize>,
    height: Option<usize>,
    label: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        Self {
            x: find("x"),
            y: find("y"),
            width: find("width"),
            height: find("height"),
            label: find("label"),
        }
    }
}

fn parse_box_csv<R: Read>(input: R) -> ParsedBoxes {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let columns = match reader.headers() {
        Ok(headers) => Columns::from_headers(headers),
        Err(err) => {
            debug!("unreadable box CSV header: {err}");
            return ParsedBoxes::default();
        }
    };

    let mut parsed = ParsedBoxes::default();
    for (index, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                debug!("dropping box CSV row {}: {err}", index + 1);
                parsed.skipped_rows += 1;
                continue;
            }
        };
        match parse_row(&record, &columns) {
            Some(parsed_box) => parsed.boxes.push(parsed_box),
            None => {
                debug!("dropping box CSV row {}: {:?}", index + 1, record);
                parsed.skipped_rows += 1;
            }
        }
    }
    parsed
}

/// Parses one record. Absent columns take their defaults (`0` for geometry,
/// `1` for the label); a column that exists but is missing from a short row
/// rejects the row.
fn parse_row(record: &csv::StringRecord, columns: &Columns) -> Option<ParsedBox> {
    let x = parse_coord(field(record, columns.x, "0")?)?;
    let y = parse_coord(field(record, columns.y, "0")?)?;
    let width = parse_coord(field(record, columns.width, "0")?)?;
    let height = parse_coord(field(record, columns.height, "0")?)?;
    let category_id: i64 = field(record, columns.label, "1")?.parse().ok()?;

    if width > 0.0 && height > 0.0 {
        Some(ParsedBox {
            bbox: [x, y, width, height],
            area: width * height,
            category_id,
        })
    } else {
        None
    }
}

fn field<'a>(
    record: &'a csv::StringRecord,
    column: Option<usize>,
    default: &'static str,
) -> Option<&'a str> {
    match column {
        Some(index) => record.get(index).map(str::trim),
        None => Some(default),
    }
}

fn parse_coord(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}
