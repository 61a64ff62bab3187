//! Workbook loader: raw bytes -> `RawGrid`.
//!
//! `.xlsx`/`.xls` go through calamine, `.csv` through the csv crate. The loader
//! only fails when the bytes are not a spreadsheet at all; odd content is the
//! later stages' problem.

use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader};
use chrono::NaiveDate;
use ledgerlift_core::{IngestError, RawCell, RawGrid, Result};
use tracing::{debug, warn};

use crate::values::serial_to_date;

const CSV_DELIMITERS: &[u8] = b",;\t|";
const SNIFF_LINES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Xlsx,
    Xls,
    Csv,
}

impl SourceFormat {
    /// Format from the filename's final extension, case-insensitively.
    pub fn from_filename(filename: &str) -> Result<Self> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "xlsx" => Ok(SourceFormat::Xlsx),
            "xls" => Ok(SourceFormat::Xls),
            "csv" => Ok(SourceFormat::Csv),
            _ => Err(IngestError::unsupported(ext)),
        }
    }
}

pub fn load_workbook(bytes: &[u8], format: SourceFormat) -> Result<RawGrid> {
    match format {
        SourceFormat::Csv => load_csv(bytes),
        SourceFormat::Xlsx => load_spreadsheet(bytes),
        SourceFormat::Xls => match load_spreadsheet(bytes) {
            Ok(grid) => Ok(grid),
            // Many banks serve delimited text under an .xls name
            Err(err) if looks_like_text(bytes) => {
                warn!(error = %err, "xls bytes are not a BIFF workbook; reading as delimited text");
                load_csv(bytes)
            }
            Err(err) => Err(err),
        },
    }
}

fn load_spreadsheet(bytes: &[u8]) -> Result<RawGrid> {
    let mut workbook =
        calamine::open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(IngestError::unreadable)?;

    let sheet_names = workbook.sheet_names();
    if sheet_names.is_empty() {
        return Err(IngestError::unreadable("workbook has no worksheets"));
    }

    let mut first = None;
    for name in &sheet_names {
        let range = workbook
            .worksheet_range(name)
            .map_err(IngestError::unreadable)?;

        if range.used_cells().next().is_some() {
            debug!(sheet = %name, "using first non-empty worksheet");
            return Ok(grid_from_range(&range));
        }
        first.get_or_insert(range);
    }

    Ok(first.map(|range| grid_from_range(&range)).unwrap_or_default())
}

/// calamine ranges begin at the first used cell; blank leading rows and
/// columns are restored so indices match the sheet (and a CSV export of it).
fn grid_from_range(range: &calamine::Range<Data>) -> RawGrid {
    let (top, left) = range
        .start()
        .map_or((0, 0), |(row, col)| (row as usize, col as usize));

    let mut rows: Vec<Vec<RawCell>> = vec![Vec::new(); top];
    rows.extend(range.rows().map(|row| {
        let mut cells = vec![RawCell::Empty; left];
        cells.extend(row.iter().map(convert_cell));
        cells
    }));
    RawGrid::new(rows)
}

fn convert_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Int(i) => RawCell::number(*i as f64),
        Data::Float(f) => RawCell::number(*f),
        Data::String(s) => RawCell::text(s.trim()),
        Data::Bool(b) => RawCell::text(if *b { "TRUE" } else { "FALSE" }),
        Data::DateTime(dt) if !dt.is_duration() => serial_to_date(dt.as_f64())
            .map(RawCell::date)
            .unwrap_or_else(|| RawCell::number(dt.as_f64())),
        Data::DateTime(dt) => RawCell::number(dt.as_f64()),
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map(RawCell::date)
            .unwrap_or_else(|| RawCell::text(s.trim())),
        Data::DurationIso(s) => RawCell::text(s.trim()),
        Data::Error(e) => RawCell::text(e.to_string()),
        Data::Empty => RawCell::Empty,
    }
}

fn load_csv(bytes: &[u8]) -> Result<RawGrid> {
    let text = decode_text(bytes)?;
    let delimiter = sniff_delimiter(&text);
    debug!(delimiter = ?(delimiter as char), "reading delimited text");

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in rdr.byte_records() {
        let record = record.map_err(IngestError::unreadable)?;
        rows.push(
            record
                .iter()
                .map(|field| RawCell::text(String::from_utf8_lossy(field).trim()))
                .collect(),
        );
    }

    Ok(RawGrid::new(rows))
}

/// UTF-8 (lossy, BOM stripped) or BOM-marked UTF-16LE, as Excel's "Unicode text" writes.
fn decode_text(bytes: &[u8]) -> Result<String> {
    if let Some(body) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        let units: Vec<u16> = body
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        return Ok(char::decode_utf16(units)
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect());
    }

    let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    if !looks_like_text(body) {
        return Err(IngestError::unreadable("binary content is not delimited text"));
    }
    Ok(String::from_utf8_lossy(body).into_owned())
}

fn looks_like_text(bytes: &[u8]) -> bool {
    !bytes.iter().take(8192).any(|b| *b == 0)
}

/// Pick the candidate delimiter that occurs most often in the first lines.
fn sniff_delimiter(text: &str) -> u8 {
    let sample: Vec<&str> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();

    CSV_DELIMITERS
        .iter()
        .map(|d| {
            let count: usize = sample
                .iter()
                .map(|line| line.bytes().filter(|b| b == d).count())
                .sum();
            (*d, count)
        })
        .filter(|(_, count)| *count > 0)
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .map_or(b',', |(d, _)| d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_detection() {
        assert_eq!(SourceFormat::from_filename("stmt.XLSX").unwrap(), SourceFormat::Xlsx);
        assert_eq!(SourceFormat::from_filename("a.b.xls").unwrap(), SourceFormat::Xls);
        assert_eq!(SourceFormat::from_filename("export.csv").unwrap(), SourceFormat::Csv);

        let err = SourceFormat::from_filename("statement.pdf").unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedExtension { ref extension } if extension == "pdf"));
        assert!(SourceFormat::from_filename("noext").is_err());
    }

    #[test]
    fn test_csv_rows_are_padded() {
        let grid = load_workbook(b"Date,Narration\n01/01/2024,Rent,500\n", SourceFormat::Csv).unwrap();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.row(0).unwrap()[2], RawCell::Empty);
        assert_eq!(grid.row(1).unwrap()[1], RawCell::text("Rent"));
    }

    #[test]
    fn test_csv_bom_and_semicolons() {
        let grid = load_workbook("\u{feff}Date;Amount\n01.02.2024;1.234,50\n".as_bytes(), SourceFormat::Csv)
            .unwrap();
        assert_eq!(grid.row(0).unwrap()[0], RawCell::text("Date"));
        assert_eq!(grid.row(1).unwrap()[1], RawCell::text("1.234,50"));
    }

    #[test]
    fn test_utf16_text() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "Date\tDebit\n".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let grid = load_workbook(&bytes, SourceFormat::Csv).unwrap();
        assert_eq!(grid.row(0).unwrap()[1], RawCell::text("Debit"));
    }

    #[test]
    fn test_corrupt_spreadsheet_is_unreadable() {
        let bytes = [0x50, 0x4B, 0x03, 0x04, 0x00, 0x00, 0xDE, 0xAD, 0xBE, 0xEF];
        let err = load_workbook(&bytes, SourceFormat::Xlsx).unwrap_err();
        assert!(matches!(err, IngestError::UnreadableWorkbook { .. }));

        let err = load_workbook(&bytes, SourceFormat::Csv).unwrap_err();
        assert!(matches!(err, IngestError::UnreadableWorkbook { .. }));
    }

    #[test]
    fn test_text_disguised_as_xls() {
        let grid = load_workbook(b"Date\tDescription\n01/01/2024\tATM\n", SourceFormat::Xls).unwrap();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.row(1).unwrap()[1], RawCell::text("ATM"));
    }

    #[test]
    fn test_range_offset_is_restored() {
        let mut range = calamine::Range::new((3, 1), (4, 2));
        range.set_value((3, 1), Data::String("Date".to_string()));
        range.set_value((3, 2), Data::String("Debit".to_string()));
        range.set_value((4, 1), Data::String("01/01/2024".to_string()));
        range.set_value((4, 2), Data::Float(500.0));

        let grid = grid_from_range(&range);
        assert_eq!(grid.len(), 5);
        assert_eq!(grid.width(), 3);
        assert!(grid.row(0).unwrap().iter().all(RawCell::is_blank));
        assert_eq!(grid.row(3).unwrap()[0], RawCell::Empty);
        assert_eq!(grid.row(3).unwrap()[1], RawCell::text("Date"));
        assert_eq!(grid.row(4).unwrap()[2], RawCell::number(500.0));
        assert_eq!(grid.source_row_number(4), 5);
    }

    #[test]
    fn test_convert_cell_variants() {
        assert_eq!(convert_cell(&Data::Int(5)), RawCell::number(5.0));
        assert_eq!(convert_cell(&Data::Bool(true)), RawCell::text("TRUE"));
        assert_eq!(
            convert_cell(&Data::DateTimeIso("2024-01-02T00:00:00".to_string())),
            RawCell::date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
        );
        assert_eq!(convert_cell(&Data::Empty), RawCell::Empty);
    }
}
