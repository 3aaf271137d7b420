use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use super::error::DataFormatError;
use super::model::Table;
use super::schema::{normalize, RawCell, RawTable};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sales table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`                              – UTF-8, or ISO-8859-1 as exported by Excel
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – first worksheet, header in row 1
///
/// A source that normalizes to zero records is rejected with
/// [`DataFormatError::NoData`].
pub fn load_file(path: &Path) -> Result<Table, DataFormatError> {
    let raw = match source_extension(path)?.as_str() {
        "csv" => read_csv(std::fs::File::open(path)?)?,
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path)?,
        other => return Err(DataFormatError::UnsupportedFormat(format!(".{other}"))),
    };

    into_table(raw)
}

/// Lower-cased extension of `path`; a path without one is unsupported.
pub(crate) fn source_extension(path: &Path) -> Result<String, DataFormatError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.is_empty() => Ok(ext.to_ascii_lowercase()),
        _ => Err(DataFormatError::UnsupportedFormat("file has no extension".into())),
    }
}

/// Load a sales table from CSV bytes held in any reader.
pub fn load_csv_reader<R: Read>(reader: R) -> Result<Table, DataFormatError> {
    into_table(read_csv(reader)?)
}

fn into_table(raw: RawTable) -> Result<Table, DataFormatError> {
    let n_raw = raw.rows.len();
    let table = normalize(raw)?;
    if table.is_empty() {
        return Err(DataFormatError::NoData);
    }
    log::debug!("Normalized {n_raw} raw rows into {} records", table.len());
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// Read every row as text. Rows may be ragged; missing trailing cells are
/// treated as empty by the schema step.
fn read_csv<R: Read>(reader: R) -> Result<RawTable, DataFormatError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(decode_field)
        .collect();

    let mut rows = Vec::new();
    for result in reader.byte_records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    let text = decode_field(field);
                    if text.trim().is_empty() {
                        RawCell::Empty
                    } else {
                        RawCell::Text(text)
                    }
                })
                .collect(),
        );
    }

    Ok(RawTable { headers, rows })
}

/// Decode a CSV field as UTF-8, falling back to ISO-8859-1.
///
/// Every byte sequence is valid Latin-1, where each byte is its own code point.
fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.trim_start_matches('\u{feff}').to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet reader
// ---------------------------------------------------------------------------

fn read_workbook(path: &Path) -> Result<RawTable, DataFormatError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(DataFormatError::NoWorksheet)??;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(|c| c.to_string()).collect(),
        None => return Ok(RawTable::default()),
    };
    let rows = rows
        .map(|row| row.iter().map(cell_to_raw).collect())
        .collect();

    Ok(RawTable { headers, rows })
}

fn cell_to_raw(cell: &Data) -> RawCell {
    match cell {
        Data::String(s) if s.trim().is_empty() => RawCell::Empty,
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Float(v) => RawCell::Number(*v),
        Data::Int(v) => RawCell::Number(*v as f64),
        Data::Bool(b) => RawCell::Text(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => RawCell::Date(ndt.date()),
            None => RawCell::Empty,
        },
        Data::DateTimeIso(s) => RawCell::Text(s.clone()),
        Data::DurationIso(_) | Data::Error(_) | Data::Empty => RawCell::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
Row ID,Order Date,Segment,State,Region,Category,Sub-Category,Sales,Profit
1,01/15/2024,Consumer,New York,East,Technology,Phones,100,20
2,02/03/2024,Corporate,California,West,Technology,Machines,200,-10
3,garbage,Consumer,Texas,Central,Furniture,Chairs,50,5
";

    #[test]
    fn csv_reader_normalizes_and_drops_bad_dates() {
        let table = load_csv_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.dropped.bad_date, 1);
        assert_eq!(table.records[0].region, "East");
        assert_eq!(table.records[1].month, "2024-02");
    }

    #[test]
    fn latin1_fields_are_decoded() {
        let mut bytes = b"Order Date,Segment,State,Region,Category,Sub-Category,Sales,Profit\n".to_vec();
        bytes.extend_from_slice(b"2024-01-01,Consumer,Qu\xe9bec,East,Tech,Phones,1,1\n");
        let table = load_csv_reader(bytes.as_slice()).unwrap();
        assert_eq!(table.records[0].state, "Québec");
    }

    #[test]
    fn header_only_csv_is_no_data() {
        let err = load_csv_reader("Order Date,Segment,State,Region,Category,Sub-Category,Sales,Profit\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, DataFormatError::NoData));
    }

    #[test]
    fn csv_without_date_column_fails_without_partial_table() {
        let err = load_csv_reader("Region,Sales\nEast,1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DataFormatError::MissingDateColumn));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.parquet");
        std::fs::write(&path, b"PAR1").unwrap();
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, DataFormatError::UnsupportedFormat(ext) if ext == ".parquet"));
    }

    #[test]
    fn csv_file_is_loaded_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Superstore.CSV");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(SAMPLE.as_bytes()).unwrap();
        drop(f);
        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn bundled_sample_loads_completely() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/superstore.csv");
        let table = load_file(&path).unwrap();
        // Row count written by `generate_sample`.
        assert_eq!(table.len(), 600);
        assert_eq!(table.dropped.total(), 0);
        assert_eq!(table.domain(crate::data::model::CategoryField::Region).unwrap().len(), 4);
    }

    #[test]
    fn workbook_dates_and_amounts_are_normalized() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/fixtures/orders.xlsx");
        let table = load_file(&path).unwrap();
        let months: Vec<_> = table.records.iter().map(|r| r.month.as_str()).collect();
        assert_eq!(months, ["2024-03", "2016-11"]);
        assert_eq!(table.records[0].order_date, chrono::NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(table.records[0].sales, 120.5);
        assert_eq!(table.records[1].profit, -4.25);
        assert_eq!(table.records[1].region, "Central");
        assert_eq!(table.dropped.bad_date, 1);
        assert_eq!(table.dropped.bad_number, 0);
    }

    #[test]
    fn workbook_copied_under_another_name_still_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Q1 Orders.XLSX");
        std::fs::copy(Path::new(env!("CARGO_MANIFEST_DIR")).join("data/fixtures/orders.xlsx"), &path).unwrap();
        assert_eq!(load_file(&path).unwrap().len(), 2);
    }

    #[test]
    fn spreadsheet_cells_map_to_raw_cells() {
        use calamine::CellErrorType;

        assert_eq!(cell_to_raw(&Data::Int(7)), RawCell::Number(7.0));
        assert_eq!(cell_to_raw(&Data::Float(2.5)), RawCell::Number(2.5));
        assert_eq!(cell_to_raw(&Data::String("  ".into())), RawCell::Empty);
        assert_eq!(cell_to_raw(&Data::Bool(true)), RawCell::Text("true".into()));
        assert_eq!(
            cell_to_raw(&Data::DateTimeIso("2016-11-08T00:00:00".into())),
            RawCell::Text("2016-11-08T00:00:00".into())
        );
        assert_eq!(cell_to_raw(&Data::Error(CellErrorType::Div0)), RawCell::Empty);
        assert_eq!(cell_to_raw(&Data::Empty), RawCell::Empty);
    }

    #[test]
    fn corrupt_workbook_is_a_spreadsheet_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a zip archive").unwrap();
        assert!(matches!(load_file(&path).unwrap_err(), DataFormatError::Spreadsheet(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_file(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DataFormatError::Io(_)));
    }
}
