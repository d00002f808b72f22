use credit_approval_data::RawTable;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::error::{IoError, IoResult};

/// Read a headerless delimited file into a [`RawTable`] of text fields.
///
/// Every record must have as many fields as the first one; a short or long row is
/// reported as [`IoError::RowWidth`] with its 0-based row number.
pub fn read_raw_table<P: AsRef<Path>>(path: P, delimiter: u8) -> IoResult<RawTable> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let table = read_raw_table_from_reader(file, delimiter)?;
    info!(
        path = %path.display(),
        rows = table.n_rows(),
        columns = table.width(),
        "loaded raw table"
    );
    Ok(table)
}

/// Same as [`read_raw_table`] for any byte source.
pub fn read_raw_table_from_reader<R: Read>(reader: R, delimiter: u8) -> IoResult<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        let fields: Vec<String> = record.iter().map(|f| f.to_string()).collect();
        if let Some(first) = rows.first() {
            if fields.len() != first.len() {
                return Err(IoError::RowWidth {
                    row,
                    expected: first.len(),
                    got: fields.len(),
                });
            }
        }
        rows.push(fields);
    }

    Ok(RawTable::new(rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_headerless_rows() {
        let text = "b,30.83,0,+\na,?,4.46,-\n";
        let raw = read_raw_table_from_reader(text.as_bytes(), b',').unwrap();
        assert_eq!(raw.n_rows(), 2);
        assert_eq!(raw.width(), 4);
        assert_eq!(raw.rows()[1], vec!["a", "?", "4.46", "-"]);
        assert_eq!(raw.count_token("?"), 1);
    }

    #[test]
    fn test_custom_delimiter() {
        let raw = read_raw_table_from_reader("1;2\n3;4\n".as_bytes(), b';').unwrap();
        assert_eq!(raw.rows()[1], vec!["3", "4"]);
    }

    #[test]
    fn test_ragged_row_is_reported() {
        let err = read_raw_table_from_reader("1,2,3\n4,5\n".as_bytes(), b',').unwrap_err();
        assert!(matches!(
            err,
            IoError::RowWidth {
                row: 1,
                expected: 3,
                got: 2
            }
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = read_raw_table("/nonexistent/credit.csv", b',').unwrap_err();
        assert!(matches!(err, IoError::Io(_)));
    }
}
