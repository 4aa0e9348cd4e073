//! Delimited file loader.
//!
//! Reads a CSV file with a header row into a [`Table`], inferring a
//! [`Scalar`] for every cell. Any failure is fatal for the run.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::domain::{Scalar, Table};
use crate::error::IngestError;

/// Loads `path` into a [`Table`].
///
/// Column names come from the header row. Every data row must have as many
/// cells as the header.
///
/// # Errors
///
/// Returns [`IngestError::FileNotFound`] if `path` does not exist, and
/// [`IngestError::Parse`] for unreadable or malformed content (unequal row
/// lengths, an unterminated quote, invalid UTF-8).
pub fn load_table(path: &Path) -> Result<Table, IngestError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => IngestError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => IngestError::Parse {
            path: path.to_path_buf(),
            source: csv::Error::from(e),
        },
    })?;

    let table = read_table(file).map_err(|source| IngestError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(
        path = %path.display(),
        rows = table.len(),
        columns = table.columns().len(),
        "table loaded"
    );
    Ok(table)
}

/// Parses CSV content from any reader.
///
/// # Errors
///
/// Returns the underlying [`csv::Error`] on malformed input, including a
/// quoted field that is still open at end of input.
pub fn read_table<R: Read>(mut reader: R) -> Result<Table, csv::Error> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;

    // The csv reader accepts an unterminated quote and swallows every
    // following row into one cell.
    if let Some(line) = unterminated_quote_line(&data) {
        return Err(csv::Error::from(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("quoted field opened on line {line} is not closed before end of file"),
        )));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(data.as_slice());

    let headers = reader.headers()?.clone();
    let mut table = Table::with_columns(headers.iter());

    for result in reader.records() {
        let record = result?;
        table.push_row(record.iter().map(Scalar::infer));
    }

    Ok(table)
}

/// Returns the line on which a quoted field opens without closing.
///
/// A `"` only opens a quoted field at the start of a field; inside one,
/// `""` is an escaped quote and a lone `"` closes it.
fn unterminated_quote_line(data: &[u8]) -> Option<usize> {
    let mut line = 1usize;
    let mut open_on: Option<usize> = None;
    let mut at_field_start = true;
    let mut bytes = data.iter().peekable();

    while let Some(&b) = bytes.next() {
        if open_on.is_some() {
            match b {
                b'"' if bytes.peek() == Some(&&b'"') => {
                    bytes.next();
                }
                b'"' => open_on = None,
                b'\n' => line = line.saturating_add(1),
                _ => {}
            }
            continue;
        }
        match b {
            b'"' if at_field_start => {
                open_on = Some(line);
                at_field_start = false;
            }
            b',' | b'\r' => at_field_start = true,
            b'\n' => {
                line = line.saturating_add(1);
                at_field_start = true;
            }
            _ => at_field_start = false,
        }
    }
    open_on
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(contents: &str) -> tempfile::NamedTempFile {
        let Ok(mut file) = tempfile::NamedTempFile::new() else {
            panic!("temp file");
        };
        if file.write_all(contents.as_bytes()).is_err() {
            panic!("write fixture");
        }
        file
    }

    #[test]
    fn loads_rows_in_file_order() {
        let fixture = write_fixture("player_id,name,height\n1,A,180\n2,B,\n3,\"C, Jr.\",175.5\n");
        let Ok(table) = load_table(fixture.path()) else {
            panic!("expected table");
        };

        assert_eq!(table.columns(), ["player_id", "name", "height"]);
        assert_eq!(table.len(), 3);

        let ids: Vec<Option<&Scalar>> = table.rows().iter().map(|r| r.get("player_id")).collect();
        assert_eq!(
            ids,
            [
                Some(&Scalar::Integer(1)),
                Some(&Scalar::Integer(2)),
                Some(&Scalar::Integer(3))
            ]
        );

        let Some(second) = table.rows().get(1) else {
            panic!("expected second row");
        };
        assert_eq!(second.get("height"), Some(&Scalar::Null));

        let Some(third) = table.rows().get(2) else {
            panic!("expected third row");
        };
        assert_eq!(third.get("name"), Some(&Scalar::from("C, Jr.")));
        assert_eq!(third.get("height"), Some(&Scalar::Float(175.5)));
    }

    #[test]
    fn header_only_file_is_empty_table() {
        let fixture = write_fixture("player_id,market_value_in_eur\n");
        let Ok(table) = load_table(fixture.path()) else {
            panic!("expected table");
        };
        assert!(table.is_empty());
        assert!(table.has_column("player_id"));
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("temp dir");
        };
        let path = dir.path().join("players.csv");
        let result = load_table(&path);
        assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
    }

    #[test]
    fn unequal_row_length_is_parse_error() {
        let fixture = write_fixture("player_id,name\n1,A\n2,B,extra\n");
        let result = load_table(fixture.path());
        let Err(IngestError::Parse { path, .. }) = result else {
            panic!("expected parse error");
        };
        assert_eq!(path, fixture.path());
    }

    #[test]
    fn unterminated_quote_is_parse_error() {
        let fixture = write_fixture("player_id,name\n1,\"A\n2,B\n");
        let result = load_table(fixture.path());
        let Err(IngestError::Parse { source, .. }) = result else {
            panic!("expected parse error");
        };
        assert!(source.to_string().contains("line 2"));
    }

    #[test]
    fn closed_multiline_and_escaped_quotes_still_load() {
        let input = "player_id,name\n1,\"He said \"\"hi\"\"\nthere\"\n2,B\"x\n";
        let Ok(table) = read_table(input.as_bytes()) else {
            panic!("expected table");
        };
        assert_eq!(table.len(), 2);
        let Some(first) = table.rows().first() else {
            panic!("expected first row");
        };
        assert_eq!(
            first.get("name"),
            Some(&Scalar::from("He said \"hi\"\nthere"))
        );
        let Some(second) = table.rows().get(1) else {
            panic!("expected second row");
        };
        assert_eq!(second.get("name"), Some(&Scalar::from("B\"x")));
    }

    #[test]
    fn read_table_accepts_in_memory_input() {
        let Ok(table) = read_table("a,b\nx,1\n".as_bytes()) else {
            panic!("expected table");
        };
        let Some(row) = table.rows().first() else {
            panic!("expected row");
        };
        assert_eq!(row.get("a"), Some(&Scalar::from("x")));
        assert_eq!(row.get("b"), Some(&Scalar::Integer(1)));
    }
}
