use encoding_rs::{UTF_8, WINDOWS_1256};
use std::borrow::Cow;
use std::io;

use crate::error::{StoreError, StoreResult};
use crate::models::{RawTable, StudentTable};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decode CSV bytes: UTF-8 first (BOM dropped), then Windows-1256, which is
/// what spreadsheet tools on Persian-locale Windows export.
///
/// Windows-1256 maps every byte, so the fallback only fails when the result
/// holds control characters no CSV text has (a spreadsheet or image uploaded
/// by mistake).
pub fn decode_text<'a>(bytes: &'a [u8], source_name: &str) -> StoreResult<Cow<'a, str>> {
    let (text, had_errors) = UTF_8.decode_with_bom_removal(bytes);
    if !had_errors {
        return Ok(text);
    }

    tracing::warn!("{} is not valid UTF-8, retrying as Windows-1256", source_name);
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    WINDOWS_1256
        .decode_without_bom_handling_and_without_replacement(body)
        .filter(|text| !text.chars().any(is_binary_control))
        .ok_or_else(|| StoreError::Decode {
            source_name: source_name.to_string(),
        })
}

fn is_binary_control(c: char) -> bool {
    c.is_control() && !matches!(c, '\t' | '\n' | '\r')
}

/// Parse CSV bytes into an untyped table. Rows with a different number of
/// cells than the header are rejected.
pub fn parse_raw_table(bytes: &[u8], source_name: &str) -> StoreResult<RawTable> {
    let text = decode_text(bytes, source_name)?;
    if text.trim().is_empty() {
        return Ok(RawTable::default());
    }
    if let Some(line) = unterminated_quote_line(&text) {
        return Err(StoreError::Corrupt {
            source_name: source_name.to_string(),
            line,
            reason: "quoted field is never closed".to_string(),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| corrupt(source_name, &e))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| corrupt(source_name, &e))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable::new(headers, rows))
}

/// Serialize a table as UTF-8 CSV with a BOM, header row first.
pub fn encode_table(table: &StudentTable, source_name: &str) -> StoreResult<Vec<u8>> {
    let raw = RawTable::from_table(table);

    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    writer
        .write_record(&raw.headers)
        .map_err(|e| StoreError::io(source_name, io::Error::from(e)))?;
    for row in &raw.rows {
        writer
            .write_record(row)
            .map_err(|e| StoreError::io(source_name, io::Error::from(e)))?;
    }

    writer
        .into_inner()
        .map_err(|e| StoreError::io(source_name, e.into_error()))
}

/// Line on which a quoted field opens and runs to the end of the input.
/// The csv reader accepts such input and folds every following row into
/// one cell.
fn unterminated_quote_line(text: &str) -> Option<u64> {
    let mut line = 1;
    let mut open_at = None;
    let mut field_start = true;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match (open_at, c) {
            (Some(_), '"') => {
                // "" inside a quoted field is an escaped quote
                if chars.peek() == Some(&'"') {
                    chars.next();
                } else {
                    open_at = None;
                }
            }
            (None, '"') if field_start => open_at = Some(line),
            _ => {}
        }
        if c == '\n' {
            line += 1;
        }
        field_start = open_at.is_none() && matches!(c, ',' | '\n' | '\r');
    }
    open_at
}

fn corrupt(source_name: &str, e: &csv::Error) -> StoreError {
    StoreError::Corrupt {
        source_name: source_name.to_string(),
        line: e.position().map(|p| p.line()).unwrap_or(0),
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StudentRecord;

    #[test]
    fn reads_utf8_with_bom() {
        let bytes = "\u{feff}first_name,contact\nعلی,a@x.com\n".as_bytes();
        let raw = parse_raw_table(bytes, "students.csv").unwrap();
        assert_eq!(raw.headers, vec!["first_name", "contact"]);
        assert_eq!(raw.rows, vec![vec!["علی".to_string(), "a@x.com".to_string()]]);
    }

    #[test]
    fn falls_back_to_windows_1256() {
        let (encoded, _, unmappable) = WINDOWS_1256.encode("first_name\nرضا\n");
        assert!(!unmappable);
        assert!(std::str::from_utf8(&encoded).is_err());

        let raw = parse_raw_table(&encoded, "legacy.csv").unwrap();
        assert_eq!(raw.rows[0][0], "رضا");
    }

    #[test]
    fn ragged_rows_are_corrupt() {
        let bytes = b"first_name,last_name\nAli,Rezaei\nSara\n";
        match parse_raw_table(bytes, "broken.csv") {
            Err(StoreError::Corrupt { source_name, line, .. }) => {
                assert_eq!(source_name, "broken.csv");
                assert_eq!(line, 3);
            }
            other => panic!("expected corrupt error, got {:?}", other),
        }
    }

    #[test]
    fn unclosed_quote_is_corrupt_at_the_opening_line() {
        let bytes = b"first_name,last_name\nAli,\"Rezaei\nSara,Ahmadi\n";
        match parse_raw_table(bytes, "upload.csv") {
            Err(StoreError::Corrupt { source_name, line, .. }) => {
                assert_eq!(source_name, "upload.csv");
                assert_eq!(line, 2);
            }
            other => panic!("expected corrupt error, got {:?}", other),
        }
    }

    #[test]
    fn escaped_and_stray_quotes_still_parse() {
        let bytes = b"first_name,feedback\nAli,\"said \"\"hi\"\", then\nleft\"\nSara,5\" tall\n";
        let raw = parse_raw_table(bytes, "quotes.csv").unwrap();
        assert_eq!(raw.rows[0][1], "said \"hi\", then\nleft");
        assert_eq!(raw.rows[1][1], "5\" tall");
    }

    #[test]
    fn bom_is_dropped_before_the_windows_1256_fallback() {
        let (body, _, _) = WINDOWS_1256.encode("first_name,contact\nرضا,r@x.com\n");
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(&body);

        let raw = parse_raw_table(&bytes, "legacy.csv").unwrap();
        assert_eq!(raw.headers, vec!["first_name", "contact"]);
        assert_eq!(raw.rows[0][0], "رضا");
    }

    #[test]
    fn binary_upload_is_a_decode_error() {
        let bytes = b"PK\x03\x04\x14\x00\x06\x00\xff\xfe";
        match parse_raw_table(bytes, "students.xlsx") {
            Err(StoreError::Decode { source_name }) => assert_eq!(source_name, "students.xlsx"),
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn blank_input_is_an_empty_table() {
        let raw = parse_raw_table(b"  \n", "empty.csv").unwrap();
        assert!(raw.headers.is_empty());
        assert!(raw.is_empty());
    }

    #[test]
    fn encoded_table_starts_with_bom_and_quotes_commas() {
        let table = StudentTable::from_rows(vec![StudentRecord {
            first_name: "Ali".into(),
            feedback: "likes maths, chess".into(),
            ..StudentRecord::default()
        }]);
        let bytes = encode_table(&table, "students.csv").unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("first_name,last_name,age,grade_level,contact,gender,feedback,submitted_at,photo_path,accepted_terms")
        );
        assert_eq!(lines.next(), Some("Ali,,0,,,,\"likes maths, chess\",,,False"));
    }
}
