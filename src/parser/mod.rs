//! Raw CSV reader with encoding and delimiter auto-detection.
//!
//! Turns a bank export into header-keyed string rows. No bank-specific
//! logic here; typing the values is the normalizer's job. Bank exports
//! arrive in UTF-8, Latin-1, or Windows-1252 with varying delimiters, so
//! both are sniffed per file before parsing.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{CsvError, CsvResult};

/// One raw CSV row: column name to untyped cell text.
pub type RawRow = HashMap<String, String>;

/// Result of parsing one file, with detection metadata.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Header-keyed rows in file order.
    pub rows: Vec<RawRow>,
    /// Detected encoding.
    pub encoding: String,
    /// Detected delimiter.
    pub delimiter: char,
    /// Column headers in file order.
    pub headers: Vec<String>,
}

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let (charset, _, _) = chardet::detect(bytes);

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to a string using the named encoding.
///
/// Encodings outside the set bank exports actually use are an error rather
/// than a lossy guess.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => Ok(String::from_utf8_lossy(bytes).into_owned()),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => {
            Ok(encoding_rs::ISO_8859_15.decode(bytes).0.into_owned())
        }
        "windows-1252" | "cp1252" => Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()),
        other => Err(CsvError::Encoding(format!(
            "unsupported encoding '{}'",
            other
        ))),
    }
}

/// Detect the delimiter by counting candidates in the header line.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text into header-keyed rows with an explicit delimiter.
///
/// Cells are trimmed and unquoted. A ragged row is padded with empty cells
/// so every row carries every header; the coercion stage decides whether an
/// empty cell is acceptable for the field's type.
pub fn parse_str(content: &str, delimiter: char) -> CsvResult<Vec<RawRow>> {
    Ok(parse_rows(content, delimiter)?.1)
}

fn parse_rows(content: &str, delimiter: char) -> CsvResult<(Vec<String>, Vec<RawRow>)> {
    let mut lines = content.lines();

    let header_line = lines.next().ok_or(CsvError::EmptyFile)?;

    let headers: Vec<String> = header_line
        .split(delimiter)
        .map(|s| s.trim().trim_matches('"').to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    let mut rows = Vec::new();

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }

        let cells: Vec<&str> = line.split(delimiter).collect();
        let mut row = RawRow::with_capacity(headers.len());

        for (i, header) in headers.iter().enumerate() {
            let cell = cells
                .get(i)
                .map(|s| s.trim().trim_matches('"'))
                .unwrap_or("");
            row.insert(header.clone(), cell.to_string());
        }

        rows.push(row);
    }

    Ok((headers, rows))
}

/// Parse CSV bytes with auto-detected encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);

    let (headers, rows) = parse_rows(&content, delimiter)?;

    Ok(ParseResult {
        rows,
        encoding,
        delimiter,
        headers,
    })
}

/// Read and parse a CSV file with auto-detected encoding and delimiter.
pub fn parse_file_auto<P: AsRef<Path>>(path: P) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let csv = "amount,date\n100.0,01/02/2020\n50.5,01/03/2020";
        let rows = parse_str(csv, ',').unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["amount"], "100.0");
        assert_eq!(rows[0]["date"], "01/02/2020");
        assert_eq!(rows[1]["amount"], "50.5");
    }

    #[test]
    fn test_semicolon_delimiter() {
        let csv = "a;b;c\n1;2;3";
        let rows = parse_str(csv, ';').unwrap();

        assert_eq!(rows[0]["a"], "1");
        assert_eq!(rows[0]["b"], "2");
        assert_eq!(rows[0]["c"], "3");
    }

    #[test]
    fn test_quoted_values() {
        let csv = "memo,amount\n\"coffee shop\",4.50";
        let rows = parse_str(csv, ',').unwrap();

        assert_eq!(rows[0]["memo"], "coffee shop");
        assert_eq!(rows[0]["amount"], "4.50");
    }

    #[test]
    fn test_empty_lines_skipped() {
        let csv = "a,b\n1,2\n\n3,4\n";
        let rows = parse_str(csv, ',').unwrap();

        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_ragged_row_padded() {
        let csv = "a,b,c\n1,2";
        let rows = parse_str(csv, ',').unwrap();

        assert_eq!(rows[0]["a"], "1");
        assert_eq!(rows[0]["b"], "2");
        assert_eq!(rows[0]["c"], "");
    }

    #[test]
    fn test_extra_cells_ignored() {
        let csv = "a,b\n1,2,3,4";
        let rows = parse_str(csv, ',').unwrap();

        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[0]["a"], "1");
        assert_eq!(rows[0]["b"], "2");
    }

    #[test]
    fn test_empty_file_error() {
        assert!(matches!(parse_str("", ','), Err(CsvError::EmptyFile)));
    }

    #[test]
    fn test_blank_header_error() {
        assert!(matches!(parse_str("\n1,2", ','), Err(CsvError::NoHeaders)));
    }

    #[test]
    fn test_detect_delimiter_comma() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
    }

    #[test]
    fn test_detect_delimiter_semicolon() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
    }

    #[test]
    fn test_detect_delimiter_tab() {
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
    }

    #[test]
    fn test_detect_delimiter_pipe() {
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
    }

    #[test]
    fn test_auto_parse() {
        let csv = "amount;date\n100.0;01/02/2020";
        let result = parse_bytes_auto(csv.as_bytes()).unwrap();

        assert_eq!(result.delimiter, ';');
        assert_eq!(result.encoding, "utf-8");
        assert_eq!(result.headers, vec!["amount", "date"]);
        assert_eq!(result.rows.len(), 1);
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert!(decoded.starts_with("Soci"));
    }

    #[test]
    fn test_unsupported_encoding_error() {
        let result = decode_content(b"abc", "big5");
        assert!(matches!(result, Err(CsvError::Encoding(_))));
    }
}
