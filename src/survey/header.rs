//! Header line detection.
//!
//! Survey exports carry a free-form preamble (instrument, operator, site
//! notes) before the actual table. The table starts at the first line that
//! begins with the header marker.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// UTF-8 byte order mark.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Find the zero-based index of the first line starting with `marker`.
///
/// Returns `Ok(None)` when the file ends without such a line.
pub fn locate_header_line(path: impl AsRef<Path>, marker: &str) -> Result<Option<usize>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
        _ => Error::Io(e),
    })?;
    locate_header_line_in(BufReader::new(file), marker)
}

/// Find the header line in any buffered reader.
pub fn locate_header_line_in<R: BufRead>(mut reader: R, marker: &str) -> Result<Option<usize>> {
    let marker = marker.as_bytes();
    let mut line = Vec::new();
    let mut index = 0;

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }

        let content = if index == 0 {
            line.strip_prefix(UTF8_BOM).unwrap_or(&line)
        } else {
            &line[..]
        };

        if content.starts_with(marker) {
            return Ok(Some(index));
        }
        index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_header_after_preamble() {
        let data = "Instrument: GX-1\nOperator: kim\n\nID,Depth,Reading\n1,0.5,12\n";
        let found = locate_header_line_in(Cursor::new(data), "ID").unwrap();
        assert_eq!(found, Some(3));
    }

    #[test]
    fn test_header_on_first_line() {
        let found = locate_header_line_in(Cursor::new("ID,A\n1,2\n"), "ID").unwrap();
        assert_eq!(found, Some(0));
    }

    #[test]
    fn test_header_missing() {
        let found = locate_header_line_in(Cursor::new("a,b\n1,2\n"), "ID").unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn test_marker_must_start_line() {
        let data = "Sensor ID,A\n ID,B\nID,C\n";
        let found = locate_header_line_in(Cursor::new(data), "ID").unwrap();
        assert_eq!(found, Some(2));
    }

    #[test]
    fn test_bom_is_ignored() {
        let data = b"\xEF\xBB\xBFID,A\n1,2\n";
        let found = locate_header_line_in(Cursor::new(&data[..]), "ID").unwrap();
        assert_eq!(found, Some(0));
    }

    #[test]
    fn test_non_utf8_preamble() {
        let data = b"Site: M\xFCnster\nID,A\n";
        let found = locate_header_line_in(Cursor::new(&data[..]), "ID").unwrap();
        assert_eq!(found, Some(1));
    }

    #[test]
    fn test_missing_file() {
        let result = locate_header_line("definitely/not/here.csv", "ID");
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }
}
