//! XLSX shared strings table.

use crate::error::{Error, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::borrow::Cow;
use std::collections::HashMap;

use super::NS_MAIN;

/// Shared strings table.
#[derive(Debug, Clone, Default)]
pub struct SharedStrings {
    /// All strings in order
    strings: Vec<String>,
    /// Index of each string, for de-duplication while writing
    index: HashMap<String, usize>,
    /// Number of cells referring to the table
    references: usize,
}

impl SharedStrings {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a string (or reuse an existing entry) and return its index.
    pub fn intern(&mut self, text: &str) -> usize {
        self.references += 1;
        if let Some(&idx) = self.index.get(text) {
            return idx;
        }
        let idx = self.strings.len();
        self.strings.push(text.to_string());
        self.index.insert(text.to_string(), idx);
        idx
    }

    /// Parse shared strings from XML content.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut table = Self::default();
        let mut reader = quick_xml::Reader::from_str(xml);

        let mut buf = Vec::new();
        let mut in_si = false;
        let mut in_t = false;
        let mut current_text = String::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_text.clear();
                    }
                    b"t" if in_si => {
                        in_t = true;
                    }
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"si" => {
                    table.strings.push(String::new());
                }
                Ok(Event::Text(e)) => {
                    if in_t {
                        let text = e.unescape().unwrap_or_default();
                        current_text.push_str(&text);
                    }
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        let text = std::mem::take(&mut current_text);
                        table.strings.push(decode_text(&text).into_owned());
                        in_si = false;
                    }
                    b"t" => {
                        in_t = false;
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(table)
    }

    /// Serialize the table as `xl/sharedStrings.xml`.
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut writer = quick_xml::Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

        let count = self.references.to_string();
        let unique = self.strings.len().to_string();
        let sst = BytesStart::new("sst").with_attributes([
            ("xmlns", NS_MAIN),
            ("count", count.as_str()),
            ("uniqueCount", unique.as_str()),
        ]);
        writer.write_event(Event::Start(sst))?;

        for text in &self.strings {
            writer.write_event(Event::Start(BytesStart::new("si")))?;
            let mut t = BytesStart::new("t");
            if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
                t.push_attribute(("xml:space", "preserve"));
            }
            writer.write_event(Event::Start(t))?;
            let encoded = encode_text(text);
            writer.write_event(Event::Text(BytesText::new(&encoded)))?;
            writer.write_event(Event::End(BytesEnd::new("t")))?;
            writer.write_event(Event::End(BytesEnd::new("si")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("sst")))?;
        Ok(writer.into_inner())
    }

    /// Get a string by index.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(|s| s.as_str())
    }

    /// Get the count of unique strings.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// Check for characters XML 1.0 cannot carry, even as character references.
fn is_forbidden_in_xml(c: char) -> bool {
    matches!(
        c,
        '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}'
    )
}

/// Check whether `s` starts with an `_xHHHH_` escape.
fn starts_with_escape(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 7
        && b[0] == b'_'
        && b[1] == b'x'
        && b[2..6].iter().all(u8::is_ascii_hexdigit)
        && b[6] == b'_'
}

/// Encode text for a `<t>` element.
///
/// Characters XML cannot hold become `_xHHHH_`. An underscore that would
/// otherwise read as the start of such an escape becomes `_x005F_`.
pub(crate) fn encode_text(text: &str) -> Cow<'_, str> {
    if !text.contains(is_forbidden_in_xml) && !text.contains("_x") {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 8);
    for (i, c) in text.char_indices() {
        if is_forbidden_in_xml(c) {
            out.push_str(&format!("_x{:04X}_", c as u32));
        } else if c == '_' && starts_with_escape(&text[i..]) {
            out.push_str("_x005F_");
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

/// Decode `_xHHHH_` escapes in text read from a workbook.
pub(crate) fn decode_text(text: &str) -> Cow<'_, str> {
    if !text.contains("_x") {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        if starts_with_escape(rest) {
            if let Some(decoded) = u32::from_str_radix(&rest[2..6], 16)
                .ok()
                .and_then(char::from_u32)
            {
                out.push(decoded);
                rest = &rest[7..];
                continue;
            }
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shared_strings() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="5" uniqueCount="3">
    <si><t>Hello</t></si>
    <si><t>World</t></si>
    <si><t>Test</t></si>
</sst>"#;

        let ss = SharedStrings::parse(xml).unwrap();
        assert_eq!(ss.len(), 3);
        assert_eq!(ss.get(0), Some("Hello"));
        assert_eq!(ss.get(1), Some("World"));
        assert_eq!(ss.get(2), Some("Test"));
        assert_eq!(ss.get(3), None);
    }

    #[test]
    fn test_rich_text() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <si>
        <r><t>Hello </t></r>
        <r><t>World</t></r>
    </si>
</sst>"#;

        let ss = SharedStrings::parse(xml).unwrap();
        assert_eq!(ss.len(), 1);
        assert_eq!(ss.get(0), Some("Hello World"));
    }

    #[test]
    fn test_intern_deduplicates() {
        let mut ss = SharedStrings::new();
        assert_eq!(ss.intern("Depth"), 0);
        assert_eq!(ss.intern("Reading"), 1);
        assert_eq!(ss.intern("Depth"), 0);
        assert_eq!(ss.len(), 2);

        let xml = String::from_utf8(ss.to_xml().unwrap()).unwrap();
        assert!(xml.contains(r#"count="3""#));
        assert!(xml.contains(r#"uniqueCount="2""#));
    }

    #[test]
    fn test_written_table_parses_back() {
        let mut ss = SharedStrings::new();
        ss.intern("a < b & c");
        ss.intern("  padded ");
        ss.intern("");

        let xml = String::from_utf8(ss.to_xml().unwrap()).unwrap();
        assert!(xml.contains(r#"xml:space="preserve""#));

        let parsed = SharedStrings::parse(&xml).unwrap();
        assert_eq!(parsed.get(0), Some("a < b & c"));
        assert_eq!(parsed.get(1), Some("  padded "));
        assert_eq!(parsed.get(2), Some(""));
    }

    #[test]
    fn test_control_characters_are_escaped() {
        let mut ss = SharedStrings::new();
        ss.intern("x\u{1}y");
        ss.intern("tab\there");

        let xml = String::from_utf8(ss.to_xml().unwrap()).unwrap();
        assert!(!xml.contains('\u{1}'));
        assert!(xml.contains("x_x0001_y"));
        assert!(xml.contains("tab\there"));

        let parsed = SharedStrings::parse(&xml).unwrap();
        assert_eq!(parsed.get(0), Some("x\u{1}y"));
        assert_eq!(parsed.get(1), Some("tab\there"));
    }

    #[test]
    fn test_literal_escape_lookalike_survives() {
        assert_eq!(encode_text("A_x0041_"), "A_x005F_x0041_");
        assert_eq!(decode_text("A_x005F_x0041_"), "A_x0041_");
        assert_eq!(decode_text("_x0041_"), "A");
        assert_eq!(encode_text("snake_case"), "snake_case");
        assert_eq!(decode_text("_x12"), "_x12");
    }
}
