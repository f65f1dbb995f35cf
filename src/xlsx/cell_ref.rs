//! A1-style cell references.

/// Highest row number a worksheet can hold.
pub const MAX_ROWS: u32 = 1_048_576;

/// Highest column count a worksheet can hold (`XFD`).
pub const MAX_COLUMNS: usize = 16_384;

/// Convert a zero-based column index to its letters (`0` → `A`, `27` → `AB`).
pub fn column_letters(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Build a reference from a zero-based column and a one-based row.
pub fn cell_reference(column: usize, row: u32) -> String {
    format!("{}{}", column_letters(column), row)
}

/// Parse a reference like `C12` into (one-based row, zero-based column).
///
/// References outside the worksheet grid yield `None`.
pub fn parse_cell_reference(reference: &str) -> Option<(u32, usize)> {
    let split = reference
        .find(|c: char| c.is_ascii_digit())
        .filter(|&i| i > 0)?;
    let (letters, digits) = reference.split_at(split);

    let mut column = 0usize;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = c.to_ascii_uppercase() as usize - 'A' as usize + 1;
        column = column.checked_mul(26)?.checked_add(digit)?;
        if column > MAX_COLUMNS {
            return None;
        }
    }
    let row = digits
        .parse::<u32>()
        .ok()
        .filter(|&r| r > 0 && r <= MAX_ROWS)?;

    Some((row, column - 1))
}
