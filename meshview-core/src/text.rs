/// Line helpers shared by the text mesh formats
use crate::error::{ParseError, ParseErrorKind};

const BOM: &str = "\u{FEFF}";

/// Decode `data`, dropping a leading byte-order mark.
pub(crate) fn from_utf8(data: &[u8]) -> Result<&str, ParseError> {
    std::str::from_utf8(data)
        .map(strip_bom)
        .map_err(|e| ParseError::new(line_at(data, e.valid_up_to()), ParseErrorKind::InvalidUtf8))
}

pub(crate) fn strip_bom(text: &str) -> &str {
    text.strip_prefix(BOM).unwrap_or(text)
}

/// 1-based line number of the byte at `offset`.
pub(crate) fn line_at(data: &[u8], offset: usize) -> usize {
    data[..offset].iter().filter(|&&b| b == b'\n').count() + 1
}

/// Lines paired with their 1-based numbers, line endings stripped.
pub(crate) fn numbered_lines(input: &str) -> impl Iterator<Item = (usize, &str)> {
    input.lines().enumerate().map(|(i, line)| (i + 1, line))
}
