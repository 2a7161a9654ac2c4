/// Error types for mesh loading
use std::fmt;

use thiserror::Error;

/// Which attribute list an index was resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Position,
    Normal,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Position => f.write_str("position"),
            Attribute::Normal => f.write_str("normal"),
        }
    }
}

/// Encoding declared by the `format` line of a PLY header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlyFormat {
    Ascii,
    BinaryBigEndian,
    BinaryLittleEndian,
}

impl fmt::Display for PlyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlyFormat::Ascii => f.write_str("ascii"),
            PlyFormat::BinaryBigEndian => f.write_str("binary_big_endian"),
            PlyFormat::BinaryLittleEndian => f.write_str("binary_little_endian"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    Malformed(String),
    /// OBJ indices are 1-based, so 0 never names a vertex.
    InvalidIndex,
    UnsupportedFormat(PlyFormat),
    MissingEndHeader,
    UnexpectedEof { element: String },
    InvalidUtf8,
}

/// A parse failure pinned to the 1-based line it occurred on
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(line: usize, kind: ParseErrorKind) -> Self {
        Self { line, kind }
    }

    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::new(line, ParseErrorKind::Malformed(message.into()))
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::Malformed(message) => f.write_str(message),
            ParseErrorKind::InvalidIndex => f.write_str("index 0 is not a valid 1-based index"),
            ParseErrorKind::UnsupportedFormat(format) => {
                write!(f, "PLY format '{}' is not supported", format)
            }
            ParseErrorKind::MissingEndHeader => f.write_str("header is missing 'end_header'"),
            ParseErrorKind::UnexpectedEof { element } => {
                write!(f, "file ended before all '{}' records were read", element)
            }
            ParseErrorKind::InvalidUtf8 => f.write_str("text is not valid UTF-8"),
        }
    }
}

/// Everything that can abort a single load operation
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("{attribute} index {index} out of range (list has {len} entries)")]
    IndexOutOfRange {
        attribute: Attribute,
        index: usize,
        len: usize,
    },

    #[error("no ear found in polygon with {remaining} remaining vertices")]
    NoEar { remaining: usize },

    #[error("polygon with {vertices} vertices is degenerate")]
    DegeneratePolygon { vertices: usize },

    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
}

impl Error {
    /// Source line of a parse failure.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Parse(err) => Some(err.line),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err: Error = ParseError::new(4, ParseErrorKind::MissingEndHeader).into();
        assert_eq!(err.to_string(), "parse error: line 4: header is missing 'end_header'");
        assert_eq!(err.line(), Some(4));
    }

    #[test]
    fn test_index_error_display() {
        let err = Error::IndexOutOfRange {
            attribute: Attribute::Normal,
            index: 7,
            len: 2,
        };
        assert_eq!(err.to_string(), "normal index 7 out of range (list has 2 entries)");
        assert_eq!(err.line(), None);
    }
}
