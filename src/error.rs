//! Error types

use crate::binary::read::ReadEof;
use crate::tag::DisplayTag;
use std::fmt;

/// Errors that originate when parsing binary data
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum ParseError {
    BadEof,
    BadValue,
    BadVersion,
    BadOffset,
    BadIndex,
    LimitExceeded,
    CompressionError,
    NotImplemented,
    /// Reading the font data from its source failed.
    Io(std::io::ErrorKind),
    /// The font has no table with this tag.
    MissingTable(u32),
    /// The font has no `head` table.
    MissingHead,
    /// The checksum of the table with this tag does not match the table directory.
    InvalidChecksum(u32),
    /// The data does not start with a known SFNT, WOFF, or WOFF2 signature.
    UnsupportedContainerFormat(u32),
    /// A pair adjustment subtable, or one of its coverage or class tables, is truncated or
    /// malformed. Holds the byte offset of the subtable within the `GPOS` table.
    InvalidKerningSubtable(usize),
    /// A class definition table uses a format other than 1 or 2.
    UnsupportedClassDefFormat(u16),
    /// The kerning source parsed successfully but contains no pair adjustments.
    MissingKerningInformation,
    /// The table stored under this tag is not of the kind requested.
    TableKindMismatch(u32),
}

impl From<ReadEof> for ParseError {
    fn from(_error: ReadEof) -> Self {
        ParseError::BadEof
    }
}

impl From<std::num::TryFromIntError> for ParseError {
    fn from(_error: std::num::TryFromIntError) -> Self {
        ParseError::BadValue
    }
}

impl From<std::io::Error> for ParseError {
    fn from(error: std::io::Error) -> Self {
        ParseError::Io(error.kind())
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::BadEof => write!(f, "end of data reached unexpectedly"),
            ParseError::BadValue => write!(f, "invalid value"),
            ParseError::BadVersion => write!(f, "unexpected data version"),
            ParseError::BadOffset => write!(f, "invalid data offset"),
            ParseError::BadIndex => write!(f, "invalid data index"),
            ParseError::LimitExceeded => write!(f, "limit exceeded"),
            ParseError::CompressionError => write!(f, "compression error"),
            ParseError::NotImplemented => write!(f, "feature not implemented"),
            ParseError::Io(kind) => write!(f, "unable to read font data: {}", kind),
            ParseError::MissingTable(tag) => {
                write!(f, "font is missing '{}' table", DisplayTag(*tag))
            }
            ParseError::MissingHead => write!(f, "missing head table in font"),
            ParseError::InvalidChecksum(tag) => {
                write!(f, "invalid checksum for '{}' table", DisplayTag(*tag))
            }
            ParseError::UnsupportedContainerFormat(magic) => {
                write!(f, "unsupported font format '{}'", DisplayTag(*magic))
            }
            ParseError::InvalidKerningSubtable(offset) => {
                write!(f, "invalid kerning subtable at offset {}", offset)
            }
            ParseError::UnsupportedClassDefFormat(format) => {
                write!(f, "unsupported class definition format {}", format)
            }
            ParseError::MissingKerningInformation => write!(f, "missing kerning information"),
            ParseError::TableKindMismatch(tag) => {
                write!(f, "table '{}' is not of the requested kind", DisplayTag(*tag))
            }
        }
    }
}

impl std::error::Error for ParseError {}
