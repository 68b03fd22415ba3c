#![warn(rust_2018_idioms)]

//! Font table directory with lazily decoded tables, and pair kerning from the `GPOS` and legacy
//! `kern` tables.
//!
//! ```no_run
//! # fn main() -> Result<(), sfnt_kern::error::ParseError> {
//! let data = std::fs::read("font.ttf")?;
//! let mut font = sfnt_kern::Font::parse(&data)?;
//! let kerning = font.kerning(false)?;
//! println!("{:?}", kerning.kern_pair(36, 57));
//! # Ok(())
//! # }
//! ```

/// Reading of binary data.
pub mod binary;
/// Checksum calculation routines.
pub mod checksum;
pub mod error;
pub mod font;
pub mod fontfile;
pub mod gpos;
pub mod layout;
pub mod post;
pub mod size;
pub mod tables;
pub mod tag;
/// Reading of the WOFF format.
#[cfg(feature = "flate2")]
pub mod woff;
pub mod woff2;

pub use font::{Font, Table};
pub use gpos::KernSet;
