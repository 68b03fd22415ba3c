//! Reading of the WOFF2 font format.
//!
//! Tables stored with a null transform are served directly from the decompressed data block.
//! Reconstructing transformed `glyf`, `loca` and `hmtx` tables is not supported.
//!
//! <https://www.w3.org/TR/WOFF2/>

mod lut;

use std::borrow::Cow;
use std::io::{Cursor, Read};

use bitflags::bitflags;

use self::lut::KNOWN_TABLE_TAGS;
use crate::binary::read::{ReadBinary, ReadBinaryDep, ReadCtxt, ReadScope};
use crate::error::ParseError;
use crate::tables::{FontTableProvider, TableLocation, TTCF_MAGIC};
use crate::tag;

pub const MAGIC: u32 = 0x774F4632; /* wOF2 */
// This is the default size of the buffer in the brotli crate.
// There's no guidance on how to choose this value.
const BROTLI_DECODER_BUFFER_SIZE: usize = 4096;
/// Tag index signalling that an explicit 4-byte tag follows the flags.
const ARBITRARY_TAG_INDEX: u8 = 63;

/// UIntBase128, Variable-length encoding of 32-bit unsigned integers.
#[derive(Copy, Clone)]
pub enum U32Base128 {}

bitflags! {
    /// The flags byte of a table directory entry.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    struct TableFlags: u8 {
        const TAG_INDEX = 0x3F;
        const TRANSFORM_VERSION = 0xC0;
    }
}

impl TableFlags {
    fn tag_index(self) -> u8 {
        (self & TableFlags::TAG_INDEX).bits()
    }

    fn transform_version(self) -> u8 {
        (self & TableFlags::TRANSFORM_VERSION).bits() >> 6
    }
}

/// A WOFF2 font with its table data block decompressed.
pub struct Woff2Font {
    pub woff_header: Woff2Header,
    pub table_directory: Vec<TableDirectoryEntry>,
    table_data_block: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Woff2Header {
    pub flavor: u32,
    pub length: u32,
    pub num_tables: u16,
    pub total_sfnt_size: u32,
    pub total_compressed_size: u32,
    pub major_version: u16,
    pub minor_version: u16,
    pub meta_offset: u32,
    pub meta_length: u32,
    pub meta_orig_length: u32,
    pub priv_offset: u32,
    pub priv_length: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDirectoryEntry {
    pub tag: u32,
    /// Offset of the table in the decompressed data block.
    pub offset: usize,
    pub transform_version: u8,
    pub orig_length: u32,
    pub transform_length: Option<u32>,
}

fn decompress(compressed: &[u8]) -> Result<Vec<u8>, ParseError> {
    let mut input =
        brotli_decompressor::Decompressor::new(Cursor::new(compressed), BROTLI_DECODER_BUFFER_SIZE);
    let mut output = Vec::new();
    input
        .read_to_end(&mut output)
        .map_err(|_err| ParseError::CompressionError)?;
    Ok(output)
}

impl Woff2Font {
    pub fn new(data: &[u8]) -> Result<Woff2Font, ParseError> {
        ReadScope::new(data).read::<Woff2Font>()
    }

    /// The "sfnt version" of the input font
    pub fn flavor(&self) -> u32 {
        self.woff_header.flavor
    }

    /// Decompress and return the extended metadata XML if present
    pub fn extended_metadata(&self, data: &[u8]) -> Result<Option<String>, ParseError> {
        let offset = usize::try_from(self.woff_header.meta_offset)?;
        let length = usize::try_from(self.woff_header.meta_length)?;
        if offset == 0 || length == 0 {
            return Ok(None);
        }

        let compressed_metadata = ReadScope::new(data).offset_length(offset, length)?;
        let metadata = decompress(compressed_metadata.data())?;
        String::from_utf8(metadata)
            .map(Some)
            .map_err(|_err| ParseError::BadValue)
    }

    fn read_table_directory(
        ctxt: &mut ReadCtxt<'_>,
        num_tables: usize,
    ) -> Result<Vec<TableDirectoryEntry>, ParseError> {
        let mut offset = 0;
        let mut table_directory = Vec::with_capacity(num_tables);
        for _i in 0..num_tables {
            let entry = ctxt.read_dep::<TableDirectoryEntry>(offset)?;
            offset = offset
                .checked_add(entry.length()?)
                .ok_or(ParseError::LimitExceeded)?;
            table_directory.push(entry);
        }

        Ok(table_directory)
    }

    pub fn find_table_entry(&self, tag: u32) -> Option<&TableDirectoryEntry> {
        self.table_directory.iter().find(|entry| entry.tag == tag)
    }
}

impl ReadBinary for Woff2Font {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let woff_header = ctxt.read::<Woff2Header>()?;
        if woff_header.flavor == TTCF_MAGIC {
            return Err(ParseError::UnsupportedContainerFormat(TTCF_MAGIC));
        }

        let table_directory =
            Self::read_table_directory(ctxt, usize::from(woff_header.num_tables))?;

        // The compressed data block directly follows the table directory
        let compressed_data =
            ctxt.read_slice(usize::try_from(woff_header.total_compressed_size)?)?;
        let table_data_block = decompress(compressed_data)?;

        Ok(Woff2Font {
            woff_header,
            table_directory,
            table_data_block,
        })
    }
}

impl FontTableProvider for Woff2Font {
    fn table_data(&self, tag: u32) -> Result<Option<Cow<'_, [u8]>>, ParseError> {
        self.find_table_entry(tag)
            .map(|entry| {
                entry
                    .read_table(ReadScope::new(&self.table_data_block))
                    .map(Cow::Borrowed)
            })
            .transpose()
    }

    fn has_table(&self, tag: u32) -> bool {
        self.find_table_entry(tag).is_some()
    }

    fn table_locations(&self) -> Vec<TableLocation> {
        self.table_directory
            .iter()
            .map(|entry| TableLocation {
                tag: entry.tag,
                offset: u32::try_from(entry.offset).unwrap_or(u32::MAX),
                length: entry.transform_length.unwrap_or(entry.orig_length),
                orig_length: entry.orig_length,
            })
            .collect()
    }

    fn sfnt_version(&self) -> u32 {
        self.flavor()
    }
}

impl ReadBinary for Woff2Header {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let signature = ctxt.read_u32be()?;
        ctxt.check_version(signature == MAGIC)?;
        let flavor = ctxt.read_u32be()?;
        let length = ctxt.read_u32be()?;
        let num_tables = ctxt.read_u16be()?;
        let reserved = ctxt.read_u16be()?;
        // A non-zero reserved field makes the file invalid
        ctxt.check(reserved == 0)?;
        let total_sfnt_size = ctxt.read_u32be()?;
        let total_compressed_size = ctxt.read_u32be()?;
        let major_version = ctxt.read_u16be()?;
        let minor_version = ctxt.read_u16be()?;
        let meta_offset = ctxt.read_u32be()?;
        let meta_length = ctxt.read_u32be()?;
        let meta_orig_length = ctxt.read_u32be()?;
        let priv_offset = ctxt.read_u32be()?;
        let priv_length = ctxt.read_u32be()?;

        Ok(Woff2Header {
            flavor,
            length,
            num_tables,
            total_sfnt_size,
            total_compressed_size,
            major_version,
            minor_version,
            meta_offset,
            meta_length,
            meta_orig_length,
            priv_offset,
            priv_length,
        })
    }
}

impl ReadBinaryDep for TableDirectoryEntry {
    type Args<'a> = usize;
    type HostType<'a> = Self;

    fn read_dep<'a>(ctxt: &mut ReadCtxt<'a>, offset: usize) -> Result<Self, ParseError> {
        let flags = TableFlags::from_bits_retain(ctxt.read_u8()?);
        let tag = match flags.tag_index() {
            ARBITRARY_TAG_INDEX => ctxt.read_u32be()?,
            index => KNOWN_TABLE_TAGS[usize::from(index)],
        };
        let transform_version = flags.transform_version();
        let orig_length = ctxt.read::<U32Base128>()?;

        // Version 3 is the null transform for glyf and loca, version 0 for every other table
        let transform_length = match (transform_version, tag) {
            (3, tag::GLYF) | (3, tag::LOCA) => None,
            (_, tag::GLYF) | (_, tag::LOCA) => Some(ctxt.read::<U32Base128>()?),
            (0, _) => None,
            _ => Some(ctxt.read::<U32Base128>()?),
        };

        Ok(TableDirectoryEntry {
            tag,
            offset,
            transform_version,
            orig_length,
            transform_length,
        })
    }
}

// Parse "UIntBase128" Data Type
// https://w3c.github.io/woff/woff2/#UIntBase128-0
impl ReadBinary for U32Base128 {
    type HostType<'a> = u32;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<u32, ParseError> {
        let mut accum = 0u32;

        for i in 0..5 {
            let byte = ctxt.read_u8()?;

            // No leading 0's
            if i == 0 && byte == 0x80 {
                return Err(ParseError::BadValue);
            }

            // If any of the top 7 bits are set then << 7 would overflow
            if accum & 0xFE000000 != 0 {
                return Err(ParseError::BadValue);
            }

            accum = (accum << 7) | u32::from(byte & 0x7F);

            if byte & 0x80 == 0 {
                return Ok(accum);
            }
        }

        // UIntBase128 sequence exceeds 5 bytes
        Err(ParseError::BadValue)
    }
}

impl TableDirectoryEntry {
    fn length(&self) -> Result<usize, ParseError> {
        Ok(usize::try_from(
            self.transform_length.unwrap_or(self.orig_length),
        )?)
    }

    pub fn is_transformed(&self) -> bool {
        self.transform_length.is_some()
    }

    /// Read the contents of a table entry stored with a null transform
    pub fn read_table<'a>(&self, scope: ReadScope<'a>) -> Result<&'a [u8], ParseError> {
        if self.is_transformed() {
            return Err(ParseError::NotImplemented);
        }
        let table_data = scope.offset_length(self.offset, self.length()?)?;
        Ok(table_data.data())
    }
}
