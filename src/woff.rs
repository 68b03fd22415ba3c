//! Reading of the WOFF font format.
//!
//! <https://www.w3.org/TR/WOFF/>

use flate2::bufread::ZlibDecoder;

use crate::binary::read::{ReadBinary, ReadCtxt, ReadFrom, ReadScope};
use crate::binary::U32Be;
use crate::error::ParseError;
use crate::tables::{FontTableProvider, TableLocation};

use std::borrow::Cow;
use std::io::Read;

/// The magic number identifying a WOFF file: 'wOFF'
pub const MAGIC: u32 = 0x774F4646;

/// A WOFF font, holding the header and table directory. Tables are decompressed on request.
pub struct WoffFont<'a> {
    data: Cow<'a, [u8]>,
    pub woff_header: WoffHeader,
    pub table_directory: Vec<TableDirectoryEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WoffHeader {
    pub flavor: u32,
    pub length: u32,
    pub num_tables: u16,
    pub total_sfnt_size: u32,
    pub major_version: u16,
    pub minor_version: u16,
    pub meta_offset: u32,
    pub meta_length: u32,
    pub meta_orig_length: u32,
    pub priv_offset: u32,
    pub priv_length: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TableDirectoryEntry {
    pub tag: u32,
    pub offset: u32,
    pub comp_length: u32,
    pub orig_length: u32,
    pub orig_checksum: u32,
}

impl<'a> WoffFont<'a> {
    pub fn new(data: Cow<'a, [u8]>) -> Result<WoffFont<'a>, ParseError> {
        let (woff_header, table_directory) = {
            let mut ctxt = ReadScope::new(&data).ctxt();
            let woff_header = ctxt.read::<WoffHeader>()?;
            let table_directory = ctxt
                .read_array::<TableDirectoryEntry>(usize::from(woff_header.num_tables))?
                .to_vec();
            (woff_header, table_directory)
        };
        Ok(WoffFont {
            data,
            woff_header,
            table_directory,
        })
    }

    /// The "sfnt version" of the input font
    pub fn flavor(&self) -> u32 {
        self.woff_header.flavor
    }

    /// Decompress and return the extended metadata XML if present
    pub fn extended_metadata(&self) -> Result<Option<String>, ParseError> {
        let offset = usize::try_from(self.woff_header.meta_offset)?;
        let length = usize::try_from(self.woff_header.meta_length)?;
        if offset == 0 || length == 0 {
            return Ok(None);
        }

        let compressed_metadata = ReadScope::new(&self.data).offset_length(offset, length)?;
        let mut z = ZlibDecoder::new(compressed_metadata.data());
        let mut metadata = String::new();
        z.read_to_string(&mut metadata)
            .map_err(|_err| ParseError::CompressionError)?;

        Ok(Some(metadata))
    }

    /// Find the table directory entry for the given `tag`
    pub fn find_table_directory_entry(&self, tag: u32) -> Option<&TableDirectoryEntry> {
        self.table_directory
            .iter()
            .find(|table_entry| table_entry.tag == tag)
    }
}

impl FontTableProvider for WoffFont<'_> {
    fn table_data(&self, tag: u32) -> Result<Option<Cow<'_, [u8]>>, ParseError> {
        self.find_table_directory_entry(tag)
            .map(|table_entry| table_entry.read_table(ReadScope::new(&self.data)))
            .transpose()
    }

    fn has_table(&self, tag: u32) -> bool {
        self.find_table_directory_entry(tag).is_some()
    }

    fn table_locations(&self) -> Vec<TableLocation> {
        self.table_directory
            .iter()
            .map(|entry| TableLocation {
                tag: entry.tag,
                offset: entry.offset,
                length: entry.comp_length,
                orig_length: entry.orig_length,
            })
            .collect()
    }

    fn sfnt_version(&self) -> u32 {
        self.flavor()
    }

    fn expected_checksum(&self, tag: u32) -> Option<u32> {
        self.find_table_directory_entry(tag)
            .map(|entry| entry.orig_checksum)
    }
}

impl ReadBinary for WoffHeader {
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
        let major_version = ctxt.read_u16be()?;
        let minor_version = ctxt.read_u16be()?;
        let meta_offset = ctxt.read_u32be()?;
        let meta_length = ctxt.read_u32be()?;
        let meta_orig_length = ctxt.read_u32be()?;
        let priv_offset = ctxt.read_u32be()?;
        let priv_length = ctxt.read_u32be()?;

        Ok(WoffHeader {
            flavor,
            length,
            num_tables,
            total_sfnt_size,
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

impl ReadFrom for TableDirectoryEntry {
    type ReadType = ((U32Be, U32Be, U32Be), (U32Be, U32Be));
    fn read_from(
        ((tag, offset, comp_length), (orig_length, orig_checksum)): ((u32, u32, u32), (u32, u32)),
    ) -> Self {
        TableDirectoryEntry {
            tag,
            offset,
            comp_length,
            orig_length,
            orig_checksum,
        }
    }
}

impl TableDirectoryEntry {
    fn is_compressed(&self) -> bool {
        self.comp_length < self.orig_length
    }

    /// Read and uncompress the contents of a table entry
    pub fn read_table<'a>(&self, scope: ReadScope<'a>) -> Result<Cow<'a, [u8]>, ParseError> {
        if self.comp_length > self.orig_length {
            return Err(ParseError::BadValue);
        }
        let offset = usize::try_from(self.offset)?;
        let length = usize::try_from(self.comp_length)?;
        let orig_length = usize::try_from(self.orig_length)?;
        let table_data = scope.offset_length(offset, length)?;

        if self.is_compressed() {
            let mut z = ZlibDecoder::new(table_data.data());
            let mut uncompressed = Vec::with_capacity(orig_length);
            z.read_to_end(&mut uncompressed)
                .map_err(|_err| ParseError::CompressionError)?;
            if uncompressed.len() != orig_length {
                return Err(ParseError::CompressionError);
            }

            Ok(Cow::Owned(uncompressed))
        } else {
            Ok(Cow::Borrowed(table_data.data()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag;
    use crate::tests::writer::{self, TtfType::*};
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    const HEADER_SIZE: usize = 44;
    const ENTRY_SIZE: usize = 20;

    fn zlib(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    /// Build a WOFF file. Each table is stored compressed when that makes it smaller.
    fn woff(tables: &[(u32, &[u8])]) -> Vec<u8> {
        let mut directory = Vec::new();
        let mut table_data = Vec::new();
        let data_start = HEADER_SIZE + ENTRY_SIZE * tables.len();
        for &(table_tag, data) in tables {
            let compressed = zlib(data);
            let stored = if compressed.len() < data.len() {
                compressed
            } else {
                data.to_vec()
            };
            directory.extend(writer::convert(&[
                Tag(table_tag),
                UInt32((data_start + table_data.len()) as u32),
                UInt32(stored.len() as u32),
                UInt32(data.len() as u32),
                UInt32(0x1234),
            ]));
            table_data.extend(stored);
            table_data.resize((table_data.len() + 3) & !3, 0);
        }

        let mut file = writer::convert(&[
            Tag(MAGIC),
            UInt32(0x00010000),
            UInt32((data_start + table_data.len()) as u32),
            UInt16(tables.len() as u16),
            UInt16(0),
            UInt32(0),
            UInt16(1),
            UInt16(0),
            UInt32(0),
            UInt32(0),
            UInt32(0),
            UInt32(0),
            UInt32(0),
        ]);
        file.extend(directory);
        file.extend(table_data);
        file
    }

    #[test]
    fn test_read_tables() {
        let glyf = [7u8; 200];
        let maxp = [0, 0, 0x50, 0, 0, 3];
        let data = woff(&[(tag::GLYF, &glyf[..]), (tag::MAXP, &maxp[..])]);
        let woff = WoffFont::new(Cow::Borrowed(data.as_slice())).unwrap();

        assert_eq!(woff.sfnt_version(), 0x00010000);
        let glyf_entry = woff.find_table_directory_entry(tag::GLYF).unwrap();
        assert!(glyf_entry.comp_length < glyf_entry.orig_length);
        assert_eq!(
            woff.table_data(tag::GLYF).unwrap().as_deref(),
            Some(&glyf[..])
        );
        assert_eq!(
            woff.table_data(tag::MAXP).unwrap().as_deref(),
            Some(&maxp[..])
        );
        assert!(woff.table_data(tag::HEAD).unwrap().is_none());
        assert_eq!(woff.expected_checksum(tag::MAXP), Some(0x1234));
        assert_eq!(woff.table_locations().len(), 2);
    }

    #[test]
    fn test_wrong_decompressed_length() {
        let glyf = [7u8; 200];
        let mut data = woff(&[(tag::GLYF, &glyf[..])]);
        // origLength of the first entry
        data[HEADER_SIZE + 12..HEADER_SIZE + 16].copy_from_slice(&300u32.to_be_bytes());
        let woff = WoffFont::new(Cow::Borrowed(data.as_slice())).unwrap();
        assert_eq!(
            woff.table_data(tag::GLYF).map(|_| ()),
            Err(ParseError::CompressionError)
        );
    }

    #[test]
    fn test_compressed_larger_than_original() {
        let maxp = [0, 0, 0x50, 0, 0, 3];
        let mut data = woff(&[(tag::MAXP, &maxp[..])]);
        data[HEADER_SIZE + 12..HEADER_SIZE + 16].copy_from_slice(&4u32.to_be_bytes());
        let woff = WoffFont::new(Cow::Borrowed(data.as_slice())).unwrap();
        assert_eq!(
            woff.table_data(tag::MAXP).map(|_| ()),
            Err(ParseError::BadValue)
        );
    }

    #[test]
    fn test_reserved_must_be_zero() {
        let mut data = woff(&[]);
        data[14] = 1;
        assert!(WoffFont::new(Cow::Borrowed(data.as_slice())).is_err());
    }
}
