//! The font table directory.
//!
//! A [Font] maps table tags to [TableSection]s. Each section remembers where its table lives in
//! the container and caches the decoded table after the first successful access. Cross-table
//! dependencies (`post` and `hmtx` need values from `maxp` and `hhea`) are resolved through the
//! same cache.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::io::{Read, Seek, SeekFrom};
use std::rc::Rc;

use log::debug;

use crate::binary::read::ReadScope;
use crate::checksum;
use crate::error::ParseError;
use crate::fontfile::FontFile;
use crate::gpos::KernSet;
use crate::layout::{LayoutTable, LayoutTableType, GPOS, GSUB};
use crate::post::PostTable;
use crate::tables::cmap::Cmap;
use crate::tables::kern::KernTable;
use crate::tables::os2::Os2;
use crate::tables::{
    FontTableProvider, HeadTable, HheaTable, HmtxTable, MaxpTable, NameTable, TTF_MAGIC,
};
use crate::tag::{self, DisplayTag};

/// A decoded table.
///
/// Cloning is cheap; clones share the decoded table.
#[derive(Clone)]
pub enum Table {
    Head(Rc<HeadTable>),
    Name(Rc<NameTable>),
    Hhea(Rc<HheaTable>),
    Os2(Rc<Os2>),
    Maxp(Rc<MaxpTable>),
    Cmap(Rc<Cmap>),
    Post(Rc<PostTable>),
    Hmtx(Rc<HmtxTable>),
    Gpos(Rc<LayoutTable<GPOS>>),
    Gsub(Rc<LayoutTable<GSUB>>),
    /// The pairs of a legacy `kern` table.
    Kern(Rc<KernSet>),
    /// A table without a dedicated decoder, kept as raw bytes.
    Raw(Rc<[u8]>),
}

/// A directory entry: where a table is stored and, once decoded, the table itself.
pub struct TableSection {
    pub offset: u32,
    pub length: u32,
    pub orig_length: u32,
    table: Option<Table>,
}

impl TableSection {
    fn materialized(table: Table) -> Self {
        TableSection {
            offset: 0,
            length: 0,
            orig_length: 0,
            table: Some(table),
        }
    }

    /// True once the table has been decoded or was added directly.
    pub fn is_loaded(&self) -> bool {
        self.table.is_some()
    }
}

/// A font: the scaler type and a lazily decoded table directory.
pub struct Font<'a> {
    sfnt_version: u32,
    provider: Option<Box<dyn FontTableProvider + 'a>>,
    tables: BTreeMap<u32, TableSection>,
}

/// Layout tables that can be extracted from a [Table].
pub trait FontLayoutTable: LayoutTableType {
    fn from_table(table: Table) -> Option<Rc<LayoutTable<Self>>>;
}

impl FontLayoutTable for GPOS {
    fn from_table(table: Table) -> Option<Rc<LayoutTable<GPOS>>> {
        match table {
            Table::Gpos(gpos) => Some(gpos),
            _ => None,
        }
    }
}

impl FontLayoutTable for GSUB {
    fn from_table(table: Table) -> Option<Rc<LayoutTable<GSUB>>> {
        match table {
            Table::Gsub(gsub) => Some(gsub),
            _ => None,
        }
    }
}

macro_rules! table_accessor {
    ($(#[$attr:meta])* $name:ident, $tag:expr, $variant:ident, $ty:ty) => {
        $(#[$attr])*
        pub fn $name(&mut self) -> Result<Rc<$ty>, ParseError> {
            match self.table($tag)? {
                Table::$variant(table) => Ok(table),
                _ => Err(ParseError::TableKindMismatch($tag)),
            }
        }
    };
}

impl<'a> Font<'a> {
    /// An empty font holding only a default `head` table.
    pub fn new(sfnt_version: u32) -> Font<'static> {
        let mut font = Font {
            sfnt_version,
            provider: None,
            tables: BTreeMap::new(),
        };
        font.add_table(tag::HEAD, Table::Head(Rc::new(HeadTable::default())));
        font
    }

    /// Read the table directory of an SFNT, WOFF, or WOFF2 font. Tables are decoded on access.
    pub fn parse(data: &'a [u8]) -> Result<Font<'a>, ParseError> {
        Font::from_provider(FontFile::new(Cow::Borrowed(data))?.table_provider())
    }

    pub fn parse_owned(data: Vec<u8>) -> Result<Font<'static>, ParseError> {
        Font::from_provider(FontFile::new(Cow::Owned(data))?.table_provider())
    }

    /// Read a whole font from `reader`, starting at its beginning.
    pub fn from_reader<R: Read + Seek>(mut reader: R) -> Result<Font<'static>, ParseError> {
        reader.seek(SeekFrom::Start(0))?;
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Font::parse_owned(data)
    }

    /// Parse `data`, verify every recorded table checksum, and decode every table.
    pub fn parse_strict(data: &'a [u8]) -> Result<Font<'a>, ParseError> {
        let mut font = Font::parse(data)?;
        font.verify_checksums()?;
        for tag in font.tags() {
            match font.table(tag) {
                Ok(_) => {}
                // A legacy kern table with only unsupported subtables is still well formed
                Err(ParseError::MissingKerningInformation) if tag == tag::KERN => {}
                Err(err) => return Err(err),
            }
        }
        Ok(font)
    }

    /// Build the directory from the table locations of `provider`. The font must have a `head`
    /// table.
    pub fn from_provider(
        provider: Box<dyn FontTableProvider + 'a>,
    ) -> Result<Font<'a>, ParseError> {
        let tables = provider
            .table_locations()
            .into_iter()
            .map(|location| {
                let section = TableSection {
                    offset: location.offset,
                    length: location.length,
                    orig_length: location.orig_length,
                    table: None,
                };
                (location.tag, section)
            })
            .collect::<BTreeMap<_, _>>();
        if !tables.contains_key(&tag::HEAD) {
            return Err(ParseError::MissingHead);
        }

        Ok(Font {
            sfnt_version: provider.sfnt_version(),
            provider: Some(provider),
            tables,
        })
    }

    /// The scaler type, such as `0x00010000` or `OTTO`.
    pub fn sfnt_version(&self) -> u32 {
        self.sfnt_version
    }

    /// The tags of all tables in ascending order.
    pub fn tags(&self) -> Vec<u32> {
        self.tables.keys().copied().collect()
    }

    pub fn has_table(&self, tag: u32) -> bool {
        self.tables.contains_key(&tag)
    }

    pub fn section(&self, tag: u32) -> Option<&TableSection> {
        self.tables.get(&tag)
    }

    /// Insert `table` under `tag`, replacing any existing table.
    pub fn add_table(&mut self, tag: u32, table: Table) {
        self.tables.insert(tag, TableSection::materialized(table));
    }

    pub fn remove_table(&mut self, tag: u32) {
        self.tables.remove(&tag);
    }

    /// Return the table for `tag`, decoding it on first access.
    ///
    /// A table that fails to decode is not cached, so a later call decodes it again.
    pub fn table(&mut self, tag: u32) -> Result<Table, ParseError> {
        let section = self
            .tables
            .get(&tag)
            .ok_or(ParseError::MissingTable(tag))?;
        if let Some(table) = &section.table {
            return Ok(table.clone());
        }

        let table = self.decode_table(tag)?;
        if let Some(section) = self.tables.get_mut(&tag) {
            section.table = Some(table.clone());
        }
        Ok(table)
    }

    table_accessor!(head_table, tag::HEAD, Head, HeadTable);
    table_accessor!(name_table, tag::NAME, Name, NameTable);
    table_accessor!(hhea_table, tag::HHEA, Hhea, HheaTable);
    table_accessor!(os2_table, tag::OS_2, Os2, Os2);
    table_accessor!(maxp_table, tag::MAXP, Maxp, MaxpTable);
    table_accessor!(cmap_table, tag::CMAP, Cmap, Cmap);
    table_accessor!(
        /// The `post` table. Requires `maxp`.
        post_table,
        tag::POST,
        Post,
        PostTable
    );
    table_accessor!(
        /// The `hmtx` table. Requires `maxp` and `hhea`.
        hmtx_table,
        tag::HMTX,
        Hmtx,
        HmtxTable
    );
    table_accessor!(
        /// The pairs of the legacy `kern` table.
        kern_table,
        tag::KERN,
        Kern,
        KernSet
    );

    pub fn layout_table<T: FontLayoutTable>(&mut self) -> Result<Rc<LayoutTable<T>>, ParseError> {
        let table = self.table(T::TAG)?;
        T::from_table(table).ok_or(ParseError::TableKindMismatch(T::TAG))
    }

    pub fn gpos_table(&mut self) -> Result<Rc<LayoutTable<GPOS>>, ParseError> {
        self.layout_table::<GPOS>()
    }

    pub fn gsub_table(&mut self) -> Result<Rc<LayoutTable<GSUB>>, ParseError> {
        self.layout_table::<GSUB>()
    }

    /// Pair kerning from either the `GPOS` or the legacy `kern` table.
    ///
    /// With `kern_first` the `kern` table is tried first and any failure falls back to `GPOS`.
    /// Otherwise `GPOS` is tried first and falls back to `kern` only when it has no table or no
    /// pair kerning. A malformed `GPOS` table is reported without falling back. When both
    /// sources fail the error of the second attempt is returned.
    pub fn kerning(&mut self, kern_first: bool) -> Result<Rc<KernSet>, ParseError> {
        if kern_first {
            match self.kern_table() {
                Ok(kerns) => Ok(kerns),
                Err(err) => {
                    debug!("no kerning from kern table ({}), trying GPOS", err);
                    self.gpos_kerning()
                }
            }
        } else {
            match self.gpos_kerning() {
                Err(err @ (ParseError::MissingTable(_) | ParseError::MissingKerningInformation)) => {
                    debug!("no kerning from GPOS table ({}), trying kern", err);
                    self.kern_table()
                }
                result => result,
            }
        }
    }

    fn gpos_kerning(&mut self) -> Result<Rc<KernSet>, ParseError> {
        let gpos = self.gpos_table()?;
        gpos.kern_set().map(Rc::new)
    }

    fn verify_checksums(&self) -> Result<(), ParseError> {
        let provider = match &self.provider {
            Some(provider) => provider,
            None => return Ok(()),
        };
        for &tag in self.tables.keys() {
            let expected = match provider.expected_checksum(tag) {
                Some(expected) => expected,
                None => continue,
            };
            let data = provider.read_table_data(tag)?;
            let actual = if tag == tag::HEAD {
                checksum::head_checksum(&data)?
            } else {
                checksum::table_checksum(&data)?
            };
            if actual.0 != expected {
                return Err(ParseError::InvalidChecksum(tag));
            }
        }
        Ok(())
    }

    fn table_data(&self, tag: u32) -> Result<Cow<'_, [u8]>, ParseError> {
        match &self.provider {
            Some(provider) => provider.read_table_data(tag),
            None => Err(ParseError::MissingTable(tag)),
        }
    }

    fn decode_table(&mut self, tag: u32) -> Result<Table, ParseError> {
        // Dependencies are resolved before the table's own data is touched
        match tag {
            tag::POST => {
                let num_glyphs = self.maxp_table()?.num_glyphs;
                let data = self.table_data(tag)?;
                let post = ReadScope::new(&data).read_dep::<PostTable>(num_glyphs)?;
                return Ok(Table::Post(Rc::new(post)));
            }
            tag::HMTX => {
                let num_glyphs = usize::from(self.maxp_table()?.num_glyphs);
                let num_h_metrics = usize::from(self.hhea_table()?.num_h_metrics);
                let data = self.table_data(tag)?;
                let hmtx =
                    ReadScope::new(&data).read_dep::<HmtxTable>((num_glyphs, num_h_metrics))?;
                return Ok(Table::Hmtx(Rc::new(hmtx)));
            }
            _ => {}
        }

        let data = self.table_data(tag)?;
        let scope = ReadScope::new(&data);
        let table = match tag {
            tag::HEAD => Table::Head(Rc::new(scope.read::<HeadTable>()?)),
            tag::NAME => Table::Name(Rc::new(scope.read::<NameTable>()?)),
            tag::HHEA => Table::Hhea(Rc::new(scope.read::<HheaTable>()?)),
            tag::OS_2 => Table::Os2(Rc::new(scope.read_dep::<Os2>(data.len())?)),
            tag::MAXP => Table::Maxp(Rc::new(scope.read::<MaxpTable>()?)),
            tag::CMAP => Table::Cmap(Rc::new(scope.read::<Cmap>()?)),
            tag::GPOS => Table::Gpos(Rc::new(scope.read::<LayoutTable<GPOS>>()?)),
            tag::GSUB => Table::Gsub(Rc::new(scope.read::<LayoutTable<GSUB>>()?)),
            tag::KERN => Table::Kern(Rc::new(scope.read::<KernTable<'_>>()?.kern_set()?)),
            _ => Table::Raw(Rc::from(&data[..])),
        };
        Ok(table)
    }
}

impl fmt::Display for Font<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parsed font with scalerType=0x{:08x}", self.sfnt_version)?;
        if self.sfnt_version != TTF_MAGIC {
            write!(f, " ({})", DisplayTag(self.sfnt_version))?;
        }
        for &tag in self.tables.keys() {
            write!(f, "\n{}", DisplayTag(tag))?;
        }
        Ok(())
    }
}
