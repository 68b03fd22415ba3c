//! OpenType font table parsing.

pub mod cmap;
pub mod kern;
pub mod os2;

use crate::binary::read::{ReadBinary, ReadBinaryDep, ReadCtxt, ReadFrom, ReadScope};
use crate::binary::{I16Be, I32Be, I64Be, U16Be, U32Be};
use crate::error::ParseError;
use crate::size;
use crate::tag;

use encoding_rs::{DecoderResult, MACINTOSH, UTF_16BE};
use std::borrow::Cow;

/// Magic value identifying a CFF font (`OTTO`)
pub const CFF_MAGIC: u32 = tag::OTTO;

/// Magic number identifying TrueType 1.0
///
/// The version number 1.0 as a 16.16 fixed-point value, indicating TrueType glyph data.
pub const TTF_MAGIC: u32 = 0x00010000;

/// Magic value used by Apple TrueType fonts (`true`)
pub const APPLE_TTF_MAGIC: u32 = tag::TRUE;

/// Magic value identifying an SFNT-wrapped PostScript Type 1 font (`typ1`)
pub const TYPE1_MAGIC: u32 = tag::TYP1;

/// Magic value identifying a TrueType font collection `ttcf`
pub const TTCF_MAGIC: u32 = tag::TTCF;

/// Value of the `magicNumber` field of the `head` table.
const HEAD_MAGIC: u32 = 0x5F0F3CF5;

/// 32-bit signed fixed-point number (16.16)
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Fixed(i32);

/// Date represented in number of seconds since 12:00 midnight, January 1, 1904
///
/// The value is represented as a signed 64-bit integer.
type LongDateTime = i64;

/// Where a table lives inside its container.
///
/// `length` is the number of bytes the table occupies in the file, `orig_length` the number of
/// bytes after decompression. They are equal for uncompressed containers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TableLocation {
    pub tag: u32,
    pub offset: u32,
    pub length: u32,
    pub orig_length: u32,
}

/// Access to the tables of a font container.
pub trait FontTableProvider {
    /// Return data for the specified table if present
    fn table_data(&self, tag: u32) -> Result<Option<Cow<'_, [u8]>>, ParseError>;

    fn has_table(&self, tag: u32) -> bool;

    /// The location of every table in the container, in directory order.
    fn table_locations(&self) -> Vec<TableLocation>;

    /// The scaler type of the font, such as `0x00010000` or `OTTO`.
    fn sfnt_version(&self) -> u32;

    /// The checksum recorded for `tag` by the container, if it records one.
    fn expected_checksum(&self, _tag: u32) -> Option<u32> {
        None
    }

    fn read_table_data(&self, tag: u32) -> Result<Cow<'_, [u8]>, ParseError> {
        self.table_data(tag)?.ok_or(ParseError::MissingTable(tag))
    }
}

/// The size of the offsets in the `loca` table
///
/// <https://docs.microsoft.com/en-us/typography/opentype/spec/loca>
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexToLocFormat {
    /// Offsets are 16-bit. The actual local offset divided by 2 is stored.
    #[default]
    Short,
    /// Offsets are 32-bit. The actual local offset is stored.
    Long,
}

/// OpenType Offset Table
///
/// <https://docs.microsoft.com/en-us/typography/opentype/spec/otff#organization-of-an-opentype-font>
#[derive(Clone)]
pub struct OffsetTable<'a> {
    pub sfnt_version: u32,
    pub search_range: u16,
    pub entry_selector: u16,
    pub range_shift: u16,
    pub table_records: crate::binary::read::ReadArray<'a, TableRecord>,
}

/// Table provider for a plain SFNT (TrueType or OpenType) file.
pub struct SfntProvider<'a> {
    data: Cow<'a, [u8]>,
    sfnt_version: u32,
    table_records: Vec<TableRecord>,
}

/// An entry in the Offset Table
///
/// <https://docs.microsoft.com/en-us/typography/opentype/spec/otff#organization-of-an-opentype-font>
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Hash)]
pub struct TableRecord {
    pub table_tag: u32,
    pub checksum: u32,
    pub offset: u32,
    pub length: u32,
}

/// `head` table
///
/// <https://docs.microsoft.com/en-us/typography/opentype/spec/head>
#[derive(Debug, Clone, PartialEq, PartialOrd, Hash)]
pub struct HeadTable {
    pub major_version: u16,
    pub minor_version: u16,
    pub font_revision: Fixed,
    pub check_sum_adjustment: u32,
    pub magic_number: u32,
    pub flags: u16,
    pub units_per_em: u16,
    pub created: LongDateTime,
    pub modified: LongDateTime,
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
    pub mac_style: u16,
    pub lowest_rec_ppem: u16,
    pub font_direction_hint: i16,
    pub index_to_loc_format: IndexToLocFormat,
    pub glyph_data_format: i16,
}

/// `hhea` horizontal header table
///
/// > This table contains information for horizontal layout.
///
/// <https://docs.microsoft.com/en-us/typography/opentype/spec/hhea>
#[derive(Debug, Clone, PartialEq, PartialOrd, Hash)]
pub struct HheaTable {
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
    pub advance_width_max: u16,
    pub min_left_side_bearing: i16,
    pub min_right_side_bearing: i16,
    pub x_max_extent: i16,
    pub caret_slope_rise: i16,
    pub caret_slope_run: i16,
    pub caret_offset: i16,
    pub num_h_metrics: u16,
}

/// `hmtx` horizontal metrics table
///
/// <https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx>
#[derive(Debug, Clone, PartialEq)]
pub struct HmtxTable {
    pub h_metrics: Vec<LongHorMetric>,
    pub left_side_bearings: Vec<i16>,
    num_glyphs: usize,
}

/// A `longHorMetric` record in the `hmtx` table.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct LongHorMetric {
    pub advance_width: u16,
    pub lsb: i16,
}

/// maxp - Maximum profile
///
/// Fonts with CFF data use version 0.5 of this table, specifying only the numGlyphs field. Fonts
/// with TrueType outlines use version 1.0, where all data is required.
///
/// <https://docs.microsoft.com/en-us/typography/opentype/spec/maxp>
#[derive(Debug, Clone, PartialEq, PartialOrd, Hash)]
pub struct MaxpTable {
    pub num_glyphs: u16,
    /// Extra fields, present if maxp table is version 1.0, absent if version 0.5.
    pub version1_sub_table: Option<MaxpVersion1SubTable>,
}

#[derive(Debug, Clone, PartialEq, PartialOrd, Hash)]
pub struct MaxpVersion1SubTable {
    pub max_points: u16,
    pub max_contours: u16,
    pub max_composite_points: u16,
    pub max_composite_contours: u16,
    pub max_zones: u16,
    pub max_twilight_points: u16,
    pub max_storage: u16,
    pub max_function_defs: u16,
    pub max_instruction_defs: u16,
    pub max_stack_elements: u16,
    pub max_size_of_instructions: u16,
    pub max_component_elements: u16,
    pub max_component_depth: u16,
}

/// `name` table
///
/// <https://docs.microsoft.com/en-us/typography/opentype/spec/name>
#[derive(Debug, Clone)]
pub struct NameTable {
    pub format: u16,
    pub name_records: Vec<NameRecord>,
    pub langtag_records: Vec<LangTagRecord>,
    string_storage: Box<[u8]>,
}

/// Record within the `name` table
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NameRecord {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub language_id: u16,
    pub name_id: u16,
    pub length: u16,
    pub offset: u16,
}

/// Language-tag record within the `name` table
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LangTagRecord {
    pub length: u16,
    pub offset: u16,
}

enum NameEncoding {
    Utf16Be,
    AppleRoman,
}

impl<'a> SfntProvider<'a> {
    pub fn new(data: Cow<'a, [u8]>) -> Result<SfntProvider<'a>, ParseError> {
        let (sfnt_version, table_records) = {
            let offset_table = ReadScope::new(&data).read::<OffsetTable<'_>>()?;
            (
                offset_table.sfnt_version,
                offset_table.table_records.to_vec(),
            )
        };
        Ok(SfntProvider {
            data,
            sfnt_version,
            table_records,
        })
    }

    pub fn find_table_record(&self, tag: u32) -> Option<&TableRecord> {
        self.table_records
            .iter()
            .find(|table_record| table_record.table_tag == tag)
    }
}

impl ReadBinary for OffsetTable<'_> {
    type HostType<'a> = OffsetTable<'a>;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self::HostType<'a>, ParseError> {
        let sfnt_version = ctxt.read_u32be()?;
        match sfnt_version {
            TTF_MAGIC | CFF_MAGIC | APPLE_TTF_MAGIC | TYPE1_MAGIC => {
                let num_tables = ctxt.read_u16be()?;
                let search_range = ctxt.read_u16be()?;
                let entry_selector = ctxt.read_u16be()?;
                let range_shift = ctxt.read_u16be()?;
                let table_records = ctxt.read_array::<TableRecord>(usize::from(num_tables))?;
                Ok(OffsetTable {
                    sfnt_version,
                    search_range,
                    entry_selector,
                    range_shift,
                    table_records,
                })
            }
            _ => Err(ParseError::BadVersion),
        }
    }
}

impl FontTableProvider for SfntProvider<'_> {
    fn table_data(&self, tag: u32) -> Result<Option<Cow<'_, [u8]>>, ParseError> {
        self.find_table_record(tag)
            .map(|table_record| {
                table_record
                    .read_table(&ReadScope::new(&self.data))
                    .map(|scope| Cow::Borrowed(scope.data()))
            })
            .transpose()
    }

    fn has_table(&self, tag: u32) -> bool {
        self.find_table_record(tag).is_some()
    }

    fn table_locations(&self) -> Vec<TableLocation> {
        self.table_records
            .iter()
            .map(|record| TableLocation {
                tag: record.table_tag,
                offset: record.offset,
                length: record.length,
                orig_length: record.length,
            })
            .collect()
    }

    fn sfnt_version(&self) -> u32 {
        self.sfnt_version
    }

    fn expected_checksum(&self, tag: u32) -> Option<u32> {
        self.find_table_record(tag).map(|record| record.checksum)
    }
}

impl ReadFrom for TableRecord {
    type ReadType = ((U32Be, U32Be), (U32Be, U32Be));
    fn read_from(((table_tag, checksum), (offset, length)): ((u32, u32), (u32, u32))) -> Self {
        TableRecord {
            table_tag,
            checksum,
            offset,
            length,
        }
    }
}

impl TableRecord {
    pub const SIZE: usize = 4 * size::U32;

    pub fn read_table<'a>(&self, scope: &ReadScope<'a>) -> Result<ReadScope<'a>, ParseError> {
        let offset = usize::try_from(self.offset)?;
        let length = usize::try_from(self.length)?;
        scope.offset_length(offset, length)
    }
}

impl ReadBinary for HeadTable {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let major_version = ctxt.read::<U16Be>()?;
        let minor_version = ctxt.read::<U16Be>()?;
        let font_revision = ctxt.read::<Fixed>()?;
        let check_sum_adjustment = ctxt.read::<U32Be>()?;
        let magic_number = ctxt.read::<U32Be>()?;
        ctxt.check(magic_number == HEAD_MAGIC)?;
        let flags = ctxt.read::<U16Be>()?;
        let units_per_em = ctxt.read::<U16Be>()?;
        let created = ctxt.read::<I64Be>()?;
        let modified = ctxt.read::<I64Be>()?;
        let x_min = ctxt.read::<I16Be>()?;
        let y_min = ctxt.read::<I16Be>()?;
        let x_max = ctxt.read::<I16Be>()?;
        let y_max = ctxt.read::<I16Be>()?;
        let mac_style = ctxt.read::<U16Be>()?;
        let lowest_rec_ppem = ctxt.read::<U16Be>()?;
        let font_direction_hint = ctxt.read::<I16Be>()?;
        let index_to_loc_format = ctxt.read::<IndexToLocFormat>()?;
        let glyph_data_format = ctxt.read::<I16Be>()?;

        Ok(HeadTable {
            major_version,
            minor_version,
            font_revision,
            check_sum_adjustment,
            magic_number,
            flags,
            units_per_em,
            created,
            modified,
            x_min,
            y_min,
            x_max,
            y_max,
            mac_style,
            lowest_rec_ppem,
            font_direction_hint,
            index_to_loc_format,
            glyph_data_format,
        })
    }
}

impl Default for HeadTable {
    /// An empty version 1.0 `head` table with the required magic number.
    fn default() -> Self {
        HeadTable {
            major_version: 1,
            minor_version: 0,
            font_revision: Fixed::default(),
            check_sum_adjustment: 0,
            magic_number: HEAD_MAGIC,
            flags: 0,
            units_per_em: 0,
            created: 0,
            modified: 0,
            x_min: 0,
            y_min: 0,
            x_max: 0,
            y_max: 0,
            mac_style: 0,
            lowest_rec_ppem: 0,
            font_direction_hint: 0,
            index_to_loc_format: IndexToLocFormat::default(),
            glyph_data_format: 0,
        }
    }
}

impl HeadTable {
    // macStyle:
    // Bit 0: Bold (if set to 1);
    // Bit 1: Italic (if set to 1)
    // https://docs.microsoft.com/en-us/typography/opentype/spec/head
    pub fn is_bold(&self) -> bool {
        self.mac_style & 1 != 0
    }

    pub fn is_italic(&self) -> bool {
        self.mac_style & 2 != 0
    }
}

impl ReadBinary for HheaTable {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let major_version = ctxt.read_u16be()?;
        let _minor_version = ctxt.read_u16be()?;
        ctxt.check_version(major_version == 1)?;
        let ascender = ctxt.read_i16be()?;
        let descender = ctxt.read_i16be()?;
        let line_gap = ctxt.read_i16be()?;
        let advance_width_max = ctxt.read_u16be()?;
        let min_left_side_bearing = ctxt.read_i16be()?;
        let min_right_side_bearing = ctxt.read_i16be()?;
        let x_max_extent = ctxt.read_i16be()?;
        let caret_slope_rise = ctxt.read_i16be()?;
        let caret_slope_run = ctxt.read_i16be()?;
        let caret_offset = ctxt.read_i16be()?;
        let _reserved = ctxt.read_slice(4 * size::I16)?;
        let metric_data_format = ctxt.read_i16be()?;
        ctxt.check(metric_data_format == 0)?;
        let num_h_metrics = ctxt.read_u16be()?;

        Ok(HheaTable {
            ascender,
            descender,
            line_gap,
            advance_width_max,
            min_left_side_bearing,
            min_right_side_bearing,
            x_max_extent,
            caret_slope_rise,
            caret_slope_run,
            caret_offset,
            num_h_metrics,
        })
    }
}

impl ReadBinaryDep for HmtxTable {
    type Args<'a> = (usize, usize); // num_glyphs, num_h_metrics
    type HostType<'a> = Self;

    fn read_dep<'a>(
        ctxt: &mut ReadCtxt<'a>,
        (num_glyphs, num_h_metrics): (usize, usize),
    ) -> Result<Self, ParseError> {
        // At least one metric is needed to give the trailing glyphs an advance.
        ctxt.check(num_h_metrics > 0 || num_glyphs == 0)?;
        let h_metrics = ctxt.read_array::<LongHorMetric>(num_h_metrics)?.to_vec();
        let left_side_bearings = ctxt
            .read_array::<I16Be>(num_glyphs.saturating_sub(num_h_metrics))?
            .to_vec();
        Ok(HmtxTable {
            h_metrics,
            left_side_bearings,
            num_glyphs,
        })
    }
}

impl HmtxTable {
    /// The advance width of `glyph_id`, or `None` if it is outside the font.
    pub fn horizontal_advance(&self, glyph_id: u16) -> Option<u16> {
        let index = usize::from(glyph_id);
        if index >= self.num_glyphs && index >= self.h_metrics.len() {
            return None;
        }
        // As an optimization, the number of records can be less than the number of glyphs, in
        // which case the advance width value of the last record applies to all remaining glyph
        // IDs. -- https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx
        self.h_metrics
            .get(index)
            .or_else(|| self.h_metrics.last())
            .map(|metric| metric.advance_width)
    }

    /// The advance width of every glyph in the font, indexed by glyph id.
    pub fn advances(&self) -> Vec<u16> {
        let last = self.h_metrics.last().map_or(0, |metric| metric.advance_width);
        (0..self.num_glyphs)
            .map(|index| {
                self.h_metrics
                    .get(index)
                    .map_or(last, |metric| metric.advance_width)
            })
            .collect()
    }

    pub fn num_glyphs(&self) -> usize {
        self.num_glyphs
    }
}

impl ReadFrom for LongHorMetric {
    type ReadType = (U16Be, I16Be);
    fn read_from((advance_width, lsb): (u16, i16)) -> Self {
        LongHorMetric { advance_width, lsb }
    }
}

impl ReadBinary for MaxpTable {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let version = ctxt.read_u32be()?;
        let num_glyphs = ctxt.read_u16be()?;
        let sub_table = if version == 0x00010000 {
            Some(ctxt.read::<MaxpVersion1SubTable>()?)
        } else {
            None
        };
        Ok(MaxpTable {
            num_glyphs,
            version1_sub_table: sub_table,
        })
    }
}

impl ReadBinary for MaxpVersion1SubTable {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let max_points = ctxt.read_u16be()?;
        let max_contours = ctxt.read_u16be()?;
        let max_composite_points = ctxt.read_u16be()?;
        let max_composite_contours = ctxt.read_u16be()?;
        let max_zones = ctxt.read_u16be()?;
        let max_twilight_points = ctxt.read_u16be()?;
        let max_storage = ctxt.read_u16be()?;
        let max_function_defs = ctxt.read_u16be()?;
        let max_instruction_defs = ctxt.read_u16be()?;
        let max_stack_elements = ctxt.read_u16be()?;
        let max_size_of_instructions = ctxt.read_u16be()?;
        let max_component_elements = ctxt.read_u16be()?;
        let max_component_depth = ctxt.read_u16be()?;

        Ok(MaxpVersion1SubTable {
            max_points,
            max_contours,
            max_composite_points,
            max_composite_contours,
            max_zones,
            max_twilight_points,
            max_storage,
            max_function_defs,
            max_instruction_defs,
            max_stack_elements,
            max_size_of_instructions,
            max_component_elements,
            max_component_depth,
        })
    }
}

impl ReadBinary for NameTable {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let scope = ctxt.scope();

        let format = ctxt.read_u16be()?;
        ctxt.check_version(format <= 1)?;
        let count = usize::from(ctxt.read_u16be()?);
        let string_offset = usize::from(ctxt.read_u16be()?);
        let name_records = ctxt.read_array::<NameRecord>(count)?.to_vec();
        let langtag_records = if format > 0 {
            let langtag_count = usize::from(ctxt.read_u16be()?);
            ctxt.read_array::<LangTagRecord>(langtag_count)?.to_vec()
        } else {
            Vec::new()
        };
        let string_storage = Box::from(scope.offset(string_offset).data());

        Ok(NameTable {
            format,
            name_records,
            langtag_records,
            string_storage,
        })
    }
}

impl NameTable {
    /// The raw bytes of `record` in the string storage.
    pub fn record_data(&self, record: &NameRecord) -> Result<&[u8], ParseError> {
        ReadScope::new(&self.string_storage)
            .offset_length(usize::from(record.offset), usize::from(record.length))
            .map(|scope| scope.data())
    }

    /// Decode the best available string for `name_id`.
    ///
    /// Windows and Unicode platform records are preferred over Macintosh Roman ones. Records
    /// that cannot be decoded are skipped.
    pub fn string_for_id(&self, name_id: u16) -> Option<String> {
        let mut best = 0;
        let mut result = None;
        for record in self.name_records.iter().filter(|r| r.name_id == name_id) {
            let (score, encoding) =
                match score_encoding(record.platform_id, record.encoding_id, record.language_id) {
                    Some(scored) => scored,
                    None => continue,
                };
            if score <= best {
                continue;
            }
            let name = self
                .record_data(record)
                .ok()
                .and_then(|data| decode_name(encoding, data));
            if let Some(name) = name {
                result = Some(name);
                best = score;
            }
        }
        result
    }
}

fn score_encoding(
    platform_id: u16,
    encoding_id: u16,
    language_id: u16,
) -> Option<(usize, NameEncoding)> {
    match (platform_id, encoding_id, language_id) {
        // Windows; Unicode full repertoire
        (3, 10, _) => Some((1000, NameEncoding::Utf16Be)),
        // Unicode; Unicode full repertoire
        (0, 6, 0) => Some((900, NameEncoding::Utf16Be)),
        (0, 4, 0) => Some((800, NameEncoding::Utf16Be)),
        // Windows; Unicode BMP, US English first
        (3, 1, 0x409) => Some((750, NameEncoding::Utf16Be)),
        (3, 1, _) => Some((700, NameEncoding::Utf16Be)),
        (0, 3, 0) => Some((600, NameEncoding::Utf16Be)),
        (0, 2, 0) => Some((500, NameEncoding::Utf16Be)),
        (0, 1, 0) => Some((400, NameEncoding::Utf16Be)),
        (0, 0, 0) => Some((300, NameEncoding::Utf16Be)),
        // Windows, Symbol
        (3, 0, _) => Some((200, NameEncoding::Utf16Be)),
        // Apple Roman
        (1, 0, 0) => Some((150, NameEncoding::AppleRoman)),
        (1, 0, _) => Some((100, NameEncoding::AppleRoman)),
        _ => None,
    }
}

fn decode_name(encoding: NameEncoding, data: &[u8]) -> Option<String> {
    let mut decoder = match encoding {
        NameEncoding::Utf16Be => UTF_16BE.new_decoder_without_bom_handling(),
        NameEncoding::AppleRoman => MACINTOSH.new_decoder_without_bom_handling(),
    };
    let size = decoder.max_utf8_buffer_length_without_replacement(data.len())?;
    let mut s = String::with_capacity(size);
    let (res, _read) = decoder.decode_to_string_without_replacement(data, &mut s, true);
    match res {
        DecoderResult::InputEmpty => Some(s),
        DecoderResult::OutputFull | DecoderResult::Malformed(_, _) => None,
    }
}

impl ReadFrom for NameRecord {
    type ReadType = ((U16Be, U16Be, U16Be), (U16Be, U16Be, U16Be));
    fn read_from(
        ((platform_id, encoding_id, language_id), (name_id, length, offset)): (
            (u16, u16, u16),
            (u16, u16, u16),
        ),
    ) -> Self {
        NameRecord {
            platform_id,
            encoding_id,
            language_id,
            name_id,
            length,
            offset,
        }
    }
}

impl ReadFrom for LangTagRecord {
    type ReadType = (U16Be, U16Be);
    fn read_from((length, offset): (u16, u16)) -> Self {
        LangTagRecord { length, offset }
    }
}

impl ReadBinary for IndexToLocFormat {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let index_to_loc_format = ctxt.read_i16be()?;

        match index_to_loc_format {
            0 => Ok(IndexToLocFormat::Short),
            1 => Ok(IndexToLocFormat::Long),
            _ => Err(ParseError::BadValue),
        }
    }
}

impl Fixed {
    pub fn new(value: i32) -> Fixed {
        Fixed(value)
    }

    pub fn raw_value(self) -> i32 {
        self.0
    }
}

impl ReadFrom for Fixed {
    type ReadType = I32Be;

    fn read_from(value: i32) -> Self {
        Fixed(value)
    }
}

impl From<Fixed> for f32 {
    fn from(value: Fixed) -> f32 {
        (f64::from(value.0) / 65536.0) as f32
    }
}

impl<T: FontTableProvider + ?Sized> FontTableProvider for Box<T> {
    fn table_data(&self, tag: u32) -> Result<Option<Cow<'_, [u8]>>, ParseError> {
        self.as_ref().table_data(tag)
    }

    fn has_table(&self, tag: u32) -> bool {
        self.as_ref().has_table(tag)
    }

    fn table_locations(&self) -> Vec<TableLocation> {
        self.as_ref().table_locations()
    }

    fn sfnt_version(&self) -> u32 {
        self.as_ref().sfnt_version()
    }

    fn expected_checksum(&self, tag: u32) -> Option<u32> {
        self.as_ref().expected_checksum(tag)
    }
}
