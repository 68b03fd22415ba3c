//! `cmap` table parsing and character to glyph mapping.
//!
//! <https://docs.microsoft.com/en-us/typography/opentype/spec/cmap>

use std::convert::TryFrom;

use crate::binary::read::{ReadArray, ReadBinary, ReadCtxt, ReadFrom, ReadScope, ReadScopeOwned};
use crate::binary::{I16Be, U16Be, U32Be, U8};
use crate::error::ParseError;
use crate::size;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PlatformId(pub u16);

impl PlatformId {
    pub const UNICODE: PlatformId = PlatformId(0);
    pub const MACINTOSH: PlatformId = PlatformId(1);
    pub const WINDOWS: PlatformId = PlatformId(3);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EncodingId(pub u16);

impl EncodingId {
    pub const WINDOWS_SYMBOL: EncodingId = EncodingId(0);
    pub const WINDOWS_UNICODE_BMP_UCS2: EncodingId = EncodingId(1);
    pub const WINDOWS_UNICODE_UCS4: EncodingId = EncodingId(10);

    pub const UNICODE_FULL_REPERTOIRE: EncodingId = EncodingId(4);

    pub const MACINTOSH_APPLE_ROMAN: EncodingId = EncodingId(0);
}

/// A decoded `cmap` table.
///
/// The encoding records are decoded eagerly. Subtables are decoded from the retained table data
/// when they are looked up.
pub struct Cmap {
    scope: ReadScopeOwned,
    pub encoding_records: Vec<EncodingRecord>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EncodingRecord {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub offset: u32,
}

pub enum CmapSubtable<'a> {
    Format0 {
        language: u16,
        glyph_id_array: ReadArray<'a, U8>,
    },
    Format4 {
        language: u16,
        end_codes: ReadArray<'a, U16Be>,
        start_codes: ReadArray<'a, U16Be>,
        id_deltas: ReadArray<'a, I16Be>,
        id_range_offsets: ReadArray<'a, U16Be>,
        glyph_id_array: ReadArray<'a, U16Be>,
    },
    Format6 {
        language: u16,
        first_code: u16,
        glyph_id_array: ReadArray<'a, U16Be>,
    },
    Format10 {
        language: u32,
        start_char_code: u32,
        glyph_id_array: ReadArray<'a, U16Be>,
    },
    Format12 {
        language: u32,
        groups: ReadArray<'a, SequentialMapGroup>,
    },
}

pub struct SequentialMapGroup {
    start_char_code: u32,
    end_char_code: u32,
    start_glyph_id: u32,
}

/// Preferred subtables, most preferred first.
const SUBTABLE_PREFERENCE: [(PlatformId, Option<EncodingId>); 6] = [
    (PlatformId::WINDOWS, Some(EncodingId::WINDOWS_UNICODE_UCS4)),
    (
        PlatformId::WINDOWS,
        Some(EncodingId::WINDOWS_UNICODE_BMP_UCS2),
    ),
    (PlatformId::UNICODE, Some(EncodingId::UNICODE_FULL_REPERTOIRE)),
    (PlatformId::UNICODE, None),
    (PlatformId::WINDOWS, Some(EncodingId::WINDOWS_SYMBOL)),
    (PlatformId::MACINTOSH, Some(EncodingId::MACINTOSH_APPLE_ROMAN)),
];

impl ReadBinary for Cmap {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let scope = ctxt.scope();
        let version = ctxt.read_u16be()?;
        ctxt.check(version == 0)?;
        let num_tables = usize::from(ctxt.read_u16be()?);
        let encoding_records = ctxt.read_array::<EncodingRecord>(num_tables)?.to_vec();
        Ok(Cmap {
            scope: ReadScopeOwned::new(scope),
            encoding_records,
        })
    }
}

impl ReadFrom for EncodingRecord {
    type ReadType = (U16Be, U16Be, U32Be);
    fn read_from((platform_id, encoding_id, offset): (u16, u16, u32)) -> Self {
        EncodingRecord {
            platform_id,
            encoding_id,
            offset,
        }
    }
}

impl ReadBinary for CmapSubtable<'_> {
    type HostType<'a> = CmapSubtable<'a>;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<CmapSubtable<'a>, ParseError> {
        let subtable_format = ctxt.read_u16be()?;
        match subtable_format {
            0 => {
                let length = usize::from(ctxt.read_u16be()?);
                ctxt.check(length >= 3 * size::U16 + 256)?;
                let language = ctxt.read_u16be()?;
                let glyph_id_array = ctxt.read_array::<U8>(256)?;
                Ok(CmapSubtable::Format0 {
                    language,
                    glyph_id_array,
                })
            }
            4 => {
                let length = usize::from(ctxt.read_u16be()?);
                let language = ctxt.read_u16be()?;
                let seg_count_x2 = usize::from(ctxt.read_u16be()?);
                ctxt.check((seg_count_x2 & 1) == 0)?;
                let seg_count = seg_count_x2 >> 1;
                let _search_range = ctxt.read_u16be()?;
                let _entry_selector = ctxt.read_u16be()?;
                let _range_shift = ctxt.read_u16be()?;
                let end_codes = ctxt.read_array::<U16Be>(seg_count)?;
                let _reserved_pad = ctxt.read_u16be()?;
                let start_codes = ctxt.read_array::<U16Be>(seg_count)?;
                let id_deltas = ctxt.read_array::<I16Be>(seg_count)?;
                let id_range_offsets = ctxt.read_array::<U16Be>(seg_count)?;
                ctxt.check(length >= (8 + (4 * seg_count)) * size::U16)?;
                let remaining = length - ((8 + (4 * seg_count)) * size::U16);
                ctxt.check((remaining & 1) == 0)?;
                let num_indices = remaining >> 1;
                let glyph_id_array = ctxt.read_array::<U16Be>(num_indices)?;
                Ok(CmapSubtable::Format4 {
                    language,
                    end_codes,
                    start_codes,
                    id_deltas,
                    id_range_offsets,
                    glyph_id_array,
                })
            }
            6 => {
                let _length = ctxt.read_u16be()?;
                let language = ctxt.read_u16be()?;
                let first_code = ctxt.read_u16be()?;
                let entry_count = usize::from(ctxt.read_u16be()?);
                let glyph_id_array = ctxt.read_array::<U16Be>(entry_count)?;
                Ok(CmapSubtable::Format6 {
                    language,
                    first_code,
                    glyph_id_array,
                })
            }
            10 => {
                let reserved = ctxt.read_u16be()?;
                ctxt.check(reserved == 0)?;
                let _length = ctxt.read_u32be()?;
                let language = ctxt.read_u32be()?;
                let start_char_code = ctxt.read_u32be()?;
                let num_chars = usize::try_from(ctxt.read_u32be()?)?;
                let glyph_id_array = ctxt.read_array::<U16Be>(num_chars)?;
                Ok(CmapSubtable::Format10 {
                    language,
                    start_char_code,
                    glyph_id_array,
                })
            }
            12 => {
                let reserved = ctxt.read_u16be()?;
                ctxt.check(reserved == 0)?;
                let _length = ctxt.read_u32be()?;
                let language = ctxt.read_u32be()?;
                let num_groups = usize::try_from(ctxt.read_u32be()?)?;
                let groups = ctxt.read_array::<SequentialMapGroup>(num_groups)?;
                Ok(CmapSubtable::Format12 { language, groups })
            }
            _ => Err(ParseError::BadVersion),
        }
    }
}

impl ReadFrom for SequentialMapGroup {
    type ReadType = (U32Be, U32Be, U32Be);
    fn read_from((start_char_code, end_char_code, start_glyph_id): (u32, u32, u32)) -> Self {
        SequentialMapGroup {
            start_char_code,
            end_char_code,
            start_glyph_id,
        }
    }
}

impl Cmap {
    /// Find the first encoding record for the given `platform_id` and `encoding_id`
    pub fn find_subtable(
        &self,
        platform_id: PlatformId,
        encoding_id: EncodingId,
    ) -> Option<EncodingRecord> {
        self.encoding_records.iter().copied().find(|record| {
            record.platform_id == platform_id.0 && record.encoding_id == encoding_id.0
        })
    }

    /// Find the first encoding record for the given `platform_id`
    pub fn find_subtable_for_platform(&self, platform_id: PlatformId) -> Option<EncodingRecord> {
        self.encoding_records
            .iter()
            .copied()
            .find(|record| record.platform_id == platform_id.0)
    }

    /// Pick the most suitable encoding record for mapping Unicode characters.
    pub fn find_best_encoding(&self) -> Option<EncodingRecord> {
        SUBTABLE_PREFERENCE
            .iter()
            .find_map(|&(platform_id, encoding_id)| match encoding_id {
                Some(encoding_id) => self.find_subtable(platform_id, encoding_id),
                None => self.find_subtable_for_platform(platform_id),
            })
    }

    pub fn subtable(&self, record: &EncodingRecord) -> Result<CmapSubtable<'_>, ParseError> {
        let offset = usize::try_from(record.offset)?;
        self.scope.scope().offset(offset).read::<CmapSubtable<'_>>()
    }

    /// Map `ch` to a glyph id through the best available subtable.
    ///
    /// Returns `Ok(None)` if the table has no usable subtable or the character is not mapped.
    pub fn map_glyph(&self, ch: char) -> Result<Option<u16>, ParseError> {
        match self.find_best_encoding() {
            Some(record) => self.subtable(&record)?.map_glyph(u32::from(ch)),
            None => Ok(None),
        }
    }
}

impl CmapSubtable<'_> {
    pub fn map_glyph(&self, ch: u32) -> Result<Option<u16>, ParseError> {
        match *self {
            CmapSubtable::Format0 {
                ref glyph_id_array, ..
            } => {
                let index = usize::try_from(ch)?;
                Ok(glyph_id_array.get_item(index).map(u16::from))
            }
            CmapSubtable::Format4 {
                ref end_codes,
                ref start_codes,
                ref id_deltas,
                ref id_range_offsets,
                ref glyph_id_array,
                ..
            } => {
                let segments = end_codes
                    .iter()
                    .zip(start_codes.iter())
                    .zip(id_deltas.iter().zip(id_range_offsets.iter()));
                for (i, ((end_code, start_code), (id_delta, id_range_offset))) in
                    segments.enumerate()
                {
                    let (start_code, end_code) = (u32::from(start_code), u32::from(end_code));
                    if !(start_code <= ch && ch <= end_code) {
                        continue;
                    }
                    let id_delta = i32::from(id_delta);
                    let id_range_offset = usize::from(id_range_offset);
                    if id_range_offset == 0 {
                        let glyph_id = ((ch as i32) + id_delta) as u32 & 0xFFFF;
                        return Ok(Some(glyph_id as u16));
                    }
                    // The offset is relative to the location of this segment's idRangeOffset
                    let glyph_id_offset =
                        id_range_offset + i * 2 + usize::try_from(ch - start_code)? * 2;
                    if glyph_id_offset < id_range_offsets.len() * 2 || (glyph_id_offset & 1) != 0
                    {
                        return Err(ParseError::BadIndex);
                    }
                    let index = (glyph_id_offset >> 1) - id_range_offsets.len();
                    let glyph_id = glyph_id_array
                        .get_item(index)
                        .ok_or(ParseError::BadIndex)?;
                    if glyph_id == 0 {
                        return Ok(Some(0));
                    }
                    let glyph_id = (i32::from(glyph_id) + id_delta) as u32 & 0xFFFF;
                    return Ok(Some(glyph_id as u16));
                }
                Ok(None)
            }
            CmapSubtable::Format6 {
                first_code,
                ref glyph_id_array,
                ..
            } => {
                let first_code = u32::from(first_code);
                if first_code <= ch {
                    let index = usize::try_from(ch - first_code)?;
                    Ok(glyph_id_array.get_item(index))
                } else {
                    Ok(None)
                }
            }
            CmapSubtable::Format10 {
                start_char_code,
                ref glyph_id_array,
                ..
            } => {
                if ch >= start_char_code {
                    let index = usize::try_from(ch - start_char_code)?;
                    Ok(glyph_id_array.get_item(index))
                } else {
                    Ok(None)
                }
            }
            CmapSubtable::Format12 { ref groups, .. } => {
                for group in groups {
                    if group.start_char_code <= ch && ch <= group.end_char_code {
                        let glyph_id = group.start_glyph_id + (ch - group.start_char_code);
                        return Ok(Some(u16::try_from(glyph_id)?));
                    }
                }
                Ok(None)
            }
        }
    }

    pub fn language(&self) -> u32 {
        match *self {
            CmapSubtable::Format0 { language, .. }
            | CmapSubtable::Format4 { language, .. }
            | CmapSubtable::Format6 { language, .. } => u32::from(language),
            CmapSubtable::Format10 { language, .. } | CmapSubtable::Format12 { language, .. } => {
                language
            }
        }
    }
}
