#![deny(missing_docs)]

//! `kern` table parsing.
//!
//! <https://learn.microsoft.com/en-us/typography/opentype/spec/kern>

use bitflags::bitflags;
use log::{debug, warn};

use crate::{
    binary::{
        read::{ReadArray, ReadBinary, ReadCtxt, ReadFrom, ReadScope},
        I16Be, U16Be,
    },
    error::ParseError,
    gpos::{KernSet, SimpleKerns},
};

/// `kern` Kerning Table.
pub struct KernTable<'a> {
    /// Number of subtables in the kerning table.
    table_count: u16,
    data: &'a [u8],
}

bitflags! {
    /// The `coverage` bits of a `kern` subtable header.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct KernCoverage: u8 {
        /// The subtable has horizontal data. Vertical otherwise.
        const HORIZONTAL = 1;
        /// The subtable has minimum values. Kerning values otherwise.
        const MINIMUM = 1 << 1;
        /// Kerning is perpendicular to the flow of the text.
        const CROSS_STREAM = 1 << 2;
        /// The values in this subtable replace the value currently being accumulated.
        const OVERRIDE = 1 << 3;
    }
}

/// Kerning value for glyph pair.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct KernPair {
    /// The glyph index for the left-hand glyph in the kerning pair.
    pub left: u16,
    /// The glyph index for the right-hand glyph in the kerning pair.
    pub right: u16,
    /// The kerning value for the above pair, in font design units. If this value is greater than
    /// zero, the characters will be moved apart. If this value is less than zero, the character
    /// will be moved closer together.
    pub value: i16,
}

/// Sub-table within `kern` table.
pub struct KernSubtable<'a> {
    coverage: KernCoverage,
    format: u8,
    /// Pairs of a format 0 subtable. `None` for every other format.
    kern_pairs: Option<ReadArray<'a, KernPair>>,
}

/// Size of the version, length and coverage fields of a subtable.
const SUBTABLE_HEADER_SIZE: usize = 6;

impl ReadBinary for KernTable<'_> {
    type HostType<'a> = KernTable<'a>;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self::HostType<'a>, ParseError> {
        let version = ctxt.read_u16be()?;
        ctxt.check_version(version == 0)?;
        let table_count = ctxt.read_u16be()?;
        let data = ctxt.scope().data();

        Ok(KernTable { table_count, data })
    }
}

impl<'a> KernTable<'a> {
    /// Iterate over the sub-tables of this `kern` table.
    pub fn sub_tables(&self) -> impl Iterator<Item = Result<KernSubtable<'a>, ParseError>> + 'a {
        let mut ctxt = ReadScope::new(self.data).ctxt();
        (0..self.table_count).map(move |_| {
            let start = ctxt.scope();
            let version = ctxt.read_u16be()?;
            ctxt.check_version(version == 0)?;
            let length = usize::from(ctxt.read_u16be()?);
            ctxt.check(length >= SUBTABLE_HEADER_SIZE)?;
            let format = ctxt.read_u8()?;
            let coverage = KernCoverage::from_bits_truncate(ctxt.read_u8()?);
            let kern_pairs = match format {
                0 => Some(Self::read_format0(&mut ctxt)?),
                _ => None,
            };

            // The length field overflows for large format 0 subtables, so it only ever extends
            // the subtable past the pairs that were read.
            let consumed = start.data().len() - ctxt.remaining();
            if length > consumed {
                ctxt.read_slice(length - consumed)?;
            }

            Ok(KernSubtable {
                coverage,
                format,
                kern_pairs,
            })
        })
    }

    // Format 0 is the only subtable format supported by Windows.
    fn read_format0(ctxt: &mut ReadCtxt<'a>) -> Result<ReadArray<'a, KernPair>, ParseError> {
        let n_pairs = ctxt.read_u16be()?;
        let _search_range = ctxt.read_u16be()?;
        let _entry_selector = ctxt.read_u16be()?;
        let _range_shift = ctxt.read_u16be()?;
        ctxt.read_array(usize::from(n_pairs)) // [nPairs]: KernPair,
    }

    /// Collect the horizontal kerning pairs of every format 0 subtable.
    ///
    /// The first value seen for a pair is kept. Subtables that cannot be expressed as a simple
    /// pair adjustment are skipped.
    pub fn kern_set(&self) -> Result<KernSet, ParseError> {
        let mut kerns = SimpleKerns::default();
        for (index, sub_table) in self.sub_tables().enumerate() {
            let sub_table = sub_table?;
            let kern_pairs = match (sub_table.format, &sub_table.kern_pairs) {
                (0, Some(kern_pairs)) => kern_pairs,
                (2, _) => {
                    warn!("skipping kern subtable {} in unsupported format 2", index);
                    continue;
                }
                (format, _) => {
                    debug!("skipping kern subtable {} in unknown format {}", index, format);
                    continue;
                }
            };
            if !sub_table.is_horizontal() || sub_table.is_minimum() || sub_table.is_cross_stream()
            {
                warn!(
                    "skipping kern subtable {} with coverage {:?}",
                    index, sub_table.coverage
                );
                continue;
            }
            for pair in kern_pairs {
                kerns.insert_if_absent(pair.left, pair.right, pair.value);
            }
        }

        if kerns.is_empty() {
            Err(ParseError::MissingKerningInformation)
        } else {
            Ok(KernSet::new(kerns, Vec::new()))
        }
    }
}

impl KernSubtable<'_> {
    /// The subtable format.
    pub fn format(&self) -> u8 {
        self.format
    }

    /// True if table has horizontal data, false if vertical.
    pub fn is_horizontal(&self) -> bool {
        self.coverage.contains(KernCoverage::HORIZONTAL)
    }

    /// If true the table has minimum values, otherwise the table has kerning values.
    pub fn is_minimum(&self) -> bool {
        self.coverage.contains(KernCoverage::MINIMUM)
    }

    /// Is kerning is perpendicular to the flow of the text.
    pub fn is_cross_stream(&self) -> bool {
        self.coverage.contains(KernCoverage::CROSS_STREAM)
    }
}

impl ReadFrom for KernPair {
    type ReadType = (U16Be, U16Be, I16Be);

    fn read_from((left, right, value): (u16, u16, i16)) -> Self {
        KernPair { left, right, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::writer::{self, TtfType::*};

    fn format0_subtable(coverage: u8, pairs: &[(u16, u16, i16)]) -> Vec<u8> {
        let mut data = writer::convert(&[
            UInt16(0),
            UInt16((SUBTABLE_HEADER_SIZE + 8 + 6 * pairs.len()) as u16),
            UInt8(0),
            UInt8(coverage),
            UInt16(pairs.len() as u16),
            UInt16(0),
            UInt16(0),
            UInt16(0),
        ]);
        for &(left, right, value) in pairs {
            data.extend(writer::convert(&[UInt16(left), UInt16(right), Int16(value)]));
        }
        data
    }

    fn kern_table(subtables: &[Vec<u8>]) -> Vec<u8> {
        let mut data = writer::convert(&[UInt16(0), UInt16(subtables.len() as u16)]);
        for subtable in subtables {
            data.extend_from_slice(subtable);
        }
        data
    }

    #[test]
    fn test_format0_pairs() {
        let data = kern_table(&[format0_subtable(1, &[(5, 9, -30), (5, 10, 12)])]);
        let kern = ReadScope::new(&data).read::<KernTable<'_>>().unwrap();
        let kerns = kern.kern_set().unwrap();
        assert_eq!(kerns.kern_pair(5, 9), Some(-30));
        assert_eq!(kerns.kern_pair(5, 10), Some(12));
        assert_eq!(kerns.kern_pair(9, 5), None);
    }

    #[test]
    fn test_first_subtable_wins() {
        let data = kern_table(&[
            format0_subtable(1, &[(5, 9, -30)]),
            format0_subtable(1, &[(5, 9, -50), (6, 9, -5)]),
        ]);
        let kern = ReadScope::new(&data).read::<KernTable<'_>>().unwrap();
        let kerns = kern.kern_set().unwrap();
        assert_eq!(kerns.kern_pair(5, 9), Some(-30));
        assert_eq!(kerns.kern_pair(6, 9), Some(-5));
    }

    #[test]
    fn test_subtable_padding_is_skipped() {
        let mut padded = format0_subtable(1, &[(5, 9, -30)]);
        let length = (padded.len() + 4) as u16;
        padded[2..4].copy_from_slice(&length.to_be_bytes());
        padded.extend_from_slice(&[0xFF; 4]);
        let data = kern_table(&[padded, format0_subtable(1, &[(6, 9, -5)])]);
        let kern = ReadScope::new(&data).read::<KernTable<'_>>().unwrap();
        let kerns = kern.kern_set().unwrap();
        assert_eq!(kerns.kern_pair(5, 9), Some(-30));
        assert_eq!(kerns.kern_pair(6, 9), Some(-5));
    }

    #[test]
    fn test_skips_vertical_and_minimum_subtables() {
        let data = kern_table(&[
            format0_subtable(0, &[(5, 9, -30)]),
            format0_subtable(1 | 2, &[(6, 9, -30)]),
            format0_subtable(1, &[(7, 9, -7)]),
        ]);
        let kern = ReadScope::new(&data).read::<KernTable<'_>>().unwrap();
        let kerns = kern.kern_set().unwrap();
        assert_eq!(kerns.kern_pair(5, 9), None);
        assert_eq!(kerns.kern_pair(6, 9), None);
        assert_eq!(kerns.kern_pair(7, 9), Some(-7));
    }

    #[test]
    fn test_format2_only_is_missing_kerning() {
        let format2 = writer::convert(&[
            UInt16(0),
            UInt16(14),
            UInt8(2),
            UInt8(1),
            UInt16(0),
            UInt16(0),
            UInt16(0),
            UInt16(0),
        ]);
        let data = kern_table(&[format2]);
        let kern = ReadScope::new(&data).read::<KernTable<'_>>().unwrap();
        assert_eq!(
            kern.kern_set().map(|_| ()),
            Err(ParseError::MissingKerningInformation)
        );
    }

    #[test]
    fn test_truncated_pairs() {
        let mut data = kern_table(&[format0_subtable(1, &[(5, 9, -30)])]);
        data.truncate(data.len() - 1);
        let kern = ReadScope::new(&data).read::<KernTable<'_>>().unwrap();
        assert_eq!(kern.kern_set().map(|_| ()), Err(ParseError::BadEof));
    }

    #[test]
    fn test_unsupported_version() {
        let data = writer::convert(&[UInt16(1), UInt16(0)]);
        assert!(ReadScope::new(&data).read::<KernTable<'_>>().is_err());
    }
}
