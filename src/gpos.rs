//! Pair kerning from the `GPOS` table.
//!
//! Only pair adjustment lookups (lookup type 2) that carry a plain X advance on the first
//! glyph are decoded. Individual pairs (format 1) are merged into a single map while each
//! class based subtable (format 2) is kept as its own source, in the order it was found.
//!
//! <https://learn.microsoft.com/en-us/typography/opentype/spec/gpos#lookup-type-2-pair-adjustment-positioning-subtable>

use bitflags::bitflags;
use log::{debug, warn};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::binary::read::{ReadArray, ReadBinary, ReadCtxt, ReadFrom, ReadScope};
use crate::binary::{I16Be, U16Be};
use crate::error::ParseError;
use crate::layout::{ClassDef, Coverage, LayoutTable, PosLookupType, GPOS};

const PAIR_POS_LOOKUP_TYPE: u16 = 2;
const EXTENSION_LOOKUP_TYPE: u16 = 9;

bitflags! {
    /// Which fields a ValueRecord holds.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct ValueFormat: u16 {
        const X_PLACEMENT = 0x0001;
        const Y_PLACEMENT = 0x0002;
        const X_ADVANCE = 0x0004;
        const Y_ADVANCE = 0x0008;
        const X_PLACEMENT_DEVICE = 0x0010;
        const Y_PLACEMENT_DEVICE = 0x0020;
        const X_ADVANCE_DEVICE = 0x0040;
        const Y_ADVANCE_DEVICE = 0x0080;
    }
}

impl ReadFrom for ValueFormat {
    type ReadType = U16Be;

    fn read_from(value_format: u16) -> Self {
        ValueFormat::from_bits_retain(value_format)
    }
}

/// True if a pair with these value formats is a plain horizontal kern of the first glyph.
fn is_kerning_value_format(value_format1: ValueFormat, value_format2: ValueFormat) -> bool {
    value_format1 == ValueFormat::X_ADVANCE && value_format2.is_empty()
}

fn pair_key(left: u16, right: u16) -> u32 {
    (u32::from(left) << 16) | u32::from(right)
}

/// Kerning values for individual glyph pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleKerns {
    pairs: FxHashMap<u32, i16>,
}

impl SimpleKerns {
    /// Record the kerning value of a pair, replacing any earlier value.
    pub fn insert(&mut self, left: u16, right: u16, value: i16) {
        self.pairs.insert(pair_key(left, right), value);
    }

    /// Record the kerning value of a pair unless the pair already has one.
    pub fn insert_if_absent(&mut self, left: u16, right: u16, value: i16) {
        self.pairs.entry(pair_key(left, right)).or_insert(value);
    }

    /// Add the pairs of `other`. Its values replace those already present.
    pub fn merge(&mut self, other: SimpleKerns) {
        self.pairs.extend(other.pairs);
    }

    pub fn get(&self, left: u16, right: u16) -> Option<i16> {
        self.pairs.get(&pair_key(left, right)).copied()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Kerning values for pairs of glyph classes, from a PairPos format 2 subtable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassKerns {
    coverage: FxHashSet<u16>,
    class_def1: ClassDef,
    class_def2: ClassDef,
    class2_count: usize,
    /// `class1_count` rows of `class2_count` values.
    matrix: Vec<i16>,
}

impl ClassKerns {
    /// Look up the kerning value for a pair.
    ///
    /// There is no match unless `left` is covered and both classes lie within the matrix.
    pub fn kern_pair(&self, left: u16, right: u16) -> Option<i16> {
        if !self.coverage.contains(&left) {
            return None;
        }
        let class1 = usize::from(self.class_def1.glyph_class_value(left));
        let class2 = usize::from(self.class_def2.glyph_class_value(right));
        if class1 >= self.class1_count() || class2 >= self.class2_count {
            return None;
        }
        self.matrix
            .get(class1 * self.class2_count + class2)
            .copied()
    }

    pub fn class2_count(&self) -> usize {
        self.class2_count
    }

    pub fn class1_count(&self) -> usize {
        self.matrix
            .len()
            .checked_div(self.class2_count)
            .unwrap_or(0)
    }
}

/// One source of kerning values within a [KernSet].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernSource {
    Simple(SimpleKerns),
    Class(ClassKerns),
}

impl KernSource {
    pub fn kern_pair(&self, left: u16, right: u16) -> Option<i16> {
        match self {
            KernSource::Simple(kerns) => kerns.get(left, right),
            KernSource::Class(kerns) => kerns.kern_pair(left, right),
        }
    }
}

/// An ordered list of kerning sources.
///
/// The first source always holds the individual pairs, which may be empty. Class based
/// sources follow in the order their subtables were found. The first source with a value for
/// a pair provides it; values are never summed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernSet {
    sources: Vec<KernSource>,
}

impl KernSet {
    pub fn new(simple: SimpleKerns, classes: Vec<ClassKerns>) -> Self {
        let mut sources = Vec::with_capacity(classes.len() + 1);
        sources.push(KernSource::Simple(simple));
        sources.extend(classes.into_iter().map(KernSource::Class));
        KernSet { sources }
    }

    /// The kerning value for `left` followed by `right`, in font design units.
    pub fn kern_pair(&self, left: u16, right: u16) -> Option<i16> {
        self.sources
            .iter()
            .find_map(|source| source.kern_pair(left, right))
    }

    pub fn sources(&self) -> &[KernSource] {
        &self.sources
    }
}

/// A decoded pair adjustment subtable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairPos {
    Format1(SimpleKerns),
    Format2(ClassKerns),
}

struct PairValueRecord {
    second_glyph: u16,
    x_advance: i16,
}

impl ReadFrom for PairValueRecord {
    type ReadType = (U16Be, I16Be);

    fn read_from((second_glyph, x_advance): (u16, i16)) -> Self {
        PairValueRecord {
            second_glyph,
            x_advance,
        }
    }
}

struct PairSet<'a> {
    pair_value_records: ReadArray<'a, PairValueRecord>,
}

// Only valid for pair sets whose value formats passed `is_kerning_value_format`.
impl ReadBinary for PairSet<'_> {
    type HostType<'a> = PairSet<'a>;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self::HostType<'a>, ParseError> {
        let pair_value_count = usize::from(ctxt.read_u16be()?);
        let pair_value_records = ctxt.read_array::<PairValueRecord>(pair_value_count)?;
        Ok(PairSet { pair_value_records })
    }
}

impl PairPos {
    /// Decode the pair adjustment subtable at `scope`.
    ///
    /// Returns `Ok(None)` for subtables in an unknown format and for value formats other than
    /// a lone X advance on the first glyph. Truncated or malformed data is reported as
    /// `InvalidKerningSubtable` with the position of `scope`.
    pub fn read(scope: ReadScope<'_>) -> Result<Option<PairPos>, ParseError> {
        Self::read_subtable(scope).map_err(|err| match err {
            ParseError::BadEof
            | ParseError::BadValue
            | ParseError::BadVersion
            | ParseError::BadOffset
            | ParseError::BadIndex
            | ParseError::LimitExceeded => ParseError::InvalidKerningSubtable(scope.base()),
            err => err,
        })
    }

    fn read_subtable(scope: ReadScope<'_>) -> Result<Option<PairPos>, ParseError> {
        let mut ctxt = scope.ctxt();
        let pos_format = ctxt.read_u16be()?;
        let coverage_offset = usize::from(ctxt.read_u16be()?);
        let coverage = scope.offset(coverage_offset).read::<Coverage>()?;
        match pos_format {
            1 => Self::read_format1(scope, &mut ctxt, &coverage),
            2 => Self::read_format2(scope, &mut ctxt, &coverage),
            _ => {
                debug!(
                    "skipping pair adjustment subtable in unknown format {}",
                    pos_format
                );
                Ok(None)
            }
        }
    }

    fn read_format1<'a>(
        scope: ReadScope<'a>,
        ctxt: &mut ReadCtxt<'a>,
        coverage: &Coverage,
    ) -> Result<Option<PairPos>, ParseError> {
        let value_format1 = ctxt.read::<ValueFormat>()?;
        let value_format2 = ctxt.read::<ValueFormat>()?;
        let pair_set_count = usize::from(ctxt.read_u16be()?);
        if !is_kerning_value_format(value_format1, value_format2) {
            debug!(
                "ignoring pair adjustment subtable with value formats {:?}, {:?}",
                value_format1, value_format2
            );
            return Ok(None);
        }
        let pair_set_offsets = ctxt.read_array::<U16Be>(pair_set_count)?;

        // The pair set furthest into the subtable must hold all of its records
        if let Some(last_offset) = pair_set_offsets.iter().max() {
            scope.offset(usize::from(last_offset)).read::<PairSet<'_>>()?;
        }

        let mut kerns = SimpleKerns::default();
        for (coverage_index, &first_glyph) in coverage.glyphs().iter().enumerate() {
            let pair_set_offset = pair_set_offsets
                .get_item(coverage_index)
                .ok_or(ParseError::BadIndex)?;
            let pair_set = scope
                .offset(usize::from(pair_set_offset))
                .read::<PairSet<'_>>()?;
            for record in &pair_set.pair_value_records {
                kerns.insert(first_glyph, record.second_glyph, record.x_advance);
            }
        }
        Ok(Some(PairPos::Format1(kerns)))
    }

    fn read_format2<'a>(
        scope: ReadScope<'a>,
        ctxt: &mut ReadCtxt<'a>,
        coverage: &Coverage,
    ) -> Result<Option<PairPos>, ParseError> {
        let value_format1 = ctxt.read::<ValueFormat>()?;
        let value_format2 = ctxt.read::<ValueFormat>()?;
        let class_def1_offset = usize::from(ctxt.read_u16be()?);
        let class_def2_offset = usize::from(ctxt.read_u16be()?);
        let class1_count = usize::from(ctxt.read_u16be()?);
        let class2_count = usize::from(ctxt.read_u16be()?);
        if !is_kerning_value_format(value_format1, value_format2) {
            debug!(
                "ignoring pair adjustment subtable with value formats {:?}, {:?}",
                value_format1, value_format2
            );
            return Ok(None);
        }

        let class_def1 = scope.offset(class_def1_offset).read::<ClassDef>()?;
        let class_def2 = scope.offset(class_def2_offset).read::<ClassDef>()?;
        // The class matrix directly follows the 16 byte header
        let matrix = ctxt
            .read_array::<I16Be>(class1_count * class2_count)?
            .to_vec();

        Ok(Some(PairPos::Format2(ClassKerns {
            coverage: coverage.glyphs().iter().copied().collect(),
            class_def1,
            class_def2,
            class2_count,
            matrix,
        })))
    }
}

impl LayoutTable<GPOS> {
    /// Collect the pair kerning of every pair adjustment lookup in this table.
    ///
    /// Lookups of other types are skipped. Fails with `MissingKerningInformation` when no
    /// lookup contributes a kerning source.
    pub fn kern_set(&self) -> Result<KernSet, ParseError> {
        let lookup_list = self
            .lookup_list()
            .ok_or(ParseError::MissingKerningInformation)?;

        let mut simple = SimpleKerns::default();
        let mut classes = Vec::new();
        for lookup_index in 0..lookup_list.len() {
            match lookup_list.raw_lookup_type(lookup_index)? {
                PAIR_POS_LOOKUP_TYPE | EXTENSION_LOOKUP_TYPE => {}
                1..=8 => continue,
                lookup_type => {
                    warn!(
                        "skipping GPOS lookup {} with unknown type {}",
                        lookup_index, lookup_type
                    );
                    continue;
                }
            }
            let lookup = lookup_list.lookup(lookup_index)?;
            if lookup.subtable_count() == 0 {
                continue;
            }
            let subtables = lookup.smart_subtable_iter()?;
            if subtables.get_lookup_type() != PosLookupType::PairPos {
                continue;
            }
            for subtable in subtables {
                match PairPos::read(subtable?)? {
                    Some(PairPos::Format1(kerns)) => simple.merge(kerns),
                    Some(PairPos::Format2(class_kerns)) => classes.push(class_kerns),
                    None => {}
                }
            }
        }

        if simple.is_empty() && classes.is_empty() {
            Err(ParseError::MissingKerningInformation)
        } else {
            Ok(KernSet::new(simple, classes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{extension_subtable, gpos_table, pair_pos_format1, pair_pos_format2};

    fn simple_subtable() -> Vec<u8> {
        pair_pos_format1(&[(5, &[(9, -30)])])
    }

    fn class_subtable() -> Vec<u8> {
        pair_pos_format2(&[5, 6], &[(5, 0), (6, 1)], &[(9, 0)], 1, &[-10, -20])
    }

    fn read_gpos(data: &[u8]) -> LayoutTable<GPOS> {
        ReadScope::new(data).read::<LayoutTable<GPOS>>().unwrap()
    }

    #[test]
    fn test_format1_pairs() {
        let data = simple_subtable();
        let pair_pos = PairPos::read(ReadScope::new(&data)).unwrap();
        let kerns = match pair_pos {
            Some(PairPos::Format1(kerns)) => kerns,
            _ => panic!("expected format 1"),
        };
        assert_eq!(kerns.get(5, 9), Some(-30));
        assert_eq!(kerns.get(5, 10), None);
        assert_eq!(kerns.len(), 1);
    }

    #[test]
    fn test_format1_last_value_wins() {
        let data = pair_pos_format1(&[(5, &[(9, -30), (9, -50)])]);
        match PairPos::read(ReadScope::new(&data)).unwrap() {
            Some(PairPos::Format1(kerns)) => assert_eq!(kerns.get(5, 9), Some(-50)),
            _ => panic!("expected format 1"),
        }
    }

    #[test]
    fn test_format2_classes() {
        let data = class_subtable();
        let class_kerns = match PairPos::read(ReadScope::new(&data)).unwrap() {
            Some(PairPos::Format2(class_kerns)) => class_kerns,
            _ => panic!("expected format 2"),
        };
        assert_eq!(class_kerns.class1_count(), 2);
        assert_eq!(class_kerns.class2_count(), 1);
        assert_eq!(class_kerns.kern_pair(5, 9), Some(-10));
        assert_eq!(class_kerns.kern_pair(6, 9), Some(-20));
        assert_eq!(class_kerns.kern_pair(7, 9), None);
        // Unclassified right glyphs are class 0
        assert_eq!(class_kerns.kern_pair(6, 200), Some(-20));
    }

    #[test]
    fn test_format2_classes_outside_matrix() {
        // Right class 1 with a single class 2 column would land in the next row
        let data = pair_pos_format2(&[5, 6], &[(5, 0), (6, 1)], &[(9, 1)], 1, &[-10, -20]);
        let class_kerns = match PairPos::read(ReadScope::new(&data)).unwrap() {
            Some(PairPos::Format2(class_kerns)) => class_kerns,
            _ => panic!("expected format 2"),
        };
        assert_eq!(class_kerns.kern_pair(5, 9), None);
        assert_eq!(class_kerns.kern_pair(6, 9), None);
        assert_eq!(class_kerns.kern_pair(5, 10), Some(-10));

        let data = pair_pos_format2(&[5, 6], &[(6, 2)], &[(9, 3)], 2, &[-10, -20, -30, -40]);
        let class_kerns = match PairPos::read(ReadScope::new(&data)).unwrap() {
            Some(PairPos::Format2(class_kerns)) => class_kerns,
            _ => panic!("expected format 2"),
        };
        assert_eq!(class_kerns.kern_pair(5, 9), None);
        assert_eq!(class_kerns.kern_pair(6, 10), None);
        assert_eq!(class_kerns.kern_pair(5, 10), Some(-10));
    }

    #[test]
    fn test_value_format_gating() {
        for (value_format1, value_format2) in [(0x0005, 0), (0x0004, 0x0004), (0, 0)] {
            let mut data = simple_subtable();
            data[4..6].copy_from_slice(&u16::to_be_bytes(value_format1));
            data[6..8].copy_from_slice(&u16::to_be_bytes(value_format2));
            assert_eq!(PairPos::read(ReadScope::new(&data)), Ok(None));

            let mut data = class_subtable();
            data[4..6].copy_from_slice(&u16::to_be_bytes(value_format1));
            data[6..8].copy_from_slice(&u16::to_be_bytes(value_format2));
            assert_eq!(PairPos::read(ReadScope::new(&data)), Ok(None));
        }
    }

    #[test]
    fn test_unknown_format_is_skipped() {
        let mut data = simple_subtable();
        data[0..2].copy_from_slice(&3u16.to_be_bytes());
        assert_eq!(PairPos::read(ReadScope::new(&data)), Ok(None));
    }

    #[test]
    fn test_every_truncation_is_invalid() {
        for data in [simple_subtable(), class_subtable()] {
            for len in 0..data.len() {
                assert_eq!(
                    PairPos::read(ReadScope::new(&data[..len])),
                    Err(ParseError::InvalidKerningSubtable(0)),
                    "truncated to {} bytes",
                    len
                );
            }
            assert!(PairPos::read(ReadScope::new(&data)).unwrap().is_some());
        }
    }

    #[test]
    fn test_coverage_index_beyond_pair_sets() {
        let mut data = simple_subtable();
        // Cover a second glyph without a pair set for it
        data.truncate(data.len() - 4);
        data.extend_from_slice(&[0, 2, 0, 5, 0, 6]);
        assert_eq!(
            PairPos::read(ReadScope::new(&data)),
            Err(ParseError::InvalidKerningSubtable(0))
        );
    }

    #[test]
    fn test_reversed_coverage_range_is_skipped() {
        let mut data = simple_subtable();
        // Replace the format 1 coverage with ranges 5..=5 and 8..=7
        data.truncate(data.len() - 6);
        data.extend_from_slice(&[0, 2, 0, 2, 0, 5, 0, 5, 0, 0, 0, 8, 0, 7, 0, 1]);
        match PairPos::read(ReadScope::new(&data)).unwrap() {
            Some(PairPos::Format1(kerns)) => {
                assert_eq!(kerns.get(5, 9), Some(-30));
                assert_eq!(kerns.len(), 1);
            }
            _ => panic!("expected format 1"),
        }
    }

    #[test]
    fn test_unsupported_class_def_format() {
        let mut data = class_subtable();
        let class_def1_offset = usize::from(u16::from_be_bytes([data[8], data[9]]));
        data[class_def1_offset..class_def1_offset + 2].copy_from_slice(&3u16.to_be_bytes());
        assert_eq!(
            PairPos::read(ReadScope::new(&data)),
            Err(ParseError::UnsupportedClassDefFormat(3))
        );
    }

    #[test]
    fn test_short_matrix() {
        let mut data = class_subtable();
        // Claim more class 1 rows than the subtable has room for
        data[12..14].copy_from_slice(&1000u16.to_be_bytes());
        assert_eq!(
            PairPos::read(ReadScope::new(&data)),
            Err(ParseError::InvalidKerningSubtable(0))
        );
    }

    #[test]
    fn test_error_offset_is_relative_to_gpos() {
        let mut subtable = simple_subtable();
        subtable.truncate(subtable.len() - 1);
        let data = gpos_table(&[(2, vec![subtable])]);
        // header (10) + lookup list (4) + lookup header (8)
        assert_eq!(
            read_gpos(&data).kern_set(),
            Err(ParseError::InvalidKerningSubtable(22))
        );
    }

    #[test]
    fn test_kern_set_simple_before_classes() {
        let data = gpos_table(&[
            (2, vec![class_subtable()]),
            (2, vec![pair_pos_format1(&[(5, &[(9, -30)]), (6, &[(7, 4)])])]),
        ]);
        let kerns = read_gpos(&data).kern_set().unwrap();
        assert_eq!(kerns.sources().len(), 2);
        assert!(matches!(kerns.sources()[0], KernSource::Simple(_)));
        assert_eq!(kerns.kern_pair(5, 9), Some(-30));
        assert_eq!(kerns.kern_pair(6, 9), Some(-20));
        assert_eq!(kerns.kern_pair(6, 7), Some(4));
        assert_eq!(kerns.kern_pair(7, 9), None);
    }

    #[test]
    fn test_kern_set_first_class_source_wins() {
        let first = pair_pos_format2(&[5], &[(5, 1)], &[(9, 1)], 2, &[0, 0, 0, -40]);
        let second = pair_pos_format2(&[5, 6], &[], &[], 1, &[-60]);
        let data = gpos_table(&[(2, vec![first, second])]);
        let kerns = read_gpos(&data).kern_set().unwrap();
        assert_eq!(kerns.sources().len(), 3);
        assert_eq!(kerns.kern_pair(5, 9), Some(-40));
        assert_eq!(kerns.kern_pair(6, 9), Some(-60));
    }

    #[test]
    fn test_kern_set_later_pairs_win() {
        let data = gpos_table(&[
            (2, vec![pair_pos_format1(&[(5, &[(9, -30)])])]),
            (
                2,
                vec![
                    pair_pos_format1(&[(5, &[(9, -50)])]),
                    pair_pos_format1(&[(5, &[(10, -5)]), (6, &[(9, 8)])]),
                ],
            ),
        ]);
        let kerns = read_gpos(&data).kern_set().unwrap();
        assert_eq!(kerns.kern_pair(5, 9), Some(-50));
        assert_eq!(kerns.kern_pair(5, 10), Some(-5));
        assert_eq!(kerns.kern_pair(6, 9), Some(8));
    }

    #[test]
    fn test_kern_set_extension_lookup() {
        let data = gpos_table(&[(9, vec![extension_subtable(2, &simple_subtable())])]);
        let kerns = read_gpos(&data).kern_set().unwrap();
        assert_eq!(kerns.kern_pair(5, 9), Some(-30));
    }

    #[test]
    fn test_kern_set_skips_other_lookups() {
        let data = gpos_table(&[
            (1, vec![vec![0xFF; 4]]),
            (9, vec![extension_subtable(1, &[0xFF; 4])]),
            (42, vec![]),
            (2, vec![simple_subtable()]),
        ]);
        let kerns = read_gpos(&data).kern_set().unwrap();
        assert_eq!(kerns.kern_pair(5, 9), Some(-30));
    }

    #[test]
    fn test_kern_set_missing_kerning() {
        let data = gpos_table(&[(1, vec![vec![0; 4]])]);
        assert_eq!(
            read_gpos(&data).kern_set(),
            Err(ParseError::MissingKerningInformation)
        );

        let mut gated = simple_subtable();
        gated[4..6].copy_from_slice(&5u16.to_be_bytes());
        let data = gpos_table(&[(2, vec![gated])]);
        assert_eq!(
            read_gpos(&data).kern_set(),
            Err(ParseError::MissingKerningInformation)
        );
    }
}
