//! Common structures of the `GSUB` and `GPOS` layout tables.
//!
//! This covers the script, feature and lookup lists, lookup and extension subtable framing,
//! and the Coverage and Class Definition tables shared by many lookup subtables.
//!
//! <https://docs.microsoft.com/en-us/typography/opentype/spec/chapter2>

use crate::error::ParseError;

use crate::binary::read::{
    CheckIndex, ReadArray, ReadBinary, ReadBinaryDep, ReadCtxt, ReadFixedSizeDep, ReadFrom,
    ReadScope, ReadScopeOwned,
};
use crate::binary::U16Be;
use crate::size;
use crate::tag;
use log::debug;
use rustc_hash::FxHashMap;
use std::marker::PhantomData;

/// The largest number of glyphs a Coverage or ClassDef table may expand to.
pub const MAX_EXPANDED_GLYPHS: usize = 0x10000;

pub enum GSUB {}
pub enum GPOS {}

// GSUB and GPOS tables have the same top-level structure
pub struct LayoutTable<T> {
    pub major_version: u16,
    pub minor_version: u16,
    pub opt_script_list: Option<ScriptList>,
    pub opt_feature_list: Option<FeatureList>,
    pub opt_lookup_list: Option<LookupList<T>>,
}

pub struct ScriptList {
    script_records: Vec<ScriptRecord>,
}

pub struct ScriptRecord {
    pub script_tag: u32,
    script_table: ScriptTable,
}

pub struct ScriptTable {
    opt_default_langsys: Option<LangSys>,
    langsys_records: Vec<LangSysRecord>,
}

pub struct LangSysRecord {
    pub langsys_tag: u32,
    langsys_table: LangSys,
}

pub struct LangSys {
    required_feature_index: u16,
    feature_indices: Vec<u16>,
}

pub struct FeatureList {
    feature_records: Vec<FeatureRecord>,
}

pub struct FeatureRecord {
    pub feature_tag: u32,
    feature_table: FeatureTable,
}

pub struct FeatureTable {
    pub lookup_indices: Vec<u16>,
}

pub struct LookupList<T> {
    scope_owned: ReadScopeOwned,
    lookup_offsets: Vec<u16>,
    phantom: PhantomData<T>,
}

pub struct Lookup<'a, T: LayoutTableType> {
    scope: ReadScope<'a>,
    lookup_type: LookupType<T>,
    pub lookup_flag: u16,
    subtable_offsets: ReadArray<'a, U16Be>,
    /// Present when bit 4 (`USE_MARK_FILTERING_SET`) of the lookup flag is set.
    pub mark_filtering_set: Option<u16>,
}

pub struct ExtensionSubst<'a, T: LayoutTableType> {
    scope: ReadScope<'a>,
    extension_lookup_type: T::BaseLookupType,
    extension_offset: u32,
}

pub struct LookupSubtableIter<'a, 'b, T: LayoutTableType> {
    lookup: &'b Lookup<'a, T>,
    index: usize,
}

pub struct ExtensionLookupSubtableIter<'a, 'b, T: LayoutTableType> {
    lookup_type: T::BaseLookupType,
    iter: LookupSubtableIter<'a, 'b, T>,
}

pub enum SmartLookupSubtableIter<'a, 'b, T: LayoutTableType> {
    Normal(T::BaseLookupType, LookupSubtableIter<'a, 'b, T>),
    Extension(ExtensionLookupSubtableIter<'a, 'b, T>),
}

pub enum LookupType<T: LayoutTableType> {
    Normal(T::BaseLookupType),
    Extension,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SubstLookupType {
    SingleSubst,
    MultipleSubst,
    AlternateSubst,
    LigatureSubst,
    ContextSubst,
    ChainContextSubst,
    ReverseChainSingleSubst,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PosLookupType {
    SinglePos,
    PairPos,
    CursivePos,
    MarkBasePos,
    MarkLigPos,
    MarkMarkPos,
    ContextPos,
    ChainContextPos,
}

pub trait LayoutTableType: Sized {
    type BaseLookupType: Copy + PartialEq + std::fmt::Debug;

    /// Tag of the table, `GSUB` or `GPOS`.
    const TAG: u32;

    fn check_lookup_type(lookup_type: u16) -> Result<LookupType<Self>, ParseError>;
}

const USE_MARK_FILTERING_SET: u16 = 0x0010;

impl<T> ReadBinary for LayoutTable<T> {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let table = ctxt.scope();

        let major_version = ctxt.read_u16be()?;
        let minor_version = ctxt.read_u16be()?;
        let script_list_offset = usize::from(ctxt.read_u16be()?);
        let feature_list_offset = usize::from(ctxt.read_u16be()?);
        let lookup_list_offset = usize::from(ctxt.read_u16be()?);

        // We handle versions 1.x
        if major_version != 1 {
            return Err(ParseError::BadVersion);
        }

        let opt_script_list = if script_list_offset >= table.data().len() {
            return Err(ParseError::BadOffset);
        } else if script_list_offset == 0 {
            None
        } else {
            Some(table.offset(script_list_offset).read::<ScriptList>()?)
        };

        let opt_feature_list = if feature_list_offset >= table.data().len() {
            return Err(ParseError::BadOffset);
        } else if feature_list_offset == 0 {
            None
        } else {
            Some(table.offset(feature_list_offset).read::<FeatureList>()?)
        };

        let opt_lookup_list = if lookup_list_offset >= table.data().len() {
            return Err(ParseError::BadOffset);
        } else if lookup_list_offset == 0 {
            None
        } else {
            Some(table.offset(lookup_list_offset).read::<LookupList<T>>()?)
        };

        // Version 1.1 also includes an offset to a FeatureVariations table, which is not read.

        Ok(LayoutTable {
            major_version,
            minor_version,
            opt_script_list,
            opt_feature_list,
            opt_lookup_list,
        })
    }
}

impl ReadBinary for ScriptList {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let scope = ctxt.scope();
        let script_count = usize::from(ctxt.read_u16be()?);
        let script_records = ctxt
            .read_array_dep::<ScriptRecord>(script_count, scope)?
            .read_to_vec()?;
        Ok(ScriptList { script_records })
    }
}

impl ReadBinaryDep for ScriptRecord {
    type Args<'a> = ReadScope<'a>;
    type HostType<'a> = ScriptRecord;

    fn read_dep<'a>(ctxt: &mut ReadCtxt<'a>, scope: Self::Args<'a>) -> Result<Self, ParseError> {
        let script_tag = ctxt.read_u32be()?;
        let script_offset = ctxt.read_u16be()?;
        let script_table = scope
            .offset(usize::from(script_offset))
            .read::<ScriptTable>()?;
        Ok(ScriptRecord {
            script_tag,
            script_table,
        })
    }
}

impl ReadFixedSizeDep for ScriptRecord {
    fn size(_scope: Self::Args<'_>) -> usize {
        size::U32 + size::U16
    }
}

impl ReadBinary for ScriptTable {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let scope = ctxt.scope();
        let default_langsys_offset = usize::from(ctxt.read_u16be()?);
        let opt_default_langsys = if default_langsys_offset != 0 {
            Some(scope.offset(default_langsys_offset).read::<LangSys>()?)
        } else {
            None
        };
        let langsys_count = usize::from(ctxt.read_u16be()?);
        let langsys_records = ctxt
            .read_array_dep::<LangSysRecord>(langsys_count, scope)?
            .read_to_vec()?;
        Ok(ScriptTable {
            opt_default_langsys,
            langsys_records,
        })
    }
}

impl ReadBinary for FeatureList {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let scope = ctxt.scope();
        let feature_count = usize::from(ctxt.read_u16be()?);
        let feature_records = ctxt
            .read_array_dep::<FeatureRecord>(feature_count, scope)?
            .read_to_vec()?;
        Ok(FeatureList { feature_records })
    }
}

impl FeatureList {
    pub fn nth_feature_record(&self, index: usize) -> Result<&FeatureRecord, ParseError> {
        self.feature_records.check_index(index)?;
        Ok(&self.feature_records[index])
    }

    pub fn feature_records(&self) -> &[FeatureRecord] {
        &self.feature_records
    }
}

impl FeatureRecord {
    pub fn feature_table(&self) -> &FeatureTable {
        &self.feature_table
    }
}

impl ReadBinaryDep for FeatureRecord {
    type Args<'a> = ReadScope<'a>;
    type HostType<'a> = FeatureRecord;

    fn read_dep<'a>(ctxt: &mut ReadCtxt<'a>, scope: Self::Args<'a>) -> Result<Self, ParseError> {
        let feature_tag = ctxt.read_u32be()?;
        let feature_offset = ctxt.read_u16be()?;
        let feature_table = scope
            .offset(usize::from(feature_offset))
            .read::<FeatureTable>()?;
        Ok(FeatureRecord {
            feature_tag,
            feature_table,
        })
    }
}

impl ReadFixedSizeDep for FeatureRecord {
    fn size(_scope: Self::Args<'_>) -> usize {
        size::U32 + size::U16
    }
}

impl ReadBinary for FeatureTable {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let _feature_params = ctxt.read_u16be()?; // reserved, should be zero
        let lookup_index_count = usize::from(ctxt.read_u16be()?);
        let lookup_indices = ctxt.read_array::<U16Be>(lookup_index_count)?.to_vec();
        Ok(FeatureTable { lookup_indices })
    }
}

impl<T> ReadBinary for LookupList<T> {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let scope_owned = ReadScopeOwned::new(ctxt.scope());
        let lookup_count = usize::from(ctxt.read_u16be()?);
        let lookup_offsets = ctxt.read_array::<U16Be>(lookup_count)?.to_vec();
        Ok(LookupList {
            scope_owned,
            lookup_offsets,
            phantom: PhantomData,
        })
    }
}

impl ReadBinary for LangSys {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let _lookup_order = ctxt.read_u16be()?; // reserved, should be zero
        let required_feature_index = ctxt.read_u16be()?;
        let feature_index_count = usize::from(ctxt.read_u16be()?);
        let feature_indices = ctxt.read_array::<U16Be>(feature_index_count)?.to_vec();
        Ok(LangSys {
            required_feature_index,
            feature_indices,
        })
    }
}

impl LangSysRecord {
    pub fn langsys_table(&self) -> &LangSys {
        &self.langsys_table
    }
}

impl LangSys {
    /// Index of the feature required by this language system, if any.
    pub fn required_feature_index(&self) -> Option<u16> {
        match self.required_feature_index {
            0xFFFF => None,
            index => Some(index),
        }
    }
}

impl<T> LayoutTable<T> {
    pub fn find_script(&self, script_tag: u32) -> Option<&ScriptTable> {
        self.opt_script_list
            .as_ref()
            .and_then(|script_list| script_list.find_script(script_tag))
    }

    pub fn find_script_or_default(&self, script_tag: u32) -> Option<&ScriptTable> {
        self.find_script(script_tag)
            .or_else(|| self.find_script(tag::DFLT))
    }

    pub fn find_langsys_feature(
        &self,
        langsys: &LangSys,
        feature_tag: u32,
    ) -> Result<Option<&FeatureTable>, ParseError> {
        if let Some(ref feature_list) = self.opt_feature_list {
            for feature_index in &langsys.feature_indices {
                let feature_record =
                    feature_list.nth_feature_record(usize::from(*feature_index))?;
                if feature_record.feature_tag == feature_tag {
                    return Ok(Some(&feature_record.feature_table));
                }
            }
        }
        Ok(None)
    }

    /// The lookup indices of every feature with `feature_tag`, in feature list order, without
    /// duplicates.
    pub fn feature_lookup_indices(&self, feature_tag: u32) -> Vec<u16> {
        let mut indices = Vec::new();
        let records = self
            .opt_feature_list
            .iter()
            .flat_map(|feature_list| feature_list.feature_records.iter())
            .filter(|record| record.feature_tag == feature_tag);
        for record in records {
            for &index in &record.feature_table.lookup_indices {
                if !indices.contains(&index) {
                    indices.push(index);
                }
            }
        }
        indices
    }

    pub fn lookup_list(&self) -> Option<&LookupList<T>> {
        self.opt_lookup_list.as_ref()
    }
}

impl ScriptList {
    pub fn script_records(&self) -> &[ScriptRecord] {
        &self.script_records
    }

    pub fn find_script(&self, script_tag: u32) -> Option<&ScriptTable> {
        self.script_records
            .iter()
            .find(|script_record| script_record.script_tag == script_tag)
            .map(|script_record| &script_record.script_table)
    }
}

impl ScriptRecord {
    pub fn script_table(&self) -> &ScriptTable {
        &self.script_table
    }
}

impl ScriptTable {
    pub fn default_langsys_record(&self) -> Option<&LangSys> {
        self.opt_default_langsys.as_ref()
    }

    pub fn langsys_records(&self) -> &[LangSysRecord] {
        &self.langsys_records
    }
}

impl ReadBinaryDep for LangSysRecord {
    type Args<'a> = ReadScope<'a>;
    type HostType<'a> = LangSysRecord;

    fn read_dep<'a>(ctxt: &mut ReadCtxt<'a>, scope: Self::Args<'a>) -> Result<Self, ParseError> {
        let langsys_tag = ctxt.read_u32be()?;
        let langsys_offset = ctxt.read_u16be()?;
        let langsys_table = scope
            .offset(usize::from(langsys_offset))
            .read::<LangSys>()?;
        Ok(LangSysRecord {
            langsys_tag,
            langsys_table,
        })
    }
}

impl ReadFixedSizeDep for LangSysRecord {
    fn size(_scope: Self::Args<'_>) -> usize {
        size::U32 + size::U16
    }
}

impl<T: LayoutTableType> LookupList<T> {
    pub fn len(&self) -> usize {
        self.lookup_offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup_offsets.is_empty()
    }

    /// Read the raw `lookupType` field of a lookup without validating it.
    pub fn raw_lookup_type(&self, lookup_index: usize) -> Result<u16, ParseError> {
        self.lookup_offsets.check_index(lookup_index)?;
        let lookup_table_offset = self.lookup_offsets[lookup_index];
        let mut ctxt = self
            .scope_owned
            .scope()
            .offset(usize::from(lookup_table_offset))
            .ctxt();
        Ok(ctxt.read_u16be()?)
    }

    pub fn lookup(&self, lookup_index: usize) -> Result<Lookup<'_, T>, ParseError> {
        self.lookup_offsets.check_index(lookup_index)?;
        let lookup_table_offset = self.lookup_offsets[lookup_index];
        self.scope_owned
            .scope()
            .offset(usize::from(lookup_table_offset))
            .read::<Lookup<'_, T>>()
    }
}

impl<'a, T: LayoutTableType> Lookup<'a, T> {
    fn subtable_iter<'b>(&'b self) -> LookupSubtableIter<'a, 'b, T> {
        LookupSubtableIter {
            lookup: self,
            index: 0,
        }
    }

    pub fn subtable_count(&self) -> usize {
        self.subtable_offsets.len()
    }

    /// Iterate over the subtables of this lookup, resolving extension subtables to the
    /// subtables they wrap.
    pub fn smart_subtable_iter<'b>(
        &'b self,
    ) -> Result<SmartLookupSubtableIter<'a, 'b, T>, ParseError> {
        match self.lookup_type {
            LookupType::Normal(lookup_type) => {
                let iter = self.subtable_iter();
                Ok(SmartLookupSubtableIter::Normal(lookup_type, iter))
            }
            LookupType::Extension => {
                if let Some(subtable) = self.subtable_iter().next() {
                    let ext_subtable = subtable.read::<ExtensionSubst<'_, T>>()?;
                    let lookup_type = ext_subtable.extension_lookup_type;
                    let iter = ExtensionLookupSubtableIter {
                        lookup_type,
                        iter: self.subtable_iter(),
                    };
                    Ok(SmartLookupSubtableIter::Extension(iter))
                } else {
                    Err(ParseError::BadValue)
                }
            }
        }
    }

    pub fn get_lookup_type(&self) -> Result<T::BaseLookupType, ParseError> {
        let subtables = self.smart_subtable_iter()?;
        Ok(subtables.get_lookup_type())
    }

    pub fn is_extension(&self) -> bool {
        matches!(self.lookup_type, LookupType::Extension)
    }
}

impl<T: LayoutTableType> ReadBinary for Lookup<'_, T> {
    type HostType<'a> = Lookup<'a, T>;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self::HostType<'a>, ParseError> {
        let scope = ctxt.scope();
        let lookup_type = ctxt.read_u16be()?;
        let lookup_type = T::check_lookup_type(lookup_type)?;
        let lookup_flag = ctxt.read_u16be()?;
        let subtable_count = usize::from(ctxt.read_u16be()?);
        let subtable_offsets = ctxt.read_array::<U16Be>(subtable_count)?;
        let mark_filtering_set = if lookup_flag & USE_MARK_FILTERING_SET != 0 {
            Some(ctxt.read_u16be()?)
        } else {
            None
        };
        Ok(Lookup {
            scope,
            lookup_type,
            lookup_flag,
            subtable_offsets,
            mark_filtering_set,
        })
    }
}

impl<T: LayoutTableType> ReadBinary for ExtensionSubst<'_, T> {
    type HostType<'a> = ExtensionSubst<'a, T>;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self::HostType<'a>, ParseError> {
        let scope = ctxt.scope();
        let subst_format = ctxt.read_u16be()?;
        match subst_format {
            1 => {
                let extension_lookup_type = ctxt.read_u16be()?;
                let extension_lookup_type = match T::check_lookup_type(extension_lookup_type)? {
                    LookupType::Normal(lookup_type) => lookup_type,
                    LookupType::Extension => return Err(ParseError::BadVersion),
                };
                let extension_offset = ctxt.read_u32be()?;
                Ok(ExtensionSubst {
                    scope,
                    extension_lookup_type,
                    extension_offset,
                })
            }
            _ => Err(ParseError::BadVersion),
        }
    }
}

impl<'a, T: LayoutTableType> ExtensionSubst<'a, T> {
    /// The wrapped subtable. The offset is relative to the start of the extension subtable.
    pub fn subtable(&self) -> Result<ReadScope<'a>, ParseError> {
        let offset = usize::try_from(self.extension_offset)?;
        Ok(self.scope.offset(offset))
    }
}

impl<'a, T: LayoutTableType> Iterator for LookupSubtableIter<'a, '_, T> {
    type Item = ReadScope<'a>;
    fn next(&mut self) -> Option<ReadScope<'a>> {
        let subtable_offset = self.lookup.subtable_offsets.get_item(self.index)?;
        self.index += 1;
        Some(self.lookup.scope.offset(usize::from(subtable_offset)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let upper = self.lookup.subtable_offsets.len().saturating_sub(self.index);
        (upper, Some(upper))
    }
}

impl<'a, T: LayoutTableType> Iterator for ExtensionLookupSubtableIter<'a, '_, T> {
    type Item = Result<ReadScope<'a>, ParseError>;
    fn next(&mut self) -> Option<Result<ReadScope<'a>, ParseError>> {
        let subtable = self.iter.next()?;
        let result = subtable
            .read::<ExtensionSubst<'_, T>>()
            .and_then(|ext_subtable| {
                // All subtables of an extension lookup must wrap the same lookup type
                if ext_subtable.extension_lookup_type != self.lookup_type {
                    return Err(ParseError::BadVersion);
                }
                ext_subtable.subtable()
            });
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<'a, T: LayoutTableType> Iterator for SmartLookupSubtableIter<'a, '_, T> {
    type Item = Result<ReadScope<'a>, ParseError>;
    fn next(&mut self) -> Option<Result<ReadScope<'a>, ParseError>> {
        match *self {
            SmartLookupSubtableIter::Normal(_, ref mut iter) => iter.next().map(Ok),
            SmartLookupSubtableIter::Extension(ref mut iter) => iter.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            SmartLookupSubtableIter::Normal(_lookup_type, iter) => iter.size_hint(),
            SmartLookupSubtableIter::Extension(iter) => iter.size_hint(),
        }
    }
}

impl<T: LayoutTableType> SmartLookupSubtableIter<'_, '_, T> {
    pub fn get_lookup_type(&self) -> T::BaseLookupType {
        match *self {
            SmartLookupSubtableIter::Normal(lookup_type, _) => lookup_type,
            SmartLookupSubtableIter::Extension(ref iter) => iter.lookup_type,
        }
    }
}

impl LayoutTableType for GSUB {
    type BaseLookupType = SubstLookupType;

    const TAG: u32 = tag::GSUB;

    fn check_lookup_type(lookup_type: u16) -> Result<LookupType<GSUB>, ParseError> {
        match lookup_type {
            1 => Ok(LookupType::Normal(SubstLookupType::SingleSubst)),
            2 => Ok(LookupType::Normal(SubstLookupType::MultipleSubst)),
            3 => Ok(LookupType::Normal(SubstLookupType::AlternateSubst)),
            4 => Ok(LookupType::Normal(SubstLookupType::LigatureSubst)),
            5 => Ok(LookupType::Normal(SubstLookupType::ContextSubst)),
            6 => Ok(LookupType::Normal(SubstLookupType::ChainContextSubst)),
            7 => Ok(LookupType::Extension),
            8 => Ok(LookupType::Normal(SubstLookupType::ReverseChainSingleSubst)),
            _ => Err(ParseError::BadVersion),
        }
    }
}

impl LayoutTableType for GPOS {
    type BaseLookupType = PosLookupType;

    const TAG: u32 = tag::GPOS;

    fn check_lookup_type(lookup_type: u16) -> Result<LookupType<GPOS>, ParseError> {
        match lookup_type {
            1 => Ok(LookupType::Normal(PosLookupType::SinglePos)),
            2 => Ok(LookupType::Normal(PosLookupType::PairPos)),
            3 => Ok(LookupType::Normal(PosLookupType::CursivePos)),
            4 => Ok(LookupType::Normal(PosLookupType::MarkBasePos)),
            5 => Ok(LookupType::Normal(PosLookupType::MarkLigPos)),
            6 => Ok(LookupType::Normal(PosLookupType::MarkMarkPos)),
            7 => Ok(LookupType::Normal(PosLookupType::ContextPos)),
            8 => Ok(LookupType::Normal(PosLookupType::ChainContextPos)),
            9 => Ok(LookupType::Extension),
            _ => Err(ParseError::BadVersion),
        }
    }
}

/// A decoded Coverage table.
///
/// The position of a glyph in `glyphs` is its coverage index. Range records are expanded in
/// the order they are declared and their stored start coverage index is not trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coverage {
    glyphs: Vec<u16>,
}

struct CoverageRangeRecord {
    start_glyph: u16,
    end_glyph: u16,
    start_coverage_index: u16,
}

impl ReadFrom for CoverageRangeRecord {
    type ReadType = (U16Be, U16Be, U16Be);
    fn read_from((start_glyph, end_glyph, start_coverage_index): (u16, u16, u16)) -> Self {
        CoverageRangeRecord {
            start_glyph,
            end_glyph,
            start_coverage_index,
        }
    }
}

impl ReadBinary for Coverage {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        match ctxt.read_u16be()? {
            1 => {
                let glyph_count = ctxt.read_u16be()?;
                let glyphs = ctxt
                    .read_array::<U16Be>(usize::from(glyph_count))?
                    .to_vec();
                Ok(Coverage { glyphs })
            }
            2 => {
                let coverage_range_count = ctxt.read_u16be()?;
                let coverage_range_array =
                    ctxt.read_array::<CoverageRangeRecord>(usize::from(coverage_range_count))?;
                let mut glyphs = Vec::new();
                for record in &coverage_range_array {
                    if record.start_glyph > record.end_glyph {
                        debug!(
                            "skipping reversed coverage range {}..={}",
                            record.start_glyph, record.end_glyph
                        );
                        continue;
                    }
                    if usize::from(record.start_coverage_index) != glyphs.len() {
                        debug!(
                            "coverage range {}..={} declares start index {}, derived {}",
                            record.start_glyph,
                            record.end_glyph,
                            record.start_coverage_index,
                            glyphs.len()
                        );
                    }
                    let range_len = usize::from(record.end_glyph - record.start_glyph) + 1;
                    if glyphs.len() + range_len > MAX_EXPANDED_GLYPHS {
                        return Err(ParseError::LimitExceeded);
                    }
                    glyphs.extend(record.start_glyph..=record.end_glyph);
                }
                Ok(Coverage { glyphs })
            }
            _ => Err(ParseError::BadVersion),
        }
    }
}

impl Coverage {
    /// The covered glyphs, in coverage index order.
    pub fn glyphs(&self) -> &[u16] {
        &self.glyphs
    }

    pub fn glyph_coverage_value(&self, glyph: u16) -> Option<u16> {
        self.glyphs
            .iter()
            .position(|&covered| covered == glyph)
            .and_then(|index| u16::try_from(index).ok())
    }

    /// Convenience method to count the total number of glyphs covered
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }
}

/// A decoded Class Definition table.
///
/// Glyphs that are not assigned a class belong to class 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassDef {
    classes: FxHashMap<u16, u16>,
}

struct ClassRangeRecord {
    start_glyph: u16,
    end_glyph: u16,
    class_value: u16,
}

impl ReadFrom for ClassRangeRecord {
    type ReadType = (U16Be, U16Be, U16Be);
    fn read_from((start_glyph, end_glyph, class_value): (u16, u16, u16)) -> Self {
        ClassRangeRecord {
            start_glyph,
            end_glyph,
            class_value,
        }
    }
}

impl ReadBinary for ClassDef {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        match ctxt.read_u16be()? {
            1 => {
                let start_glyph = ctxt.read_u16be()?;
                let glyph_count = ctxt.read_u16be()?;
                let class_value_array = ctxt.read_array::<U16Be>(usize::from(glyph_count))?;
                if usize::from(start_glyph) + usize::from(glyph_count) > 0x10000 {
                    debug!("class values past glyph {} are ignored", u16::MAX);
                }
                let classes = (start_glyph..=u16::MAX)
                    .zip(class_value_array.iter())
                    .collect::<FxHashMap<_, _>>();
                Ok(ClassDef { classes })
            }
            2 => {
                let class_range_count = usize::from(ctxt.read_u16be()?);
                let class_range_array = ctxt.read_array::<ClassRangeRecord>(class_range_count)?;
                let mut classes = FxHashMap::default();
                let mut expanded = 0;
                for record in &class_range_array {
                    if record.start_glyph > record.end_glyph {
                        debug!(
                            "skipping reversed class range {}..={}",
                            record.start_glyph, record.end_glyph
                        );
                        continue;
                    }
                    expanded += usize::from(record.end_glyph - record.start_glyph) + 1;
                    if expanded > MAX_EXPANDED_GLYPHS {
                        return Err(ParseError::LimitExceeded);
                    }
                    // Later ranges take precedence over earlier overlapping ones
                    for glyph in record.start_glyph..=record.end_glyph {
                        classes.insert(glyph, record.class_value);
                    }
                }
                Ok(ClassDef { classes })
            }
            format => Err(ParseError::UnsupportedClassDefFormat(format)),
        }
    }
}

impl ClassDef {
    pub fn glyph_class_value(&self, glyph: u16) -> u16 {
        self.classes.get(&glyph).copied().unwrap_or(0)
    }

    /// Number of glyphs explicitly assigned a class.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
