// In-memory font builders shared by the unit and integration tests.

const SFNT_HEADER_SIZE: usize = 12;
const SFNT_RECORD_SIZE: usize = 16;

const HEAD_TAG: u32 = u32::from_be_bytes(*b"head");

fn push_u16(data: &mut Vec<u8>, value: u16) {
    data.extend_from_slice(&value.to_be_bytes());
}

fn push_i16(data: &mut Vec<u8>, value: i16) {
    data.extend_from_slice(&value.to_be_bytes());
}

fn push_u32(data: &mut Vec<u8>, value: u32) {
    data.extend_from_slice(&value.to_be_bytes());
}

fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

/// OpenType table checksum, with `checkSumAdjustment` zeroed for `head`.
pub fn sfnt_checksum(tag: u32, data: &[u8]) -> u32 {
    let mut padded = data.to_vec();
    padded.resize(padded_len(data.len()), 0);
    if tag == HEAD_TAG && padded.len() >= 12 {
        padded[8..12].fill(0);
    }
    padded
        .chunks_exact(4)
        .map(|word| u32::from_be_bytes([word[0], word[1], word[2], word[3]]))
        .fold(0u32, u32::wrapping_add)
}

/// Builds an SFNT font file from raw table data. Table records are sorted by tag.
#[derive(Debug, Clone)]
pub struct SfntBuilder {
    sfnt_version: u32,
    tables: Vec<(u32, Vec<u8>)>,
}

impl SfntBuilder {
    pub fn new() -> Self {
        SfntBuilder {
            sfnt_version: 0x00010000,
            tables: Vec::new(),
        }
    }

    pub fn sfnt_version(mut self, sfnt_version: u32) -> Self {
        self.sfnt_version = sfnt_version;
        self
    }

    pub fn table(mut self, tag: u32, data: &[u8]) -> Self {
        self.tables.retain(|(existing, _)| *existing != tag);
        self.tables.push((tag, data.to_vec()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut tables = self.tables.clone();
        tables.sort_by_key(|(tag, _)| *tag);

        let num_tables = tables.len() as u16;
        let entry_selector = if num_tables == 0 {
            0
        } else {
            15 - num_tables.leading_zeros() as u16
        };
        let search_range = (1u16 << entry_selector) * 16;
        let range_shift = (num_tables * 16).saturating_sub(search_range);

        let mut data = Vec::new();
        push_u32(&mut data, self.sfnt_version);
        push_u16(&mut data, num_tables);
        push_u16(&mut data, search_range);
        push_u16(&mut data, entry_selector);
        push_u16(&mut data, range_shift);

        let mut offset = SFNT_HEADER_SIZE + SFNT_RECORD_SIZE * tables.len();
        for (tag, table) in &tables {
            push_u32(&mut data, *tag);
            push_u32(&mut data, sfnt_checksum(*tag, table));
            push_u32(&mut data, offset as u32);
            push_u32(&mut data, table.len() as u32);
            offset += padded_len(table.len());
        }
        for (_, table) in &tables {
            data.extend_from_slice(table);
            data.resize(padded_len(data.len()), 0);
        }
        data
    }
}

/// A version 1.0 `head` table.
pub fn head_table(units_per_em: u16) -> Vec<u8> {
    let mut data = Vec::new();
    push_u32(&mut data, 0x00010000);
    push_u32(&mut data, 0x00010000);
    push_u32(&mut data, 0);
    push_u32(&mut data, 0x5F0F3CF5);
    push_u16(&mut data, 0);
    push_u16(&mut data, units_per_em);
    data.extend_from_slice(&[0; 16]);
    for bound in [0, -200, 1000, 800] {
        push_i16(&mut data, bound);
    }
    push_u16(&mut data, 0);
    push_u16(&mut data, 8);
    push_i16(&mut data, 2);
    push_i16(&mut data, 0);
    push_i16(&mut data, 0);
    data
}

/// A version 0.5 `maxp` table.
pub fn maxp_table(num_glyphs: u16) -> Vec<u8> {
    let mut data = Vec::new();
    push_u32(&mut data, 0x00005000);
    push_u16(&mut data, num_glyphs);
    data
}

pub fn hhea_table(num_h_metrics: u16) -> Vec<u8> {
    let mut data = Vec::new();
    push_u16(&mut data, 1);
    push_u16(&mut data, 0);
    push_i16(&mut data, 800);
    push_i16(&mut data, -200);
    push_i16(&mut data, 0);
    push_u16(&mut data, 1000);
    data.extend_from_slice(&[0; 20]);
    push_i16(&mut data, 0);
    push_u16(&mut data, num_h_metrics);
    data
}

pub fn hmtx_table(advances: &[u16]) -> Vec<u8> {
    let mut data = Vec::new();
    for &advance in advances {
        push_u16(&mut data, advance);
        push_i16(&mut data, 0);
    }
    data
}

/// A version 0 `kern` table with a single horizontal format 0 subtable.
pub fn kern_table(pairs: &[(u16, u16, i16)]) -> Vec<u8> {
    let mut data = Vec::new();
    push_u16(&mut data, 0);
    push_u16(&mut data, 1);
    push_u16(&mut data, 0);
    push_u16(&mut data, (14 + 6 * pairs.len()) as u16);
    data.push(0);
    data.push(1);
    push_u16(&mut data, pairs.len() as u16);
    push_u16(&mut data, 0);
    push_u16(&mut data, 0);
    push_u16(&mut data, 0);
    for &(left, right, value) in pairs {
        push_u16(&mut data, left);
        push_u16(&mut data, right);
        push_i16(&mut data, value);
    }
    data
}

fn coverage_format1(glyphs: &[u16]) -> Vec<u8> {
    let mut data = Vec::new();
    push_u16(&mut data, 1);
    push_u16(&mut data, glyphs.len() as u16);
    for &glyph in glyphs {
        push_u16(&mut data, glyph);
    }
    data
}

fn class_def_format2(classes: &[(u16, u16)]) -> Vec<u8> {
    let mut data = Vec::new();
    push_u16(&mut data, 2);
    push_u16(&mut data, classes.len() as u16);
    for &(glyph, class) in classes {
        push_u16(&mut data, glyph);
        push_u16(&mut data, glyph);
        push_u16(&mut data, class);
    }
    data
}

/// A PairPos format 1 subtable with an X advance on the first glyph of each pair.
///
/// Each entry is a covered first glyph and its (second glyph, value) records. The coverage
/// table follows the pair sets.
pub fn pair_pos_format1(pair_sets: &[(u16, &[(u16, i16)])]) -> Vec<u8> {
    let header_size = 10 + 2 * pair_sets.len();
    let mut pair_set_data = Vec::new();
    let mut offsets = Vec::new();
    for (_, records) in pair_sets {
        offsets.push((header_size + pair_set_data.len()) as u16);
        push_u16(&mut pair_set_data, records.len() as u16);
        for &(second, value) in records.iter() {
            push_u16(&mut pair_set_data, second);
            push_i16(&mut pair_set_data, value);
        }
    }
    let first_glyphs: Vec<u16> = pair_sets.iter().map(|(first, _)| *first).collect();

    let mut data = Vec::new();
    push_u16(&mut data, 1);
    push_u16(&mut data, (header_size + pair_set_data.len()) as u16);
    push_u16(&mut data, 0x0004);
    push_u16(&mut data, 0);
    push_u16(&mut data, pair_sets.len() as u16);
    for offset in offsets {
        push_u16(&mut data, offset);
    }
    data.extend(pair_set_data);
    data.extend(coverage_format1(&first_glyphs));
    data
}

/// A PairPos format 2 subtable with an X advance on the first glyph of each pair.
///
/// `matrix` holds `class2_count` values per class 1 row. The class definitions and coverage
/// table follow the matrix, in that order.
pub fn pair_pos_format2(
    coverage: &[u16],
    class1: &[(u16, u16)],
    class2: &[(u16, u16)],
    class2_count: u16,
    matrix: &[i16],
) -> Vec<u8> {
    let class1_count = matrix.len() as u16 / class2_count;
    let class_def1 = class_def_format2(class1);
    let class_def2 = class_def_format2(class2);
    let class_def1_offset = 16 + 2 * matrix.len();
    let class_def2_offset = class_def1_offset + class_def1.len();
    let coverage_offset = class_def2_offset + class_def2.len();

    let mut data = Vec::new();
    push_u16(&mut data, 2);
    push_u16(&mut data, coverage_offset as u16);
    push_u16(&mut data, 0x0004);
    push_u16(&mut data, 0);
    push_u16(&mut data, class_def1_offset as u16);
    push_u16(&mut data, class_def2_offset as u16);
    push_u16(&mut data, class1_count);
    push_u16(&mut data, class2_count);
    for &value in matrix {
        push_i16(&mut data, value);
    }
    data.extend(class_def1);
    data.extend(class_def2);
    data.extend(coverage_format1(coverage));
    data
}

/// Wrap `subtable` in a format 1 extension subtable for `lookup_type`.
pub fn extension_subtable(lookup_type: u16, subtable: &[u8]) -> Vec<u8> {
    let mut data = Vec::new();
    push_u16(&mut data, 1);
    push_u16(&mut data, lookup_type);
    push_u32(&mut data, 8);
    data.extend_from_slice(subtable);
    data
}

/// A version 1.0 `GPOS` table without scripts or features, holding the given lookups.
///
/// Each lookup is a lookup type and its subtables. Lookups are laid out one after the other,
/// each followed directly by its subtables.
pub fn gpos_table(lookups: &[(u16, Vec<Vec<u8>>)]) -> Vec<u8> {
    const HEADER_SIZE: usize = 10;

    let lookup_list_size = 2 + 2 * lookups.len();
    let mut lookup_data = Vec::new();
    let mut lookup_offsets = Vec::new();
    for (lookup_type, subtables) in lookups {
        lookup_offsets.push((lookup_list_size + lookup_data.len()) as u16);
        let lookup_header_size = 6 + 2 * subtables.len();
        let mut lookup = Vec::new();
        push_u16(&mut lookup, *lookup_type);
        push_u16(&mut lookup, 0);
        push_u16(&mut lookup, subtables.len() as u16);
        let mut subtable_offset = lookup_header_size;
        for subtable in subtables {
            push_u16(&mut lookup, subtable_offset as u16);
            subtable_offset += subtable.len();
        }
        for subtable in subtables {
            lookup.extend_from_slice(subtable);
        }
        lookup_data.extend(lookup);
    }

    let mut data = Vec::new();
    push_u16(&mut data, 1);
    push_u16(&mut data, 0);
    push_u16(&mut data, 0);
    push_u16(&mut data, 0);
    push_u16(&mut data, HEADER_SIZE as u16);
    push_u16(&mut data, lookups.len() as u16);
    for offset in lookup_offsets {
        push_u16(&mut data, offset);
    }
    data.extend(lookup_data);
    data
}
