#[allow(dead_code)]
mod common;

use std::io::Cursor;
use std::rc::Rc;

use sfnt_kern::error::ParseError;
use sfnt_kern::tag;
use sfnt_kern::Font;

use common::{
    gpos_table, head_table, hhea_table, hmtx_table, kern_table, maxp_table, pair_pos_format1,
    SfntBuilder,
};

const PAIR_POS: u16 = 2;
const SINGLE_POS: u16 = 1;

fn gpos_kerning() -> Vec<u8> {
    let pairs: &[(u16, i16)] = &[(2, -50)];
    gpos_table(&[(PAIR_POS, vec![pair_pos_format1(&[(1, pairs)])])])
}

fn base_font() -> SfntBuilder {
    SfntBuilder::new()
        .table(tag::HEAD, &head_table(1000))
        .table(tag::MAXP, &maxp_table(5))
}

#[test]
fn gpos_is_preferred_by_default() {
    let data = base_font()
        .table(tag::GPOS, &gpos_kerning())
        .table(tag::KERN, &kern_table(&[(1, 2, -10), (3, 4, -20)]))
        .build();
    let mut font = Font::parse(&data).unwrap();

    let kerning = font.kerning(false).unwrap();
    assert_eq!(kerning.kern_pair(1, 2), Some(-50));
    assert_eq!(kerning.kern_pair(3, 4), None);

    let kerning = font.kerning(true).unwrap();
    assert_eq!(kerning.kern_pair(1, 2), Some(-10));
    assert_eq!(kerning.kern_pair(3, 4), Some(-20));
}

#[test]
fn falls_back_to_kern_without_pair_adjustments() {
    let data = base_font()
        .table(tag::GPOS, &gpos_table(&[(SINGLE_POS, vec![vec![0, 1, 0, 0]])]))
        .table(tag::KERN, &kern_table(&[(1, 2, -10)]))
        .build();
    let mut font = Font::parse(&data).unwrap();
    let kerning = font.kerning(false).unwrap();
    assert_eq!(kerning.kern_pair(1, 2), Some(-10));
}

#[test]
fn falls_back_to_gpos_without_kern() {
    let data = base_font().table(tag::GPOS, &gpos_kerning()).build();
    let mut font = Font::parse(&data).unwrap();
    let kerning = font.kerning(true).unwrap();
    assert_eq!(kerning.kern_pair(1, 2), Some(-50));
}

#[test]
fn malformed_gpos_does_not_fall_back() {
    let pairs: &[(u16, i16)] = &[(2, -50)];
    let mut subtable = pair_pos_format1(&[(1, pairs)]);
    // Drop the covered glyph of the coverage table at the end
    subtable.truncate(subtable.len() - 2);
    let data = base_font()
        .table(tag::GPOS, &gpos_table(&[(PAIR_POS, vec![subtable])]))
        .table(tag::KERN, &kern_table(&[(1, 2, -10)]))
        .build();
    let mut font = Font::parse(&data).unwrap();

    assert_eq!(
        font.kerning(false).map(|_| ()),
        Err(ParseError::InvalidKerningSubtable(22))
    );
    assert_eq!(font.kerning(true).unwrap().kern_pair(1, 2), Some(-10));
}

#[test]
fn no_kerning_sources() {
    let data = base_font().build();
    let mut font = Font::parse(&data).unwrap();
    assert_eq!(
        font.kerning(false).map(|_| ()),
        Err(ParseError::MissingTable(tag::KERN))
    );
    assert_eq!(
        font.kerning(true).map(|_| ()),
        Err(ParseError::MissingTable(tag::GPOS))
    );
}

#[test]
fn kern_table_is_cached() {
    let data = base_font()
        .table(tag::KERN, &kern_table(&[(1, 2, -10)]))
        .build();
    let mut font = Font::parse(&data).unwrap();
    let first = font.kerning(true).unwrap();
    let second = font.kerning(true).unwrap();
    assert!(Rc::ptr_eq(&first, &second));
}

#[test]
fn dependent_tables() {
    let mut post = Vec::new();
    post.extend_from_slice(&0x0002_0000u32.to_be_bytes());
    post.extend_from_slice(&[0; 28]);
    post.extend_from_slice(&[0, 2, 0, 0, 1, 2]);
    post.extend_from_slice(b"\x05hello");
    let data = SfntBuilder::new()
        .table(tag::HEAD, &head_table(1000))
        .table(tag::MAXP, &maxp_table(2))
        .table(tag::HHEA, &hhea_table(2))
        .table(tag::HMTX, &hmtx_table(&[500, 700]))
        .table(tag::POST, &post)
        .build();
    let mut font = Font::parse(&data).unwrap();

    let post = font.post_table().unwrap();
    assert_eq!(post.glyph_name(0).unwrap(), Some(".notdef"));
    assert_eq!(post.glyph_name(1).unwrap(), Some("hello"));
    let hmtx = font.hmtx_table().unwrap();
    assert_eq!(hmtx.advances(), vec![500, 700]);
    assert_eq!(font.head_table().unwrap().units_per_em, 1000);
}

#[test]
fn parse_strict_decodes_everything() {
    let data = base_font()
        .table(tag::HHEA, &hhea_table(2))
        .table(tag::HMTX, &hmtx_table(&[500, 600, 0, 0, 0]))
        .table(tag::GPOS, &gpos_kerning())
        .table(tag::KERN, &kern_table(&[(1, 2, -10)]))
        .build();
    let font = Font::parse_strict(&data).unwrap();
    for tag in font.tags() {
        assert!(font.section(tag).unwrap().is_loaded());
    }
}

#[test]
fn parse_strict_checks_checksums() {
    let mut data = base_font().build();
    // Checksum of the second record, `maxp`
    data[12 + 16 + 4] ^= 0xFF;
    assert!(Font::parse(&data).is_ok());
    assert_eq!(
        Font::parse_strict(&data).map(|_| ()),
        Err(ParseError::InvalidChecksum(tag::MAXP))
    );
}

#[test]
fn parse_strict_reports_table_errors() {
    let data = base_font().table(tag::HHEA, &[0, 1]).build();
    assert_eq!(
        Font::parse_strict(&data).map(|_| ()),
        Err(ParseError::BadEof)
    );
}

#[test]
fn unsupported_containers() {
    assert_eq!(
        Font::parse(b"ttcf\0\x01\0\0").map(|_| ()),
        Err(ParseError::UnsupportedContainerFormat(tag::TTCF))
    );
    assert_eq!(
        Font::parse(b"\0\0").map(|_| ()),
        Err(ParseError::BadEof)
    );
}

#[test]
fn from_reader_starts_at_the_beginning() {
    let data = base_font().build();
    let mut cursor = Cursor::new(data);
    cursor.set_position(10);
    let mut font = Font::from_reader(cursor).unwrap();
    assert_eq!(font.maxp_table().unwrap().num_glyphs, 5);
}

#[test]
fn display_lists_tags() {
    let data = base_font().sfnt_version(tag::OTTO).build();
    let font = Font::parse(&data).unwrap();
    assert_eq!(
        font.to_string(),
        "Parsed font with scalerType=0x4f54544f (OTTO)\nhead\nmaxp"
    );
}

#[cfg(feature = "flate2")]
mod woff {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn zlib(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn woff(tables: &[(u32, Vec<u8>)]) -> Vec<u8> {
        let data_start = 44 + 20 * tables.len();
        let mut directory = Vec::new();
        let mut table_data = Vec::new();
        for (tag, data) in tables {
            let compressed = zlib(data);
            let stored = if compressed.len() < data.len() {
                compressed
            } else {
                data.clone()
            };
            directory.extend_from_slice(&tag.to_be_bytes());
            directory.extend_from_slice(&((data_start + table_data.len()) as u32).to_be_bytes());
            directory.extend_from_slice(&(stored.len() as u32).to_be_bytes());
            directory.extend_from_slice(&(data.len() as u32).to_be_bytes());
            directory.extend_from_slice(&common::sfnt_checksum(*tag, data).to_be_bytes());
            table_data.extend(stored);
            table_data.resize((table_data.len() + 3) & !3, 0);
        }

        let mut file = Vec::new();
        file.extend_from_slice(b"wOFF");
        file.extend_from_slice(&0x00010000u32.to_be_bytes());
        file.extend_from_slice(&((data_start + table_data.len()) as u32).to_be_bytes());
        file.extend_from_slice(&(tables.len() as u16).to_be_bytes());
        file.extend_from_slice(&[0; 2]);
        file.extend_from_slice(&[0; 4]);
        file.extend_from_slice(&[0, 1, 0, 0]);
        file.extend_from_slice(&[0; 20]);
        file.extend(directory);
        file.extend(table_data);
        file
    }

    #[test]
    fn kerning_from_compressed_tables() {
        let pairs: Vec<(u16, u16, i16)> = (0..40).map(|glyph| (glyph, glyph + 1, -5)).collect();
        let data = woff(&[
            (tag::GLYF, vec![0; 400]),
            (tag::HEAD, head_table(1000)),
            (tag::KERN, kern_table(&pairs)),
            (tag::MAXP, maxp_table(41)),
        ]);
        let mut font = Font::parse_strict(&data).unwrap();
        assert_eq!(font.sfnt_version(), 0x00010000);
        let section = font.section(tag::GLYF).unwrap();
        assert!(section.length < section.orig_length);

        let kerning = font.kerning(false).unwrap();
        assert_eq!(kerning.kern_pair(10, 11), Some(-5));
        assert_eq!(kerning.kern_pair(11, 10), None);
    }

    #[test]
    fn checksum_mismatch() {
        let mut data = woff(&[(tag::HEAD, head_table(1000)), (tag::MAXP, maxp_table(1))]);
        // origChecksum of the `maxp` entry
        data[44 + 20 + 16] ^= 0xFF;
        assert_eq!(
            Font::parse_strict(&data).map(|_| ()),
            Err(ParseError::InvalidChecksum(tag::MAXP))
        );
    }
}
