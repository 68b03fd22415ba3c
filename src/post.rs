//! `post` table parsing.
//!
//! <https://docs.microsoft.com/en-us/typography/opentype/spec/post>

use crate::binary::read::{ReadBinary, ReadBinaryDep, ReadCtxt};
use crate::binary::U16Be;
use crate::error::ParseError;
use crate::tables::Fixed;
use std::str;

/// A decoded `post` table.
#[derive(Debug, Clone, PartialEq)]
pub struct PostTable {
    pub header: Header,
    pub opt_sub_table: Option<SubTable>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub version: i32,
    pub italic_angle: Fixed,
    pub underline_position: i16,
    pub underline_thickness: i16,
    pub is_fixed_pitch: u32,
    pub min_mem_type_42: u32,
    pub max_mem_type_42: u32,
    pub min_mem_type_1: u32,
    pub max_mem_type_1: u32,
}

/// Glyph names of a version 2.0 table.
#[derive(Debug, Clone, PartialEq)]
pub struct SubTable {
    pub glyph_name_index: Vec<u16>,
    pub names: Vec<Box<[u8]>>,
}

impl ReadBinary for Header {
    type HostType<'a> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let version = ctxt.read_i32be()?;
        let italic_angle = ctxt.read::<Fixed>()?;
        let underline_position = ctxt.read_i16be()?;
        let underline_thickness = ctxt.read_i16be()?;
        let is_fixed_pitch = ctxt.read_u32be()?;
        let min_mem_type_42 = ctxt.read_u32be()?;
        let max_mem_type_42 = ctxt.read_u32be()?;
        let min_mem_type_1 = ctxt.read_u32be()?;
        let max_mem_type_1 = ctxt.read_u32be()?;

        Ok(Header {
            version,
            italic_angle,
            underline_position,
            underline_thickness,
            is_fixed_pitch,
            min_mem_type_42,
            max_mem_type_42,
            min_mem_type_1,
            max_mem_type_1,
        })
    }
}

impl ReadBinaryDep for PostTable {
    type Args<'a> = u16; // maxp.num_glyphs
    type HostType<'a> = Self;

    fn read_dep<'a>(ctxt: &mut ReadCtxt<'a>, num_glyphs: u16) -> Result<Self, ParseError> {
        let header = ctxt.read::<Header>()?;
        let opt_sub_table = match header.version {
            0x00020000 => {
                let num_names_glyphs = ctxt.read_u16be()?;
                ctxt.check(num_names_glyphs == num_glyphs)?;
                let glyph_name_index = ctxt
                    .read_array::<U16Be>(usize::from(num_names_glyphs))?
                    .to_vec();

                // Indices past the standard Macintosh set refer to the Pascal strings that follow
                let num_names = glyph_name_index
                    .iter()
                    .map(|&index| usize::from(index))
                    .filter(|&index| index >= FORMAT_1_NAMES.len())
                    .map(|index| index - FORMAT_1_NAMES.len() + 1)
                    .max()
                    .unwrap_or(0);
                let mut names = Vec::with_capacity(num_names);
                for _ in 0..num_names {
                    let length = ctxt.read_u8()?;
                    let bytes = ctxt.read_slice(usize::from(length))?;
                    names.push(Box::from(bytes));
                }

                Some(SubTable {
                    glyph_name_index,
                    names,
                })
            }
            // Version 2.5 is deprecated, its names are not resolved
            0x00010000 | 0x00025000 | 0x00030000 => None,
            _ => return Err(ParseError::BadVersion),
        };

        Ok(PostTable {
            header,
            opt_sub_table,
        })
    }
}

impl PostTable {
    /// The PostScript name of `glyph_index`, if the table records one.
    pub fn glyph_name(&self, glyph_index: u16) -> Result<Option<&str>, ParseError> {
        match (self.header.version, &self.opt_sub_table) {
            (0x00010000, _) => Ok(FORMAT_1_NAMES.get(usize::from(glyph_index)).copied()),
            (0x00020000, Some(sub_table)) => {
                let name_index = match sub_table.glyph_name_index.get(usize::from(glyph_index)) {
                    Some(&name_index) => usize::from(name_index),
                    None => return Ok(None),
                };
                if let Some(&name) = FORMAT_1_NAMES.get(name_index) {
                    return Ok(Some(name));
                }
                let bytes = sub_table
                    .names
                    .get(name_index - FORMAT_1_NAMES.len())
                    .ok_or(ParseError::BadIndex)?;
                str::from_utf8(bytes)
                    .map(Some)
                    .map_err(|_| ParseError::BadValue)
            }
            // If the table is version 2, the sub-table should exist
            (0x00020000, None) => Err(ParseError::BadValue),
            _ => Ok(None),
        }
    }
}

static FORMAT_1_NAMES: &[&str; 258] = &[
    ".notdef",
    ".null",
    "nonmarkingreturn",
    "space",
    "exclam",
    "quotedbl",
    "numbersign",
    "dollar",
    "percent",
    "ampersand",
    "quotesingle",
    "parenleft",
    "parenright",
    "asterisk",
    "plus",
    "comma",
    "hyphen",
    "period",
    "slash",
    "zero",
    "one",
    "two",
    "three",
    "four",
    "five",
    "six",
    "seven",
    "eight",
    "nine",
    "colon",
    "semicolon",
    "less",
    "equal",
    "greater",
    "question",
    "at",
    "A",
    "B",
    "C",
    "D",
    "E",
    "F",
    "G",
    "H",
    "I",
    "J",
    "K",
    "L",
    "M",
    "N",
    "O",
    "P",
    "Q",
    "R",
    "S",
    "T",
    "U",
    "V",
    "W",
    "X",
    "Y",
    "Z",
    "bracketleft",
    "backslash",
    "bracketright",
    "asciicircum",
    "underscore",
    "grave",
    "a",
    "b",
    "c",
    "d",
    "e",
    "f",
    "g",
    "h",
    "i",
    "j",
    "k",
    "l",
    "m",
    "n",
    "o",
    "p",
    "q",
    "r",
    "s",
    "t",
    "u",
    "v",
    "w",
    "x",
    "y",
    "z",
    "braceleft",
    "bar",
    "braceright",
    "asciitilde",
    "Adieresis",
    "Aring",
    "Ccedilla",
    "Eacute",
    "Ntilde",
    "Odieresis",
    "Udieresis",
    "aacute",
    "agrave",
    "acircumflex",
    "adieresis",
    "atilde",
    "aring",
    "ccedilla",
    "eacute",
    "egrave",
    "ecircumflex",
    "edieresis",
    "iacute",
    "igrave",
    "icircumflex",
    "idieresis",
    "ntilde",
    "oacute",
    "ograve",
    "ocircumflex",
    "odieresis",
    "otilde",
    "uacute",
    "ugrave",
    "ucircumflex",
    "udieresis",
    "dagger",
    "degree",
    "cent",
    "sterling",
    "section",
    "bullet",
    "paragraph",
    "germandbls",
    "registered",
    "copyright",
    "trademark",
    "acute",
    "dieresis",
    "notequal",
    "AE",
    "Oslash",
    "infinity",
    "plusminus",
    "lessequal",
    "greaterequal",
    "yen",
    "mu",
    "partialdiff",
    "summation",
    "product",
    "pi",
    "integral",
    "ordfeminine",
    "ordmasculine",
    "Omega",
    "ae",
    "oslash",
    "questiondown",
    "exclamdown",
    "logicalnot",
    "radical",
    "florin",
    "approxequal",
    "Delta",
    "guillemotleft",
    "guillemotright",
    "ellipsis",
    "nonbreakingspace",
    "Agrave",
    "Atilde",
    "Otilde",
    "OE",
    "oe",
    "endash",
    "emdash",
    "quotedblleft",
    "quotedblright",
    "quoteleft",
    "quoteright",
    "divide",
    "lozenge",
    "ydieresis",
    "Ydieresis",
    "fraction",
    "currency",
    "guilsinglleft",
    "guilsinglright",
    "fi",
    "fl",
    "daggerdbl",
    "periodcentered",
    "quotesinglbase",
    "quotedblbase",
    "perthousand",
    "Acircumflex",
    "Ecircumflex",
    "Aacute",
    "Edieresis",
    "Egrave",
    "Iacute",
    "Icircumflex",
    "Idieresis",
    "Igrave",
    "Oacute",
    "Ocircumflex",
    "apple",
    "Ograve",
    "Uacute",
    "Ucircumflex",
    "Ugrave",
    "dotlessi",
    "circumflex",
    "tilde",
    "macron",
    "breve",
    "dotaccent",
    "ring",
    "cedilla",
    "hungarumlaut",
    "ogonek",
    "caron",
    "Lslash",
    "lslash",
    "Scaron",
    "scaron",
    "Zcaron",
    "zcaron",
    "brokenbar",
    "Eth",
    "eth",
    "Yacute",
    "yacute",
    "Thorn",
    "thorn",
    "minus",
    "multiply",
    "onesuperior",
    "twosuperior",
    "threesuperior",
    "onehalf",
    "onequarter",
    "threequarters",
    "franc",
    "Gbreve",
    "gbreve",
    "Idotaccent",
    "Scedilla",
    "scedilla",
    "Cacute",
    "cacute",
    "Ccaron",
    "ccaron",
    "dcroat",
];
