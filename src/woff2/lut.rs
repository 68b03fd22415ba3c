use crate::tag::*;

// When table tags are encoded into a WOFF2 TableDirectoryEntry this table is used to provide a one
// 5-bit encoding for common tables. The tables are in the order that they are encoded such that
// the value read from the file can be looked up in this array to get the corresponding tag. If the
// value is 0b11111 (63), which is not present in this table, then this is an indication that a
// 4-byte tag follows the tag in the data stream.
// https://www.w3.org/TR/WOFF2/#table_dir_format
pub static KNOWN_TABLE_TAGS: [u32; 63] = [
    CMAP, HEAD, HHEA, HMTX, MAXP, NAME, OS_2, POST, CVT, FPGM, GLYF, LOCA, PREP, CFF, VORG, EBDT,
    EBLC, GASP, HDMX, KERN, LTSH, PCLT, VDMX, VHEA, VMTX, BASE, GDEF, GPOS, GSUB, EBSC, JSTF, MATH,
    CBDT, CBLC, COLR, CPAL, SVG, SBIX, ACNT, AVAR, BDAT, BLOC, BSLN, CVAR, FDSC, FEAT, FMTX, FVAR,
    GVAR, HSTY, JUST, LCAR, MORT, MORX, OPBD, PROP, TRAK, ZAPF, SILF, GLAT, GLOC, FEAT2, SILL,
];
