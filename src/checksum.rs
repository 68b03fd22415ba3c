#![deny(missing_docs)]

use std::num::Wrapping;

use crate::binary::read::ReadScope;
use crate::binary::U32Be;
use crate::error::ParseError;

/// Byte range of the `checkSumAdjustment` field in the `head` table.
const HEAD_CHECK_SUM_ADJUSTMENT: std::ops::Range<usize> = 8..12;

/// Calculate a checksum of `data` according to the OpenType table checksum algorithm
///
/// Data that is not a multiple of four bytes long is treated as if padded with zeros.
///
/// https://docs.microsoft.com/en-us/typography/opentype/spec/otff#calculating-checksums
pub fn table_checksum(data: &[u8]) -> Result<Wrapping<u32>, ParseError> {
    let whole = data.len() / 4;
    let mut ctxt = ReadScope::new(data).ctxt();
    let array = ctxt.read_array::<U32Be>(whole)?;
    let sum: Wrapping<u32> = array.iter().map(Wrapping).sum();

    let tail = &data[whole * 4..];
    let mut padded = [0u8; 4];
    padded[..tail.len()].copy_from_slice(tail);
    Ok(sum + Wrapping(u32::from_be_bytes(padded)))
}

/// Calculate the checksum of a `head` table, treating `checkSumAdjustment` as zero.
pub fn head_checksum(data: &[u8]) -> Result<Wrapping<u32>, ParseError> {
    if data.len() < HEAD_CHECK_SUM_ADJUSTMENT.end {
        return table_checksum(data);
    }
    let mut copy = data.to_vec();
    copy[HEAD_CHECK_SUM_ADJUSTMENT].fill(0);
    table_checksum(&copy)
}
