//! Detection of the font container format.

use std::borrow::Cow;

use crate::binary::read::ReadScope;
use crate::error::ParseError;
use crate::tables::{
    FontTableProvider, SfntProvider, APPLE_TTF_MAGIC, CFF_MAGIC, TTF_MAGIC, TYPE1_MAGIC,
};
#[cfg(feature = "flate2")]
use crate::woff::{self, WoffFont};
use crate::woff2::{self, Woff2Font};

/// A font file in one of the supported container formats.
pub enum FontFile<'a> {
    Sfnt(SfntProvider<'a>),
    #[cfg(feature = "flate2")]
    Woff(WoffFont<'a>),
    Woff2(Woff2Font),
}

impl<'a> FontFile<'a> {
    /// Read the container header and table directory of `data`.
    ///
    /// Font collections and unknown signatures fail with `UnsupportedContainerFormat`.
    pub fn new(data: Cow<'a, [u8]>) -> Result<FontFile<'a>, ParseError> {
        let magic = ReadScope::new(&data).ctxt().read_u32be()?;
        match magic {
            TTF_MAGIC | CFF_MAGIC | APPLE_TTF_MAGIC | TYPE1_MAGIC => {
                Ok(FontFile::Sfnt(SfntProvider::new(data)?))
            }
            #[cfg(feature = "flate2")]
            woff::MAGIC => Ok(FontFile::Woff(WoffFont::new(data)?)),
            woff2::MAGIC => Ok(FontFile::Woff2(Woff2Font::new(&data)?)),
            _ => Err(ParseError::UnsupportedContainerFormat(magic)),
        }
    }

    pub fn table_provider(self) -> Box<dyn FontTableProvider + 'a> {
        match self {
            FontFile::Sfnt(provider) => Box::new(provider),
            #[cfg(feature = "flate2")]
            FontFile::Woff(provider) => Box::new(provider),
            FontFile::Woff2(provider) => Box::new(provider),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::TTCF_MAGIC;
    use crate::tag;
    use crate::tests::SfntBuilder;

    #[test]
    fn test_sfnt_magics() {
        for magic in [TTF_MAGIC, CFF_MAGIC, APPLE_TTF_MAGIC, TYPE1_MAGIC] {
            let data = SfntBuilder::new()
                .sfnt_version(magic)
                .table(tag::MAXP, &[0, 0, 0x50, 0, 0, 1])
                .build();
            let provider = FontFile::new(Cow::Owned(data)).unwrap().table_provider();
            assert_eq!(provider.sfnt_version(), magic);
            assert!(provider.has_table(tag::MAXP));
        }
    }

    #[test]
    fn test_unsupported_formats() {
        let collection = TTCF_MAGIC.to_be_bytes();
        assert_eq!(
            FontFile::new(Cow::Borrowed(&collection[..])).map(|_| ()),
            Err(ParseError::UnsupportedContainerFormat(TTCF_MAGIC))
        );
        assert_eq!(
            FontFile::new(Cow::Borrowed(&b"abcd"[..])).map(|_| ()),
            Err(ParseError::UnsupportedContainerFormat(0x61626364))
        );
        assert_eq!(
            FontFile::new(Cow::Borrowed(&[0u8, 1][..])).map(|_| ()),
            Err(ParseError::BadEof)
        );
    }
}
