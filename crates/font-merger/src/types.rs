//! Newtypes for the ids that flow through a merge.

use std::fmt::{self, Display, Formatter};

use read_fonts::types::Tag;

macro_rules! u16_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u16);

        impl $name {
            pub const fn new(id: u16) -> Self {
                Self(id)
            }

            pub const fn to_u16(self) -> u16 {
                self.0
            }

            pub const fn to_u32(self) -> u32 {
                self.0 as u32
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $label, self.0)
            }
        }
    };
}

u16_id!(
    /// Glyph id in one of the source fonts
    GlyphId,
    "GID"
);

u16_id!(
    /// Glyph id in the merged font
    MegaGlyphId,
    "MGID"
);

/// A table tag given by name, e.g. on the command line.
#[repr(transparent)]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TableTag(Tag);

impl TableTag {
    /// Parse a tag of at most four bytes, padding short names with spaces.
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        (!bytes.is_empty() && bytes.len() <= 4).then(|| {
            let mut arr = [b' '; 4];
            arr[..bytes.len()].copy_from_slice(bytes);
            Self(Tag::new(&arr))
        })
    }

    pub fn tag(&self) -> Tag {
        self.0
    }
}

impl Display for TableTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_display() {
        assert_eq!(GlyphId::new(42).to_string(), "GID42");
        assert_eq!(MegaGlyphId::new(7).to_u32(), 7);
        assert_eq!(MegaGlyphId::new(100).to_string(), "MGID100");
    }

    #[test]
    fn test_table_tag_parse() {
        assert_eq!(TableTag::parse("OS/2").unwrap().to_string(), "OS/2");
        assert_eq!(TableTag::parse("cvt").unwrap().tag(), Tag::new(b"cvt "));
        assert!(TableTag::parse("toolong").is_none());
        assert!(TableTag::parse("").is_none());
    }
}
