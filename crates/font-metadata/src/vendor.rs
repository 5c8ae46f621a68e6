//! OS/2 vendor id.

use std::fmt::{self, Display, Formatter};

use anyhow::{Result, bail};
use log::{info, warn};
use read_fonts::TableProvider;
use robotonoto_font_ops::rewrite_font;
use write_fonts::{from_obj::ToOwnedTable, tables::os2::Os2, types::Tag};

/// Four-character vendor id, space padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vendor(Tag);

impl Vendor {
    pub fn new(id: &str) -> Result<Self> {
        if id.is_empty() || id.len() > 4 || !id.chars().all(|c| c.is_ascii_graphic()) {
            bail!("Invalid vendor id '{id}': expected one to four printable ASCII characters");
        }
        let mut bytes = [b' '; 4];
        bytes[..id.len()].copy_from_slice(id.as_bytes());
        Ok(Self(Tag::new(&bytes)))
    }

    pub fn tag(&self) -> Tag {
        self.0
    }

    pub fn apply(&self, data: &[u8]) -> Result<Vec<u8>> {
        let tag = self.0;
        rewrite_font(data, |font, builder| {
            match font.os2() {
                Ok(os2) => {
                    let mut os2: Os2 = os2.to_owned_table();
                    os2.ach_vend_id = tag;
                    builder.add_table(&os2)?;
                    info!("Set vendor id to '{tag}'");
                }
                Err(_) => warn!("No OS/2 table; vendor id not set"),
            }
            Ok(())
        })
    }
}

impl Display for Vendor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
