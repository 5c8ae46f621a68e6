//! Font revision and timestamps.

use std::env;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use log::{debug, info};
use read_fonts::TableProvider;
use robotonoto_font_ops::rewrite_font;
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::head::Head,
    types::{Fixed, LongDateTime},
};

/// Seconds between 1904-01-01 and 1970-01-01
const MAC_EPOCH_OFFSET: i64 = 2_082_844_800;

/// Release version in the form `vMAJOR.MINOR[.PATCH]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
    /// The version as written, e.g. `v0.0.1`
    pub tag: String,
}

impl FontVersion {
    pub fn parse(value: &str) -> Result<Self> {
        let invalid = || anyhow!("Invalid version '{value}'. Expected vMAJOR.MINOR[.PATCH].");

        let digits = value.strip_prefix('v').unwrap_or(value);
        let parts = digits
            .split('.')
            .map(|p| p.parse::<u16>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| invalid())?;

        let (major, minor, patch) = match parts.as_slice() {
            [major, minor] => (*major, *minor, 0),
            [major, minor, patch] => (*major, *minor, *patch),
            _ => return Err(invalid()),
        };
        if minor > 9 || patch > 99 {
            return Err(anyhow!("Version '{value}' does not fit a three-digit font revision"));
        }

        Ok(Self { major, minor, patch, tag: value.to_string() })
    }

    /// `head.fontRevision`: `MAJOR + (MINOR * 100 + PATCH) / 1000`
    pub fn revision(&self) -> Fixed {
        let fraction = f64::from(self.minor * 100 + self.patch) / 1000.0;
        Fixed::from_f64(f64::from(self.major) + fraction)
    }

    pub fn apply(&self, data: &[u8]) -> Result<Vec<u8>> {
        let revision = self.revision();
        let result = rewrite_font(data, |font, builder| {
            let mut head: Head = font.head()?.to_owned_table();
            head.font_revision = revision;
            builder.add_table(&head)?;
            Ok(())
        })?;
        info!("Set font revision to {:.3} ({})", revision.to_f64(), self.tag);
        Ok(result)
    }
}

/// Time written to `head.modified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildTimestamp(DateTime<Utc>);

impl BuildTimestamp {
    /// `SOURCE_DATE_EPOCH` when set, so repeated builds are byte identical.
    pub fn from_env() -> Result<Self> {
        match env::var("SOURCE_DATE_EPOCH") {
            Ok(value) => Self::from_epoch(&value),
            Err(_) => Ok(Self(Utc::now())),
        }
    }

    pub fn from_epoch(value: &str) -> Result<Self> {
        let seconds: i64 = value
            .trim()
            .parse()
            .with_context(|| format!("Invalid SOURCE_DATE_EPOCH '{value}'"))?;
        let time = DateTime::from_timestamp(seconds, 0)
            .ok_or_else(|| anyhow!("SOURCE_DATE_EPOCH {seconds} is out of range"))?;
        debug!("Using SOURCE_DATE_EPOCH {seconds}");
        Ok(Self(time))
    }

    pub fn long_date_time(&self) -> LongDateTime {
        LongDateTime::new(self.0.timestamp() + MAC_EPOCH_OFFSET)
    }

    pub fn apply(&self, data: &[u8]) -> Result<Vec<u8>> {
        let modified = self.long_date_time();
        rewrite_font(data, |font, builder| {
            if let Ok(head) = font.head() {
                let mut head: Head = head.to_owned_table();
                head.modified = modified;
                builder.add_table(&head)?;
            }
            Ok(())
        })
    }
}
