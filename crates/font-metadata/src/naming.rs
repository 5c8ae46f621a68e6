//! The name table.

use std::collections::BTreeMap;

use anyhow::Result;
use log::info;
use read_fonts::{FontRef, TableProvider, types::NameId};
use robotonoto_font_ops::rewrite_font;
use write_fonts::tables::name::{Name, NameRecord};

const COPYRIGHT: u16 = 0;
const FAMILY: u16 = 1;
const SUBFAMILY: u16 = 2;
const UNIQUE_ID: u16 = 3;
const FULL_NAME: u16 = 4;
const VERSION: u16 = 5;
const POSTSCRIPT_NAME: u16 = 6;
const LICENSE: u16 = 13;
const LICENSE_URL: u16 = 14;
const TYPOGRAPHIC_FAMILY: u16 = 16;
const TYPOGRAPHIC_SUBFAMILY: u16 = 17;

const MANAGED_IDS: [u16; 11] = [
    COPYRIGHT,
    FAMILY,
    SUBFAMILY,
    UNIQUE_ID,
    FULL_NAME,
    VERSION,
    POSTSCRIPT_NAME,
    LICENSE,
    LICENSE_URL,
    TYPOGRAPHIC_FAMILY,
    TYPOGRAPHIC_SUBFAMILY,
];

/// Windows, Unicode BMP, English (United States)
const WINDOWS_ENGLISH: (u16, u16, u16) = (3, 1, 0x409);

/// Names written into the merged font.
#[derive(Debug, Clone)]
pub struct FontNaming {
    pub family: String,
    pub style: String,
    /// Version tag, e.g. `v0.0.1`
    pub version: String,
    /// Vendor id used in the unique identifier
    pub vendor: String,
    pub copyright: String,
    pub license: String,
    pub license_url: String,
}

impl FontNaming {
    /// Regular, Bold, Italic and Bold Italic fit the legacy four-style family.
    pub fn is_ribbi(&self) -> bool {
        matches!(self.style.as_str(), "Regular" | "Bold" | "Italic" | "Bold Italic")
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.family, self.style)
    }

    pub fn postscript_name(&self) -> String {
        format!("{}-{}", self.family.replace(' ', ""), self.style.replace(' ', ""))
    }

    pub fn unique_id(&self) -> String {
        format!("{};{};{}", self.version, self.vendor, self.postscript_name())
    }

    pub fn version_string(&self) -> String {
        format!("{} {}", self.family, self.version)
    }

    /// Legacy family and subfamily (name IDs 1 and 2).
    fn legacy_names(&self) -> (String, String) {
        if self.is_ribbi() {
            (self.family.clone(), self.style.clone())
        } else {
            let subfamily = if self.style.contains("Italic") { "Italic" } else { "Regular" };
            (self.full_name(), subfamily.to_string())
        }
    }

    /// Every managed name ID with its new value.
    ///
    /// Typographic names are only present for styles outside the legacy
    /// four-style family.
    pub fn records(&self) -> BTreeMap<u16, String> {
        let (family, subfamily) = self.legacy_names();
        let mut records = BTreeMap::from([
            (COPYRIGHT, self.copyright.clone()),
            (FAMILY, family),
            (SUBFAMILY, subfamily),
            (UNIQUE_ID, self.unique_id()),
            (FULL_NAME, self.full_name()),
            (VERSION, self.version_string()),
            (POSTSCRIPT_NAME, self.postscript_name()),
            (LICENSE, self.license.clone()),
            (LICENSE_URL, self.license_url.clone()),
        ]);
        if !self.is_ribbi() {
            records.insert(TYPOGRAPHIC_FAMILY, self.family.clone());
            records.insert(TYPOGRAPHIC_SUBFAMILY, self.style.clone());
        }
        records
    }

    /// Build a name table from the font's current one.
    ///
    /// Records of managed IDs are replaced by a single Windows English record;
    /// all other records are kept.
    pub fn build_name(&self, font: &FontRef) -> Result<Name> {
        let mut records: Vec<NameRecord> = Vec::new();

        if let Ok(name) = font.name() {
            for record in name.name_record() {
                let name_id = record.name_id().to_u16();
                if MANAGED_IDS.contains(&name_id) {
                    continue;
                }
                let Ok(value) = record.string(name.string_data()) else {
                    continue;
                };
                records.push(NameRecord::new(
                    record.platform_id(),
                    record.encoding_id(),
                    record.language_id(),
                    record.name_id(),
                    value.chars().collect::<String>().into(),
                ));
            }
        }

        let (platform, encoding, language) = WINDOWS_ENGLISH;
        records.extend(self.records().into_iter().map(|(name_id, value)| {
            NameRecord::new(platform, encoding, language, NameId::new(name_id), value.into())
        }));
        records.sort();

        Ok(Name::new(records))
    }

    pub fn apply(&self, data: &[u8]) -> Result<Vec<u8>> {
        let result = rewrite_font(data, |font, builder| {
            builder.add_table(&self.build_name(font)?)?;
            Ok(())
        })?;
        info!("Set names to '{}' ({})", self.full_name(), self.postscript_name());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use robotonoto_font_ops::testing::{TestFont, name_string};

    use super::*;

    fn naming(style: &str) -> FontNaming {
        FontNaming {
            family: "RobotoNotoJP".to_string(),
            style: style.to_string(),
            version: "v0.0.1".to_string(),
            vendor: "TWR".to_string(),
            copyright: "Copyright 2023 soracat".to_string(),
            license: "SIL Open Font License, Version 1.1".to_string(),
            license_url: "http://scripts.sil.org/OFL".to_string(),
        }
    }

    #[test]
    fn test_derived_names() {
        let naming = naming("Bold");
        assert_eq!(naming.full_name(), "RobotoNotoJP Bold");
        assert_eq!(naming.postscript_name(), "RobotoNotoJP-Bold");
        assert_eq!(naming.unique_id(), "v0.0.1;TWR;RobotoNotoJP-Bold");
        assert_eq!(naming.version_string(), "RobotoNotoJP v0.0.1");
    }

    #[test]
    fn test_ribbi_records() {
        let records = naming("Regular").records();
        assert_eq!(records[&FAMILY], "RobotoNotoJP");
        assert_eq!(records[&SUBFAMILY], "Regular");
        assert!(!records.contains_key(&TYPOGRAPHIC_FAMILY));
    }

    #[test]
    fn test_non_ribbi_records() {
        let records = naming("Medium Italic").records();
        assert_eq!(records[&FAMILY], "RobotoNotoJP Medium Italic");
        assert_eq!(records[&SUBFAMILY], "Italic");
        assert_eq!(records[&TYPOGRAPHIC_FAMILY], "RobotoNotoJP");
        assert_eq!(records[&TYPOGRAPHIC_SUBFAMILY], "Medium Italic");
        assert_eq!(records[&POSTSCRIPT_NAME], "RobotoNotoJP-MediumItalic");
    }

    #[test]
    fn test_apply_names() {
        let data = TestFont::new(2048).family("Roboto").build();
        let renamed = naming("Regular").apply(&data).unwrap();
        let font = FontRef::new(&renamed).unwrap();

        assert_eq!(name_string(&font, COPYRIGHT).as_deref(), Some("Copyright 2023 soracat"));
        assert_eq!(name_string(&font, FAMILY).as_deref(), Some("RobotoNotoJP"));
        assert_eq!(name_string(&font, FULL_NAME).as_deref(), Some("RobotoNotoJP Regular"));
        assert_eq!(name_string(&font, VERSION).as_deref(), Some("RobotoNotoJP v0.0.1"));
        assert_eq!(name_string(&font, POSTSCRIPT_NAME).as_deref(), Some("RobotoNotoJP-Regular"));
        assert_eq!(name_string(&font, LICENSE_URL).as_deref(), Some("http://scripts.sil.org/OFL"));

        let name = font.name().unwrap();
        let families = name
            .name_record()
            .iter()
            .filter(|r| r.name_id().to_u16() == FAMILY)
            .count();
        assert_eq!(families, 1);
    }

    #[test]
    fn test_unmanaged_records_kept() {
        let extra = Name::new(vec![NameRecord::new(
            3,
            1,
            0x409,
            NameId::new(256),
            "Alternate a".to_string().into(),
        )]);
        let data = rewrite_font(&TestFont::new(2048).build(), |_, builder| {
            builder.add_table(&extra)?;
            Ok(())
        })
        .unwrap();
        let font = FontRef::new(&data).unwrap();

        let name = naming("Bold").build_name(&font).unwrap();
        let ids: Vec<u16> = name.name_record.iter().map(|r| r.name_id.to_u16()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4, 5, 6, 13, 14, 256]);
    }
}
