//! Options for font merging

use read_fonts::types::Tag;

use crate::types::TableTag;

/// Options for font merging
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Tables left out of the merged font
    pub drop_tables: Vec<TableTag>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the dropped tables. Names longer than four bytes are ignored.
    pub fn drop_tables(mut self, tables: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        self.drop_tables = tables
            .into_iter()
            .filter_map(|s| TableTag::parse(s.as_ref()))
            .collect();
        self
    }

    pub fn drop_table(mut self, table: impl AsRef<str>) -> Self {
        if let Some(tag) = TableTag::parse(table.as_ref()) {
            self.drop_tables.push(tag);
        }
        self
    }

    pub fn should_drop(&self, tag: Tag) -> bool {
        self.drop_tables.iter().any(|t| t.tag() == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_tables() {
        let options = Options::new().drop_tables(["DSIG", "toolong"]).drop_table("OS/2");
        assert!(options.should_drop(Tag::new(b"DSIG")));
        assert!(options.should_drop(Tag::new(b"OS/2")));
        assert!(!options.should_drop(Tag::new(b"GSUB")));
        assert_eq!(options.drop_tables.len(), 2);
    }

    #[test]
    fn test_short_tag_is_padded() {
        let options = Options::new().drop_table("cvt");
        assert!(options.should_drop(Tag::new(b"cvt ")));
    }
}
