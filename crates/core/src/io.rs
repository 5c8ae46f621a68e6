//! Font file I/O.

use std::{
    fs::{create_dir_all, read, write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use glob::glob;
use log::error;

#[derive(Debug, Clone)]
pub struct FontFile {
    path: PathBuf,
}

impl FontFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        read(&self.path).with_context(|| format!("Failed to read font: {}", self.path.display()))
    }

    /// Write the font, creating its directory first.
    pub fn write(&self, data: impl AsRef<[u8]>) -> Result<()> {
        self.ensure_parent_dir()?;
        write(&self.path, data)
            .with_context(|| format!("Failed to write font: {}", self.path.display()))
    }

    pub fn transform(&self, f: impl FnOnce(&[u8]) -> Result<Vec<u8>>) -> Result<()> {
        let data = self.read()?;
        let new_data = f(&data)?;
        self.write(new_data)
    }

    pub fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        Ok(())
    }
}

impl AsRef<Path> for FontFile {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

pub fn glob_fonts(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let pattern = dir.join(pattern);
    let pattern_str = pattern.to_str().context("Invalid pattern path")?;
    let mut fonts: Vec<PathBuf> = glob(pattern_str)
        .with_context(|| format!("Failed to glob pattern: {pattern_str}"))?
        .filter_map(Result::ok)
        .collect();
    fonts.sort();
    Ok(fonts)
}

/// Log every failure of a batch and bail if there was any.
pub fn check_results<T>(results: &[(String, Result<T>)], operation: &str) -> Result<()> {
    let errors: Vec<_> = results
        .iter()
        .filter_map(|(item, r)| r.as_ref().err().map(|e| (item, e)))
        .collect();

    if !errors.is_empty() {
        for (item, err) in &errors {
            error!("{item}: {err:#}");
        }
        bail!("{operation} failed for {} of {}", errors.len(), results.len());
    }
    Ok(())
}

pub fn read_font(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    FontFile::new(path.as_ref()).read()
}

pub fn write_font(path: impl AsRef<Path>, data: impl AsRef<[u8]>) -> Result<()> {
    FontFile::new(path.as_ref()).write(data)
}

pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    FontFile::new(path).ensure_parent_dir()
}

pub fn transform_font_in_place(
    path: impl AsRef<Path>,
    f: impl FnOnce(&[u8]) -> Result<Vec<u8>>,
) -> Result<()> {
    FontFile::new(path.as_ref()).transform(f)
}

/// Read `input`, transform it, and write the result to `output`.
pub fn transform_font(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    f: impl FnOnce(&[u8]) -> Result<Vec<u8>>,
) -> Result<()> {
    let data = read_font(input)?;
    write_font(output, f(&data)?)
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_write_creates_parent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/font.ttf");
        write_font(&path, b"data").unwrap();
        assert_eq!(read_font(&path).unwrap(), b"data");
    }

    #[test]
    fn test_read_error_names_path() {
        let err = read_font("/nonexistent/font.ttf").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/font.ttf"));
    }

    #[test]
    fn test_transform_in_place() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("font.ttf");
        write_font(&path, b"abc").unwrap();
        transform_font_in_place(&path, |data| Ok(data.iter().rev().copied().collect())).unwrap();
        assert_eq!(read_font(&path).unwrap(), b"cba");
    }

    #[test]
    fn test_glob_fonts_sorted() {
        let dir = tempdir().unwrap();
        for name in ["B-Bold.ttf", "A-Regular.ttf", "notes.txt"] {
            write_font(dir.path().join(name), b"").unwrap();
        }
        let fonts = glob_fonts(dir.path(), "*.ttf").unwrap();
        let names: Vec<_> = fonts.iter().filter_map(|p| p.file_name()).collect();
        assert_eq!(names, vec!["A-Regular.ttf", "B-Bold.ttf"]);
    }

    #[test]
    fn test_check_results() {
        let ok: Vec<(String, Result<()>)> = vec![("a".into(), Ok(()))];
        assert!(check_results(&ok, "build").is_ok());

        let failed = vec![("a".to_string(), Ok(())), ("b".to_string(), Err(anyhow!("boom")))];
        let err = check_results(&failed, "build").unwrap_err();
        assert_eq!(err.to_string(), "build failed for 1 of 2");
    }
}
