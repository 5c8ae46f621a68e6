//! Hint removal for the final fonts.

use std::{
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{Context, Result, bail};
use log::{debug, info};
use robotonoto_font_ops::strip_hinting;

use crate::io::{ensure_parent_dir, transform_font};

/// How hinting is removed from the generated font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dehinter {
    /// Run `program --dehint <input> <output>` (ttfautohint).
    External { program: PathBuf },
    /// Strip hinting in process.
    Builtin,
}

impl Dehinter {
    pub fn run(&self, input: &Path, output: &Path) -> Result<()> {
        match self {
            Dehinter::External { program } => run_external(program, input, output),
            Dehinter::Builtin => {
                transform_font(input, output, strip_hinting)?;
                info!("Stripped hinting: {}", output.display());
                Ok(())
            }
        }
    }
}

fn run_external(program: &Path, input: &Path, output: &Path) -> Result<()> {
    ensure_parent_dir(output)?;

    let mut cmd = Command::new(program);
    cmd.arg("--dehint").arg(input).arg(output);
    debug!("Running {cmd:?}");

    let result = cmd
        .output()
        .with_context(|| format!("Failed to run {}", program.display()))?;
    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        bail!(
            "{} --dehint {} failed ({}): {}",
            program.display(),
            input.display(),
            result.status,
            stderr.trim()
        );
    }

    info!("{} --dehint: {}", program.display(), output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use read_fonts::{FontRef, types::Tag};
    use robotonoto_font_ops::testing::TestFont;
    use tempfile::tempdir;

    use super::*;
    use crate::io::{read_font, write_font};

    #[test]
    fn test_builtin() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("gen.ttf");
        let output = dir.path().join("out/final.ttf");
        let data = TestFont::new(1000)
            .square("A", 'A', 500)
            .table(Tag::new(b"fpgm"), vec![0xB0, 0x00])
            .build();
        write_font(&input, data).unwrap();

        Dehinter::Builtin.run(&input, &output).unwrap();

        let result = read_font(&output).unwrap();
        let font = FontRef::new(&result).unwrap();
        assert!(font.table_data(Tag::new(b"fpgm")).is_none());
    }

    #[test]
    fn test_missing_program() {
        let dir = tempdir().unwrap();
        let dehinter = Dehinter::External { program: dir.path().join("no-such-tool") };
        let err = dehinter
            .run(&dir.path().join("in.ttf"), &dir.path().join("out.ttf"))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to run"), "{err}");
    }

    #[cfg(unix)]
    mod unix {
        use std::{fs, os::unix::fs::PermissionsExt};

        use super::*;

        fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
            let path = dir.join(name);
            fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[test]
        fn test_external_program() {
            let dir = tempdir().unwrap();
            let input = dir.path().join("gen.ttf");
            write_font(&input, b"font").unwrap();

            let program = script(dir.path(), "ok", r#"[ "$1" = "--dehint" ] && cp "$2" "$3""#);
            let output = dir.path().join("dist/final.ttf");
            Dehinter::External { program }.run(&input, &output).unwrap();
            assert_eq!(read_font(&output).unwrap(), b"font");

            let program = script(dir.path(), "failing", "echo 'bad font' >&2; exit 3");
            let err = Dehinter::External { program }
                .run(&input, &dir.path().join("other.ttf"))
                .unwrap_err();
            assert!(err.to_string().contains("bad font"), "{err}");
        }
    }
}
