//! File and directory conversion on top of [`Converter`].
//!
//! [`convert_dir`] fans the per-file work out across Rayon workers, all
//! sharing one read-only converter -- the converter is `Send + Sync` after
//! construction, so no locking is involved.
//!
//! Files are read as UTF-8 with an explicit decode step so encoding
//! failures surface as [`PyshiftError::EncodingError`] rather than a
//! generic I/O error.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;

use crate::convert::Converter;
use crate::errors::PyshiftError;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// Owned outcome of a single file conversion.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertOutcome {
    /// Path the converted text was written to.
    pub path: String,
    pub bytes_in: usize,
    pub bytes_out: usize,
    /// Whether conversion changed the text at all.
    pub changed: bool,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Read a source file as UTF-8 text.
pub fn read_source(input: &Path) -> Result<String, PyshiftError> {
    let bytes =
        fs::read(input).map_err(|e| PyshiftError::IoError(format!("{}: {e}", input.display())))?;
    String::from_utf8(bytes)
        .map_err(|e| PyshiftError::EncodingError(format!("{}: {e}", input.display())))
}

/// Convert one file.
///
/// Writes to `output` when given; otherwise rewrites `input` in place.
pub fn convert_file(
    converter: &Converter,
    input: &Path,
    output: Option<&Path>,
) -> Result<ConvertOutcome, PyshiftError> {
    let source = read_source(input)?;
    let converted = converter.convert(&source);

    let target = output.unwrap_or(input);
    fs::write(target, &converted)
        .map_err(|e| PyshiftError::IoError(format!("{}: {e}", target.display())))?;

    info!(
        "converted {} -> {} ({} bytes -> {} bytes)",
        input.display(),
        target.display(),
        source.len(),
        converted.len()
    );

    Ok(ConvertOutcome {
        path: target.display().to_string(),
        bytes_in: source.len(),
        bytes_out: converted.len(),
        changed: converted != source,
    })
}

/// Convert every `*.py` file under `dir` in place, in parallel.
///
/// Outcomes are returned sorted by path.  A tree without Python files
/// yields an empty list, not an error.
pub fn convert_dir(
    converter: &Converter,
    dir: &Path,
) -> Result<Vec<ConvertOutcome>, PyshiftError> {
    let mut files = Vec::new();
    collect_python_files(dir, &mut files)?;
    debug!("found {} Python files under {}", files.len(), dir.display());

    let mut outcomes = files
        .par_iter()
        .map(|path| convert_file(converter, path, None))
        .collect::<Result<Vec<_>, _>>()?;

    outcomes.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(outcomes)
}

/// Recursively collect `*.py` files.
fn collect_python_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), PyshiftError> {
    for entry in
        fs::read_dir(dir).map_err(|e| PyshiftError::IoError(format!("{}: {e}", dir.display())))?
    {
        let entry = entry.map_err(|e| PyshiftError::IoError(e.to_string()))?;
        let path = entry.path();
        if path.is_dir() {
            collect_python_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "py") {
            out.push(path);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn converter() -> Converter {
        Converter::new().unwrap()
    }

    #[test]
    fn test_convert_file_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.py");
        fs::write(&path, "print \"hi\"\n").unwrap();

        let outcome = convert_file(&converter(), &path, None).unwrap();

        assert!(outcome.changed);
        assert_eq!(fs::read_to_string(&path).unwrap(), "print(\"hi\")\n");
    }

    #[test]
    fn test_convert_file_explicit_output_keeps_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("old.py");
        let output = dir.path().join("new.py");
        fs::write(&input, "x = raw_input()\n").unwrap();

        convert_file(&converter(), &input, Some(&output)).unwrap();

        assert_eq!(fs::read_to_string(&input).unwrap(), "x = raw_input()\n");
        assert_eq!(fs::read_to_string(&output).unwrap(), "x = input()\n");
    }

    #[test]
    fn test_convert_file_unchanged_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modern.py");
        fs::write(&path, "x = 1 + 2\n").unwrap();

        let outcome = convert_file(&converter(), &path, None).unwrap();

        assert!(!outcome.changed);
        assert_eq!(outcome.bytes_in, outcome.bytes_out);
    }

    #[test]
    fn test_convert_file_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.py");

        let err = convert_file(&converter(), &missing, None).unwrap_err();
        assert!(matches!(err, PyshiftError::IoError(_)));
    }

    #[test]
    fn test_read_source_rejects_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.py");
        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        let err = read_source(&path).unwrap_err();
        assert!(matches!(err, PyshiftError::EncodingError(_)));
    }

    #[test]
    fn test_convert_dir_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("lib");
        fs::create_dir(&nested).unwrap();
        fs::write(dir.path().join("a.py"), "print \"a\"\n").unwrap();
        fs::write(nested.join("b.py"), "for i in xrange(3):\n    pass\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "print \"not python\"\n").unwrap();

        let outcomes = convert_dir(&converter(), dir.path()).unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.changed));
        assert_eq!(
            fs::read_to_string(dir.path().join("a.py")).unwrap(),
            "print(\"a\")\n"
        );
        assert_eq!(
            fs::read_to_string(nested.join("b.py")).unwrap(),
            "for i in range(3):\n    pass\n"
        );
        // Non-Python files are left alone.
        assert_eq!(
            fs::read_to_string(dir.path().join("notes.txt")).unwrap(),
            "print \"not python\"\n"
        );
    }

    #[test]
    fn test_convert_dir_empty_tree() {
        let dir = tempfile::tempdir().unwrap();
        let outcomes = convert_dir(&converter(), dir.path()).unwrap();
        assert!(outcomes.is_empty());
    }
}
