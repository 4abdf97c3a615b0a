//! Python dialect detection heuristics.
//!
//! [`SyntaxAnalyzer`] classifies a source text as Python 2, Python 3,
//! Unknown, or Mixed with a line-oriented scan for dialect-specific
//! constructs.  The runtime uses this to decide whether a script needs
//! conversion before execution; [`SyntaxAnalyzer::validate`] rejects
//! sources that mix both dialects.
//!
//! Heuristics only -- a string literal containing `xrange(` counts as
//! evidence.  Good enough for routing scripts, not a parser.

use serde::Serialize;

use crate::errors::PyshiftError;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// Python dialect detected from syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PythonVersion {
    Python2,
    Python3,
    Unknown,
    /// Contains both Python 2 and 3 specific syntax.
    Mixed,
}

impl std::fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PythonVersion::Python2 => write!(f, "Python 2"),
            PythonVersion::Python3 => write!(f, "Python 3"),
            PythonVersion::Unknown => write!(f, "Unknown"),
            PythonVersion::Mixed => write!(f, "Mixed"),
        }
    }
}

/// Owned detection result -- serializable for the CLI and FFI JSON
/// surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionReport {
    pub version: PythonVersion,
    /// Lines carrying Python 2 specific evidence.
    pub python2_lines: usize,
    /// Lines carrying Python 3 specific evidence.
    pub python3_lines: usize,
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// Python syntax analyzer for dialect detection.
pub struct SyntaxAnalyzer;

impl SyntaxAnalyzer {
    /// Scan the source and report the detected dialect with evidence
    /// counts.  Comments and blank lines are skipped.
    pub fn analyze(source: &str) -> DetectionReport {
        let mut python2_lines = 0;
        let mut python3_lines = 0;

        for line in source.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if Self::is_python2_syntax(trimmed) {
                python2_lines += 1;
            }
            if Self::is_python3_syntax(trimmed) {
                python3_lines += 1;
            }
        }

        let version = match (python2_lines > 0, python3_lines > 0) {
            (true, true) => PythonVersion::Mixed,
            (true, false) => PythonVersion::Python2,
            (false, true) => PythonVersion::Python3,
            (false, false) => PythonVersion::Unknown,
        };

        DetectionReport {
            version,
            python2_lines,
            python3_lines,
        }
    }

    /// Detect the Python dialect of the source.
    pub fn detect_version(source: &str) -> PythonVersion {
        Self::analyze(source).version
    }

    /// Detect the dialect, rejecting sources that mix both.
    pub fn validate(source: &str) -> Result<PythonVersion, PyshiftError> {
        match Self::detect_version(source) {
            PythonVersion::Mixed => Err(PyshiftError::MixedSyntaxError(
                "source contains both Python 2 and Python 3 constructs".to_owned(),
            )),
            version => Ok(version),
        }
    }

    /// Check for Python 2 specific syntax.
    fn is_python2_syntax(line: &str) -> bool {
        // print statement (not function)
        if line.starts_with("print ") && !line.contains("print(") {
            return true;
        }

        // Comma-binding exception form
        if line.contains("except") && line.contains(',') && !line.contains(" as ") {
            return true;
        }

        if line.contains("xrange(") {
            return true;
        }

        if line.contains("raw_input(") {
            return true;
        }

        if Self::has_long_literal(line) {
            return true;
        }

        if line.contains("basestring") {
            return true;
        }

        if line.contains("execfile(") {
            return true;
        }

        false
    }

    /// Check for Python 3 specific syntax.
    fn is_python3_syntax(line: &str) -> bool {
        // print function with keyword arguments
        if line.contains("print(")
            && (line.contains("end=") || line.contains("sep=") || line.contains("file="))
        {
            return true;
        }

        // Return-type annotations
        if line.contains("->") && line.contains("def ") {
            return true;
        }

        // f-strings
        if line.contains("f\"") || line.contains("f'") {
            return true;
        }

        // async/await
        if line.starts_with("async ")
            || line.contains(" async ")
            || line.starts_with("await ")
            || line.contains(" await ")
        {
            return true;
        }

        // Walrus operator
        if line.contains(":=") {
            return true;
        }

        if line.starts_with("nonlocal ") {
            return true;
        }

        if line.contains("yield from") {
            return true;
        }

        // Keyword-only argument marker
        if line.contains("def ") && line.contains(", *,") {
            return true;
        }

        false
    }

    /// Check for long integer literals (`123L`), rejecting suffixes that
    /// continue into a longer identifier.
    fn has_long_literal(line: &str) -> bool {
        let chars: Vec<char> = line.chars().collect();
        for i in 1..chars.len() {
            if (chars[i] == 'L' || chars[i] == 'l')
                && chars[i - 1].is_ascii_digit()
                && (i + 1 >= chars.len() || !chars[i + 1].is_alphanumeric())
            {
                return true;
            }
        }
        false
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_python2_print_statement() {
        assert_eq!(
            SyntaxAnalyzer::detect_version("print 'hello'"),
            PythonVersion::Python2
        );
    }

    #[test]
    fn test_detect_python2_xrange() {
        assert_eq!(
            SyntaxAnalyzer::detect_version("for i in xrange(10):\n    pass"),
            PythonVersion::Python2
        );
    }

    #[test]
    fn test_detect_python3_print_keywords() {
        assert_eq!(
            SyntaxAnalyzer::detect_version("print(\"x\", end=\"\")"),
            PythonVersion::Python3
        );
    }

    #[test]
    fn test_detect_python3_fstring() {
        assert_eq!(
            SyntaxAnalyzer::detect_version("name = f\"{user}\""),
            PythonVersion::Python3
        );
    }

    #[test]
    fn test_detect_mixed() {
        let source = "print 'old'\nprint(\"new\", end=\"\")\n";
        assert_eq!(
            SyntaxAnalyzer::detect_version(source),
            PythonVersion::Mixed
        );
    }

    #[test]
    fn test_detect_unknown() {
        assert_eq!(
            SyntaxAnalyzer::detect_version("x = 1"),
            PythonVersion::Unknown
        );
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let source = "# print 'hello'\n\n# xrange(3)\n";
        assert_eq!(
            SyntaxAnalyzer::detect_version(source),
            PythonVersion::Unknown
        );
    }

    #[test]
    fn test_long_literal_evidence() {
        assert_eq!(
            SyntaxAnalyzer::detect_version("total = 100L"),
            PythonVersion::Python2
        );
    }

    #[test]
    fn test_long_suffix_in_identifier_is_not_evidence() {
        assert_eq!(
            SyntaxAnalyzer::detect_version("total = 100Long"),
            PythonVersion::Unknown
        );
    }

    #[test]
    fn test_analyze_counts_evidence_lines() {
        let source = "print 'a'\nprint 'b'\nx = 1\n";
        let report = SyntaxAnalyzer::analyze(source);
        assert_eq!(report.version, PythonVersion::Python2);
        assert_eq!(report.python2_lines, 2);
        assert_eq!(report.python3_lines, 0);
    }

    #[test]
    fn test_validate_rejects_mixed() {
        let source = "print 'old'\nasync def main():\n";
        assert!(SyntaxAnalyzer::validate(source).is_err());
    }

    #[test]
    fn test_validate_accepts_python2() {
        assert_eq!(
            SyntaxAnalyzer::validate("print 'x'").unwrap(),
            PythonVersion::Python2
        );
    }

    #[test]
    fn test_report_serialization() {
        let report = SyntaxAnalyzer::analyze("print 'x'");
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"Python2\""));
        assert!(json.contains("\"python2_lines\":1"));
    }
}
