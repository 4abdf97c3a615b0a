//! Ordered rewrite rules for the Python 2 -> Python 3 transliteration.
//!
//! [`RuleSet::builtin`] compiles the full rule catalog once;
//! [`RuleSet::apply`] runs every rule in insertion order, each rule's
//! output feeding the next rule's input.  Rules are plain text
//! substitutions over the whole document -- `(?m)` binds `^`/`$` to line
//! boundaries, so line-shaped rules work inside larger texts.
//!
//! The rules are deliberately type-unaware: `.has_key()` on a non-mapping
//! receiver is still rewritten.  The converter is best-effort over
//! possibly incomplete or mixed-dialect snippets, not a parser.

use std::borrow::Cow;

use log::debug;
use regex::{Captures, Regex};

use crate::errors::PyshiftError;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// Replacement half of a rewrite rule.
///
/// Most rules are literal templates with `$n` back-references.  The
/// print-statement rule needs computed replacement text (trailing-comma
/// and stream-redirect handling depend on the captured arguments), so the
/// table is a tagged union applied by a single dispatch step in
/// [`RuleSet::apply`].
pub enum Replacement {
    /// Literal template; `$n` expands to capture group `n`.
    Template(&'static str),
    /// Computed replacement.  The closure may return the whole match
    /// unchanged to decline a rewrite.
    Compute(Box<dyn Fn(&Captures<'_>) -> String + Send + Sync>),
}

/// One ordered (matcher, replacement) pair.
pub struct RewriteRule {
    name: &'static str,
    pattern: Regex,
    replacement: Replacement,
}

impl RewriteRule {
    /// Short identifier used in debug logging.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// The ordered, immutable rule table.
///
/// Constructed once via [`RuleSet::builtin`] and reused across all
/// conversion calls; it holds no per-call mutable state, so one instance
/// can be shared freely across threads.
pub struct RuleSet {
    rules: Vec<RewriteRule>,
}

// ---------------------------------------------------------------------------
// Builtin catalog
// ---------------------------------------------------------------------------

impl RuleSet {
    /// Compile the builtin Python 2 -> 3 rule catalog.
    ///
    /// Order is significant: the print rules run first so later rules see
    /// call-form print lines, and each rule rewrites the previous rule's
    /// output.
    pub fn builtin() -> Result<Self, PyshiftError> {
        // `>> stream, rest` redirect inside a print statement.  The stream
        // name may be dotted (`sys.stderr`).  Compiled once, shared by the
        // print closure.
        let redirect = Regex::new(r"^>>\s*([\w.]+)\s*,\s*(.+)$")?;

        let rules = vec![
            // `print` with no arguments: print -> print()
            RewriteRule {
                name: "print-bare",
                pattern: Regex::new(r"(?m)^(\s*)print\s*$")?,
                replacement: Replacement::Template("${1}print()"),
            },
            // `print args` -> print(args).  Call-form guard, trailing
            // comma, and stream redirect all live in the closure.
            RewriteRule {
                name: "print-args",
                pattern: Regex::new(r"(?m)^(\s*)print\s+(.+)$")?,
                replacement: Replacement::Compute(Box::new(move |caps: &Captures<'_>| {
                    rewrite_print(caps, &redirect)
                })),
            },
            // xrange( -> range(
            RewriteRule {
                name: "xrange",
                pattern: Regex::new(r"\bxrange\s*\(")?,
                replacement: Replacement::Template("range("),
            },
            // raw_input( -> input(
            RewriteRule {
                name: "raw-input",
                pattern: Regex::new(r"\braw_input\s*\(")?,
                replacement: Replacement::Template("input("),
            },
            // except Exception, e: -> except Exception as e:
            RewriteRule {
                name: "except-comma",
                pattern: Regex::new(r"except\s+(\w+(?:\.\w+)*)\s*,\s*(\w+)\s*:")?,
                replacement: Replacement::Template("except $1 as $2:"),
            },
            // Long literals: 123L -> 123
            RewriteRule {
                name: "long-suffix",
                pattern: Regex::new(r"\b(\d+)[Ll]\b")?,
                replacement: Replacement::Template("$1"),
            },
            // basestring -> str
            RewriteRule {
                name: "basestring",
                pattern: Regex::new(r"\bbasestring\b")?,
                replacement: Replacement::Template("str"),
            },
            // unicode( -> str(
            RewriteRule {
                name: "unicode-call",
                pattern: Regex::new(r"\bunicode\s*\(")?,
                replacement: Replacement::Template("str("),
            },
            // <> -> !=
            RewriteRule {
                name: "not-equal",
                pattern: Regex::new(r"\s*<>\s*")?,
                replacement: Replacement::Template(" != "),
            },
            // d.has_key(k) -> (k in d)
            RewriteRule {
                name: "has-key",
                pattern: Regex::new(r"(\w+)\.has_key\s*\(\s*([^)]+)\s*\)")?,
                replacement: Replacement::Template("($2 in $1)"),
            },
            // dict.iteritems() -> dict.items()
            RewriteRule {
                name: "iteritems",
                pattern: Regex::new(r"\.iteritems\s*\(\s*\)")?,
                replacement: Replacement::Template(".items()"),
            },
            // dict.iterkeys() -> dict.keys()
            RewriteRule {
                name: "iterkeys",
                pattern: Regex::new(r"\.iterkeys\s*\(\s*\)")?,
                replacement: Replacement::Template(".keys()"),
            },
            // dict.itervalues() -> dict.values()
            RewriteRule {
                name: "itervalues",
                pattern: Regex::new(r"\.itervalues\s*\(\s*\)")?,
                replacement: Replacement::Template(".values()"),
            },
            // execfile('f') -> exec(open('f').read())
            RewriteRule {
                name: "execfile",
                pattern: Regex::new(r"\bexecfile\s*\(\s*([^)]+)\s*\)")?,
                replacement: Replacement::Template("exec(open($1).read())"),
            },
        ];

        Ok(Self { rules })
    }

    /// Apply every rule in order and return the rewritten text.
    ///
    /// Single dispatch point for both replacement kinds.  Unmatched text
    /// passes through unchanged.
    pub fn apply(&self, source: &str) -> String {
        let mut text = source.to_owned();
        for rule in &self.rules {
            let rewritten = match &rule.replacement {
                Replacement::Template(template) => rule.pattern.replace_all(&text, *template),
                Replacement::Compute(compute) => rule
                    .pattern
                    .replace_all(&text, |caps: &Captures<'_>| compute(caps)),
            };
            // `replace_all` only allocates when something matched.
            if let Cow::Owned(changed) = rewritten {
                debug!("rule {} matched", rule.name);
                text = changed;
            }
        }
        text
    }

    /// Number of rules in the table.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Print-statement rewriting
// ---------------------------------------------------------------------------

/// Rewrite one `print <args>` statement to call form.
///
/// Returns the match unchanged when `<args>` already begins with `(` --
/// the line is already a call, and leaving it alone keeps re-conversion a
/// no-op (the target regex engine has no look-ahead, so the guard lives
/// here instead of in the pattern).
fn rewrite_print(caps: &Captures<'_>, redirect: &Regex) -> String {
    let indent = &caps[1];
    let args = caps[2].trim();

    if args.starts_with('(') {
        return caps[0].to_owned();
    }

    // A bare trailing comma is the legacy "no newline" marker.
    let (args, space_end) = match args.strip_suffix(',') {
        Some(head) => (head.trim_end(), true),
        None => (args, false),
    };

    // `print >> stream, rest` targets an explicit stream.
    if let Some(redir) = redirect.captures(args) {
        let stream = &redir[1];
        let rest = &redir[2];
        return if space_end {
            format!("{indent}print({rest}, file={stream}, end=\" \")")
        } else {
            format!("{indent}print({rest}, file={stream})")
        };
    }

    if space_end {
        format!("{indent}print({args}, end=\" \")")
    } else {
        format!("{indent}print({args})")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
