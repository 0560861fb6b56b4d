//! Front-matter framing: a `---` fenced YAML block, one blank separator
//! line, then the body verbatim.
//!
//! The body is untouched UTF-8: code fences, emojis and zero-width
//! characters all survive a round trip byte-for-byte.

use std::path::PathBuf;

/// Errors from parsing or writing projection files.
#[derive(Debug, thiserror::Error)]
pub enum MarkdownError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("malformed projection file {path}: {reason}")]
    Malformed {
        /// File the parse failed on (empty for in-memory input).
        path: PathBuf,
        /// What was wrong.
        reason: String,
    },
}

impl MarkdownError {
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Assembles a projection file from a YAML front-matter string (as produced
/// by `serde_yaml::to_string`, trailing newline included) and a body.
pub fn assemble_document(yaml: &str, body: &str) -> String {
    format!("---\n{yaml}---\n\n{body}")
}

/// Splits a projection file into its YAML front-matter and body.
///
/// The framing is strict: the file must start with `---`, the block must be
/// closed by a line of `---`, and exactly one blank line separates the
/// block from the body (so the body round-trips byte-for-byte).
pub fn split_document(text: &str) -> std::result::Result<(&str, &str), MarkdownError> {
    let rest = text.strip_prefix("---\n").ok_or_else(|| {
        MarkdownError::malformed("", "missing opening front-matter delimiter")
    })?;
    let close = rest.find("\n---\n").ok_or_else(|| {
        MarkdownError::malformed("", "missing closing front-matter delimiter")
    })?;
    let yaml = &rest[..close + 1];
    let after = &rest[close + 5..];
    let body = after.strip_prefix('\n').unwrap_or(after);
    Ok((yaml, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn assemble_then_split_preserves_body() {
        let yaml = "title: Test\n";
        let body = "# Heading\n\n```rust\nfn main() {}\n```\n";
        let doc = assemble_document(yaml, body);
        let (got_yaml, got_body) = split_document(&doc).unwrap();
        assert_eq!(got_yaml, yaml);
        assert_eq!(got_body, body);
    }

    #[test]
    fn body_with_leading_newline_survives() {
        let body = "\n\nstarts after two blank lines";
        let doc = assemble_document("a: 1\n", body);
        let (_, got_body) = split_document(&doc).unwrap();
        assert_eq!(got_body, body);
    }

    #[test]
    fn unicode_body_is_verbatim() {
        let body = "🌍 国際 Test\u{200B}zero-width stays in body";
        let doc = assemble_document("a: 1\n", body);
        let (_, got_body) = split_document(&doc).unwrap();
        assert_eq!(got_body, body);
    }

    #[test]
    fn missing_delimiters_fail() {
        assert!(split_document("no front matter").is_err());
        assert!(split_document("---\nunclosed: true\n").is_err());
    }

    #[test]
    fn dashes_inside_body_do_not_confuse_split() {
        let body = "text\n---\nmore";
        let doc = assemble_document("a: 1\n", body);
        let (yaml, got_body) = split_document(&doc).unwrap();
        assert_eq!(yaml, "a: 1\n");
        assert_eq!(got_body, body);
    }
}
