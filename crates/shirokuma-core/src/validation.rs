//! Field validation rules for items and registry entries.

use chrono::NaiveDate;

/// Maximum title length (chars, after trimming).
pub const MAX_TITLE_CHARS: usize = 200;
/// Maximum description length (chars).
pub const MAX_DESCRIPTION_CHARS: usize = 1000;
/// Maximum content size (bytes).
pub const MAX_CONTENT_BYTES: usize = 100 * 1024;
/// Maximum category/version length (chars).
pub const MAX_SHORT_FIELD_CHARS: usize = 50;
/// Maximum number of tags per item.
pub const MAX_TAGS: usize = 20;

/// Error type for validation failures.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("title is required")]
    TitleRequired,

    #[error("title must be {MAX_TITLE_CHARS} characters or less (got {0})")]
    TitleTooLong(usize),

    #[error("description must be {MAX_DESCRIPTION_CHARS} characters or less (got {0})")]
    DescriptionTooLong(usize),

    #[error("content must be {MAX_CONTENT_BYTES} bytes or less (got {0})")]
    ContentTooLarge(usize),

    #[error("content is required for {0} items")]
    ContentRequired(String),

    #[error("{field} must be {MAX_SHORT_FIELD_CHARS} characters or less")]
    ShortFieldTooLong { field: &'static str },

    #[error("at most {MAX_TAGS} tags are allowed (got {0})")]
    TooManyTags(usize),

    #[error("invalid date {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("invalid type name {0:?} (expected lowercase slug)")]
    InvalidTypeSlug(String),

    #[error("invalid priority {0:?}")]
    InvalidPriority(String),

    #[error("status {0:?} does not exist")]
    UnknownStatus(String),

    #[error("search query must not be empty")]
    EmptyQuery,

    #[error("tag name must not be empty")]
    EmptyTagName,

    #[error("malformed item reference {0:?} (expected type-id)")]
    MalformedReference(String),

    #[error("an item cannot reference itself")]
    SelfReference,

    #[error("field {0:?} is not allowed for {1} items")]
    FieldNotAllowed(&'static str, String),
}

/// Normalises and validates a title: trims, strips zero-width characters,
/// enforces the length bounds. Returns the cleaned title.
pub fn validate_title(title: &str) -> Result<String, ValidationError> {
    let cleaned: String = title
        .chars()
        .filter(|c| !is_zero_width(*c))
        .collect::<String>()
        .trim()
        .to_owned();
    if cleaned.is_empty() {
        return Err(ValidationError::TitleRequired);
    }
    let len = cleaned.chars().count();
    if len > MAX_TITLE_CHARS {
        return Err(ValidationError::TitleTooLong(len));
    }
    Ok(cleaned)
}

/// Zero-width characters stripped from titles (only -- body content is
/// preserved verbatim).
fn is_zero_width(c: char) -> bool {
    matches!(
        c,
        '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}'
    )
}

pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    let len = description.chars().count();
    if len > MAX_DESCRIPTION_CHARS {
        return Err(ValidationError::DescriptionTooLong(len));
    }
    Ok(())
}

pub fn validate_content(content: &str) -> Result<(), ValidationError> {
    if content.len() > MAX_CONTENT_BYTES {
        return Err(ValidationError::ContentTooLarge(content.len()));
    }
    Ok(())
}

pub fn validate_short_field(
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.chars().count() > MAX_SHORT_FIELD_CHARS {
        return Err(ValidationError::ShortFieldTooLong { field });
    }
    Ok(())
}

/// Normalises a tag list: trims entries, drops empties, deduplicates while
/// preserving first-occurrence order, and enforces the cap.
pub fn normalize_tags(tags: &[String]) -> Result<Vec<String>, ValidationError> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let t = tag.trim();
        if t.is_empty() {
            continue;
        }
        if !out.iter().any(|existing| existing == t) {
            out.push(t.to_owned());
        }
    }
    if out.len() > MAX_TAGS {
        return Err(ValidationError::TooManyTags(out.len()));
    }
    Ok(out)
}

/// Parses an ISO `YYYY-MM-DD` date field.
pub fn parse_date_field(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(s.to_owned()))
}

/// Returns `true` if `name` matches the type slug pattern
/// `[a-z][a-z0-9_]*`.
pub fn is_valid_type_slug(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Validates a type slug, returning the error variant on failure.
pub fn validate_type_slug(name: &str) -> Result<(), ValidationError> {
    if is_valid_type_slug(name) {
        Ok(())
    } else {
        Err(ValidationError::InvalidTypeSlug(name.to_owned()))
    }
}

/// Builds a filename-safe slug from a title, used for export filenames.
pub fn title_slug(title: &str, max_len: usize) -> String {
    let mut slug = String::new();
    let mut last_dash = true;
    for c in title.chars() {
        if slug.len() >= max_len {
            break;
        }
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    let trimmed = slug.trim_matches('-');
    if trimmed.is_empty() {
        "item".to_owned()
    } else {
        trimmed.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_trim_and_bounds() {
        assert_eq!(validate_title("  Auth Bug  ").unwrap(), "Auth Bug");
        assert!(matches!(
            validate_title("   "),
            Err(ValidationError::TitleRequired)
        ));
        let long = "x".repeat(201);
        assert!(matches!(
            validate_title(&long),
            Err(ValidationError::TitleTooLong(201))
        ));
    }

    #[test]
    fn title_strips_zero_width() {
        assert_eq!(validate_title("a\u{200B}b").unwrap(), "ab");
        assert_eq!(validate_title("\u{FEFF}title").unwrap(), "title");
    }

    #[test]
    fn unicode_title_counts_chars_not_bytes() {
        let title = "🌍".repeat(200);
        assert!(validate_title(&title).is_ok());
    }

    #[test]
    fn description_bound() {
        assert!(validate_description(&"d".repeat(1000)).is_ok());
        assert!(validate_description(&"d".repeat(1001)).is_err());
    }

    #[test]
    fn content_byte_bound() {
        assert!(validate_content(&"c".repeat(MAX_CONTENT_BYTES)).is_ok());
        assert!(validate_content(&"c".repeat(MAX_CONTENT_BYTES + 1)).is_err());
    }

    #[test]
    fn tags_normalized_and_capped() {
        let tags: Vec<String> = vec![" bug ".into(), "auth".into(), "bug".into(), "".into()];
        assert_eq!(normalize_tags(&tags).unwrap(), vec!["bug", "auth"]);

        let many: Vec<String> = (0..21).map(|i| format!("t{i}")).collect();
        assert!(matches!(
            normalize_tags(&many),
            Err(ValidationError::TooManyTags(21))
        ));
    }

    #[test]
    fn type_slug_pattern() {
        assert!(is_valid_type_slug("issues"));
        assert!(is_valid_type_slug("my_type2"));
        assert!(!is_valid_type_slug("2issues"));
        assert!(!is_valid_type_slug("My-Type"));
        assert!(!is_valid_type_slug(""));
    }

    #[test]
    fn date_field_format() {
        assert!(parse_date_field("2025-12-31").is_ok());
        assert!(parse_date_field("2025/12/31").is_err());
        assert!(parse_date_field("31-12-2025").is_err());
    }

    #[test]
    fn slug_for_export() {
        assert_eq!(title_slug("Auth Bug!", 40), "auth-bug");
        assert_eq!(title_slug("🌍 国際 Test", 40), "test");
        assert_eq!(title_slug("???", 40), "item");
    }
}
