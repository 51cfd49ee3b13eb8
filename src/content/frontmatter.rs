//! Front-matter parsing
//!
//! Every post starts with a YAML metadata block delimited by `---`
//! fences. Unlike looser generators, a missing or malformed block is a
//! hard error: the build aborts rather than guessing at metadata.

use chrono::{DateTime, Local, LocalResult, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while splitting and decoding a front-matter block
#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("missing front-matter block, expected a leading `---` fence")]
    MissingBlock,

    #[error("unterminated front-matter block, no closing `---` fence")]
    Unterminated,

    #[error("invalid front-matter YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("front-matter is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("unrecognized date format: {0:?}")]
    InvalidDate(String),
}

/// Front-matter data from a post
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    /// Posts must opt in to publication
    pub public: bool,
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            date: None,
            public: false,
        }
    }
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let content = content.trim_start_matches('\u{feff}');

        let rest = content
            .strip_prefix("---")
            .ok_or(FrontMatterError::MissingBlock)?;
        let rest = rest.trim_start_matches(['\n', '\r']);

        let end_pos = rest.find("\n---").ok_or(FrontMatterError::Unterminated)?;
        let yaml_content = &rest[..end_pos];
        let remaining = &rest[end_pos + 4..]; // Skip \n---
        let remaining = remaining.trim_start_matches(['\n', '\r']);

        let fm: FrontMatter = serde_yaml::from_str(yaml_content)?;

        if fm.title.as_deref().map_or(true, |t| t.trim().is_empty()) {
            return Err(FrontMatterError::MissingField("title"));
        }
        if fm.date.is_none() {
            return Err(FrontMatterError::MissingField("date"));
        }

        Ok((fm, remaining))
    }

    /// Parse the date string into a DateTime
    pub fn parse_date(&self) -> Result<DateTime<Local>, FrontMatterError> {
        let raw = self
            .date
            .as_deref()
            .ok_or(FrontMatterError::MissingField("date"))?;
        parse_date_string(raw).ok_or_else(|| FrontMatterError::InvalidDate(raw.to_string()))
    }
}

/// Parse a date string in various formats
fn parse_date_string(s: &str) -> Option<DateTime<Local>> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return local_from_naive(dt);
        }
        // Try parsing date only
        if let Ok(d) = chrono::NaiveDate::parse_from_str(s, fmt) {
            let dt = d.and_hms_opt(0, 0, 0)?;
            return local_from_naive(dt);
        }
    }

    // Try RFC 3339 / ISO 8601
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local));
    }

    None
}

/// Interpret a naive datetime as local wall-clock time.
///
/// A declared date has no timezone attached; treating it as a UTC
/// instant shifts the displayed date in any negative-offset timezone.
/// DST makes some wall-clock times ambiguous (take the earlier) or
/// nonexistent (skip past the gap).
fn local_from_naive(dt: NaiveDateTime) -> Option<DateTime<Local>> {
    match Local.from_local_datetime(&dt) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earlier, _) => Some(earlier),
        LocalResult::None => Local
            .from_local_datetime(&(dt + chrono::Duration::hours(1)))
            .earliest(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello World
description: A first post
date: 2024-01-15 10:30:00
public: true
---

This is the content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, Some("Hello World".to_string()));
        assert_eq!(fm.description, Some("A first post".to_string()));
        assert!(fm.public);
        assert!(remaining.contains("This is the content."));
    }

    #[test]
    fn test_public_defaults_to_false() {
        let content = "---\ntitle: Draft\ndate: 2024-01-15\n---\nBody.\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert!(!fm.public);
    }

    #[test]
    fn test_missing_block_is_error() {
        let err = FrontMatter::parse("Just some markdown.\n").unwrap_err();
        assert!(matches!(err, FrontMatterError::MissingBlock));
    }

    #[test]
    fn test_unterminated_block_is_error() {
        let err = FrontMatter::parse("---\ntitle: Oops\ndate: 2024-01-15\n").unwrap_err();
        assert!(matches!(err, FrontMatterError::Unterminated));
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let content = "---\ntitle: [unclosed\n---\nBody.\n";
        let err = FrontMatter::parse(content).unwrap_err();
        assert!(matches!(err, FrontMatterError::InvalidYaml(_)));
    }

    #[test]
    fn test_missing_title_is_error() {
        let content = "---\ndate: 2024-01-15\n---\nBody.\n";
        let err = FrontMatter::parse(content).unwrap_err();
        assert!(matches!(err, FrontMatterError::MissingField("title")));
    }

    #[test]
    fn test_missing_date_is_error() {
        let content = "---\ntitle: No Date\n---\nBody.\n";
        let err = FrontMatter::parse(content).unwrap_err();
        assert!(matches!(err, FrontMatterError::MissingField("date")));
    }

    #[test]
    fn test_parse_date() {
        let fm = FrontMatter {
            title: Some("t".to_string()),
            date: Some("2024-01-15 10:30:00".to_string()),
            ..Default::default()
        };

        let dt = fm.parse_date().unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "2024-01-15");
    }

    #[test]
    fn test_parse_date_only() {
        let fm = FrontMatter {
            title: Some("t".to_string()),
            date: Some("2024/03/02".to_string()),
            ..Default::default()
        };

        let dt = fm.parse_date().unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "2024-03-02");
    }

    #[test]
    fn test_date_only_is_stable_in_negative_offset_timezone() {
        std::env::set_var("TZ", "America/New_York");

        let fm = FrontMatter {
            title: Some("t".to_string()),
            date: Some("2024-03-02".to_string()),
            ..Default::default()
        };

        let dt = fm.parse_date().unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "2024-03-02");

        std::env::remove_var("TZ");
    }

    #[test]
    fn test_bogus_date_is_error() {
        let fm = FrontMatter {
            title: Some("t".to_string()),
            date: Some("next tuesday".to_string()),
            ..Default::default()
        };

        let err = fm.parse_date().unwrap_err();
        assert!(matches!(err, FrontMatterError::InvalidDate(_)));
    }
}
