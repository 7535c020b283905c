//! Front-matter parsing and validation

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::fmt;
use std::path::Path;

use crate::error::Error;

/// Front-matter data from a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrontMatter {
    pub title: String,
    /// Publication date
    pub date: NaiveDate,
    pub excerpt: String,
    pub description: String,
    /// Drafts are hidden outside development mode
    pub draft: bool,
}

/// Validation failures, grouped per field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors {
    /// Errors that concern the header as a whole
    pub form_errors: Vec<String>,
    /// Field name to messages, in schema order
    pub field_errors: IndexMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn add_form(&mut self, message: impl Into<String>) {
        self.form_errors.push(message.into());
    }

    pub fn add_field(&mut self, field: &str, message: impl Into<String>) {
        self.field_errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    /// Messages recorded for a field
    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.field_errors.get(name).map(Vec::as_slice)
    }

    /// Pretty JSON rendering used for diagnostics pages
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_string())
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for message in &self.form_errors {
            writeln!(f, "  {}", message)?;
        }
        for (field, messages) in &self.field_errors {
            writeln!(f, "  {}: {}", field, messages.join("; "))?;
        }
        Ok(())
    }
}

/// Why a document's front-matter could not be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontMatterError {
    /// No `---` delimited header at the start of the text
    Malformed,
    /// Header present but failed validation
    Invalid(FieldErrors),
}

impl FrontMatterError {
    /// Attach the document path
    pub fn at(self, path: &Path) -> Error {
        let path = path.to_path_buf();
        match self {
            FrontMatterError::Malformed => Error::MalformedDocument { path },
            FrontMatterError::Invalid(errors) => Error::InvalidFrontmatter { path, errors },
        }
    }
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, body) with the body trimmed
    pub fn parse(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let (header, body) = split(content).ok_or(FrontMatterError::Malformed)?;
        let fm = Self::from_yaml(header).map_err(FrontMatterError::Invalid)?;
        Ok((fm, body))
    }

    /// Parse and validate the YAML between the delimiters
    pub fn from_yaml(header: &str) -> Result<Self, FieldErrors> {
        if header.trim().is_empty() {
            return validate(Value::Null);
        }
        let value: Value = match serde_yaml::from_str(header) {
            Ok(value) => value,
            Err(e) => {
                let mut errors = FieldErrors::default();
                errors.add_form(format!("[invalid_yaml] {}", e));
                return Err(errors);
            }
        };
        validate(value)
    }
}

/// Split a document into (header, body)
///
/// The text must open with a `---` line; the header runs until the next
/// line starting with `---`.
pub fn split(content: &str) -> Option<(&str, &str)> {
    let rest = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))?;

    // Empty header: the closing delimiter follows immediately
    if let Some(after) = rest.strip_prefix("---") {
        return Some(("", after.trim()));
    }

    let end = rest.find("\n---")?;
    let header = rest[..end].trim_end_matches('\r');
    let body = rest[end + 4..].trim();
    Some((header, body))
}

fn validate(value: Value) -> Result<FrontMatter, FieldErrors> {
    let mut errors = FieldErrors::default();

    let mapping = match value {
        Value::Mapping(mapping) => mapping,
        Value::Null => Mapping::new(),
        other => {
            errors.add_form(format!(
                "[invalid_type] Expected object, received {}",
                type_name(&other)
            ));
            return Err(errors);
        }
    };

    let title = required_string(&mapping, "title", &mut errors);
    let date = required_date(&mapping, "date", &mut errors);
    let excerpt = required_string(&mapping, "excerpt", &mut errors);
    let description = required_string(&mapping, "description", &mut errors);
    let draft = optional_bool(&mapping, "draft", &mut errors).unwrap_or(false);

    match (title, date, excerpt, description) {
        (Some(title), Some(date), Some(excerpt), Some(description)) if errors.is_empty() => {
            Ok(FrontMatter {
                title,
                date,
                excerpt,
                description,
                draft,
            })
        }
        _ => Err(errors),
    }
}

fn required_string(mapping: &Mapping, field: &str, errors: &mut FieldErrors) -> Option<String> {
    match mapping.get(field) {
        None => {
            errors.add_field(field, "[invalid_type] Required");
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            errors.add_field(
                field,
                format!("[invalid_type] Expected string, received {}", type_name(other)),
            );
            None
        }
    }
}

fn required_date(mapping: &Mapping, field: &str, errors: &mut FieldErrors) -> Option<NaiveDate> {
    match mapping.get(field) {
        None => {
            errors.add_field(field, "[invalid_type] Required");
            None
        }
        Some(Value::String(s)) => {
            let date = parse_date_string(s);
            if date.is_none() {
                errors.add_field(field, format!("[invalid_date] Invalid date {:?}", s));
            }
            date
        }
        Some(other) => {
            errors.add_field(
                field,
                format!("[invalid_type] Expected date, received {}", type_name(other)),
            );
            None
        }
    }
}

fn optional_bool(mapping: &Mapping, field: &str, errors: &mut FieldErrors) -> Option<bool> {
    match mapping.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::Bool(b)) => Some(*b),
        Some(other) => {
            errors.add_field(
                field,
                format!("[invalid_type] Expected boolean, received {}", type_name(other)),
            );
            None
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "array",
        Value::Mapping(_) => "object",
        Value::Tagged(_) => "tagged value",
    }
}

/// Parse a date string in various formats, keeping the calendar date
fn parse_date_string(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    const POST: &str = r#"---
title: Hello World
date: 2024-01-15
excerpt: A first post
description: Saying hello
---

This is the content.
"#;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let (fm, body) = FrontMatter::parse(POST).unwrap();
        assert_eq!(fm.title, "Hello World");
        assert_eq!(fm.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(fm.excerpt, "A first post");
        assert_eq!(fm.description, "Saying hello");
        assert!(!fm.draft);
        assert_eq!(body, "This is the content.");
    }

    #[test]
    fn test_draft_flag() {
        let content = POST.replacen("excerpt:", "draft: true\nexcerpt:", 1);
        let (fm, _) = FrontMatter::parse(&content).unwrap();
        assert!(fm.draft);
    }

    #[test]
    fn test_missing_delimiters() {
        assert_eq!(
            FrontMatter::parse("title: Hello\n\nNo header here."),
            Err(FrontMatterError::Malformed)
        );
        assert_eq!(
            FrontMatter::parse("---\ntitle: never closed\n"),
            Err(FrontMatterError::Malformed)
        );
        // The opening delimiter must be the first line
        assert_eq!(
            FrontMatter::parse("\n---\ntitle: x\n---\n"),
            Err(FrontMatterError::Malformed)
        );
    }

    #[test]
    fn test_missing_required_field() {
        let content = POST.replace("excerpt: A first post\n", "");
        let errors = match FrontMatter::parse(&content) {
            Err(FrontMatterError::Invalid(errors)) => errors,
            other => panic!("expected invalid front-matter, got {:?}", other),
        };
        assert_eq!(
            errors.field("excerpt"),
            Some(&["[invalid_type] Required".to_string()][..])
        );
        assert!(errors.field("title").is_none());
    }

    #[test]
    fn test_collects_every_field_error() {
        let content = "---\ntitle: 42\ndate: someday\ndraft: maybe\n---\nbody";
        let errors = match FrontMatter::parse(content) {
            Err(FrontMatterError::Invalid(errors)) => errors,
            other => panic!("expected invalid front-matter, got {:?}", other),
        };
        let fields: Vec<_> = errors.field_errors.keys().cloned().collect();
        assert_eq!(
            fields,
            vec!["title", "date", "excerpt", "description", "draft"]
        );
        assert_eq!(
            errors.field("title").unwrap()[0],
            "[invalid_type] Expected string, received number"
        );
        assert!(errors.field("date").unwrap()[0].starts_with("[invalid_date]"));
    }

    #[test]
    fn test_empty_header_reports_required_fields() {
        let errors = match FrontMatter::parse("---\n---\nbody") {
            Err(FrontMatterError::Invalid(errors)) => errors,
            other => panic!("expected invalid front-matter, got {:?}", other),
        };
        assert_eq!(errors.field_errors.len(), 4);
    }

    #[test]
    fn test_non_mapping_header() {
        let errors = match FrontMatter::parse("---\n- a\n- b\n---\nbody") {
            Err(FrontMatterError::Invalid(errors)) => errors,
            other => panic!("expected invalid front-matter, got {:?}", other),
        };
        assert_eq!(
            errors.form_errors,
            vec!["[invalid_type] Expected object, received array".to_string()]
        );
    }

    #[test]
    fn test_yaml_syntax_error() {
        let result = FrontMatter::parse("---\ntitle: [unclosed\n---\nbody");
        match result {
            Err(FrontMatterError::Invalid(errors)) => {
                assert!(errors.form_errors[0].starts_with("[invalid_yaml]"))
            }
            other => panic!("expected invalid front-matter, got {:?}", other),
        }
    }

    #[test]
    fn test_crlf_line_endings() {
        let content = POST.replace('\n', "\r\n");
        let (fm, body) = FrontMatter::parse(&content).unwrap();
        assert_eq!(fm.title, "Hello World");
        assert_eq!(body, "This is the content.");
    }

    #[test]
    fn test_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15);
        assert_eq!(parse_date_string("2024-01-15"), expected);
        assert_eq!(parse_date_string("2024/01/15"), expected);
        assert_eq!(parse_date_string("2024-01-15 10:30:00"), expected);
        assert_eq!(parse_date_string("2024-01-15T10:30:00.250"), expected);
        assert_eq!(parse_date_string("2024-01-15T10:30:00+02:00"), expected);
        assert_eq!(parse_date_string("January 15"), None);
    }

    #[test]
    fn test_field_errors_json() {
        let mut errors = FieldErrors::default();
        errors.add_field("title", "[invalid_type] Required");
        let json: serde_json::Value = serde_json::from_str(&errors.to_json_pretty()).unwrap();
        assert_eq!(json["field_errors"]["title"][0], "[invalid_type] Required");
    }
}
