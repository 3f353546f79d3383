//! Front-matter parsing
//!
//! A document may open with a `---` delimited block. The text after the
//! opening `---` on the same line names the block language (`yaml` when
//! empty, `json`, or `toml`). The block ends at the first line starting
//! with `---`; whatever follows is the body.

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

const DELIMITER: &str = "---";
const CLOSING: &str = "\n---";

/// Front-matter parsing errors
#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("unsupported front-matter language: {0}")]
    UnsupportedLanguage(String),

    #[error("front-matter is not a key/value mapping")]
    NotAMapping,

    #[error("front-matter key must be a scalar, got {0}")]
    UnsupportedKey(String),

    #[error("invalid YAML front-matter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON front-matter: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML front-matter: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Key/value data from the head of a document, in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    pub fields: IndexMap<String, Value>,
}

impl FrontMatter {
    /// Split a document into its front-matter and the remaining body
    pub fn parse(input: &str) -> Result<(Self, &str), FrontMatterError> {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);

        let Some(after_open) = input.strip_prefix(DELIMITER) else {
            return Ok((FrontMatter::default(), input));
        };
        // `----` is a horizontal rule, not an opening delimiter
        if after_open.starts_with('-') {
            return Ok((FrontMatter::default(), input));
        }

        let (language, rest) = match after_open.find('\n') {
            Some(pos) => (after_open[..pos].trim(), &after_open[pos..]),
            None => (after_open.trim(), ""),
        };

        let (block, body) = match rest.find(CLOSING) {
            Some(pos) => {
                let body = &rest[pos + CLOSING.len()..];
                let body = body.strip_prefix('\r').unwrap_or(body);
                let body = body.strip_prefix('\n').unwrap_or(body);
                (&rest[..pos], body)
            }
            // Unterminated: everything is metadata
            None => (rest, ""),
        };

        let fields = parse_block(language, block)?;
        Ok((FrontMatter { fields }, body))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn parse_block(language: &str, block: &str) -> Result<IndexMap<String, Value>, FrontMatterError> {
    let has_content = block.lines().any(|line| {
        let line = line.trim();
        !line.is_empty() && !line.starts_with('#')
    });
    if !has_content {
        return Ok(IndexMap::new());
    }

    match language.to_ascii_lowercase().as_str() {
        "" | "yaml" | "yml" => {
            let value: serde_yaml::Value = serde_yaml::from_str(block)?;
            match value {
                serde_yaml::Value::Null => Ok(IndexMap::new()),
                serde_yaml::Value::Mapping(mapping) => yaml_mapping(mapping),
                _ => Err(FrontMatterError::NotAMapping),
            }
        }
        "json" => match serde_json::from_str::<Value>(block)? {
            Value::Object(map) => Ok(map.into_iter().collect()),
            Value::Null => Ok(IndexMap::new()),
            _ => Err(FrontMatterError::NotAMapping),
        },
        "toml" => {
            let table: toml::Table = toml::from_str(block)?;
            Ok(table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect())
        }
        other => Err(FrontMatterError::UnsupportedLanguage(other.to_string())),
    }
}

/// YAML keys may be numbers or booleans; they become their string form
fn yaml_mapping(mapping: serde_yaml::Mapping) -> Result<IndexMap<String, Value>, FrontMatterError> {
    mapping
        .into_iter()
        .map(|(key, value)| Ok((yaml_key(key)?, yaml_to_json(value)?)))
        .collect()
}

fn yaml_key(key: serde_yaml::Value) -> Result<String, FrontMatterError> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        serde_yaml::Value::Tagged(tagged) => yaml_key(tagged.value),
        other => Err(FrontMatterError::UnsupportedKey(format!("{:?}", other))),
    }
}

fn yaml_to_json(value: serde_yaml::Value) -> Result<Value, FrontMatterError> {
    Ok(match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<_, _>>()?,
        ),
        serde_yaml::Value::Mapping(mapping) => Value::Object(yaml_mapping(mapping)?.into_iter().collect()),
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

/// TOML datetimes have no JSON counterpart; they become their string form
fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = "---\ntitle: Hello World\ndate: 2024-01-15\ntags:\n  - rust\n---\nThis is the content.\n";

        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.fields["title"], Value::from("Hello World"));
        assert_eq!(fm.fields["date"], Value::from("2024-01-15"));
        assert_eq!(fm.fields["tags"], serde_json::json!(["rust"]));
        assert_eq!(body, "This is the content.\n");
    }

    #[test]
    fn test_fields_keep_source_order() {
        let content = "---\nzeta: 1\nalpha: 2\nmid: 3\n---\n";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        let keys: Vec<_> = fm.fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_no_frontmatter_returns_input_unchanged() {
        let content = "  # Just markdown\n\nNo metadata here.";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_horizontal_rule_is_not_frontmatter() {
        let content = "----\ntitle: nope\n----\n";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_empty_block() {
        let (fm, body) = FrontMatter::parse("---\n---\nBody").unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_comment_only_block() {
        let (fm, body) = FrontMatter::parse("---\n# draft notes\n---\nBody").unwrap();
        assert!(fm.is_empty());
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_unterminated_block_has_empty_body() {
        let (fm, body) = FrontMatter::parse("---\ntitle: Open ended\n").unwrap();
        assert_eq!(fm.fields["title"], Value::from("Open ended"));
        assert_eq!(body, "");
    }

    #[test]
    fn test_crlf_line_endings() {
        let content = "---\r\ntitle: Windows\r\n---\r\nBody\r\n";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.fields["title"], Value::from("Windows"));
        assert_eq!(body, "Body\r\n");
    }

    #[test]
    fn test_only_one_newline_stripped_after_block() {
        let (_, body) = FrontMatter::parse("---\na: 1\n---\n\n\nBody").unwrap();
        assert_eq!(body, "\n\nBody");
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let (fm, body) = FrontMatter::parse("\u{feff}---\ntitle: BOM\n---\nBody").unwrap();
        assert_eq!(fm.fields["title"], Value::from("BOM"));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_json_language() {
        let content = "---json\n{\"title\": \"From JSON\", \"draft\": true}\n---\nBody";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.fields["title"], Value::from("From JSON"));
        assert_eq!(fm.fields["draft"], Value::Bool(true));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_toml_language() {
        let content = "---toml\ntitle = \"From TOML\"\npublished = 1979-05-27\n---\nBody";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.fields["title"], Value::from("From TOML"));
        assert_eq!(fm.fields["published"], Value::from("1979-05-27"));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_unknown_language_is_rejected() {
        let err = FrontMatter::parse("---coffee\ntitle: x\n---\n").unwrap_err();
        assert!(matches!(err, FrontMatterError::UnsupportedLanguage(lang) if lang == "coffee"));
    }

    #[test]
    fn test_scalar_block_is_rejected() {
        let err = FrontMatter::parse("---\njust a sentence\n---\nBody").unwrap_err();
        assert!(matches!(err, FrontMatterError::NotAMapping));
    }

    #[test]
    fn test_invalid_yaml_is_rejected() {
        let err = FrontMatter::parse("---\ntitle: [unclosed\n---\nBody").unwrap_err();
        assert!(matches!(err, FrontMatterError::Yaml(_)));
    }

    #[test]
    fn test_yaml_scalar_keys_become_strings() {
        let (fm, body) = FrontMatter::parse("---\ntitle: T\n2024: recap\ntrue: yes\n---\nBody").unwrap();
        assert_eq!(body, "Body");
        let keys: Vec<&str> = fm.fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["title", "2024", "true"]);
        assert_eq!(fm.fields["2024"], Value::from("recap"));
    }

    #[test]
    fn test_yaml_nested_values_convert() {
        let (fm, _) =
            FrontMatter::parse("---\ntags: [a, b]\nseries:\n  1: intro\n  part: 2\n---\n").unwrap();
        assert_eq!(fm.fields["tags"], serde_json::json!(["a", "b"]));
        assert_eq!(fm.fields["series"], serde_json::json!({ "1": "intro", "part": 2 }));
    }

    #[test]
    fn test_yaml_sequence_key_is_rejected() {
        let err = FrontMatter::parse("---\n[a, b]: value\n---\n").unwrap_err();
        assert!(matches!(err, FrontMatterError::UnsupportedKey(_)));
    }
}
