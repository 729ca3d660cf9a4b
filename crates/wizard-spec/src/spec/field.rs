use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

/// Supported value kinds for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    String,
    Number,
    Integer,
    Boolean,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Integer => "integer",
            FieldKind::Boolean => "boolean",
        }
    }

    /// Whether a non-null value carries the JSON type this kind expects.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::Integer => value.is_i64() || value.is_u64(),
            FieldKind::Boolean => value.is_boolean(),
        }
    }
}

/// Regular expression compiled once, when the rule is built or deserialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl TryFrom<String> for Pattern {
    type Error = regex::Error;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        Self::new(&source)
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.as_str().to_string()
    }
}

/// Predicate half of a constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Rule {
    Required,
    MinLength { min: usize },
    MaxLength { max: usize },
    Pattern {
        #[schemars(with = "String")]
        pattern: Pattern,
    },
    Email,
    Min { min: f64 },
    Max { max: f64 },
    OneOf { choices: Vec<Value> },
}

impl Rule {
    /// Returns `true` when `value` satisfies the rule.
    ///
    /// Length rules read `null` as the empty string; every other rule fails
    /// on a value of the wrong shape.
    pub fn check(&self, value: &Value) -> bool {
        match self {
            Rule::Required => match value {
                Value::Null => false,
                Value::String(text) => !text.trim().is_empty(),
                _ => true,
            },
            Rule::MinLength { min } => text_len(value).is_some_and(|len| len >= *min),
            Rule::MaxLength { max } => text_len(value).is_some_and(|len| len <= *max),
            Rule::Pattern { pattern } => {
                value.as_str().is_some_and(|text| pattern.is_match(text))
            }
            Rule::Email => value.as_str().is_some_and(|text| EMAIL.is_match(text)),
            Rule::Min { min } => value.as_f64().is_some_and(|number| number >= *min),
            Rule::Max { max } => value.as_f64().is_some_and(|number| number <= *max),
            Rule::OneOf { choices } => choices.contains(value),
        }
    }
}

fn text_len(value: &Value) -> Option<usize> {
    match value {
        Value::Null => Some(0),
        Value::String(text) => Some(text.chars().count()),
        _ => None,
    }
}

/// A rule paired with the message reported when it fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Constraint {
    #[serde(flatten)]
    pub rule: Rule,
    pub message: String,
}

impl Constraint {
    pub fn new(rule: Rule, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
        }
    }
}

/// Declarative rule set for one form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// `null` is accepted without running the constraint chain.
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            label: None,
            description: None,
            default: None,
            nullable: false,
            constraints: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn constraint(mut self, rule: Rule, message: impl Into<String>) -> Self {
        self.constraints.push(Constraint::new(rule, message));
        self
    }

    /// Label used by renderers, falling back to the field name.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Value a freshly mounted form holds for this field.
    pub fn initial_value(&self) -> Value {
        self.default.clone().unwrap_or(Value::Null)
    }
}
