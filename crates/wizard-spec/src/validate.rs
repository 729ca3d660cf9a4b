use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::WizardError;
use crate::spec::field::FieldSpec;
use crate::spec::wizard::FormSchema;

/// Field values keyed by field name.
pub type Values = BTreeMap<String, Value>;

/// First failing constraint for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

/// Outcome of validating one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOutcome {
    pub field: String,
    pub error: Option<String>,
}

/// Per-field outcomes, in the order the fields were requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub outcomes: Vec<FieldOutcome>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.error.is_none())
    }

    pub fn get(&self, field: &str) -> Option<&FieldOutcome> {
        self.outcomes.iter().find(|outcome| outcome.field == field)
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(|outcome| outcome.error.as_deref())
    }

    pub fn errors(&self) -> Vec<ValidationError> {
        self.outcomes
            .iter()
            .filter_map(|outcome| {
                outcome.error.as_ref().map(|message| ValidationError {
                    field: outcome.field.clone(),
                    message: message.clone(),
                })
            })
            .collect()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().map(|outcome| outcome.field.as_str())
    }
}

/// Validates only the named fields against the schema.
///
/// Fields missing from `values` are checked against their default (or `null`).
pub fn validate_fields<S: AsRef<str>>(
    schema: &FormSchema,
    names: &[S],
    values: &Values,
) -> Result<ValidationReport, WizardError> {
    let outcomes = names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            let field = schema
                .field(name)
                .ok_or_else(|| WizardError::UnknownField(name.to_string()))?;
            Ok(FieldOutcome {
                field: name.to_string(),
                error: validate_field(field, values),
            })
        })
        .collect::<Result<Vec<_>, WizardError>>()?;

    let report = ValidationReport { outcomes };
    tracing::debug!(
        fields = report.outcomes.len(),
        errors = report.errors().len(),
        "validated field subset"
    );
    Ok(report)
}

/// Validates every field of the schema.
pub fn validate_all(schema: &FormSchema, values: &Values) -> ValidationReport {
    ValidationReport {
        outcomes: schema
            .fields()
            .iter()
            .map(|field| FieldOutcome {
                field: field.name.clone(),
                error: validate_field(field, values),
            })
            .collect(),
    }
}

fn validate_field(field: &FieldSpec, values: &Values) -> Option<String> {
    let fallback;
    let value = match values.get(&field.name) {
        Some(value) => value,
        None => {
            fallback = field.initial_value();
            &fallback
        }
    };
    check_value(field, value)
}

/// Runs the kind check then the constraint chain; the first failure wins.
pub fn check_value(field: &FieldSpec, value: &Value) -> Option<String> {
    if value.is_null() {
        if field.nullable {
            return None;
        }
    } else if !field.kind.accepts(value) {
        return Some(format!("Expected {}", field.kind.as_str()));
    }

    field
        .constraints
        .iter()
        .find(|constraint| !constraint.rule.check(value))
        .map(|constraint| constraint.message.clone())
}
