use std::collections::{BTreeMap, BTreeSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::spec::field::FieldSpec;

/// Ordered field set, unique by name. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSchema {
    fields: Vec<FieldSpec>,
}

impl FormSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self, ConfigError> {
        let mut seen = BTreeSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(ConfigError::DuplicateField(field.name.clone()));
            }
        }
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Ordered grouping of fields belonging to one wizard step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDefinition {
    index: usize,
    label: String,
    fields: Vec<String>,
}

impl StepDefinition {
    pub fn new(index: usize, label: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            index,
            label: label.into(),
            fields,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn owns(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field == name)
    }
}

/// Serialized step entry of a [`WizardDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StepDocument {
    /// Optional explicit index; must match the step's position when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub label: String,
    pub fields: Vec<String>,
}

/// On-disk wizard definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WizardDocument {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<FieldSpec>,
    pub steps: Vec<StepDocument>,
}

/// Validated wizard: a schema plus the step table partitioning it.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardSpec {
    id: String,
    title: String,
    description: Option<String>,
    schema: FormSchema,
    steps: Vec<StepDefinition>,
}

impl WizardSpec {
    /// Builds a wizard, rejecting step tables that do not partition the schema.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        schema: FormSchema,
        steps: Vec<StepDefinition>,
    ) -> Result<Self, ConfigError> {
        if steps.is_empty() {
            return Err(ConfigError::NoSteps);
        }

        let mut owners: BTreeMap<&str, usize> = BTreeMap::new();
        for (position, step) in steps.iter().enumerate() {
            if step.index != position {
                return Err(ConfigError::StepIndexMismatch {
                    index: position,
                    declared: step.index,
                });
            }
            if step.fields.is_empty() {
                return Err(ConfigError::EmptyStep(position));
            }
            for name in &step.fields {
                if !schema.contains(name) {
                    return Err(ConfigError::UnknownStepField {
                        step: position,
                        field: name.clone(),
                    });
                }
                if let Some(first) = owners.insert(name.as_str(), position) {
                    return Err(ConfigError::FieldInMultipleSteps {
                        field: name.clone(),
                        first,
                        second: position,
                    });
                }
            }
        }

        if let Some(orphan) = schema.names().find(|name| !owners.contains_key(name)) {
            return Err(ConfigError::UnassignedField(orphan.to_string()));
        }

        Ok(Self {
            id: id.into(),
            title: title.into(),
            description: None,
            schema,
            steps,
        })
    }

    pub fn from_document(document: WizardDocument) -> Result<Self, ConfigError> {
        let schema = FormSchema::new(document.fields)?;
        let steps = document
            .steps
            .into_iter()
            .enumerate()
            .map(|(position, step)| {
                StepDefinition::new(step.index.unwrap_or(position), step.label, step.fields)
            })
            .collect();
        let mut spec = Self::new(document.id, document.title, schema, steps)?;
        spec.description = document.description;
        Ok(spec)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let document: WizardDocument =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        Self::from_document(document)
    }

    pub fn to_document(&self) -> WizardDocument {
        WizardDocument {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            fields: self.schema.fields.clone(),
            steps: self
                .steps
                .iter()
                .map(|step| StepDocument {
                    index: Some(step.index),
                    label: step.label.clone(),
                    fields: step.fields.clone(),
                })
                .collect(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&StepDefinition> {
        self.steps.get(index)
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// Index of the step owning `field`.
    pub fn step_of(&self, field: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.owns(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::field::FieldKind;

    fn schema() -> FormSchema {
        FormSchema::new(vec![
            FieldSpec::new("name", FieldKind::String),
            FieldSpec::new("email", FieldKind::String),
        ])
        .expect("schema")
    }

    fn step(index: usize, fields: &[&str]) -> StepDefinition {
        StepDefinition::new(
            index,
            format!("Step {index}"),
            fields.iter().map(|field| field.to_string()).collect(),
        )
    }

    #[test]
    fn partitioned_steps_are_accepted() {
        let spec = WizardSpec::new(
            "signup",
            "Signup",
            schema(),
            vec![step(0, &["name"]), step(1, &["email"])],
        )
        .expect("valid wizard");
        assert_eq!(spec.total_steps(), 2);
        assert_eq!(spec.step_of("email"), Some(1));
    }

    #[test]
    fn duplicate_fields_are_rejected() {
        let err = FormSchema::new(vec![
            FieldSpec::new("name", FieldKind::String),
            FieldSpec::new("name", FieldKind::Number),
        ])
        .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateField("name".into()));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let document = serde_json::json!({
            "id": "codes",
            "title": "Codes",
            "fields": [{
                "name": "code",
                "constraints": [{ "rule": "pattern", "pattern": "([a-z", "message": "bad code" }]
            }],
            "steps": [{ "label": "Code", "fields": ["code"] }]
        });
        let err = WizardSpec::from_json_str(&document.to_string()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(ref reason) if reason.contains("regex parse error")));
    }

    #[test]
    fn unknown_step_field_is_rejected() {
        let err = WizardSpec::new(
            "signup",
            "Signup",
            schema(),
            vec![step(0, &["name", "phone"]), step(1, &["email"])],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownStepField {
                step: 0,
                field: "phone".into()
            }
        );
    }

    #[test]
    fn overlapping_steps_are_rejected() {
        let err = WizardSpec::new(
            "signup",
            "Signup",
            schema(),
            vec![step(0, &["name", "email"]), step(1, &["email"])],
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::FieldInMultipleSteps { first: 0, second: 1, .. }));
    }

    #[test]
    fn uncovered_field_is_rejected() {
        let err = WizardSpec::new("signup", "Signup", schema(), vec![step(0, &["name"])])
            .unwrap_err();
        assert_eq!(err, ConfigError::UnassignedField("email".into()));
    }

    #[test]
    fn empty_and_misnumbered_steps_are_rejected() {
        assert_eq!(
            WizardSpec::new("w", "W", schema(), vec![]).unwrap_err(),
            ConfigError::NoSteps
        );
        assert_eq!(
            WizardSpec::new("w", "W", schema(), vec![step(0, &[]), step(1, &["name", "email"])])
                .unwrap_err(),
            ConfigError::EmptyStep(0)
        );
        assert_eq!(
            WizardSpec::new("w", "W", schema(), vec![step(1, &["name", "email"])]).unwrap_err(),
            ConfigError::StepIndexMismatch {
                index: 0,
                declared: 1
            }
        );
    }
}
