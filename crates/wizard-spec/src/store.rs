use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::error::WizardError;
use crate::spec::wizard::FormSchema;
use crate::validate::{ValidationReport, Values};

/// Step-agnostic holder of every field value and error message.
///
/// Views poll [`FormState::take_changed`] after each event to learn which
/// fields need re-rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    values: Values,
    errors: BTreeMap<String, Option<String>>,
    changed: BTreeSet<String>,
}

impl FormState {
    pub fn new(schema: &FormSchema) -> Self {
        let values: Values = schema
            .fields()
            .iter()
            .map(|field| (field.name.clone(), field.initial_value()))
            .collect();
        let errors = schema
            .names()
            .map(|name| (name.to_string(), None))
            .collect();
        Self {
            values,
            errors,
            changed: BTreeSet::new(),
        }
    }

    /// Rebuilds a store from previously captured values and errors.
    pub fn restore(
        schema: &FormSchema,
        values: Values,
        errors: BTreeMap<String, String>,
    ) -> Result<Self, WizardError> {
        let mut state = Self::new(schema);
        for (name, value) in values {
            state.set_value(&name, value)?;
        }
        for (name, message) in errors {
            let slot = state
                .errors
                .get_mut(&name)
                .ok_or(WizardError::UnknownField(name))?;
            *slot = Some(message);
        }
        state.changed.clear();
        Ok(state)
    }

    /// Stores a raw value. Error entries are left alone until the next validation run.
    pub fn set_value(&mut self, name: &str, value: Value) -> Result<(), WizardError> {
        let slot = self
            .values
            .get_mut(name)
            .ok_or_else(|| WizardError::UnknownField(name.to_string()))?;
        *slot = value;
        self.changed.insert(name.to_string());
        Ok(())
    }

    /// Current value; fields start out holding their default.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).and_then(|error| error.as_deref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Overwrites error entries for exactly the fields in the report.
    pub fn apply_validation(&mut self, report: &ValidationReport) {
        for outcome in &report.outcomes {
            if let Some(slot) = self.errors.get_mut(&outcome.field) {
                if *slot != outcome.error {
                    self.changed.insert(outcome.field.clone());
                }
                *slot = outcome.error.clone();
            }
        }
    }

    pub fn clear_errors(&mut self) {
        for (name, error) in self.errors.iter_mut() {
            if error.take().is_some() {
                self.changed.insert(name.clone());
            }
        }
    }

    pub fn error_count(&self) -> usize {
        self.errors.values().filter(|error| error.is_some()).count()
    }

    pub fn errors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors
            .iter()
            .filter_map(|(name, error)| error.as_deref().map(|error| (name.as_str(), error)))
    }

    pub fn values(&self) -> &Values {
        &self.values
    }

    /// Immutable copy of the values, handed to submission handlers.
    pub fn values_snapshot(&self) -> Values {
        self.values.clone()
    }

    /// Drains the names of fields whose value or error changed since the last call.
    pub fn take_changed(&mut self) -> BTreeSet<String> {
        std::mem::take(&mut self.changed)
    }
}
