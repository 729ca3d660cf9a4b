pub mod field;
pub mod wizard;

pub use field::{Constraint, FieldKind, FieldSpec, Pattern, Rule};
pub use wizard::{FormSchema, StepDefinition, StepDocument, WizardDocument, WizardSpec};

/// JSON Schema describing the on-disk [`WizardDocument`] format.
pub fn document_schema() -> serde_json::Value {
    schemars::schema_for!(WizardDocument).to_value()
}
