use thiserror::Error;

/// Rejected wizard configuration, raised while building a [`crate::WizardSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("wizard must define at least one step")]
    NoSteps,
    #[error("field '{0}' is declared more than once")]
    DuplicateField(String),
    #[error("step {index} declares index {declared}")]
    StepIndexMismatch { index: usize, declared: usize },
    #[error("step {0} owns no fields")]
    EmptyStep(usize),
    #[error("step {step} references unknown field '{field}'")]
    UnknownStepField { step: usize, field: String },
    #[error("field '{field}' is owned by steps {first} and {second}")]
    FieldInMultipleSteps {
        field: String,
        first: usize,
        second: usize,
    },
    #[error("field '{0}' is not owned by any step")]
    UnassignedField(String),
    #[error("failed to parse wizard spec: {0}")]
    Parse(String),
}

/// Misuse of the form state or step view API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("field '{field}' does not belong to step {step}")]
    FieldNotInStep { field: String, step: usize },
}
