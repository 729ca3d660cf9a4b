#![allow(missing_docs)]

pub mod error;
pub mod navigation;
pub mod render;
pub mod session;
pub mod spec;
pub mod store;
pub mod validate;

pub use error::{ConfigError, WizardError};
pub use navigation::{Action, Navigator, SubmitOutcome, Transition};
pub use render::{
    RenderField, RenderPayload, RenderStatus, build_render_payload, render_card, render_json_ui,
    render_text,
};
pub use session::{Outcome, Progress, StepView, Submission, Wizard};
pub use spec::{
    Constraint, FieldKind, FieldSpec, FormSchema, Pattern, Rule, StepDefinition, WizardDocument,
    WizardSpec, document_schema,
};
pub use store::FormState;
pub use validate::{ValidationError, ValidationReport, Values, validate_all, validate_fields};
