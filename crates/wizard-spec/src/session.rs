use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::WizardError;
use crate::navigation::{Action, Navigator, SubmitOutcome, Transition};
use crate::spec::wizard::{StepDefinition, WizardSpec};
use crate::store::FormState;
use crate::validate::{ValidationError, Values};

/// Validated values handed to the submission handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub form_id: String,
    pub values: Values,
}

impl Submission {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>, serde_cbor::Error> {
        serde_cbor::to_vec(self)
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self, serde_cbor::Error> {
        serde_cbor::from_slice(bytes)
    }
}

/// Outcome of any session action.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Moved { from: usize, to: usize },
    Blocked { errors: Vec<ValidationError> },
    Submitted(Submission),
    Ignored,
}

/// Step position shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub step: usize,
    pub total: usize,
}

/// One wizard session: spec, form state and navigator owned together.
#[derive(Debug, Clone)]
pub struct Wizard {
    spec: Arc<WizardSpec>,
    state: FormState,
    navigator: Navigator,
}

impl Wizard {
    pub fn new(spec: Arc<WizardSpec>) -> Self {
        let state = FormState::new(spec.schema());
        let navigator = Navigator::new(spec.total_steps());
        Self {
            spec,
            state,
            navigator,
        }
    }

    /// Resumes a session with existing state at `step`.
    pub fn resume(spec: Arc<WizardSpec>, state: FormState, step: usize, completed: bool) -> Self {
        let navigator = Navigator::restore(spec.total_steps(), step, completed);
        Self {
            spec,
            state,
            navigator,
        }
    }

    pub fn spec(&self) -> &WizardSpec {
        &self.spec
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut FormState {
        &mut self.state
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn current_step(&self) -> usize {
        self.navigator.current_step()
    }

    pub fn step(&self) -> &StepDefinition {
        &self.spec.steps()[self.navigator.current_step()]
    }

    pub fn progress(&self) -> Progress {
        Progress {
            step: self.navigator.current_step() + 1,
            total: self.navigator.total_steps(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.navigator.is_completed()
    }

    /// Actions whose guards currently hold.
    pub fn available_actions(&self) -> Vec<Action> {
        [Action::Back, Action::Next, Action::Submit]
            .into_iter()
            .filter(|action| self.navigator.can(*action))
            .collect()
    }

    pub fn set_value(&mut self, name: &str, value: Value) -> Result<(), WizardError> {
        self.state.set_value(name, value)
    }

    pub fn next(&mut self) -> Transition {
        self.navigator.next(&self.spec, &mut self.state)
    }

    pub fn back(&mut self) -> Transition {
        self.navigator.back()
    }

    pub fn submit(&mut self) -> SubmitOutcome {
        self.navigator.submit(&self.spec, &mut self.state)
    }

    pub fn apply(&mut self, action: Action) -> Outcome {
        match action {
            Action::Next | Action::Back => {
                let transition = if action == Action::Next {
                    self.next()
                } else {
                    self.back()
                };
                match transition {
                    Transition::Advanced { from, to } | Transition::Retreated { from, to } => {
                        Outcome::Moved { from, to }
                    }
                    Transition::Blocked { errors } => Outcome::Blocked { errors },
                    Transition::Ignored => Outcome::Ignored,
                }
            }
            Action::Submit => match self.submit() {
                SubmitOutcome::Completed(values) => Outcome::Submitted(Submission {
                    form_id: self.spec.id().to_string(),
                    values,
                }),
                SubmitOutcome::Rejected { errors } => Outcome::Blocked { errors },
                SubmitOutcome::Ignored => Outcome::Ignored,
            },
        }
    }

    /// Starts over with a freshly mounted form.
    pub fn reset(&mut self) {
        self.state = FormState::new(self.spec.schema());
        self.navigator.reset();
    }

    /// Handle restricted to the fields of the current step.
    pub fn view(&mut self) -> StepView<'_> {
        let index = self.navigator.current_step();
        StepView {
            step: &self.spec.steps()[index],
            state: &mut self.state,
        }
    }
}

/// Per-step access to the form state.
pub struct StepView<'a> {
    step: &'a StepDefinition,
    state: &'a mut FormState,
}

impl StepView<'_> {
    pub fn index(&self) -> usize {
        self.step.index()
    }

    pub fn label(&self) -> &str {
        self.step.label()
    }

    pub fn fields(&self) -> &[String] {
        self.step.fields()
    }

    pub fn value(&self, name: &str) -> Result<&Value, WizardError> {
        self.guard(name)?;
        self.state
            .value(name)
            .ok_or_else(|| WizardError::UnknownField(name.to_string()))
    }

    pub fn error(&self, name: &str) -> Result<Option<&str>, WizardError> {
        self.guard(name)?;
        Ok(self.state.error(name))
    }

    pub fn set_value(&mut self, name: &str, value: Value) -> Result<(), WizardError> {
        self.guard(name)?;
        self.state.set_value(name, value)
    }

    fn guard(&self, name: &str) -> Result<(), WizardError> {
        if self.step.owns(name) {
            Ok(())
        } else {
            Err(WizardError::FieldNotInStep {
                field: name.to_string(),
                step: self.step.index(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::field::{FieldKind, FieldSpec, Rule};
    use crate::spec::wizard::FormSchema;
    use serde_json::json;

    fn wizard() -> Wizard {
        let schema = FormSchema::new(vec![
            FieldSpec::new("city", FieldKind::String).constraint(Rule::Required, "City required"),
            FieldSpec::new("zip", FieldKind::String).constraint(Rule::Required, "Zip required"),
        ])
        .expect("schema");
        let spec = WizardSpec::new(
            "address",
            "Address",
            schema,
            vec![
                StepDefinition::new(0, "City", vec!["city".into()]),
                StepDefinition::new(1, "Zip", vec!["zip".into()]),
            ],
        )
        .expect("spec");
        Wizard::new(Arc::new(spec))
    }

    #[test]
    fn view_rejects_fields_of_other_steps() {
        let mut wizard = wizard();
        let mut view = wizard.view();
        assert_eq!(
            view.set_value("zip", json!("1000")),
            Err(WizardError::FieldNotInStep {
                field: "zip".into(),
                step: 0
            })
        );
        view.set_value("city", json!("Oslo")).expect("own field");
        assert_eq!(view.value("city"), Ok(&json!("Oslo")));
        assert!(view.error("zip").is_err());
    }

    #[test]
    fn available_actions_follow_guards() {
        let mut wizard = wizard();
        assert_eq!(wizard.available_actions(), vec![Action::Next]);
        wizard.set_value("city", json!("Oslo")).expect("set");
        assert_eq!(wizard.apply(Action::Next), Outcome::Moved { from: 0, to: 1 });
        assert_eq!(
            wizard.available_actions(),
            vec![Action::Back, Action::Submit]
        );
    }

    #[test]
    fn submission_round_trips_through_cbor() {
        let mut wizard = wizard();
        wizard.set_value("city", json!("Oslo")).expect("set");
        wizard.next();
        wizard.set_value("zip", json!("0150")).expect("set");
        let Outcome::Submitted(submission) = wizard.apply(Action::Submit) else {
            panic!("expected submission");
        };
        let bytes = submission.to_cbor().expect("cbor");
        assert_eq!(Submission::from_cbor(&bytes).expect("decode"), submission);
        assert!(wizard.is_completed());
        assert!(wizard.available_actions().is_empty());
    }

    #[test]
    fn reset_restores_a_fresh_form() {
        let mut wizard = wizard();
        wizard.set_value("city", json!("Oslo")).expect("set");
        wizard.next();
        wizard.reset();
        assert_eq!(wizard.current_step(), 0);
        assert_eq!(wizard.state().value("city"), Some(&Value::Null));
    }
}
