use serde::{Deserialize, Serialize};

use crate::spec::wizard::WizardSpec;
use crate::store::FormState;
use crate::validate::{ValidationError, Values, validate_all, validate_fields};

/// Navigation actions a view can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Next,
    Back,
    Submit,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Next => "next",
            Action::Back => "back",
            Action::Submit => "submit",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "next" => Some(Action::Next),
            "back" => Some(Action::Back),
            "submit" => Some(Action::Submit),
            _ => None,
        }
    }
}

/// Result of a `next` or `back` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Advanced { from: usize, to: usize },
    Retreated { from: usize, to: usize },
    /// Validation failed; the errors are also stored in the form state.
    Blocked { errors: Vec<ValidationError> },
    /// The action's guard did not hold.
    Ignored,
}

/// Result of a `submit` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Completed(Values),
    Rejected { errors: Vec<ValidationError> },
    Ignored,
}

/// State machine over the current step index.
///
/// Built only through its constructors so `current_step < total_steps` holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigator {
    current_step: usize,
    total_steps: usize,
    completed: bool,
}

impl Navigator {
    pub fn new(total_steps: usize) -> Self {
        Self {
            current_step: 0,
            total_steps,
            completed: false,
        }
    }

    /// Starts at `step`, clamped into range.
    pub fn at(total_steps: usize, step: usize) -> Self {
        Self::restore(total_steps, step, false)
    }

    /// Rebuilds a navigator saved by a host, clamping `step` into range.
    pub fn restore(total_steps: usize, step: usize, completed: bool) -> Self {
        Self {
            current_step: step.min(total_steps.saturating_sub(1)),
            total_steps,
            completed,
        }
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step + 1 == self.total_steps
    }

    pub fn can_next(&self) -> bool {
        !self.completed && self.current_step + 1 < self.total_steps
    }

    pub fn can_back(&self) -> bool {
        !self.completed && self.current_step > 0
    }

    pub fn can_submit(&self) -> bool {
        !self.completed && self.is_last_step()
    }

    pub fn can(&self, action: Action) -> bool {
        match action {
            Action::Next => self.can_next(),
            Action::Back => self.can_back(),
            Action::Submit => self.can_submit(),
        }
    }

    fn matches(&self, spec: &WizardSpec) -> bool {
        if spec.total_steps() == self.total_steps {
            return true;
        }
        tracing::warn!(
            form = spec.id(),
            navigator_steps = self.total_steps,
            spec_steps = spec.total_steps(),
            "navigator built for a different step count"
        );
        false
    }

    /// Validates the current step and advances by one when every field passes.
    pub fn next(&mut self, spec: &WizardSpec, state: &mut FormState) -> Transition {
        if !self.matches(spec) {
            return Transition::Ignored;
        }
        if !self.can_next() {
            tracing::debug!(step = self.current_step, "next ignored outside guard");
            return Transition::Ignored;
        }
        let Some(step) = spec.step(self.current_step) else {
            return Transition::Ignored;
        };

        let report = match validate_fields(spec.schema(), step.fields(), state.values()) {
            Ok(report) => report,
            Err(err) => {
                tracing::warn!(step = self.current_step, error = %err, "step references unknown field");
                return Transition::Ignored;
            }
        };
        state.apply_validation(&report);

        if !report.is_valid() {
            let errors = report.errors();
            tracing::debug!(step = self.current_step, errors = errors.len(), "next blocked");
            return Transition::Blocked { errors };
        }

        let from = self.current_step;
        self.current_step += 1;
        tracing::debug!(from, to = self.current_step, "advanced");
        Transition::Advanced {
            from,
            to: self.current_step,
        }
    }

    /// Steps back one without validating.
    pub fn back(&mut self) -> Transition {
        if !self.can_back() {
            tracing::debug!(step = self.current_step, "back ignored outside guard");
            return Transition::Ignored;
        }
        let from = self.current_step;
        self.current_step -= 1;
        tracing::debug!(from, to = self.current_step, "retreated");
        Transition::Retreated {
            from,
            to: self.current_step,
        }
    }

    /// Runs full-schema validation and finishes the session when it passes.
    pub fn submit(&mut self, spec: &WizardSpec, state: &mut FormState) -> SubmitOutcome {
        if !self.matches(spec) {
            return SubmitOutcome::Ignored;
        }
        if !self.can_submit() {
            tracing::debug!(step = self.current_step, "submit ignored outside guard");
            return SubmitOutcome::Ignored;
        }

        let report = validate_all(spec.schema(), state.values());
        state.apply_validation(&report);

        if !report.is_valid() {
            let errors = report.errors();
            tracing::debug!(errors = errors.len(), "submit rejected");
            return SubmitOutcome::Rejected { errors };
        }

        self.completed = true;
        tracing::info!(form = spec.id(), "wizard submitted");
        SubmitOutcome::Completed(state.values_snapshot())
    }

    pub fn reset(&mut self) {
        self.current_step = 0;
        self.completed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::field::{FieldKind, FieldSpec, Rule};
    use crate::spec::wizard::{FormSchema, StepDefinition};
    use serde_json::json;

    fn spec() -> WizardSpec {
        let schema = FormSchema::new(vec![
            FieldSpec::new("first", FieldKind::String).constraint(Rule::Required, "required"),
            FieldSpec::new("second", FieldKind::String).constraint(Rule::Required, "required"),
        ])
        .expect("schema");
        WizardSpec::new(
            "two-step",
            "Two step",
            schema,
            vec![
                StepDefinition::new(0, "First", vec!["first".into()]),
                StepDefinition::new(1, "Second", vec!["second".into()]),
            ],
        )
        .expect("spec")
    }

    #[test]
    fn back_on_first_step_is_ignored() {
        let mut nav = Navigator::new(2);
        assert_eq!(nav.back(), Transition::Ignored);
        assert_eq!(nav.current_step(), 0);
    }

    #[test]
    fn next_on_last_step_is_ignored() {
        let spec = spec();
        let mut state = FormState::new(spec.schema());
        let mut nav = Navigator::at(2, 1);
        assert_eq!(nav.next(&spec, &mut state), Transition::Ignored);
        assert_eq!(nav.current_step(), 1);
        assert_eq!(state.error("second"), None);
    }

    #[test]
    fn submit_before_last_step_is_ignored() {
        let spec = spec();
        let mut state = FormState::new(spec.schema());
        let mut nav = Navigator::new(2);
        assert_eq!(nav.submit(&spec, &mut state), SubmitOutcome::Ignored);
        assert_eq!(state.error_count(), 0);
    }

    #[test]
    fn submit_reports_errors_from_earlier_steps() {
        let spec = spec();
        let mut state = FormState::new(spec.schema());
        state.set_value("second", json!("x")).expect("set");
        let mut nav = Navigator::at(2, 1);
        let outcome = nav.submit(&spec, &mut state);
        assert!(matches!(outcome, SubmitOutcome::Rejected { ref errors } if errors[0].field == "first"));
        assert_eq!(state.error("first"), Some("required"));
        assert_eq!(nav.current_step(), 1);
    }

    #[test]
    fn completed_navigator_ignores_everything() {
        let spec = spec();
        let mut state = FormState::new(spec.schema());
        state.set_value("first", json!("a")).expect("set");
        state.set_value("second", json!("b")).expect("set");
        let mut nav = Navigator::at(2, 1);
        assert!(matches!(nav.submit(&spec, &mut state), SubmitOutcome::Completed(_)));
        assert!(nav.is_completed());
        assert_eq!(nav.back(), Transition::Ignored);
        assert_eq!(nav.submit(&spec, &mut state), SubmitOutcome::Ignored);

        nav.reset();
        assert_eq!(nav.current_step(), 0);
        assert!(nav.can_next());
    }

    #[test]
    fn start_step_is_clamped() {
        assert_eq!(Navigator::at(3, 9).current_step(), 2);
        assert_eq!(Navigator::restore(2, 7, false).current_step(), 1);
    }

    #[test]
    fn restored_completed_navigator_stays_terminal() {
        let spec = spec();
        let mut state = FormState::new(spec.schema());
        state.set_value("first", json!("a")).expect("set");
        state.set_value("second", json!("b")).expect("set");
        let mut nav = Navigator::restore(2, 1, true);
        assert!(nav.is_completed());
        assert_eq!(nav.submit(&spec, &mut state), SubmitOutcome::Ignored);
        assert_eq!(nav.back(), Transition::Ignored);
    }

    #[test]
    fn navigator_sized_for_another_spec_never_leaves_bounds() {
        let spec = spec();
        let mut state = FormState::new(spec.schema());
        state.set_value("first", json!("a")).expect("set");
        state.set_value("second", json!("b")).expect("set");
        let mut nav = Navigator::new(5);
        for _ in 0..4 {
            assert_eq!(nav.next(&spec, &mut state), Transition::Ignored);
        }
        assert_eq!(nav.current_step(), 0);
        assert!(spec.step(nav.current_step()).is_some());
        assert_eq!(nav.submit(&spec, &mut state), SubmitOutcome::Ignored);
        assert_eq!(state.error_count(), 0);
    }
}
