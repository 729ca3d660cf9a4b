use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use wizard_spec::{
    Action, ConfigError, FormState, Outcome, RenderPayload, Values, Wizard,
    WizardError, WizardSpec, build_render_payload, render_card as wizard_render_card,
    render_json_ui as wizard_render_json_ui, render_text as wizard_render_text, validate_fields,
};

const DEFAULT_SPEC: &str = include_str!("../../wizard-spec/tests/fixtures/signup.json");

#[derive(Debug, Error)]
enum ComponentError {
    #[error("failed to parse config/{0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("failed to parse session: {0}")]
    SessionParse(#[source] serde_json::Error),
    #[error("failed to parse values: {0}")]
    ValuesParse(#[source] serde_json::Error),
    #[error("failed to parse value for '{field}': {source}")]
    ValueParse {
        field: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid wizard spec: {0}")]
    Spec(#[from] ConfigError),
    #[error("form '{0}' is not available")]
    FormUnavailable(String),
    #[error("json encode error: {0}")]
    JsonEncode(#[source] serde_json::Error),
    #[error("unknown action '{0}'")]
    UnknownAction(String),
    #[error("step {0} does not exist")]
    StepOutOfRange(usize),
    #[error(transparent)]
    Wizard(#[from] WizardError),
}

#[derive(Debug, Deserialize, Serialize, Default)]
struct ComponentConfig {
    #[serde(default)]
    form_spec_json: Option<String>,
}

/// Session state carried between calls by the host.
#[derive(Debug, Deserialize, Serialize, Default)]
struct SessionState {
    #[serde(default)]
    current_step: usize,
    #[serde(default)]
    values: Values,
    #[serde(default)]
    errors: BTreeMap<String, String>,
    #[serde(default)]
    completed: bool,
}

fn load_wizard_spec(config_json: &str) -> Result<WizardSpec, ComponentError> {
    let config = if config_json.trim().is_empty() {
        ComponentConfig::default()
    } else {
        serde_json::from_str(config_json).map_err(ComponentError::ConfigParse)?
    };

    let spec_json = config.form_spec_json.as_deref().unwrap_or(DEFAULT_SPEC);
    Ok(WizardSpec::from_json_str(spec_json)?)
}

fn ensure_form(form_id: &str, config_json: &str) -> Result<Arc<WizardSpec>, ComponentError> {
    let spec = load_wizard_spec(config_json)?;
    if spec.id() != form_id {
        Err(ComponentError::FormUnavailable(form_id.to_string()))
    } else {
        Ok(Arc::new(spec))
    }
}

fn parse_session(session_json: &str) -> Result<SessionState, ComponentError> {
    if session_json.trim().is_empty() {
        return Ok(SessionState::default());
    }
    serde_json::from_str(session_json).map_err(ComponentError::SessionParse)
}

fn parse_values(values_json: &str) -> Result<Values, ComponentError> {
    if values_json.trim().is_empty() {
        return Ok(Values::new());
    }
    serde_json::from_str(values_json).map_err(ComponentError::ValuesParse)
}

fn resume(spec: Arc<WizardSpec>, session_json: &str) -> Result<Wizard, ComponentError> {
    let session = parse_session(session_json)?;
    let state = FormState::restore(spec.schema(), session.values, session.errors)?;
    Ok(Wizard::resume(
        spec,
        state,
        session.current_step,
        session.completed,
    ))
}

fn session_value(wizard: &Wizard) -> Value {
    let errors = wizard
        .state()
        .errors()
        .map(|(name, message)| (name.to_string(), Value::String(message.to_string())))
        .collect::<serde_json::Map<_, _>>();
    json!({
        "current_step": wizard.current_step(),
        "values": wizard.state().values(),
        "errors": errors,
        "completed": wizard.is_completed(),
    })
}

fn respond(result: Result<Value, ComponentError>) -> String {
    match result {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|error| {
            json!({"error": format!("json encode: {}", error)}).to_string()
        }),
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

fn respond_string(result: Result<String, ComponentError>) -> String {
    match result {
        Ok(value) => value,
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

/// Returns the wizard document for `form_id`.
pub fn describe(form_id: &str, config_json: &str) -> String {
    respond(ensure_form(form_id, config_json).and_then(|spec| {
        serde_json::to_value(spec.to_document()).map_err(ComponentError::JsonEncode)
    }))
}

/// Validates one step's fields without touching navigation.
pub fn validate_step(form_id: &str, config_json: &str, step: usize, values_json: &str) -> String {
    respond(ensure_form(form_id, config_json).and_then(|spec| {
        let definition = spec.step(step).ok_or(ComponentError::StepOutOfRange(step))?;
        let values = parse_values(values_json)?;
        let report = validate_fields(spec.schema(), definition.fields(), &values)?;
        Ok(json!({
            "step": step,
            "valid": report.is_valid(),
            "errors": report.errors(),
        }))
    }))
}

/// Applies `next`, `back` or `submit` to the session and returns the new session.
pub fn navigate(form_id: &str, config_json: &str, session_json: &str, action: &str) -> String {
    respond(ensure_form(form_id, config_json).and_then(|spec| {
        let action = Action::from_label(action)
            .ok_or_else(|| ComponentError::UnknownAction(action.to_string()))?;
        let mut wizard = resume(spec, session_json)?;
        let outcome = wizard.apply(action);
        tracing::debug!(form = form_id, action = action.as_str(), ?outcome, "component navigation");
        build_navigation_response(&wizard, outcome)
    }))
}

fn build_navigation_response(wizard: &Wizard, outcome: Outcome) -> Result<Value, ComponentError> {
    let progress = wizard.progress();
    let mut response = json!({
        "session": session_value(wizard),
        "progress": { "step": progress.step, "total": progress.total },
        "actions": wizard
            .available_actions()
            .iter()
            .map(Action::as_str)
            .collect::<Vec<_>>(),
    });

    let (status, extra) = match outcome {
        Outcome::Moved { .. } => ("in_progress", None),
        Outcome::Ignored => ("ignored", None),
        Outcome::Blocked { errors } => (
            "blocked",
            Some((
                "errors",
                serde_json::to_value(errors).map_err(ComponentError::JsonEncode)?,
            )),
        ),
        Outcome::Submitted(submission) => (
            "complete",
            Some((
                "submission",
                serde_json::to_value(&submission)
                    .map_err(ComponentError::JsonEncode)?,
            )),
        ),
    };

    response["status"] = Value::String(status.into());
    if let Some((key, value)) = extra {
        response[key] = value;
    }
    Ok(response)
}

/// Sets one field owned by the session's current step.
pub fn patch(
    form_id: &str,
    config_json: &str,
    session_json: &str,
    field: &str,
    value_json: &str,
) -> String {
    respond(ensure_form(form_id, config_json).and_then(|spec| {
        let value: Value =
            serde_json::from_str(value_json).map_err(|source| ComponentError::ValueParse {
                field: field.to_string(),
                source,
            })?;
        let mut wizard = resume(spec, session_json)?;
        wizard.view().set_value(field, value)?;
        Ok(json!({
            "status": "in_progress",
            "session": session_value(&wizard),
        }))
    }))
}

fn render_payload(
    form_id: &str,
    config_json: &str,
    session_json: &str,
) -> Result<RenderPayload, ComponentError> {
    let spec = ensure_form(form_id, config_json)?;
    let wizard = resume(spec, session_json)?;
    Ok(build_render_payload(&wizard))
}

pub fn render_text(form_id: &str, config_json: &str, session_json: &str) -> String {
    respond_string(
        render_payload(form_id, config_json, session_json)
            .map(|payload| wizard_render_text(&payload)),
    )
}

pub fn render_json_ui(form_id: &str, config_json: &str, session_json: &str) -> String {
    respond(
        render_payload(form_id, config_json, session_json)
            .map(|payload| wizard_render_json_ui(&payload)),
    )
}

pub fn render_card(form_id: &str, config_json: &str, session_json: &str) -> String {
    respond(
        render_payload(form_id, config_json, session_json)
            .map(|payload| wizard_render_card(&payload)),
    )
}
