use serde_json::{Map, Value, json};

use crate::navigation::Action;
use crate::session::Wizard;
use crate::spec::field::FieldKind;

/// Status labels returned by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// The current step still needs input.
    NeedInput,
    /// Some fields hold validation errors.
    Invalid,
    /// The wizard has been submitted.
    Complete,
}

impl RenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStatus::NeedInput => "need_input",
            RenderStatus::Invalid => "invalid",
            RenderStatus::Complete => "complete",
        }
    }
}

/// One field of the current step, as a renderer sees it.
#[derive(Debug, Clone)]
pub struct RenderField {
    pub name: String,
    pub label: String,
    pub description: Option<String>,
    pub kind: FieldKind,
    pub nullable: bool,
    pub value: Value,
    pub error: Option<String>,
}

/// Collected payload used by the text, JSON and card renderers.
#[derive(Debug, Clone)]
pub struct RenderPayload {
    pub form_id: String,
    pub form_title: String,
    pub help: Option<String>,
    pub status: RenderStatus,
    pub step_index: usize,
    pub step_label: String,
    pub step: usize,
    pub total: usize,
    pub fields: Vec<RenderField>,
    pub actions: Vec<Action>,
}

/// Build the renderer payload for the wizard's current step.
pub fn build_render_payload(wizard: &Wizard) -> RenderPayload {
    let spec = wizard.spec();
    let step = wizard.step();
    let state = wizard.state();

    let fields = step
        .fields()
        .iter()
        .filter_map(|name| spec.schema().field(name))
        .map(|field| RenderField {
            name: field.name.clone(),
            label: field.display_label().to_string(),
            description: field.description.clone(),
            kind: field.kind,
            nullable: field.nullable,
            value: state.value(&field.name).cloned().unwrap_or(Value::Null),
            error: state.error(&field.name).map(String::from),
        })
        .collect::<Vec<_>>();

    let status = if wizard.is_completed() {
        RenderStatus::Complete
    } else if fields.iter().any(|field| field.error.is_some()) {
        RenderStatus::Invalid
    } else {
        RenderStatus::NeedInput
    };

    let progress = wizard.progress();
    RenderPayload {
        form_id: spec.id().to_string(),
        form_title: spec.title().to_string(),
        help: spec.description().map(String::from),
        status,
        step_index: step.index(),
        step_label: step.label().to_string(),
        step: progress.step,
        total: progress.total,
        fields,
        actions: wizard.available_actions(),
    }
}

/// Render the payload as a structured JSON-friendly value.
pub fn render_json_ui(payload: &RenderPayload) -> Value {
    let fields = payload
        .fields
        .iter()
        .map(|field| {
            let mut map = Map::new();
            map.insert("name".into(), Value::String(field.name.clone()));
            map.insert("label".into(), Value::String(field.label.clone()));
            if let Some(description) = &field.description {
                map.insert("description".into(), Value::String(description.clone()));
            }
            map.insert("kind".into(), Value::String(field.kind.as_str().into()));
            map.insert("nullable".into(), Value::Bool(field.nullable));
            map.insert("value".into(), field.value.clone());
            map.insert(
                "error".into(),
                field.error.clone().map(Value::String).unwrap_or(Value::Null),
            );
            Value::Object(map)
        })
        .collect::<Vec<_>>();

    json!({
        "form_id": payload.form_id,
        "form_title": payload.form_title,
        "help": payload.help,
        "status": payload.status.as_str(),
        "step": {
            "index": payload.step_index,
            "label": payload.step_label,
        },
        "progress": {
            "step": payload.step,
            "total": payload.total,
        },
        "fields": fields,
        "actions": payload.actions.iter().map(Action::as_str).collect::<Vec<_>>(),
    })
}

/// Render the payload as human-friendly text.
pub fn render_text(payload: &RenderPayload) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Form: {} ({})", payload.form_title, payload.form_id));
    lines.push(format!(
        "Step {}/{}: {}",
        payload.step, payload.total, payload.step_label
    ));
    if payload.status == RenderStatus::Complete {
        lines.push("Submitted.".to_string());
        return lines.join("\n");
    }

    for field in &payload.fields {
        let mut entry = format!(" - {} ({})", field.label, field.name);
        if !field.value.is_null() {
            entry.push_str(&format!(" = {}", value_to_display(&field.value)));
        }
        lines.push(entry);
        if let Some(error) = &field.error {
            lines.push(format!("   ! {}", error));
        }
    }

    if !payload.actions.is_empty() {
        let actions = payload
            .actions
            .iter()
            .map(Action::as_str)
            .collect::<Vec<_>>();
        lines.push(format!("Actions: {}", actions.join(", ")));
    }

    lines.join("\n")
}

/// Render the payload as an Adaptive Card v1.3 transport.
pub fn render_card(payload: &RenderPayload) -> Value {
    let mut body = vec![json!({
        "type": "TextBlock",
        "text": payload.form_title,
        "weight": "Bolder",
        "size": "Large",
        "wrap": true,
    })];

    body.push(json!({
        "type": "TextBlock",
        "text": format!("Step {} of {}: {}", payload.step, payload.total, payload.step_label),
        "wrap": true,
    }));

    for field in &payload.fields {
        let mut items = vec![field_input(field)];
        if let Some(error) = &field.error {
            items.push(json!({
                "type": "TextBlock",
                "text": error,
                "color": "Attention",
                "wrap": true,
                "spacing": "Small",
            }));
        }
        body.push(json!({
            "type": "Container",
            "items": items,
        }));
    }

    let actions = payload
        .actions
        .iter()
        .map(|action| {
            json!({
                "type": "Action.Submit",
                "title": action_title(*action),
                "data": {
                    "wizard": {
                        "formId": payload.form_id,
                        "action": action.as_str(),
                        "step": payload.step_index,
                    }
                }
            })
        })
        .collect::<Vec<_>>();

    json!({
        "$schema": "http://adaptivecards.io/schemas/adaptive-card.json",
        "type": "AdaptiveCard",
        "version": "1.3",
        "body": body,
        "actions": actions,
    })
}

fn field_input(field: &RenderField) -> Value {
    let mut map = Map::new();
    map.insert("id".into(), Value::String(field.name.clone()));
    map.insert("label".into(), Value::String(field.label.clone()));
    map.insert("isRequired".into(), Value::Bool(!field.nullable));
    match field.kind {
        FieldKind::Boolean => {
            map.insert("type".into(), Value::String("Input.Toggle".into()));
            map.insert("title".into(), Value::String(field.label.clone()));
            map.insert("valueOn".into(), Value::String("true".into()));
            map.insert("valueOff".into(), Value::String("false".into()));
            let on = field.value.as_bool() == Some(true);
            map.insert("value".into(), Value::String(on.to_string()));
        }
        FieldKind::Number | FieldKind::Integer => {
            map.insert("type".into(), Value::String("Input.Number".into()));
            if let Some(number) = field.value.as_f64() {
                map.insert("value".into(), json!(number));
            }
        }
        FieldKind::String => {
            map.insert("type".into(), Value::String("Input.Text".into()));
            if !field.value.is_null() {
                map.insert("value".into(), Value::String(value_to_display(&field.value)));
            }
        }
    }
    Value::Object(map)
}

fn action_title(action: Action) -> &'static str {
    match action {
        Action::Back => "Back",
        Action::Next => "Next",
        Action::Submit => "Submit",
    }
}

fn value_to_display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(num) => num.to_string(),
        other => other.to_string(),
    }
}
