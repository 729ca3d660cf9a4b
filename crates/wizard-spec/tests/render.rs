use std::sync::Arc;

use serde_json::json;

use wizard_spec::{
    RenderStatus, Wizard, WizardSpec, build_render_payload, document_schema, render_card,
    render_json_ui, render_text,
};

fn signup() -> Wizard {
    let spec = WizardSpec::from_json_str(include_str!("../tests/fixtures/signup.json"))
        .expect("signup spec");
    Wizard::new(Arc::new(spec))
}

#[test]
fn render_text_shows_step_and_errors() {
    let mut wizard = signup();
    wizard.next();
    let payload = build_render_payload(&wizard);
    assert_eq!(payload.status, RenderStatus::Invalid);

    let text = render_text(&payload);
    assert!(text.contains("Step 1/3: Name"));
    assert!(text.contains("! Name too short"));
    assert!(text.contains("Actions: next"));
}

#[test]
fn render_json_ui_only_lists_current_step_fields() {
    let mut wizard = signup();
    wizard.set_value("name", json!("Al")).expect("set");
    wizard.next();
    let ui = render_json_ui(&build_render_payload(&wizard));

    assert_eq!(ui["form_id"], "signup");
    assert_eq!(ui["progress"]["step"], 2);
    assert_eq!(ui["progress"]["total"], 3);
    let fields = ui["fields"].as_array().expect("fields");
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0]["name"], "email");
    assert_eq!(ui["actions"], json!(["back", "next"]));
}

#[test]
fn render_card_offers_submit_on_last_step() {
    let mut wizard = signup();
    wizard.set_value("name", json!("Al")).expect("set");
    wizard.set_value("email", json!("a@b.com")).expect("set");
    wizard.next();
    wizard.next();
    let card = render_card(&build_render_payload(&wizard));

    assert_eq!(card["version"], "1.3");
    let actions = card["actions"].as_array().expect("actions");
    assert_eq!(actions.len(), 2);
    assert_eq!(actions[1]["data"]["wizard"]["action"], "submit");
    let body = card["body"].as_array().expect("body");
    assert!(body.iter().any(|item| {
        item["type"] == "Container" && item["items"][0]["type"] == "Input.Number"
    }));
}

#[test]
fn document_schema_describes_steps() {
    let schema = document_schema();
    let props = schema["properties"].as_object().expect("properties");
    assert!(props.contains_key("fields"));
    assert!(props.contains_key("steps"));
}
