use std::fmt::Write;

use serde_json::{Number, Value};
use wizard_spec::{
    Action, FieldKind, FieldSpec, RenderField, RenderPayload, Submission, ValidationError,
};

/// Controls which bits of state the wizard prints.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Verbosity {
    /// Clean output: step headers and prompts only.
    Clean,
    /// Verbose output: field summaries and available actions.
    Verbose,
}

impl Verbosity {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Clean
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

/// Prints step headers, prompts and results for the interactive runner.
pub struct WizardPresenter {
    verbosity: Verbosity,
    header_printed: bool,
    show_values_json: bool,
}

impl WizardPresenter {
    pub fn new(verbosity: Verbosity, show_values_json: bool) -> Self {
        Self {
            verbosity,
            header_printed: false,
            show_values_json,
        }
    }

    pub fn show_header(&mut self, payload: &RenderPayload) {
        if self.header_printed {
            return;
        }
        println!("Form: {}", payload.form_title);
        if let Some(help) = &payload.help {
            println!("{}", help);
        }
        self.header_printed = true;
    }

    pub fn show_step(&self, payload: &RenderPayload) {
        println!(
            "Step {}/{}: {}",
            payload.step, payload.total, payload.step_label
        );
        if self.verbosity.is_verbose() {
            for field in &payload.fields {
                let mut entry = format!(" - {} ({})", field.label, field.name);
                if !field.value.is_null() {
                    entry.push_str(&format!(" = {}", field.value));
                }
                if let Some(error) = &field.error {
                    entry.push_str(&format!(" [{}]", error));
                }
                println!("{}", entry);
            }
        }
    }

    pub fn show_prompt(&self, field: &RenderField) {
        let mut line = field.label.clone();
        if let Some(hint) = kind_hint(field.kind) {
            line.push(' ');
            line.push_str(hint);
        }
        if !field.value.is_null() {
            line.push_str(&format!(" [{}]", display_value(&field.value)));
        }
        println!("{}", line);
        if let Some(description) = &field.description {
            println!("{}", description);
        }
    }

    pub fn show_actions(&self, actions: &[Action]) {
        let labels = actions.iter().map(Action::as_str).collect::<Vec<_>>();
        println!("Action ({}, edit, exit)", labels.join(", "));
    }

    pub fn show_parse_error(&self, error: &AnswerParseError) {
        eprintln!("Invalid answer: {}", error.user_message);
        if let Some(debug) = &error.debug_message {
            eprintln!("  Expected: {}", debug);
        }
    }

    pub fn show_errors(&self, errors: &[ValidationError]) {
        println!("Please fix the following:");
        for error in errors {
            println!("  {} - {}", error.field, error.message);
        }
    }

    pub fn show_completion(&self, submission: &Submission) {
        println!("Done ✅");
        match submission.to_cbor() {
            Ok(bytes) => {
                println!("Values (CBOR hex): {}", encode_hex(&bytes));
            }
            Err(err) => {
                eprintln!("Failed to serialize values to CBOR: {}", err);
            }
        }
        if self.show_values_json {
            match submission.to_json_pretty() {
                Ok(pretty) => println!("{}", pretty),
                Err(err) => {
                    eprintln!("Failed to serialize values to JSON: {}", err);
                }
            }
        }
    }
}

/// Commands accepted between steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Navigate(Action),
    Edit,
    Exit,
}

impl Command {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "next" | "n" => Some(Command::Navigate(Action::Next)),
            "back" | "b" => Some(Command::Navigate(Action::Back)),
            "submit" | "s" => Some(Command::Navigate(Action::Submit)),
            "edit" | "e" => Some(Command::Edit),
            "exit" | "quit" | "q" => Some(Command::Exit),
            _ => None,
        }
    }
}

/// Error produced when parsing answers from the user.
#[derive(Debug)]
pub struct AnswerParseError {
    pub user_message: String,
    pub debug_message: Option<String>,
}

impl AnswerParseError {
    pub fn new(user_message: impl Into<String>, debug_message: Option<String>) -> Self {
        Self {
            user_message: user_message.into(),
            debug_message,
        }
    }
}

/// Parses raw input for `field`.
///
/// `Ok(None)` keeps the stored value; blank input on a nullable field clears it.
pub fn parse_answer(field: &FieldSpec, raw: &str) -> Result<Option<Value>, AnswerParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(field.nullable.then_some(Value::Null));
    }

    let value = match field.kind {
        FieldKind::String => Value::String(trimmed.to_string()),
        FieldKind::Boolean => parse_boolean(trimmed)?,
        FieldKind::Integer => parse_integer(trimmed)?,
        FieldKind::Number => parse_number(trimmed)?,
    };
    Ok(Some(value))
}

fn parse_boolean(raw: &str) -> Result<Value, AnswerParseError> {
    match raw.to_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Ok(Value::Bool(true)),
        "false" | "f" | "no" | "n" | "0" => Ok(Value::Bool(false)),
        _ => Err(AnswerParseError::new(
            "Please enter yes or no.",
            Some("expected boolean (y/n/true/false)".to_string()),
        )),
    }
}

fn parse_integer(raw: &str) -> Result<Value, AnswerParseError> {
    raw.parse::<i64>()
        .map(Number::from)
        .map(Value::Number)
        .map_err(|_| {
            AnswerParseError::new(
                "Please enter a whole number.",
                Some("expected integer".to_string()),
            )
        })
}

fn parse_number(raw: &str) -> Result<Value, AnswerParseError> {
    raw.parse::<f64>()
        .map_err(|_| {
            AnswerParseError::new(
                "Please enter a number.",
                Some("expected number".to_string()),
            )
        })
        .and_then(|value| {
            Number::from_f64(value).map(Value::Number).ok_or_else(|| {
                AnswerParseError::new(
                    "Please enter a finite number.",
                    Some("number must be finite".to_string()),
                )
            })
        })
}

fn kind_hint(kind: FieldKind) -> Option<&'static str> {
    match kind {
        FieldKind::Boolean => Some("(yes/no)"),
        FieldKind::Integer => Some("(integer)"),
        FieldKind::Number => Some("(number)"),
        FieldKind::String => None,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn encode_hex(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(&mut encoded, "{:02x}", byte).expect("writing to string cannot fail");
    }
    encoded
}
