mod wizard;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use wizard::{Command as StepCommand, Verbosity, WizardPresenter, parse_answer};
use wizard_spec::{
    Outcome, RenderPayload, ValidationReport, Values, Wizard, WizardSpec,
    build_render_payload, document_schema, render_card, render_json_ui, validate_all,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Step-wise form wizard CLI",
    long_about = "Runs multi-step form wizards in a text shell and validates values against wizard specs"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RenderMode {
    Text,
    Card,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Run a wizard interactively, one step at a time.
    Run {
        /// Path to the wizard spec JSON.
        #[arg(long, value_name = "SPEC")]
        spec: PathBuf,
        /// Optional JSON file with initial field values.
        #[arg(long, value_name = "VALUES")]
        values: Option<PathBuf>,
        /// Show field summaries and debug logging.
        #[arg(long, alias = "debug")]
        verbose: bool,
        /// Also print the submitted values as JSON.
        #[arg(long)]
        values_json: bool,
        /// Render output mode for each step.
        #[arg(long, value_enum, default_value_t = RenderMode::Text)]
        format: RenderMode,
    },
    /// Validate a values file against every field of a wizard spec.
    Validate {
        /// Path to the wizard spec JSON.
        #[arg(long, value_name = "SPEC")]
        spec: PathBuf,
        /// Path to the values JSON file.
        #[arg(long, value_name = "VALUES")]
        values: PathBuf,
    },
    /// Print the JSON Schema of the wizard spec format.
    Schema,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    let verbose = matches!(cli.command, Command::Run { verbose: true, .. });
    init_tracing(verbose);

    match cli.command {
        Command::Run {
            spec,
            values,
            verbose,
            values_json,
            format,
        } => run_wizard(spec, values, verbose, values_json, format),
        Command::Validate { spec, values } => run_validate(spec, values),
        Command::Schema => run_schema(),
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "form_wizard=debug,wizard_spec=debug"
    } else {
        "form_wizard=info,wizard_spec=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn load_spec(path: &Path) -> CliResult<WizardSpec> {
    let contents = fs::read_to_string(path)?;
    let spec = WizardSpec::from_json_str(&contents)?;
    tracing::debug!(form = spec.id(), steps = spec.total_steps(), "loaded wizard spec");
    Ok(spec)
}

fn load_values(path: &Path) -> CliResult<Values> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn run_schema() -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(&document_schema())?);
    Ok(())
}

fn run_validate(spec_path: PathBuf, values_path: PathBuf) -> CliResult<()> {
    let spec = load_spec(&spec_path)?;
    let values = load_values(&values_path)?;

    let unknown = values
        .keys()
        .filter(|name| !spec.schema().contains(name))
        .cloned()
        .collect::<Vec<_>>();
    let report = validate_all(spec.schema(), &values);
    let valid = report.is_valid() && unknown.is_empty();

    println!(
        "Validation result: {}",
        if valid { "valid" } else { "invalid" }
    );
    describe_validation(&report, &unknown);

    if valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn describe_validation(report: &ValidationReport, unknown: &[String]) {
    let errors = report.errors();
    if !errors.is_empty() {
        println!("Errors:");
        for error in &errors {
            println!("  {} - {}", error.field, error.message);
        }
    }
    if !unknown.is_empty() {
        println!("Unknown fields: {}", unknown.join(", "));
    }
}

fn run_wizard(
    spec_path: PathBuf,
    values_path: Option<PathBuf>,
    verbose: bool,
    values_json: bool,
    format: RenderMode,
) -> CliResult<()> {
    let spec = load_spec(&spec_path)?;
    let mut wizard = Wizard::new(Arc::new(spec));

    if let Some(path) = values_path {
        for (name, value) in load_values(&path)? {
            wizard.set_value(&name, value)?;
        }
    }

    let mut presenter = WizardPresenter::new(Verbosity::from_verbose(verbose), values_json);
    let mut prompt_fields = true;

    loop {
        if prompt_fields {
            let payload = build_render_payload(&wizard);
            presenter.show_header(&payload);
            presenter.show_step(&payload);
            print_render_output(format, &payload)?;
            prompt_step_fields(&mut wizard, &payload, &presenter)?;
        }

        let actions = wizard.available_actions();
        presenter.show_actions(&actions);
        let command = match StepCommand::parse(&read_input()?) {
            Some(command) => command,
            None => {
                println!("Unknown command.");
                prompt_fields = false;
                continue;
            }
        };

        match command {
            StepCommand::Exit => return Err("wizard aborted by user".into()),
            StepCommand::Edit => prompt_fields = true,
            StepCommand::Navigate(action) => match wizard.apply(action) {
                Outcome::Moved { .. } => prompt_fields = true,
                Outcome::Blocked { errors } => {
                    presenter.show_errors(&errors);
                    prompt_fields = true;
                }
                Outcome::Submitted(submission) => {
                    presenter.show_completion(&submission);
                    break;
                }
                Outcome::Ignored => {
                    println!("'{}' is not available on this step.", action.as_str());
                    prompt_fields = false;
                }
            },
        }
    }

    Ok(())
}

fn prompt_step_fields(
    wizard: &mut Wizard,
    payload: &RenderPayload,
    presenter: &WizardPresenter,
) -> CliResult<()> {
    for field in &payload.fields {
        let spec = wizard
            .spec()
            .schema()
            .field(&field.name)
            .cloned()
            .ok_or_else(|| format!("field '{}' missing from spec", field.name))?;
        loop {
            presenter.show_prompt(field);
            let input = read_input()?;
            if input.trim().eq_ignore_ascii_case("exit") {
                return Err("wizard aborted by user".into());
            }
            match parse_answer(&spec, &input) {
                Ok(Some(value)) => {
                    wizard.view().set_value(&field.name, value)?;
                    break;
                }
                Ok(None) => break,
                Err(err) => presenter.show_parse_error(&err),
            }
        }
    }
    Ok(())
}

fn read_input() -> CliResult<String> {
    print!("> ");
    io::stdout().flush()?;
    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Err("unexpected end of input".into());
    }
    Ok(input.trim().to_string())
}

fn print_render_output(format: RenderMode, payload: &RenderPayload) -> CliResult<()> {
    let rendered: Option<Value> = match format {
        RenderMode::Text => None,
        RenderMode::Json => Some(render_json_ui(payload)),
        RenderMode::Card => Some(render_card(payload)),
    };
    if let Some(value) = rendered {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(())
}
