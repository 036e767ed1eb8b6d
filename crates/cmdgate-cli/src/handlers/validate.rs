//! Validation command handler

use super::utils::{load_description, load_params_file, parse_param};
use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::{redaction, timing::Timer};
use crate::output::{OutputWriter, ValidationReport};
use cmdgate_core::{Command, HandlerStack, ValidationGate};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Handle the validate command
#[instrument(skip(config, output), fields(description = %args.description, operation = %args.operation))]
pub fn handle_validate(args: ValidateArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let timer = Timer::with_details("validate_command", &args.operation);

    let description = load_description(&args.description, config)?;
    if let Ok(operation) = description.get_operation(&args.operation) {
        if operation.is_deprecated() {
            output.warning(&format!("Operation '{}' is deprecated", args.operation))?;
        }
    }

    let mut command = build_command(&args)?;
    output.debug(&format!("Submitting {} parameter(s)", command.len()))?;
    let submitted = args.detailed.then(|| redacted(command.to_map()));

    let gate = ValidationGate::new(Arc::new(description), Some(config.validator()))
        .with_options(config.gate_options(args.legacy_write_back));
    let report = run_gate(gate, &mut command, submitted)?;
    let elapsed = timer.finish();
    output.debug(&format!("Gate finished in {} ms", elapsed.as_millis()))?;

    if report.valid {
        info!(params = report.params.len(), "command is valid");
        output.success(&format!("✓ Command '{}' is valid", report.operation))?;
    } else {
        warn!(errors = report.errors.len(), "command failed validation");
        output.error(&format!("✗ Command '{}' failed validation", report.operation))?;
    }
    output.validation_report(&report)?;

    if report.valid {
        Ok(())
    } else {
        Err(Error::ValidationFailed {
            count: report.errors.len(),
        })
    }
}

/// Assemble the command from the parameter file and `-p` overrides, in that order
fn build_command(args: &ValidateArgs) -> Result<Command> {
    let mut command = match &args.params {
        Some(path) => Command::with_params(args.operation.as_str(), load_params_file(path)?),
        None => Command::new(args.operation.as_str()),
    };

    for pair in &args.param {
        let (key, value) = parse_param(pair)?;
        debug!(param = %key, "setting parameter from the command line");
        command.set(key, value);
    }

    Ok(command)
}

/// Run the command through a gate in front of a terminal stage that hands back
/// the normalized parameters.
///
/// Only validation failures become a report; any other gate error, such as an
/// unknown operation, is returned as is.
fn run_gate(
    gate: ValidationGate,
    command: &mut Command,
    submitted: Option<Map<String, Value>>,
) -> Result<ValidationReport> {
    let mut stack = HandlerStack::new(|command: &mut Command| -> cmdgate_core::Result<Map<String, Value>> {
        Ok(command.to_map())
    });
    stack.push_validation(gate);
    let handler = stack.resolve();

    let operation = command.name().to_string();
    match handler(command) {
        Ok(params) => Ok(ValidationReport {
            operation,
            valid: true,
            submitted,
            params,
            errors: Vec::new(),
        }),
        Err(error) if error.is_validation() => Ok(ValidationReport {
            operation,
            valid: false,
            submitted,
            params: error.command().map(Command::to_map).unwrap_or_default(),
            errors: error.validation_errors().map(<[String]>::to_vec).unwrap_or_default(),
        }),
        Err(error) => Err(error.into()),
    }
}

fn redacted(params: Map<String, Value>) -> Map<String, Value> {
    let mut value = Value::Object(params);
    redaction::redact_json_value(&mut value);
    match value {
        Value::Object(params) => params,
        _ => Map::new(),
    }
}
