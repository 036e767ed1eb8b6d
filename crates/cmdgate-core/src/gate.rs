//! The validation gate
//!
//! [`ValidationGate`] sits in front of an executor. For every command it
//! filters, validates and defaults each declared parameter, checks undeclared
//! parameters against the operation's additional-parameter schema, and only
//! delegates when no error was collected. Mutations are made on the caller's
//! command, which is then handed to the inner executor as-is.

use crate::command::Command;
use crate::error::{Error, Result};
use crate::handler::{Handler, Middleware};
use cmdgate_schemas::{
    is_truthy, Description, FilterRegistry, FilterSpec, Operation, ParameterSchema, SchemaValidator,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, debug_span, info, warn};

/// Which filter list decides whether a normalized undeclared parameter is written back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdditionalWriteBack {
    /// Write back when the additional-parameter schema declares no filters
    #[default]
    OwnFilters,
    /// Write back when the last declared parameter's schema declares no filters
    LegacyLastDeclared,
}

/// Gate behavior switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateOptions {
    pub additional_write_back: AdditionalWriteBack,
}

impl GateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn additional_write_back(mut self, policy: AdditionalWriteBack) -> Self {
        self.additional_write_back = policy;
        self
    }
}

/// Validates and normalizes commands before they reach an executor
#[derive(Debug, Clone)]
pub struct ValidationGate {
    description: Arc<Description>,
    validator: Arc<SchemaValidator>,
    filters: Arc<FilterRegistry>,
    options: GateOptions,
}

impl ValidationGate {
    /// Create a gate over a description. Without a validator the default one is used.
    pub fn new(description: Arc<Description>, validator: Option<SchemaValidator>) -> Self {
        Self {
            description,
            validator: Arc::new(validator.unwrap_or_default()),
            filters: Arc::new(FilterRegistry::with_builtins()),
            options: GateOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GateOptions) -> Self {
        self.options = options;
        self
    }

    /// Use a custom filter registry instead of the built-ins
    pub fn with_filters(mut self, filters: Arc<FilterRegistry>) -> Self {
        self.filters = filters;
        self
    }

    pub fn description(&self) -> &Description {
        &self.description
    }

    pub fn validator(&self) -> &SchemaValidator {
        &self.validator
    }

    pub fn options(&self) -> GateOptions {
        self.options
    }

    /// Run one validation pass over `command`, mutating it in place.
    ///
    /// Returns the description's error for an unknown operation, or a single
    /// [`Error::CommandValidation`] holding every message from the pass.
    pub fn validate(&self, command: &mut Command) -> Result<()> {
        let operation = self.description.get_operation(command.name())?;
        let span = debug_span!("validate_command", operation = operation.name());
        let _guard = span.enter();

        if operation.is_deprecated() {
            warn!(operation = operation.name(), "invoking deprecated operation");
        }

        let mut errors = Vec::new();
        let last_filters = self.process_declared(operation, command, &mut errors);
        if let Some(additional) = operation.additional_parameters() {
            let write_back_filters = match self.options.additional_write_back {
                AdditionalWriteBack::OwnFilters => additional.filters(),
                AdditionalWriteBack::LegacyLastDeclared => last_filters,
            };
            self.process_additional(operation, additional, write_back_filters, command, &mut errors);
        }

        if errors.is_empty() {
            info!(
                operation = operation.name(),
                params = command.len(),
                "command passed validation"
            );
            Ok(())
        } else {
            warn!(
                operation = operation.name(),
                errors = errors.len(),
                "command failed validation"
            );
            Err(Error::command_validation(errors, command))
        }
    }

    /// Declared parameters, in declaration order. Returns the filters of the
    /// last schema visited.
    fn process_declared<'o>(
        &self,
        operation: &'o Operation,
        command: &mut Command,
        errors: &mut Vec<String>,
    ) -> &'o [FilterSpec] {
        let mut last_filters: &[FilterSpec] = &[];

        for (name, schema) in operation.params() {
            last_filters = schema.filters();
            let original = command.get(name).cloned();

            let mut candidate = original.clone();
            if let Some(value) = original.as_ref().filter(|v| is_truthy(Some(*v))) {
                match schema.filter_with(value, &self.filters) {
                    Ok(filtered) => candidate = Some(filtered),
                    Err(e) => {
                        errors.push(format!("[{}] {}", name, e));
                        continue;
                    }
                }
            }

            let validation = self.validator.validate(schema, name, candidate.as_ref());
            if !validation.is_valid() {
                debug!(param = name.as_str(), errors = validation.errors.len(), "parameter rejected");
                errors.extend(validation.errors);
                continue;
            }

            let Some(normalized) = validation.value else {
                continue;
            };
            if original.as_ref() == Some(&normalized) {
                continue;
            }

            if schema.filters().is_empty() {
                debug!(param = name.as_str(), "writing normalized value back");
                command.set(name.as_str(), normalized);
            } else if !command.has_value(name) {
                if let Some(default) = schema.default().filter(|d| is_truthy(Some(*d))) {
                    debug!(param = name.as_str(), "injecting schema default");
                    command.set(name.as_str(), default.clone());
                }
            }
        }

        last_filters
    }

    /// Undeclared parameters, validated against the operation's catch-all schema
    fn process_additional(
        &self,
        operation: &Operation,
        additional: &ParameterSchema,
        write_back_filters: &[FilterSpec],
        command: &mut Command,
        errors: &mut Vec<String>,
    ) {
        let undeclared: Vec<(String, Value)> = command
            .iter()
            .filter(|(name, _)| !operation.has_param(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        for (name, value) in undeclared {
            let validation = self.validator.validate(additional, &name, Some(&value));
            if !validation.is_valid() {
                debug!(param = name.as_str(), "undeclared parameter rejected");
                errors.extend(validation.errors);
                continue;
            }

            match validation.value {
                Some(normalized) if command.get(&name) != Some(&normalized) && write_back_filters.is_empty() => {
                    debug!(param = name.as_str(), "writing normalized undeclared value back");
                    command.set(name, normalized);
                }
                _ => {}
            }
        }
    }
}

impl<H: Handler> Middleware<H> for ValidationGate {
    type Wrapped = ValidatedHandler<H>;

    fn wrap(&self, inner: H) -> ValidatedHandler<H> {
        ValidatedHandler {
            gate: self.clone(),
            inner,
        }
    }
}

/// An executor guarded by a [`ValidationGate`]
#[derive(Debug, Clone)]
pub struct ValidatedHandler<H> {
    gate: ValidationGate,
    inner: H,
}

impl<H> ValidatedHandler<H> {
    pub fn gate(&self) -> &ValidationGate {
        &self.gate
    }

    pub fn into_inner(self) -> H {
        self.inner
    }
}

impl<H: Handler> Handler for ValidatedHandler<H> {
    type Output = H::Output;

    fn handle(&self, command: &mut Command) -> Result<H::Output> {
        self.gate.validate(command)?;
        self.inner.handle(command)
    }
}
