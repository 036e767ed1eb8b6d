//! Property-based tests for the validation gate

use cmdgate_core::{Command, ValidationGate};
use cmdgate_schemas::{DescriptionBuilder, OperationBuilder, ParamType, ParameterSchema};
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

fn list_gate() -> ValidationGate {
    let operation = OperationBuilder::new("List")
        .param(ParameterSchema::new("Prefix").with_type(ParamType::String).with_filter("trim"))
        .param(ParameterSchema::new("Limit").with_type(ParamType::Integer).with_default(json!(100)))
        .param(ParameterSchema::new("Id").with_type(ParamType::String))
        .additional_parameters(ParameterSchema::new("").with_type(ParamType::String))
        .build();
    ValidationGate::new(Arc::new(DescriptionBuilder::new().operation(operation).build()), None)
}

proptest! {
    #[test]
    fn second_pass_changes_nothing(
        prefix in proptest::option::of("[ a-z]{0,10}"),
        limit in proptest::option::of(0i64..1000),
        id in proptest::option::of(any::<i64>()),
        extra in proptest::collection::btree_map("X[a-z]{1,5}", "[a-z0-9]{0,8}", 0..4),
    ) {
        let gate = list_gate();
        let mut command = Command::new("List");
        if let Some(p) = prefix { command.set("Prefix", p); }
        if let Some(l) = limit { command.set("Limit", l); }
        if let Some(i) = id { command.set("Id", i); }
        for (k, v) in extra { command.set(k, v); }

        prop_assert!(gate.validate(&mut command).is_ok());
        let after_first = command.clone();
        prop_assert!(gate.validate(&mut command).is_ok());
        prop_assert_eq!(command, after_first);
    }

    #[test]
    fn every_failing_parameter_is_reported(count in 2usize..8) {
        let mut operation = OperationBuilder::new("Wide");
        for i in 0..count {
            operation = operation.param(ParameterSchema::new(format!("P{}", i)).with_type(ParamType::String).required(true));
        }
        let description = DescriptionBuilder::new().operation(operation.build()).build();
        let gate = ValidationGate::new(Arc::new(description), None);

        let err = gate.validate(&mut Command::new("Wide")).unwrap_err();
        let errors = err.validation_errors().unwrap();
        prop_assert_eq!(errors.len(), count);
        for (i, message) in errors.iter().enumerate() {
            let expected = format!("[P{}] is a required string", i);
            prop_assert_eq!(message, &expected);
        }
    }
}
