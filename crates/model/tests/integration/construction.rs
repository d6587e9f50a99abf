//! Construction lifecycle, initability, hooks, equality and inheritance.

use std::sync::Arc;

use modelio::prelude::*;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

use crate::common::{person_def, registry_of};

// ============================================================================
// END TO END
// ============================================================================

#[test]
fn person_round_trip_and_type_error() {
    let registry = registry_of(Settings::default(), [person_def()]);

    let rick = registry
        .create("Person", dict! { "name" => "Rick", "age" => 70 })
        .unwrap();
    assert_eq!(rick.to_dict(), dict! { "name" => "Rick", "age" => 70 });
    assert_eq!(rick.to_string(), "Person(age=70, name='Rick')");

    let err = registry
        .create("Person", dict! { "name" => 123, "age" => 70 })
        .unwrap_err();
    assert_eq!(err.to_string(), "Person.name is not instance of str");
    assert_eq!(err.code(), "MODEL_VALIDATION");
}

#[test]
fn missing_required_value_is_reported() {
    let registry = registry_of(Settings::default(), [person_def()]);
    let err = registry
        .create("Person", dict! { "name" => "Rick" })
        .unwrap_err();
    assert_eq!(err.to_string(), "Person.age must not be None");
}

#[test]
fn skipped_validation_can_run_later() {
    let registry = registry_of(Settings::default(), [person_def()]);
    let model = registry
        .create_unvalidated("Person", dict! { "name" => "Rick", "age" => "old" })
        .unwrap();
    assert_eq!(model.state(), ModelState::Ready);

    let err = model.validate(None).unwrap_err();
    assert_eq!(err.to_string(), "Person.age is not instance of int");
    let err = model.validate(Some("Family.members[0]")).unwrap_err();
    assert_eq!(err.to_string(), "Family.members[0].age is not instance of int");
}

// ============================================================================
// INITABILITY
// ============================================================================

#[test]
fn non_initable_attribute_rejects_input() {
    let registry = registry_of(
        Settings::default(),
        [ModelDef::new("Model").attr(
            Attr::new("non_initable_model_attr", DeclaredType::STR)
                .non_initable()
                .default_value("default"),
        )],
    );

    let err = registry
        .create("Model", dict! { "non_initable_model_attr" => "x" })
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "non_initable_model_attr attribute is not initable for class Model"
    );
    assert!(matches!(err, ModelError::NonInitableAttribute { .. }));

    let model = registry.create("Model", Dict::new()).unwrap();
    assert_eq!(model.get("non_initable_model_attr"), Some(&Value::from("default")));
}

fn hidden_fields() -> ModelDef {
    ModelDef::new("TestCaseModel")
        .attr(Attr::new("_name", DeclaredType::STR).default_value("Default factory value"))
        .attr(Attr::new("__id", DeclaredType::STR).default_value("Default id"))
}

fn hidden_input() -> Dict {
    dict! { "name" => "Initialized value", "id" => "12345" }
}

#[test]
fn protected_fields_are_closed_by_default() {
    let registry = registry_of(Settings::default(), [hidden_fields()]);
    let err = registry.create("TestCaseModel", hidden_input()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "_name attribute is not initable for class TestCaseModel"
    );
}

#[test]
fn private_fields_are_closed_by_default() {
    let registry = registry_of(
        Settings::default().with_init_protected(true),
        [hidden_fields()],
    );
    let err = registry.create("TestCaseModel", hidden_input()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "_TestCaseModel__id attribute is not initable for class TestCaseModel"
    );
}

#[test]
fn settings_open_hidden_fields() {
    let registry = registry_of(
        Settings::default()
            .with_init_protected(true)
            .with_init_private(true),
        [hidden_fields()],
    );
    let model = registry.create("TestCaseModel", hidden_input()).unwrap();
    assert_eq!(model.get("_name"), Some(&Value::from("Initialized value")));
    assert_eq!(model.get("_TestCaseModel__id"), Some(&Value::from("12345")));

    let defaults = registry.create("TestCaseModel", Dict::new()).unwrap();
    assert_eq!(defaults.get("name"), Some(&Value::from("Default factory value")));
    assert_eq!(defaults.get("id"), Some(&Value::from("Default id")));
}

#[test]
fn undefined_input_uses_default_factory() {
    let registry = registry_of(
        Settings::default(),
        [ModelDef::new("Model").attr(
            Attr::new("attr", DeclaredType::STR).default_factory(|| Value::from("factory")),
        )],
    );
    let model = registry
        .create("Model", dict! { "attr" => UNDEFINED })
        .unwrap();
    assert_eq!(model.get("attr"), Some(&Value::from("factory")));
}

// ============================================================================
// HOOKS
// ============================================================================

#[test]
fn hooks_run_in_lifecycle_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (a, b, c, d) = (
        Arc::clone(&log),
        Arc::clone(&log),
        Arc::clone(&log),
        Arc::clone(&log),
    );
    let def = person_def()
        .before_init(move |input| {
            a.lock().push("before_init".to_string());
            Ok(input)
        })
        .before_validate(move |_| {
            b.lock().push("before_validate".to_string());
            Ok(())
        })
        .when_validating_attr(move |_, attr| {
            c.lock().push(format!("validating {}", attr.path));
            Ok(())
        })
        .once_validated(move |_| {
            d.lock().push("once_validated".to_string());
            Ok(())
        });
    let registry = registry_of(Settings::default(), [def]);
    registry
        .create("Person", dict! { "name" => "Rick", "age" => 70 })
        .unwrap();

    assert_eq!(
        *log.lock(),
        [
            "before_init",
            "before_validate",
            "validating Person.name",
            "validating Person.age",
            "once_validated",
        ]
    );
}

#[test]
fn before_init_can_derive_input() {
    let def = person_def().before_init(|mut input| {
        if let Some(full) = input.get("full_name").and_then(Value::as_str) {
            let first = full.split(' ').next().unwrap_or_default().to_string();
            input.insert("name".into(), Value::from(first));
        }
        Ok(input)
    });
    let registry = registry_of(Settings::default(), [def]);
    let model = registry
        .create("Person", dict! { "full_name" => "Rick Sanchez", "age" => 70 })
        .unwrap();
    assert_eq!(model.get("name"), Some(&Value::from("Rick")));
}

#[test]
fn attr_hook_sees_paths_and_spec() {
    let def = ModelDef::new("Account")
        .attr(Attr::new("_balance", DeclaredType::INT).alias("balance"))
        .when_validating_attr(|_, attr| {
            assert_eq!(attr.parent_path, "Account");
            assert_eq!(attr.internal_name, "_balance");
            assert_eq!(attr.spec.exposed_name(), attr.exposed_name);
            match attr.value.as_int() {
                Some(n) if n < 0 => Err(attr.error("must not be negative")),
                _ => Ok(()),
            }
        });
    let registry = registry_of(Settings::default(), [def]);
    let err = registry
        .create("Account", dict! { "balance" => -1 })
        .unwrap_err();
    assert_eq!(err.to_string(), "Account.balance must not be negative");
    assert_eq!(err.as_validation().map(|e| e.code.as_ref()), Some("custom"));
}

#[test]
fn hook_errors_abort_construction() {
    let def = person_def().once_validated(|_| {
        Err(ModelError::conversion("storage unavailable"))
    });
    let registry = registry_of(Settings::default(), [def]);
    let err = registry
        .create("Person", dict! { "name" => "Rick", "age" => 70 })
        .unwrap_err();
    assert_eq!(err.to_string(), "storage unavailable");
}

// ============================================================================
// EQUALITY
// ============================================================================

#[test]
fn equality_ignores_non_comparable_fields() {
    let def = ModelDef::new("Note")
        .attr(Attr::new("text", DeclaredType::STR))
        .attr(Attr::new("edited_at", DeclaredType::INT).compare(false));
    let registry = registry_of(Settings::default(), [def]);

    let a = registry
        .create("Note", dict! { "text" => "hi", "edited_at" => 1 })
        .unwrap();
    let b = registry
        .create("Note", dict! { "text" => "hi", "edited_at" => 2 })
        .unwrap();
    let c = registry
        .create("Note", dict! { "text" => "bye", "edited_at" => 1 })
        .unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn equality_requires_same_type() {
    let registry = registry_of(
        Settings::default(),
        [person_def(), ModelDef::new("Clone").extends("Person")],
    );
    let input = dict! { "name" => "Rick", "age" => 70 };
    let person = registry.create("Person", input.clone()).unwrap();
    let clone = registry.create("Clone", input).unwrap();
    assert_ne!(person, clone);
    assert!(clone.is_instance_of("Person"));
}

// ============================================================================
// INHERITANCE AND REFERENCES
// ============================================================================

#[test]
fn child_inherits_fields_and_hooks() {
    let registry = registry_of(
        Settings::default(),
        [
            person_def().before_init(|mut input| {
                input.entry("age".into()).or_insert(Value::from(0));
                Ok(input)
            }),
            ModelDef::new("Employee")
                .extends("Person")
                .attr(Attr::new("company", DeclaredType::STR)),
        ],
    );

    let employee = registry
        .create("Employee", dict! { "name" => "Morty", "company" => "Smith & Co" })
        .unwrap();
    assert_eq!(employee.get("age"), Some(&Value::from(0)));
    assert_eq!(
        employee.to_string(),
        "Employee(age=0, company='Smith & Co', name='Morty')"
    );
}

#[test]
fn self_referencing_model_validates_deeply() {
    let node = ModelDef::new("Node")
        .attr(Attr::new("value", DeclaredType::INT))
        .attr(
            Attr::new("children", DeclaredType::list_of(DeclaredType::forward_ref("Node")))
                .default_factory(|| Value::List(vec![])),
        );
    let registry = registry_of(Settings::default(), [node]);

    let data = dict! {
        "value" => 1,
        "children" => Value::list([Value::Dict(dict! {
            "value" => 2,
            "children" => Value::list([Value::Dict(dict! { "value" => "three" })]),
        })]),
    };
    let err = registry.from_dict("Node", &data).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Node.children[0].children[0].value is not instance of int"
    );
}

#[test]
fn model_typed_attribute_accepts_subtypes() {
    let registry = registry_of(
        Settings::default(),
        [
            person_def(),
            ModelDef::new("Employee").extends("Person"),
            ModelDef::new("Team").attr(Attr::new("lead", DeclaredType::model("Person"))),
        ],
    );
    let lead = registry
        .create("Employee", dict! { "name" => "Rick", "age" => 70 })
        .unwrap();
    let team = registry.create("Team", dict! { "lead" => lead }).unwrap();
    assert!(team.get("lead").and_then(Value::as_model).is_some());

    let err = registry
        .create("Team", dict! { "lead" => "Rick" })
        .unwrap_err();
    assert_eq!(err.to_string(), "Team.lead is not instance of Person");
}

// ============================================================================
// PATCH
// ============================================================================

#[test]
fn patch_recurses_into_nested_models() {
    let registry = registry_of(
        Settings::default(),
        [
            ModelDef::new("Address")
                .attr(Attr::new("city", DeclaredType::optional(DeclaredType::STR)))
                .attr(Attr::new("street", DeclaredType::optional(DeclaredType::STR))),
            ModelDef::new("Profile")
                .attr(Attr::new("nick", DeclaredType::optional(DeclaredType::STR)))
                .attr(Attr::new("address", DeclaredType::optional(DeclaredType::model("Address")))),
        ],
    );

    let address = registry
        .create("Address", dict! { "city" => "Seattle" })
        .unwrap();
    let mut profile = registry
        .create("Profile", dict! { "address" => address })
        .unwrap();

    profile.patch_from_dict(
        &dict! {
            "nick" => "rick",
            "address" => Value::Dict(dict! { "city" => "Portland", "street" => "Main" }),
        },
        &Value::Null,
    );

    assert_eq!(profile.get("nick"), Some(&Value::from("rick")));
    let address = profile.get("address").and_then(Value::as_model).unwrap();
    assert_eq!(address.get("city"), Some(&Value::from("Seattle")));
    assert_eq!(address.get("street"), Some(&Value::from("Main")));
}

// ============================================================================
// CACHE
// ============================================================================

#[test]
fn serializable_names_are_cached_per_model() {
    let registry = registry_of(Settings::default(), [person_def()]);
    let rick = registry
        .create("Person", dict! { "name" => "Rick", "age" => 70 })
        .unwrap();
    rick.to_dict();
    rick.to_dict();
    assert_eq!(registry.cache().misses(), 1);
    assert!(registry.cache().hits() >= 1);

    let uncached = registry_of(Settings::default().with_cache(false), [person_def()]);
    uncached
        .create("Person", dict! { "name" => "Rick", "age" => 70 })
        .unwrap()
        .to_dict();
    assert!(uncached.cache().is_empty());
}
