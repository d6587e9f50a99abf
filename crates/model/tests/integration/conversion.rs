//! Default validators, custom (de)serializers and date handling.

use chrono::{NaiveDate, NaiveDateTime};
use modelio::prelude::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

use crate::common::registry_of;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 4, 24).unwrap()
}

fn moment() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 4, 15)
        .and_then(|d| d.and_hms_micro_opt(10, 37, 10, 567_892))
        .unwrap()
}

fn single(declared: DeclaredType) -> Registry {
    registry_of(
        Settings::default(),
        [ModelDef::new("TestCaseModel").attr(Attr::new("attr", declared))],
    )
}

// ============================================================================
// DEFAULT VALIDATORS
// ============================================================================

#[rstest]
#[case::str(DeclaredType::STR, Value::from("a"), Value::from(1))]
#[case::int(DeclaredType::INT, Value::from(1), Value::from(1.5))]
#[case::float(DeclaredType::FLOAT, Value::from(1.5), Value::from(1))]
#[case::bool(DeclaredType::BOOL, Value::from(true), Value::from(1))]
#[case::dict(DeclaredType::DICT, Value::Dict(dict! { "a" => 1 }), Value::List(vec![]))]
#[case::list(DeclaredType::LIST, Value::list([Value::from(1)]), Value::tuple([Value::from(1)]))]
#[case::set(DeclaredType::SET, Value::set([Value::from(1)]), Value::list([Value::from(1)]))]
#[case::tuple(DeclaredType::TUPLE, Value::tuple([Value::from(1)]), Value::list([Value::from(1)]))]
#[case::datetime(DeclaredType::DATETIME, Value::from(moment()), Value::from(day()))]
#[case::date(DeclaredType::DATE, Value::from(day()), Value::from(moment()))]
#[case::optional(DeclaredType::optional(DeclaredType::INT), Value::Null, Value::from("1"))]
#[case::optional_value(DeclaredType::optional(DeclaredType::INT), Value::from(3), Value::from(3.0))]
#[case::list_of(
    DeclaredType::list_of(DeclaredType::INT),
    Value::list([Value::from(1), Value::from(2)]),
    Value::list([Value::from(1), Value::from("2")])
)]
#[case::set_of(
    DeclaredType::set_of(DeclaredType::STR),
    Value::set([Value::from("a")]),
    Value::set([Value::from(1)])
)]
#[case::tuple_of(
    DeclaredType::tuple_of(DeclaredType::FLOAT),
    Value::tuple([Value::from(1.0)]),
    Value::tuple([Value::from(1)])
)]
#[case::union(
    DeclaredType::union([DeclaredType::INT, DeclaredType::STR]),
    Value::from("a"),
    Value::from(1.5)
)]
#[case::any(DeclaredType::Any, Value::from("anything"), Value::Null)]
fn default_validator_accepts_declared_type(
    #[case] declared: DeclaredType,
    #[case] good: Value,
    #[case] bad: Value,
) {
    let registry = single(declared);
    assert!(registry.create("TestCaseModel", dict! { "attr" => good }).is_ok());
    let err = registry
        .create("TestCaseModel", dict! { "attr" => bad })
        .unwrap_err();
    assert!(err.to_string().starts_with("TestCaseModel.attr"), "{err}");
}

#[test]
fn default_validator_for_model_type() {
    let registry = registry_of(
        Settings::default(),
        [
            ModelDef::new("Inner").attr(Attr::new("n", DeclaredType::INT)),
            ModelDef::new("Outer").attr(Attr::new("inner", DeclaredType::model("Inner"))),
        ],
    );
    let inner = registry.create("Inner", dict! { "n" => 1 }).unwrap();
    assert!(registry.create("Outer", dict! { "inner" => inner }).is_ok());

    let err = registry
        .create("Outer", dict! { "inner" => Value::Dict(dict! { "n" => 1 }) })
        .unwrap_err();
    assert_eq!(err.to_string(), "Outer.inner is not instance of Inner");
}

#[test]
fn disabled_inference_skips_validation() {
    let registry = registry_of(
        Settings::default().with_default_validator(false),
        [ModelDef::new("Loose").attr(Attr::new("n", DeclaredType::INT))],
    );
    let model = registry.create("Loose", dict! { "n" => "not a number" }).unwrap();
    assert_eq!(model.get("n"), Some(&Value::from("not a number")));
}

#[test]
fn ambiguous_container_fails_the_build() {
    let err = RegistryBuilder::new(Settings::default())
        .register(ModelDef::new("Bad").attr(Attr::new(
            "items",
            DeclaredType::list_of(DeclaredType::Optional(None)),
        )))
        .build()
        .unwrap_err();
    assert!(matches!(err, ModelError::AutoValidatorBuild { .. }));
    assert_eq!(
        err.to_string(),
        "can not automatically instantiate a validator for Bad.items of type List[Optional]: \
         its elements type contains Optional"
    );
}

// ============================================================================
// CUSTOM CONVERSIONS
// ============================================================================

#[test]
fn deserializers_apply_per_exposed_name() {
    let def = ModelDef::new("TestCaseModel")
        .attr(Attr::new("attr_1", DeclaredType::STR))
        .attr(Attr::new("attr_2", DeclaredType::STR).alias("$attr_2"))
        .attr(Attr::new("_attr_3", DeclaredType::STR).alias("_attr_3"))
        .deserializer(["attr_1"], |v| Ok(Value::from(v.as_str().unwrap_or_default().to_lowercase())))
        .deserializer(["$attr_2", "_attr_3"], |v| {
            Ok(Value::from(v.as_str().unwrap_or_default().to_lowercase()))
        });
    let registry = registry_of(Settings::default(), [def]);

    let model = registry
        .from_dict(
            "TestCaseModel",
            &dict! { "attr_1" => "TEST", "$attr_2" => "TEST", "_attr_3" => "TEST" },
        )
        .unwrap();
    assert_eq!(model.get("attr_1"), Some(&Value::from("test")));
    assert_eq!(model.get("attr_2"), Some(&Value::from("test")));
    assert_eq!(model.get("_attr_3"), Some(&Value::from("test")));
}

#[test]
fn deserializer_errors_propagate_unwrapped() {
    let def = ModelDef::new("Person")
        .attr(Attr::new("age", DeclaredType::INT))
        .deserializer(["age"], |v| {
            let text = v.as_str().unwrap_or_default();
            text.parse::<i64>().map(Value::from).map_err(ModelError::conversion)
        });
    let registry = registry_of(Settings::default(), [def]);

    let model = registry.from_dict("Person", &dict! { "age" => "70" }).unwrap();
    assert_eq!(model.get("age"), Some(&Value::from(70)));

    let err = registry
        .from_dict("Person", &dict! { "age" => "seventy" })
        .unwrap_err();
    assert_eq!(err.code(), "MODEL_CONVERSION");
    assert_eq!(err.to_string(), "invalid digit found in string");
}

#[test]
fn serializer_replaces_default_conversion() {
    let def = ModelDef::new("Person")
        .attr(Attr::new("name", DeclaredType::STR))
        .serializer("name", |v| Value::from(v.as_str().unwrap_or_default().to_uppercase()));
    let registry = registry_of(Settings::default(), [def]);
    let model = registry.create("Person", dict! { "name" => "Rick" }).unwrap();
    assert_eq!(model.to_dict(), dict! { "name" => "RICK" });
}

#[test]
fn excluded_properties_are_not_serialized() {
    let def = ModelDef::new("TestCaseModel")
        .attr(Attr::new("_name", DeclaredType::STR).alias("name"))
        .getter("name", "_name")
        .property("lowercase_name", |m| {
            Value::from(
                m.get("name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_lowercase(),
            )
        })
        .do_not_serialize("lowercase_name");
    let registry = registry_of(Settings::default(), [def]);
    let model = registry
        .create("TestCaseModel", dict! { "name" => "Test Name" })
        .unwrap();
    assert_eq!(model.to_dict(), dict! { "name" => "Test Name" });
    assert_eq!(model.to_string(), "TestCaseModel(name='Test Name')");
}

#[test]
fn undefined_in_mapping_uses_default() {
    let registry = registry_of(
        Settings::default(),
        [ModelDef::new("Model").attr(Attr::new("attr", DeclaredType::STR).default_value("factory"))],
    );
    let model = registry
        .from_dict("Model", &dict! { "attr" => UNDEFINED })
        .unwrap();
    assert_eq!(model.get("attr"), Some(&Value::from("factory")));
}

// ============================================================================
// DATES
// ============================================================================

#[test]
fn datetimes_serialize_to_iso_strings() {
    let registry = single(DeclaredType::DATETIME);
    let model = registry
        .create("TestCaseModel", dict! { "attr" => moment().and_utc() })
        .unwrap();
    assert_eq!(
        model.to_dict(),
        dict! { "attr" => "2023-04-15T10:37:10.567892+00:00" }
    );
    assert_eq!(
        model.to_string(),
        "TestCaseModel(attr=datetime(2023, 4, 15, 10, 37, 10, 567892, UTC))"
    );
}

#[test]
fn dates_serialize_to_plain_strings() {
    let registry = single(DeclaredType::DATE);
    let model = registry.create("TestCaseModel", dict! { "attr" => day() }).unwrap();
    assert_eq!(model.to_dict(), dict! { "attr" => "2023-04-24" });
    assert_eq!(model.to_string(), "TestCaseModel(attr=date(2023, 4, 24))");
}

#[test]
fn naive_timestamps_parse_as_utc_when_configured() {
    let def = ModelDef::new("TestCaseModel").attr(Attr::new("dt", DeclaredType::DATETIME));
    let input = dict! { "dt" => "2023-04-15T10:37:10.567892" };

    let utc = registry_of(Settings::default().with_dates_as_utc(true), [def.clone()]);
    let model = utc.from_dict("TestCaseModel", &input).unwrap();
    assert_eq!(
        model.get("dt"),
        Some(&Value::from(moment().and_utc()))
    );

    let naive = registry_of(Settings::default(), [def]);
    let model = naive.from_dict("TestCaseModel", &input).unwrap();
    assert_eq!(model.get("dt"), Some(&Value::from(moment())));
}

#[test]
fn datetimes_are_stored_at_microsecond_precision() {
    let registry = single(DeclaredType::DATETIME);
    let precise = NaiveDate::from_ymd_opt(2023, 4, 15)
        .and_then(|d| d.and_hms_nano_opt(1, 2, 3, 1_500))
        .unwrap();
    let model = registry
        .create("TestCaseModel", dict! { "attr" => precise })
        .unwrap();

    let truncated = NaiveDate::from_ymd_opt(2023, 4, 15)
        .and_then(|d| d.and_hms_micro_opt(1, 2, 3, 1))
        .unwrap();
    assert_eq!(model.get("attr"), Some(&Value::NaiveDateTime(truncated)));
    assert_eq!(model.to_dict(), dict! { "attr" => "2023-04-15T01:02:03.000001" });

    let again = registry.from_dict("TestCaseModel", &model.to_dict()).unwrap();
    assert_eq!(again, model);
}

#[test]
fn unparseable_timestamp_fails_validation_not_parsing() {
    let registry = single(DeclaredType::DATETIME);
    let err = registry
        .from_dict("TestCaseModel", &dict! { "attr" => "next tuesday" })
        .unwrap_err();
    assert_eq!(err.to_string(), "TestCaseModel.attr is not instance of datetime");
}

// ============================================================================
// ROUND TRIP
// ============================================================================

fn profile_registry() -> Registry {
    registry_of(
        Settings::default(),
        [ModelDef::new("Profile")
            .attr(Attr::new("name", DeclaredType::STR))
            .attr(Attr::new("age", DeclaredType::INT))
            .attr(Attr::new("score", DeclaredType::FLOAT))
            .attr(Attr::new("tags", DeclaredType::tuple_of(DeclaredType::STR)))
            .attr(Attr::new("born", DeclaredType::optional(DeclaredType::DATE)))],
    )
}

proptest! {
    #[test]
    fn from_dict_of_to_dict_is_identity(
        name in "[a-zA-Z ]{0,12}",
        age in any::<i64>(),
        score in -1.0e6f64..1.0e6,
        tags in proptest::collection::vec("[a-z]{1,5}", 0..4),
        born in proptest::option::of((1900i32..2100, 1u32..=12, 1u32..=28)),
    ) {
        let registry = profile_registry();
        let born = born.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d));
        let model = registry
            .create(
                "Profile",
                dict! {
                    "name" => name,
                    "age" => age,
                    "score" => score,
                    "tags" => Value::tuple(tags.into_iter().map(Value::from)),
                    "born" => born,
                },
            )
            .unwrap();

        let again = registry.from_dict("Profile", &model.to_dict()).unwrap();
        prop_assert_eq!(again, model);
    }
}
