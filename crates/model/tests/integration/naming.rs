//! Exposed-name resolution through compiled registries.

use modelio::naming::{self, Visibility};
use modelio::prelude::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

use crate::common::registry_of;

#[rstest]
#[case("name", "name", Visibility::Public)]
#[case("_name", "name", Visibility::Protected)]
#[case("__name", "name", Visibility::Private)]
#[case("__name__", "name", Visibility::Private)]
fn exposed_name_follows_declared_name(
    #[case] declared: &str,
    #[case] exposed: &str,
    #[case] visibility: Visibility,
) {
    let registry = registry_of(
        Settings::default(),
        [ModelDef::new("Foo").attr(Attr::new(declared, DeclaredType::STR))],
    );
    let spec = &registry.model_type("Foo").unwrap().specs()[0];
    assert_eq!(spec.exposed_names(), [exposed.to_string()]);
    assert_eq!(spec.visibility(), visibility);
}

#[rstest]
#[case("name")]
#[case("_name")]
#[case("__name")]
fn explicit_alias_overrides_derived_name(#[case] declared: &str) {
    let registry = registry_of(
        Settings::default(),
        [ModelDef::new("Foo").attr(Attr::new(declared, DeclaredType::STR).alias("x"))],
    );
    let model = registry.create("Foo", dict! { "x" => "value" }).unwrap();
    let spec = &model.model_type().specs()[0];
    assert_eq!(spec.exposed_names(), ["x".to_string()]);
    assert_eq!(model.get("x"), Some(&Value::from("value")));

    let err = registry.create("Foo", dict! { "x" => 1 }).unwrap_err();
    assert_eq!(err.to_string(), "Foo.x is not instance of str");
}

#[test]
fn aliases_are_tried_in_order() {
    let registry = registry_of(
        Settings::default(),
        [ModelDef::new("User").attr(
            Attr::new("_email", DeclaredType::STR)
                .validator(EmailValidator::new())
                .aliases(["email", "mail"]),
        )],
    );

    let by_second = registry
        .create("User", dict! { "mail" => "rick@example.com" })
        .unwrap();
    assert_eq!(by_second.get("email"), Some(&Value::from("rick@example.com")));

    let both = registry
        .create("User", dict! { "mail" => "b@example.com", "email" => "a@example.com" })
        .unwrap();
    assert_eq!(both.get("_email"), Some(&Value::from("a@example.com")));

    let err = registry
        .create("User", dict! { "mail" => "nope" })
        .unwrap_err();
    assert_eq!(err.to_string(), "User.email is not a valid email address");
}

#[test]
fn public_alias_opens_protected_field() {
    let registry = registry_of(
        Settings::default(),
        [ModelDef::new("Foo").attr(Attr::new("_token", DeclaredType::STR).init_by_public_alias())],
    );
    let model = registry.create("Foo", dict! { "token" => "abc" }).unwrap();
    assert_eq!(model.get("_token"), Some(&Value::from("abc")));
}

#[test]
fn explicit_visibility_overrides_surface_syntax() {
    let registry = registry_of(
        Settings::default(),
        [ModelDef::new("Foo").attr(Attr::new("id", DeclaredType::STR).visibility(Visibility::Private))],
    );
    let spec = &registry.model_type("Foo").unwrap().specs()[0];
    assert_eq!(spec.internal_name(), "_Foo__id");
    assert_eq!(spec.exposed_name(), "id");
    assert!(!spec.accepts_input());
}

#[test]
fn inherited_private_field_keeps_parent_prefix() {
    let registry = registry_of(
        Settings::default().with_init_private(true),
        [
            ModelDef::new("Base").attr(Attr::new("__token", DeclaredType::STR)),
            ModelDef::new("Child")
                .extends("Base")
                .attr(Attr::new("__token", DeclaredType::STR).default_value("own")),
        ],
    );
    let child = registry.model_type("Child").unwrap();
    let names: Vec<_> = child.specs().iter().map(AttrSpec::internal_name).collect();
    assert_eq!(names, ["_Base__token", "_Child__token"]);
    assert!(child.specs().iter().all(|s| s.exposed_name() == "token"));

    let model = registry.create("Child", dict! { "token" => "given" }).unwrap();
    assert_eq!(model.get("_Base__token"), Some(&Value::from("given")));
    assert_eq!(model.get("_Child__token"), Some(&Value::from("given")));
}

proptest! {
    #[test]
    fn visibility_prefixes_strip_to_base_name(base in "[a-z][a-z0-9]{0,8}") {
        let lineage = ["Foo", "Base"];
        prop_assert_eq!(naming::resolve(&base, &lineage), (Visibility::Public, base.clone()));
        prop_assert_eq!(
            naming::resolve(&format!("_{base}"), &lineage),
            (Visibility::Protected, base.clone())
        );
        prop_assert_eq!(
            naming::resolve(&format!("_Foo__{base}"), &lineage),
            (Visibility::Private, base.clone())
        );
        prop_assert_eq!(
            naming::resolve(&format!("_Base__{base}"), &lineage),
            (Visibility::Private, base.clone())
        );
    }

    #[test]
    fn mangled_names_resolve_back(base in "[a-z][a-z0-9]{0,8}", owner in "[A-Z][a-z]{0,6}") {
        let internal = naming::internal_name(&format!("__{base}"), &owner, None);
        prop_assert_eq!(&internal, &format!("_{owner}__{base}"));
        prop_assert_eq!(
            naming::resolve(&internal, &[owner.as_str()]),
            (Visibility::Private, base)
        );
    }
}
