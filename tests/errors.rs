use std::convert::Infallible;

use stepbind::{
    error::{FeatureError, MatchError, ParseError, RegistryError},
    step::ParamKind,
    Engine, Error, Registry, Steps, Table, World,
};

#[derive(Default)]
struct Shelf {
    items: u8,
}

impl World for Shelf {
    type Error = Infallible;

    fn new() -> Result<Self, Self::Error> {
        Ok(Self::default())
    }

    fn steps(steps: &mut Steps<Self>) {
        _ = steps
            .given("(\\d+) items? on the shelf", |s: &mut Self, n: u8| {
                s.items = n;
            })
            .given(
                "(\\d+) items? on the (.*)",
                |_: &mut Self, _: u8, _: String| {},
            )
            .then("the shelf holds:", |s: &mut Self, t: Table| {
                assert_eq!(usize::from(s.items), t.len());
            });
    }
}

/// Re-declares a pattern of [`Shelf`].
struct Rack;

impl World for Rack {
    type Error = Infallible;

    fn new() -> Result<Self, Self::Error> {
        Ok(Self)
    }

    fn steps(steps: &mut Steps<Self>) {
        _ = steps.then("the shelf holds:", |_: &mut Self, _: Table| {});
    }
}

fn engine() -> Engine {
    Engine::new(Registry::builder().world::<Shelf>().build().unwrap())
}

fn feature_error(err: Error) -> (String, FeatureError) {
    match err {
        Error::Feature { source_name, kind } => (source_name, kind),
        other => panic!("not a feature error: {other}"),
    }
}

#[test]
fn duplicate_binding_across_worlds() {
    let err = Registry::builder()
        .world::<Shelf>()
        .world::<Rack>()
        .build()
        .unwrap_err();

    match err {
        RegistryError::DuplicateBinding { pattern, first, second } => {
            assert_eq!(pattern, "the shelf holds:");
            assert_eq!(first.filename(), "errors.rs");
            assert!(first.line < second.line, "{first} vs {second}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn registry_error_converts_into_error() {
    let err: Error = Registry::builder()
        .world::<Shelf>()
        .world::<Rack>()
        .build()
        .unwrap_err()
        .into();

    assert!(matches!(err, Error::Registry(_)));
    assert!(err.to_string().starts_with("Failed to build step registry"));
}

#[test]
fn empty_feature() {
    for text in ["", "   \n# only a comment\n", "Scenario: Headless\n"] {
        let err = engine().generate_feature("empty.feature", text).unwrap_err();
        let (source, kind) = feature_error(err);

        assert_eq!(source, "empty.feature");
        assert!(
            matches!(kind, FeatureError::Parse(ParseError::EmptyFeature)),
            "{text:?}: {kind}",
        );
    }
}

#[test]
fn missing_feature_name() {
    let (_, kind) = feature_error(
        engine()
            .generate_feature("nameless.feature", "\n@wip\nFeature:\n")
            .unwrap_err(),
    );

    assert!(matches!(
        kind,
        FeatureError::Parse(ParseError::MissingFeatureName { line: 3 }),
    ));
}

#[test]
fn malformed_table() {
    let (_, kind) = feature_error(
        engine()
            .generate_feature(
                "table.feature",
                "Feature: Tables\n\
                 Scenario: Ragged\n\
                 Then the shelf holds:\n\
                 | name  | count |\n\
                 | socks | 2     |\n\
                 | hats  |\n",
            )
            .unwrap_err(),
    );

    assert_eq!(
        kind.to_string(),
        "Malformed table in `Ragged`: row 2 at line 6 has 1 cell(s), \
         expected 2",
    );
}

#[test]
fn unbound_step_names_its_context() {
    let err = engine()
        .generate_feature(
            "shelf.feature",
            "Feature: Shelf\nScenario: Counting\nGiven a shelf\n",
        )
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "shelf.feature: Step `a shelf` at line 3 of `Counting` matches no \
         step definition",
    );
}

#[test]
fn ambiguous_step_lists_patterns() {
    let (_, kind) = feature_error(
        engine()
            .generate_feature(
                "shelf.feature",
                "Feature: Shelf\nScenario: Counting\nGiven 3 items on the shelf\n",
            )
            .unwrap_err(),
    );

    match kind {
        FeatureError::Match(MatchError::Ambiguous { step, source, .. }) => {
            assert_eq!(step, "3 items on the shelf");
            assert_eq!(
                source.patterns().collect::<Vec<_>>(),
                ["(\\d+) items? on the (.*)", "(\\d+) items? on the shelf"],
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn parameter_conversion() {
    let (_, kind) = feature_error(
        engine()
            .generate_feature(
                "shelf.feature",
                "Feature: Shelf\nScenario: Overflow\nGiven 300 items on the rack\n",
            )
            .unwrap_err(),
    );

    assert!(
        matches!(
            &kind,
            FeatureError::Match(MatchError::ParameterConversion {
                step,
                position: 0,
                expected: ParamKind::Integer,
                ..
            }) if step == "300 items on the rack",
        ),
        "{kind}",
    );
}

#[test]
fn generation_errors_are_eager() {
    let err = engine()
        .execute(
            "shelf.feature",
            "Feature: Shelf\n\
             Scenario: Fine\n\
             Given 1 item on the rack\n\
             Scenario: Broken\n\
             Given nothing at all\n",
        )
        .unwrap_err();

    assert!(err.as_feature_error().is_some());
}
