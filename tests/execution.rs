mod common;

use std::{
    convert::Infallible,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    thread,
    time::Duration,
};

use gherkin::tagexpr::TagOperation;
use regex::Regex;
use stepbind::{
    event::SkipReason, Config, Engine, HandlerFailure, Outcome, Registry,
    Steps, World,
};

/// Appends to a log shared between worlds of one test binary.
static LOG: Mutex<Vec<String>> = Mutex::new(Vec::new());

#[derive(Debug, Default)]
struct Counter {
    value: u32,
}

impl World for Counter {
    type Error = Infallible;

    fn new() -> Result<Self, Self::Error> {
        Ok(Self::default())
    }

    fn steps(steps: &mut Steps<Self>) {
        _ = steps
            .when("I increment", |c: &mut Self| c.value += 1)
            .then("the counter is (\\d+)", |c: &mut Self, n: u32| {
                assert_eq!(c.value, n);
            })
            .given("a side effect named (\\w+)", |_: &mut Self, name: String| {
                LOG.lock().unwrap().push(name);
            })
            .when("I wait (\\d+)ms", |_: &mut Self, ms: u64| {
                thread::sleep(Duration::from_millis(ms));
            })
            .then("it fails", |_: &mut Self| -> Result<(), Infallible> {
                panic!("failed on purpose")
            });
    }
}

/// Second world type, counting its constructions.
struct Audit;

static AUDITS: AtomicUsize = AtomicUsize::new(0);

impl World for Audit {
    type Error = Infallible;

    fn new() -> Result<Self, Self::Error> {
        _ = AUDITS.fetch_add(1, Ordering::SeqCst);
        Ok(Self)
    }

    fn steps(steps: &mut Steps<Self>) {
        _ = steps.then("the audit passes", |_: &mut Self| {});
    }
}

struct Unavailable;

impl World for Unavailable {
    type Error = &'static str;

    fn new() -> Result<Self, Self::Error> {
        Err("service is down")
    }

    fn steps(steps: &mut Steps<Self>) {
        _ = steps.given("the service is called", |_: &mut Self| {});
    }
}

fn engine() -> Engine {
    Engine::new(
        Registry::builder()
            .world::<Counter>()
            .world::<Audit>()
            .world::<Unavailable>()
            .build()
            .unwrap(),
    )
}

fn outcomes(engine: &Engine, text: &str) -> Vec<Outcome> {
    engine
        .execute("test.feature", text)
        .unwrap()
        .scenarios
        .into_iter()
        .map(|s| s.outcome)
        .collect()
}

#[test]
fn state_flows_across_steps_but_not_scenarios() {
    let text = "\
Feature: Counting
  Scenario: First
    When I increment
    And I increment
    Then the counter is 2

  Scenario: Second
    When I increment
    Then the counter is 1
";

    let outcomes = outcomes(&engine(), text);

    assert!(outcomes.iter().all(Outcome::is_passed), "{outcomes:?}");
}

#[test]
fn compiled_scenario_is_idempotent() {
    let scenarios = engine()
        .generate_scenarios(
            "Feature: Counting\n\
             Scenario: Twice\n\
             When I increment\n\
             Then the counter is 1\n",
        )
        .unwrap();

    let first = scenarios[0].run();
    let second = scenarios[0].run();

    assert!(first.is_passed());
    assert!(second.is_passed());
}

#[test]
fn one_instance_per_world_per_run() {
    let scenarios = engine()
        .generate_scenarios(
            "Feature: Audit\n\
             Scenario: Mixed\n\
             When I increment\n\
             Then the audit passes\n\
             And the audit passes\n\
             And the counter is 1\n",
        )
        .unwrap();

    let before = AUDITS.load(Ordering::SeqCst);
    assert!(scenarios[0].run().is_passed());
    assert_eq!(AUDITS.load(Ordering::SeqCst) - before, 1);
}

#[test]
fn ignored_scenarios_never_run() {
    let text = "\
Feature: Side effects
  @ignore
  Scenario: Ignored
    Given a side effect named ignored

  Scenario: Executed
    Given a side effect named executed
";

    let outcomes = outcomes(&engine(), text);

    assert!(matches!(
        outcomes[..],
        [Outcome::Skipped(SkipReason::Ignored), Outcome::Passed],
    ));
    let log = LOG.lock().unwrap();
    assert!(log.contains(&"executed".to_owned()));
    assert!(!log.contains(&"ignored".to_owned()));
}

#[test]
fn feature_level_ignore() {
    let text = "\
@ignore
Feature: Not yet
  Scenario: Whatever
    Given a side effect named feature_ignored
";

    let outcomes = outcomes(&engine(), text);

    assert!(matches!(outcomes[..], [Outcome::Skipped(SkipReason::Ignored)]));
    assert!(!LOG.lock().unwrap().contains(&"feature_ignored".to_owned()));
}

#[test]
fn feature_level_ignore_survives_generated_scenarios() {
    let scenarios = engine()
        .generate_scenarios(
            "@ignore\n\
             Feature: Not yet\n\
             Scenario: Detached\n\
             Given a side effect named detached\n",
        )
        .unwrap();

    assert!(scenarios[0].tags.is_empty());
    assert!(scenarios[0].is_ignored());
    assert!(matches!(
        scenarios[0].run(),
        Outcome::Skipped(SkipReason::Ignored),
    ));
    assert!(!LOG.lock().unwrap().contains(&"detached".to_owned()));
}

#[test]
fn world_construction_failure() {
    let outcomes = outcomes(
        &engine(),
        "Feature: Service\nScenario: Call\nGiven the service is called\n",
    );

    match &outcomes[..] {
        [Outcome::Failed(f)] => {
            assert!(f.step.is_none());
            assert!(matches!(
                &f.error,
                HandlerFailure::WorldInit { reason, .. }
                    if reason == "service is down",
            ));
        }
        other => panic!("unexpected outcomes: {other:?}"),
    }
}

const FAILING_SECOND: &str = "\
Feature: Fail fast
  Scenario: One
    When I increment
  Scenario: Two
    Then it fails
  Scenario: Three
    When I increment
  Scenario: Four
    When I increment
";

#[test]
fn without_fail_fast_everything_runs() {
    let outcomes = outcomes(&engine(), FAILING_SECOND);

    assert!(matches!(
        outcomes[..],
        [Outcome::Passed, Outcome::Failed(_), Outcome::Passed, Outcome::Passed],
    ));
}

#[test]
fn fail_fast_skips_the_rest() {
    let engine = engine().with_config(Config::default().fail_fast());

    let outcomes = outcomes(&engine, FAILING_SECOND);

    assert!(matches!(
        outcomes[..],
        [
            Outcome::Passed,
            Outcome::Failed(_),
            Outcome::Skipped(SkipReason::FailFast),
            Outcome::Skipped(SkipReason::FailFast),
        ],
    ));
}

#[test]
fn concurrent_execution_reports_in_order() {
    let text = "\
Feature: Slow
  Scenario: Slowest
    When I wait 60ms
    And I increment
    Then the counter is 1
  Scenario: Slow
    When I wait 30ms
    Then the counter is 0
  Scenario: Fast
    Then the counter is 0
  Scenario: Failing
    Then it fails
";
    let engine =
        engine().with_config(Config::default().max_concurrent_scenarios(4));

    let report = engine.execute("slow.feature", text).unwrap();

    let names = report
        .scenarios
        .iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, ["Slowest", "Slow", "Fast", "Failing"]);
    let stats = report.stats();
    assert_eq!((stats.passed, stats.failed), (3, 1));
    assert!(report.scenarios[0].duration >= Duration::from_millis(60));
}

#[test]
fn filters_by_name() {
    let engine = engine().with_config(
        Config::default().filter_name(Regex::new("^(One|Three)$").unwrap()),
    );

    let report = engine.execute("test.feature", FAILING_SECOND).unwrap();

    let names = report
        .scenarios
        .iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, ["One", "Three"]);
}

#[test]
fn filters_by_merged_tags() {
    let text = "\
@counting
Feature: Tagged
  @slow
  Scenario: Slow one
    When I increment
  Scenario: Plain one
    When I increment
  @slow @wip
  Scenario: Unfinished
    Then it fails
";
    // @counting and @slow and not @wip
    let expr = TagOperation::And(
        Box::new(TagOperation::And(
            Box::new(TagOperation::Tag("counting".into())),
            Box::new(TagOperation::Tag("slow".into())),
        )),
        Box::new(TagOperation::Not(Box::new(TagOperation::Tag(
            "wip".into(),
        )))),
    );
    let engine = engine().with_config(Config::default().filter_tags(expr));

    let report = engine.execute("tagged.feature", text).unwrap();

    assert_eq!(report.scenarios.len(), 1);
    assert_eq!(report.scenarios[0].name, "Slow one");
    assert_eq!(report.scenarios[0].tags, ["slow"]);
}

#[test]
fn strict_keywords() {
    let text = "\
Feature: Keywords
  Scenario: Then used as When
    Then I increment
";

    assert!(outcomes(&engine(), text)[0].is_passed());

    let strict = engine().with_config(Config::default().strict_keywords());
    assert!(strict.generate_feature("strict.feature", text).is_err());
}

#[test]
fn and_but_star_inherit_keywords() {
    let feature = engine()
        .generate_feature(
            "keywords.feature",
            "Feature: Keywords\n\
             Scenario: Inheritance\n\
             * I increment\n\
             When I increment\n\
             But I increment\n\
             Then the counter is 3\n\
             And the audit passes\n",
        )
        .unwrap();

    let types = feature.scenarios[0]
        .steps
        .iter()
        .map(|s| s.ty)
        .collect::<Vec<_>>();
    use stepbind::StepType::{Given, Then, When};
    assert_eq!(types, [Given, When, When, Then, Then]);
    assert_eq!(feature.scenarios[0].steps[2].keyword, "But");
    assert!(feature.scenarios[0].run().is_passed());
}

#[test]
fn shared_world_is_reused_from_common() {
    let engine = Engine::new(common::stock());

    let report = engine
        .execute(
            "stock.feature",
            "Feature: Stock\n\
             Scenario: Refund\n\
             Given I have 4 black jumpers left in stock\n\
             When he returns the jumper for a refund\n\
             Then I should have 5 black jumpers in stock\n",
        )
        .unwrap();

    assert!(report.scenarios[0].outcome.is_passed());
}
