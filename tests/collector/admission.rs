//! Admission policy in front of every registry

use crate::common::*;

fn with_requirements(text: &str) -> TestCollector {
    TestCollector::with_config(CollectorConfig {
        requirements: Some(text.to_string()),
        ..Default::default()
    })
}

#[test]
fn inconsistent_startd_address_is_rejected() {
    let tc = with_requirements("MyAddress == StartdIpAddr");
    let mut ad = Ad::with_type("Machine");
    ad.insert("Name", "slot1@n1");
    ad.insert("MyAddress", "10.0.0.1");
    ad.insert("StartdIpAddr", "10.0.0.2");

    let result = tc.collect(Command::UpdateStartd, ad);
    assert_eq!(result.outcome, CollectOutcome::Rejected);
    assert!(result.ad.is_none());
    assert_eq!(tc.engine.len(&AdType::Startd.into()), 0);
    assert!(tc.stats.snapshot().is_empty());
}

#[test]
fn consistent_address_passes_expression() {
    let tc = with_requirements("MyAddress == StartdIpAddr");
    let mut ad = Ad::with_type("Machine");
    ad.insert("Name", "slot1@n1");
    ad.insert("MyAddress", "<10.0.0.1:9618>");
    ad.insert("StartdIpAddr", "<10.0.0.1:9618>");
    assert_eq!(tc.collect(Command::UpdateStartd, ad).outcome, CollectOutcome::Inserted);
}

#[test]
fn rejection_leaves_existing_ad_untouched() {
    let tc = with_requirements("Cpus >= 4");
    let ok = tc.collect(Command::UpdateStartd, startd("slot1@n1", "10.0.0.1"));
    assert!(ok.is_stored());

    let mut shrunk = startd("slot1@n1", "10.0.0.1");
    shrunk.insert("Cpus", 1);
    tc.advance(60);
    assert_eq!(tc.collect(Command::UpdateStartd, shrunk).outcome, CollectOutcome::Rejected);

    let stored = tc
        .engine
        .lookup(&AdType::Startd.into(), &ok.key.unwrap())
        .unwrap();
    assert_eq!(stored.lookup_integer("Cpus"), Some(8));
    assert_eq!(stored.last_heard_from(), Some(T0));
}

#[test]
fn undefined_requirements_reject() {
    let tc = with_requirements("IsTrusted");
    assert_eq!(
        tc.collect(Command::UpdateSchedd, schedd("s@h", "10.0.0.1")).outcome,
        CollectOutcome::Rejected
    );
}

#[test]
fn requirements_can_be_replaced_at_runtime() {
    let tc = with_requirements("false");
    assert_eq!(
        tc.collect(Command::UpdateSchedd, schedd("s@h", "10.0.0.1")).outcome,
        CollectOutcome::Rejected
    );

    tc.engine.set_collector_requirements(Some("true")).unwrap();
    assert!(tc.collect(Command::UpdateSchedd, schedd("s@h", "10.0.0.1")).is_stored());

    // A bad expression leaves admission open.
    tc.engine.set_collector_requirements(Some("false")).unwrap();
    assert!(tc.engine.set_collector_requirements(Some("Cpus >")).is_err());
    assert!(tc.collect(Command::UpdateSchedd, schedd("s2@h", "10.0.0.1")).is_stored());
}

#[test]
fn invalid_requirements_fail_build() {
    let config = CollectorConfig {
        requirements: Some("(((".to_string()),
        ..Default::default()
    };
    assert!(CollectorEngine::builder().config(config).build().is_err());
}
