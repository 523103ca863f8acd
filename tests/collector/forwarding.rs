//! Forwarding decisions for startd and submitter updates

use crate::common::*;

fn filtering() -> TestCollector {
    TestCollector::with_config(CollectorConfig {
        forward_filtering: true,
        forward_interval_secs: Some(300),
        forward_watch_list: vec!["State".to_string()],
        ..Default::default()
    })
}

fn machine(state: &str) -> Ad {
    let mut ad = startd("slot1@n1", "10.0.0.1");
    ad.insert("State", state);
    ad
}

fn should_forward(result: &CollectResult) -> Option<bool> {
    result.ad.as_ref().and_then(|ad| ad.lookup_bool(attrs::SHOULD_FORWARD))
}

fn last_forwarded(result: &CollectResult) -> Option<i64> {
    result.ad.as_ref().and_then(|ad| ad.lookup_integer(attrs::LAST_FORWARDED))
}

#[test]
fn insert_stamps_last_forwarded() {
    let tc = filtering();
    let r = tc.collect(Command::UpdateStartd, machine("Unclaimed"));
    assert_eq!(last_forwarded(&r), Some(T0));
    assert_eq!(should_forward(&r), None);
}

#[test]
fn unchanged_state_within_interval() {
    let tc = filtering();
    tc.collect(Command::UpdateStartd, machine("Unclaimed"));
    tc.advance(100);
    let r = tc.collect(Command::UpdateStartd, machine("Unclaimed"));
    assert_eq!(should_forward(&r), Some(false));
    assert_eq!(last_forwarded(&r), Some(T0));
}

#[test]
fn changed_state_within_interval() {
    let tc = filtering();
    tc.collect(Command::UpdateStartd, machine("Unclaimed"));
    tc.advance(100);
    let r = tc.collect(Command::UpdateStartd, machine("Claimed"));
    assert_eq!(should_forward(&r), Some(true));
    assert_eq!(last_forwarded(&r), Some(T0 + 100));
}

#[test]
fn interval_elapsed_forwards_regardless() {
    let tc = filtering();
    tc.collect(Command::UpdateStartd, machine("Unclaimed"));
    tc.advance(301);
    let r = tc.collect(Command::UpdateStartd, machine("Unclaimed"));
    assert_eq!(should_forward(&r), Some(true));
    assert_eq!(last_forwarded(&r), Some(T0 + 301));
}

#[test]
fn suppressed_updates_keep_original_stamp() {
    let tc = filtering();
    tc.collect(Command::UpdateStartd, machine("Unclaimed"));
    for _ in 0..3 {
        tc.advance(100);
        tc.collect(Command::UpdateStartd, machine("Unclaimed"));
    }
    // 300s after the last forward: not yet past the interval.
    let key = AdKey::new("slot1@n1", "10.0.0.1");
    let stored = tc.engine.lookup(&AdType::Startd.into(), &key).unwrap();
    assert_eq!(stored.lookup_integer(attrs::LAST_FORWARDED), Some(T0));

    tc.advance(1);
    let r = tc.collect(Command::UpdateStartd, machine("Unclaimed"));
    assert_eq!(should_forward(&r), Some(true));
}

#[test]
fn unfiltered_types_are_not_stamped() {
    let tc = filtering();
    tc.collect(Command::UpdateSchedd, schedd("s@h", "10.0.0.1"));
    let r = tc.collect(Command::UpdateSchedd, schedd("s@h", "10.0.0.1"));
    assert_eq!(should_forward(&r), None);
    assert_eq!(last_forwarded(&r), None);
}

#[test]
fn submitter_updates_are_filtered() {
    let tc = filtering();
    let mut ad = named("Submitter", "alice@pool");
    ad.insert("MyAddress", "<10.0.0.1:9618>");
    ad.insert("State", "Idle");
    tc.collect(Command::UpdateSubmittor, ad.clone());
    tc.advance(5);
    let r = tc.collect(Command::UpdateSubmittor, ad);
    assert_eq!(should_forward(&r), Some(false));
}

#[test]
fn filtering_disabled_leaves_ads_alone() {
    let tc = TestCollector::new();
    tc.collect(Command::UpdateStartd, machine("Unclaimed"));
    let r = tc.collect(Command::UpdateStartd, machine("Claimed"));
    assert_eq!(should_forward(&r), None);
    assert_eq!(last_forwarded(&r), None);
}

#[test]
fn merged_extreme_last_forwarded() {
    let tc = filtering();
    tc.collect(Command::UpdateStartd, machine("Unclaimed"));
    for extreme in [i64::MAX, i64::MIN] {
        let mut patch = startd("slot1@n1", "10.0.0.1");
        patch.insert(attrs::LAST_FORWARDED, extreme);
        let merged = tc.collect(Command::MergeStartd, patch);
        assert_eq!(merged.outcome, CollectOutcome::Updated);

        tc.advance(10);
        let r = tc.collect(Command::UpdateStartd, machine("Unclaimed"));
        assert!(r.is_stored());
    }
    // After the MIN merge the interval has long passed.
    let key = AdKey::new("slot1@n1", "10.0.0.1");
    let stored = tc.engine.lookup(&AdType::Startd.into(), &key).unwrap();
    assert_eq!(stored.lookup_bool(attrs::SHOULD_FORWARD), Some(true));
}
