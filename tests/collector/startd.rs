//! Startd-specific paths: private companion ads and repeated test ads

use crate::common::*;

#[test]
fn private_ad_is_linked_to_public_ad() {
    let tc = TestCollector::new();
    let mut private = Ad::with_type("Whatever");
    private.insert("ClaimId", "<10.0.0.1:9618>#123#1");
    private.insert("Name", "spoofed");
    let mut source = QueuedSource::new("<10.0.0.1:40001>").with_ad(private);

    let r = tc.engine.collect(
        Command::UpdateStartdWithAck,
        startd("slot1@n1", "10.0.0.1"),
        Some(&mut source),
    );
    assert_eq!(r.outcome, CollectOutcome::Inserted);

    let stored = tc
        .engine
        .lookup(&AdType::StartdPrivate.into(), &r.key.unwrap())
        .unwrap();
    assert_eq!(stored.my_type().as_deref(), Some("Machine"));
    assert_eq!(stored.lookup_string("Name").as_deref(), Some("slot1@n1"));
    assert_eq!(
        stored.lookup_string("MyAddress").as_deref(),
        Some("<10.0.0.1:9618>")
    );
    assert!(stored.contains("ClaimId"));
    assert_eq!(stored.last_heard_from(), Some(T0));
}

#[test]
fn private_ads_hidden_from_any_walk() {
    let tc = TestCollector::new();
    let mut source = QueuedSource::new("peer").with_ad(Ad::new());
    tc.engine.collect(
        Command::UpdateStartd,
        startd("slot1@n1", "10.0.0.1"),
        Some(&mut source),
    );

    let mut count = 0;
    tc.engine.walk(&WalkScope::Any, |_| {
        count += 1;
        true
    });
    assert_eq!(count, 1);
    assert_eq!(tc.engine.total_len(), 2);
}

#[test]
fn private_ad_timeout_is_not_fatal() {
    let tc = TestCollector::new();
    let mut source = QueuedSource::new("peer").with_timeout();
    let r = tc.engine.collect(
        Command::UpdateStartd,
        startd("slot1@n1", "10.0.0.1"),
        Some(&mut source),
    );
    assert_eq!(r.outcome, CollectOutcome::Inserted);
    assert_eq!(tc.engine.len(&AdType::StartdPrivate.into()), 0);
}

#[test]
fn collect_from_reads_public_then_private() {
    let tc = TestCollector::new();
    let mut source = QueuedSource::new("<10.0.0.1:40001>")
        .with_ad(startd("slot1@n1", "10.0.0.1"))
        .with_ad(Ad::new())
        .authenticated("condor@pool", "IDTOKENS");

    let r = tc.engine.collect_from(Command::UpdateStartd, &mut source).unwrap();
    assert_eq!(r.outcome, CollectOutcome::Inserted);
    assert_eq!(source.pending(), 0);
    assert_eq!(tc.engine.len(&AdType::StartdPrivate.into()), 1);
    assert_eq!(
        r.ad.unwrap()
            .lookup_string(attrs::AUTHENTICATED_IDENTITY)
            .as_deref(),
        Some("condor@pool")
    );
}

#[test]
fn repeated_ads_fan_out() {
    let tc = TestCollector::with_config(CollectorConfig {
        repeat_startd_ads: 3,
        ..Default::default()
    });
    let r = tc.collect(Command::UpdateStartd, startd("slot1@n1", "10.0.0.1"));
    assert_eq!(r.outcome, CollectOutcome::Inserted);
    assert_eq!(r.key, Some(AdKey::new("slot1@n1", "10.0.0.1")));
    assert_eq!(tc.engine.len(&AdType::Startd.into()), 4);

    for n in 0..3 {
        let key = AdKey::new(format!("fake{}-slot1@n1", n), "10.0.0.1");
        let fake = tc.engine.lookup(&AdType::Startd.into(), &key).unwrap();
        assert_eq!(fake.lookup_string("State").as_deref(), Some("Unclaimed"));
    }

    // The next round replaces rather than multiplies.
    let r = tc.collect(Command::UpdateStartd, startd("slot1@n1", "10.0.0.1"));
    assert_eq!(r.outcome, CollectOutcome::Updated);
    assert_eq!(tc.engine.len(&AdType::Startd.into()), 4);
}

#[test]
fn merge_does_not_fan_out() {
    let tc = TestCollector::with_config(CollectorConfig {
        repeat_startd_ads: 2,
        ..Default::default()
    });
    tc.collect(Command::UpdateStartd, startd("slot1@n1", "10.0.0.1"));
    assert_eq!(tc.engine.len(&AdType::Startd.into()), 3);
    tc.collect(Command::MergeStartd, startd("slot1@n1", "10.0.0.1"));
    assert_eq!(tc.engine.len(&AdType::Startd.into()), 3);
}
