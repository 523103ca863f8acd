//! Insert, replace, merge and singleton behavior across every ad type

use crate::common::*;

// ============================================================================
// Insert and replace
// ============================================================================

#[test]
fn lookup_after_insert_returns_stamped_ad() {
    let tc = TestCollector::new();
    for command in UPDATE_COMMANDS {
        let ad = keyed_ad_for(command);
        let result = tc.collect(command, ad.clone());
        assert!(result.is_stored(), "{} was not stored", command);

        let kind = result.kind.clone().unwrap();
        let key = result.key.clone().unwrap();
        let stored = tc.engine.lookup(&kind, &key).unwrap();

        let mut expected = ad;
        expected.insert(attrs::LAST_HEARD_FROM, T0);
        assert_eq!(stored, expected, "{} stored a different ad", command);
    }
}

#[test]
fn replace_keeps_cardinality() {
    let tc = TestCollector::new();
    for i in 0..5 {
        tc.collect(Command::UpdateSchedd, schedd(&format!("schedd{}", i), "10.0.0.1"));
    }
    let kind = AdType::Schedd.into();
    assert_eq!(tc.engine.len(&kind), 5);

    tc.advance(30);
    let mut newer = schedd("schedd3", "10.0.0.1");
    newer.insert("TotalIdleJobs", 12);
    let result = tc.collect(Command::UpdateSchedd, newer);
    assert_eq!(result.outcome, CollectOutcome::Updated);
    assert_eq!(tc.engine.len(&kind), 5);

    let stored = tc.engine.lookup(&kind, &result.key.unwrap()).unwrap();
    assert_eq!(stored.lookup_integer("TotalIdleJobs"), Some(12));
    assert_eq!(stored.last_heard_from(), Some(T0 + 30));
}

#[test]
fn port_change_keeps_identity() {
    let tc = TestCollector::new();
    let mut first = startd("slot1@n1", "10.0.0.1");
    first.insert("MyAddress", "<10.0.0.1:4001?sock=x>");
    let mut second = startd("slot1@n1", "10.0.0.1");
    second.insert("MyAddress", "<10.0.0.1:5002>");

    assert_eq!(tc.collect(Command::UpdateStartd, first).outcome, CollectOutcome::Inserted);
    assert_eq!(tc.collect(Command::UpdateStartd, second).outcome, CollectOutcome::Updated);
    assert_eq!(tc.engine.len(&AdType::Startd.into()), 1);
}

#[test]
fn stats_skip_private_registry() {
    let tc = TestCollector::new();
    let mut source = QueuedSource::new("<10.0.0.1:7000>").with_ad(Ad::new());
    tc.engine
        .collect(Command::UpdateStartd, startd("slot1@n1", "10.0.0.1"), Some(&mut source));

    assert_eq!(tc.stats.get("Start").inserts, 1);
    assert_eq!(tc.stats.get("StartdPvt").inserts, 0);
    assert_eq!(tc.engine.len(&AdType::StartdPrivate.into()), 1);
}

// ============================================================================
// Merge
// ============================================================================

#[test]
fn merge_against_absent_key_changes_nothing() {
    let tc = TestCollector::new();
    tc.collect(Command::UpdateStartd, startd("slot1@n1", "10.0.0.1"));
    let before = tc.engine.total_len();

    let result = tc.collect(Command::MergeStartd, startd("slot9@n9", "10.0.0.9"));
    assert_eq!(result.outcome, CollectOutcome::MergeTargetMissing);
    assert!(result.ad.is_none());
    assert_eq!(tc.engine.total_len(), before);
}

#[test]
fn merge_overwrites_present_and_keeps_absent() {
    let tc = TestCollector::new();
    let mut base = startd("slot1@n1", "10.0.0.1");
    base.insert("Memory", 4096);
    base.insert(attrs::AUTHENTICATED_IDENTITY, "condor@pool");
    base.insert("TargetType", "Job");
    let inserted = tc.collect(Command::UpdateStartd, base);

    tc.advance(10);
    let mut patch = Ad::with_type("Patch");
    patch.insert("Name", "slot1@n1");
    patch.insert("MyAddress", "<10.0.0.1:9618>");
    patch.insert("State", "Claimed");
    patch.insert("TargetType", "Nothing");
    patch.insert(attrs::AUTHENTICATED_IDENTITY, "mallory@evil");
    let merged = tc.collect(Command::MergeStartd, patch);
    assert_eq!(merged.outcome, CollectOutcome::Updated);
    assert_eq!(merged.key, inserted.key);

    let ad = tc
        .engine
        .lookup(&AdType::Startd.into(), &merged.key.unwrap())
        .unwrap();
    assert_eq!(ad.lookup_string("State").as_deref(), Some("Claimed"));
    assert_eq!(ad.lookup_integer("Memory"), Some(4096));
    assert_eq!(ad.my_type().as_deref(), Some("Machine"));
    assert_eq!(ad.lookup_string("TargetType").as_deref(), Some("Job"));
    assert_eq!(
        ad.lookup_string(attrs::AUTHENTICATED_IDENTITY).as_deref(),
        Some("condor@pool")
    );
    // Merges do not refresh the timestamp or count as updates.
    assert_eq!(ad.last_heard_from(), Some(T0));
    assert_eq!(tc.stats.get("Start").updates, 0);
}

// ============================================================================
// Singletons
// ============================================================================

#[test]
fn single_negotiator_keeps_latest() {
    let tc = TestCollector::with_config(CollectorConfig {
        allow_only_one_negotiator: true,
        ..Default::default()
    });
    for i in 0..4 {
        let mut ad = named("Negotiator", &format!("neg{}", i));
        ad.insert("MyAddress", format!("<10.0.1.{}:9618>", i));
        tc.collect(Command::UpdateNegotiator, ad);
    }
    let mut names = Vec::new();
    tc.engine.walk(&AdType::Negotiator.into(), |ad| {
        names.push(ad.lookup_string("Name").unwrap_or_default());
        true
    });
    assert_eq!(names, vec!["neg3".to_string()]);
}

#[test]
fn negotiators_accumulate_without_singleton_config() {
    let tc = TestCollector::new();
    for i in 0..3 {
        let mut ad = named("Negotiator", &format!("neg{}", i));
        ad.insert("MyAddress", "<10.0.1.1:9618>");
        tc.collect(Command::UpdateNegotiator, ad);
    }
    assert_eq!(tc.engine.len(&AdType::Negotiator.into()), 3);
}

#[test]
fn lease_manager_is_always_singleton() {
    let tc = TestCollector::new();
    for i in 0..3 {
        let mut ad = named("LeaseManager", &format!("lm{}", i));
        ad.insert("MyAddress", "<10.0.1.1:9618>");
        tc.collect(Command::UpdateLeaseManager, ad);
    }
    let kind = AdType::LeaseManager.into();
    assert_eq!(tc.engine.len(&kind), 1);
    assert!(tc.engine.lookup(&kind, &AdKey::new("lm2", "10.0.1.1")).is_some());
}

mod edge_cases {
    use super::*;

    #[test]
    fn wire_codes_dispatch() {
        let tc = TestCollector::new();
        let r = tc.collect(Command::from_code(0), startd("slot1@n1", "10.0.0.1"));
        assert_eq!(r.outcome, CollectOutcome::Inserted);
        let r = tc.collect(Command::from_code(5), startd("slot1@n1", "10.0.0.1"));
        assert_eq!(r.outcome, CollectOutcome::NotImplementedHere);
        let r = tc.collect(Command::from_code(13), startd("slot1@n1", "10.0.0.1"));
        assert_eq!(r.outcome, CollectOutcome::NotImplementedHere);
        let r = tc.collect(Command::from_code(31337), startd("slot1@n1", "10.0.0.1"));
        assert_eq!(r.outcome, CollectOutcome::UnknownCommand);
        assert_eq!(r.outcome.code(), -1);
    }

    #[test]
    fn missing_key_attribute_fails() {
        let tc = TestCollector::new();
        let mut ad = Ad::with_type("Machine");
        ad.insert("Name", "slot1@n1");
        let r = tc.collect(Command::UpdateStartd, ad);
        assert_eq!(r.outcome, CollectOutcome::KeyDerivationFailed);
        assert_eq!(tc.engine.total_len(), 0);
    }
}
