//! Lookup, removal, invalidation and walks

use crate::common::*;

fn populated() -> TestCollector {
    let tc = TestCollector::new();
    for i in 0..6 {
        let mut ad = startd(&format!("slot{}@n1", i), "10.0.0.1");
        ad.insert("Cpus", i);
        tc.collect(Command::UpdateStartd, ad);
    }
    tc.collect(Command::UpdateSchedd, schedd("s@h", "10.0.0.2"));
    tc
}

#[test]
fn remove_by_key_and_query() {
    let tc = populated();
    let kind = AdType::Startd.into();
    assert!(tc.engine.remove_by_key(&kind, &AdKey::new("slot0@n1", "10.0.0.1")));
    assert!(!tc.engine.remove_by_key(&kind, &AdKey::new("slot0@n1", "10.0.0.1")));

    let mut partial = Ad::new();
    partial.insert("Name", "slot1@n1");
    partial.insert("StartdIpAddr", "<10.0.0.1:1>");
    assert_eq!(tc.engine.remove_by_query(&kind, &partial), (1, true));

    let mut no_address = Ad::new();
    no_address.insert("Name", "slot2@n1");
    assert_eq!(tc.engine.remove_by_query(&kind, &no_address), (0, false));
    assert_eq!(tc.engine.len(&kind), 4);
}

#[test]
fn invalidate_matching_removes_half_matches() {
    let tc = populated();
    let mut query = Ad::new();
    query.insert("TargetType", "Machine");
    query.insert_expr("Requirements", "TARGET.Cpus >= 3").unwrap();

    assert_eq!(tc.engine.invalidate_matching(&AdType::Startd.into(), &query), 3);
    let mut left = Vec::new();
    tc.engine.walk(&AdType::Startd.into(), |ad| {
        left.push(ad.lookup_integer("Cpus").unwrap_or(-1));
        true
    });
    left.sort();
    assert_eq!(left, vec![0, 1, 2]);
    assert_eq!(tc.engine.len(&AdType::Schedd.into()), 1);
}

#[test]
fn invalidate_matching_respects_target_type() {
    let tc = populated();
    let mut query = Ad::new();
    query.insert("TargetType", "Scheduler");
    assert_eq!(tc.engine.invalidate_matching(&AdType::Startd.into(), &query), 0);
    assert_eq!(tc.engine.invalidate_matching(&AdType::Schedd.into(), &query), 1);
}

#[test]
fn walk_visits_everything_after_rejection() {
    let tc = populated();
    let mut visited = 0;
    let all_ok = tc.engine.walk(&WalkScope::Any, |ad| {
        visited += 1;
        ad.lookup_integer("Cpus") != Some(2)
    });
    assert!(!all_ok);
    assert_eq!(visited, 7);
}

#[test]
fn self_ad_is_resolved_on_demand() {
    let tc = TestCollector::new();
    let mut me = named("Collector", "collector@cm");
    me.insert("MyAddress", "<10.0.0.100:9618>");
    let r = tc.collect(Command::UpdateCollector, me.clone());
    tc.engine
        .identify_self_ad(AdType::Collector.into(), r.key.clone().unwrap());

    me.insert("RunningJobs", 17);
    tc.advance(5);
    tc.collect(Command::UpdateCollector, me);
    let current = tc.engine.self_ad().unwrap();
    assert_eq!(current.lookup_integer("RunningJobs"), Some(17));

    tc.advance(10_000);
    tc.engine.housekeep();
    assert!(tc.engine.self_ad().is_none());
}

mod edge_cases {
    use super::*;

    #[test]
    fn lookup_in_unknown_generic_type() {
        let tc = TestCollector::new();
        assert!(tc
            .engine
            .lookup(&AdKind::generic("Nope"), &AdKey::new("x", ""))
            .is_none());
        assert!(tc.engine.generic_type_names().is_empty());
        assert_eq!(
            tc.engine.invalidate_matching(&AdKind::generic("Nope"), &Ad::new()),
            0
        );
    }

    #[test]
    fn empty_query_invalidates_everything() {
        let tc = populated();
        assert_eq!(tc.engine.invalidate_matching(&AdType::Startd.into(), &Ad::new()), 6);
    }
}
