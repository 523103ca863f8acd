//! TTL eviction through the housekeeper

use crate::common::*;

fn master_with_lifetime(name: &str, lifetime: i64) -> Ad {
    let mut ad = named("DaemonMaster", name);
    ad.insert(attrs::CLASSAD_LIFETIME, lifetime);
    ad
}

#[test]
fn lifetime_boundary() {
    let tc = TestCollector::new();
    let lifetime = 120;
    let key = tc
        .collect(Command::UpdateMaster, master_with_lifetime("m1", lifetime))
        .key
        .unwrap();
    let kind = AdType::Master.into();

    tc.clock.set(T0 + lifetime - 1);
    tc.engine.housekeep();
    assert!(tc.engine.lookup(&kind, &key).is_some());

    tc.clock.set(T0 + lifetime + 1);
    let report = tc.engine.housekeep();
    assert_eq!(report.evicted, 1);
    assert!(tc.engine.lookup(&kind, &key).is_none());
    assert_eq!(tc.hook.seen(), vec!["m1".to_string()]);
}

#[test]
fn veto_keeps_stale_ad() {
    let tc = TestCollector::new();
    tc.hook.veto("keep");
    tc.collect(Command::UpdateMaster, master_with_lifetime("keep", 10));
    tc.collect(Command::UpdateMaster, master_with_lifetime("drop", 10));

    tc.advance(11);
    let report = tc.engine.housekeep();
    assert_eq!(report.vetoed, 1);
    assert_eq!(report.evicted, 1);
    assert!(tc
        .engine
        .lookup(&AdType::Master.into(), &AdKey::new("keep", ""))
        .is_some());
}

#[test]
fn default_lifetime_is_update_interval() {
    let tc = TestCollector::new();
    tc.collect(Command::UpdateSchedd, schedd("s@h", "10.0.0.1"));
    tc.advance(900);
    assert_eq!(tc.engine.housekeep().evicted, 0);
    tc.advance(1);
    assert_eq!(tc.engine.housekeep().evicted, 1);
}

#[test]
fn rescheduling_changes_default_lifetime() {
    let tc = TestCollector::new();
    tc.collect(Command::UpdateSchedd, schedd("s@h", "10.0.0.1"));
    assert!(tc.engine.schedule_housekeeper(60).unwrap());
    tc.engine.cancel_housekeeper();

    tc.advance(61);
    assert_eq!(tc.engine.housekeep().evicted, 1);
}

#[test]
fn rescheduling_never_leaves_two_threads() {
    let tc = TestCollector::new();
    assert!(tc.engine.start_housekeeper().unwrap());
    for period in [600, 300, 120, 30] {
        tc.engine.schedule_housekeeper(period).unwrap();
        assert_eq!(tc.engine.housekeeper_threads(), 1);
    }
    assert!(!tc.engine.schedule_housekeeper(-1).unwrap());
    assert_eq!(tc.engine.housekeeper_threads(), 0);
}

#[test]
fn expire_by_query_then_veto_then_sweep() {
    let tc = TestCollector::new();
    tc.hook.veto("s@h");
    tc.collect(Command::UpdateSchedd, schedd("s@h", "10.0.0.1"));
    let kind = AdType::Schedd.into();

    assert_eq!(tc.engine.expire_by_query(&kind, &schedd("s@h", "10.0.0.1")), (0, true));
    let key = AdKey::new("s@h", "10.0.0.1");
    assert_eq!(tc.engine.lookup(&kind, &key).unwrap().last_heard_from(), Some(1));

    // Marked ads are invalidated on the next sweep unless vetoed again.
    let report = tc.engine.housekeep();
    assert_eq!(report.vetoed, 1);
    assert_eq!(report.invalidated, 0);
}

mod edge_cases {
    use super::*;

    #[test]
    fn ad_without_timestamp_is_skipped() {
        let tc = TestCollector::new();
        let mut ad = named("DaemonMaster", "bare");
        ad.insert(attrs::NAME, "bare");
        tc.engine
            .tables()
            .builtin(AdType::Master)
            .write()
            .insert(AdKey::new("bare", ""), ad);
        tc.advance(100_000);
        let report = tc.engine.housekeep();
        assert_eq!(report.skipped, 1);
        assert_eq!(tc.engine.len(&AdType::Master.into()), 1);
    }
}

#[test]
fn extreme_peer_timestamps() {
    let tc = TestCollector::new();
    let mut ancient = named("DaemonMaster", "ancient");
    ancient.insert(attrs::LAST_HEARD_FROM, i64::MIN);
    let mut future = named("DaemonMaster", "future");
    future.insert(attrs::LAST_HEARD_FROM, i64::MAX);
    tc.collect(Command::UpdateMaster, ancient);
    tc.collect(Command::UpdateMaster, future);

    let report = tc.engine.housekeep();
    assert_eq!(report.evicted, 1);
    assert_eq!(tc.hook.seen(), vec!["ancient".to_string()]);
    assert_eq!(tc.engine.len(&AdType::Master.into()), 1);
}
