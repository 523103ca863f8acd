//! Property tests over peer-supplied timestamps

use crate::common::*;
use proptest::prelude::*;

proptest! {
    #[test]
    fn housekeeping_accepts_any_last_heard_from(
        stamps in prop::collection::vec(any::<i64>(), 1..20),
        lifetime in 1i64..10_000,
    ) {
        let tc = TestCollector::new();
        for (i, stamp) in stamps.iter().enumerate() {
            let mut ad = named("DaemonMaster", &format!("m{}", i));
            ad.insert(attrs::LAST_HEARD_FROM, *stamp);
            ad.insert(attrs::CLASSAD_LIFETIME, lifetime);
            tc.collect(Command::UpdateMaster, ad);
        }

        let report = tc.engine.housekeep();
        let fresh = stamps
            .iter()
            .filter(|s| **s != 0 && T0.checked_sub(**s).map_or(false, |age| age <= lifetime))
            .count();
        prop_assert_eq!(report.examined, stamps.len());
        prop_assert_eq!(tc.engine.len(&AdType::Master.into()), fresh);
    }

    #[test]
    fn forwarding_accepts_any_last_forwarded(previous in any::<i64>(), step in 0i64..1_000) {
        let tc = TestCollector::with_config(CollectorConfig {
            forward_filtering: true,
            forward_interval_secs: Some(300),
            ..Default::default()
        });
        tc.collect(Command::UpdateStartd, startd("slot1@n1", "10.0.0.1"));
        let mut patch = startd("slot1@n1", "10.0.0.1");
        patch.insert(attrs::LAST_FORWARDED, previous);
        tc.collect(Command::MergeStartd, patch);

        tc.advance(step);
        let r = tc.collect(Command::UpdateStartd, startd("slot1@n1", "10.0.0.1"));
        prop_assert!(r.is_stored());
        let forwarded = r.ad.as_ref().and_then(|ad| ad.lookup_bool(attrs::SHOULD_FORWARD));
        prop_assert_eq!(forwarded, Some((T0 + step).saturating_sub(previous) > 300));
    }
}
