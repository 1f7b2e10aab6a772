//! Per-region inside/outside state and the evaluation step.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::region::{PositionSample, Region, TransitionEvent, TransitionKind};

/// Membership of a single region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionMembership {
    /// Whether the last evaluated sample was inside the region.
    pub inside: bool,
    /// Timestamp of the last Enter or Exit, if any.
    pub last_transition_at: Option<DateTime<Utc>>,
}

/// Inside/outside classification for every monitored region.
///
/// One instance per monitoring session. Regions that have never been
/// evaluated are reported as outside.
#[derive(Debug, Clone, Default)]
pub struct MembershipState {
    regions: HashMap<String, RegionMembership>,
}

impl MembershipState {
    /// Create an empty state (every region outside).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a state with an explicit `Outside` entry for each region.
    pub fn for_regions(regions: &[Region]) -> Self {
        Self {
            regions: regions
                .iter()
                .map(|r| (r.id.clone(), RegionMembership::default()))
                .collect(),
        }
    }

    /// Membership for a region; the initial `Outside` value if unknown.
    pub fn get(&self, region_id: &str) -> RegionMembership {
        self.regions.get(region_id).copied().unwrap_or_default()
    }

    /// Returns true if the user is currently inside `region_id`.
    pub fn is_inside(&self, region_id: &str) -> bool {
        self.get(region_id).inside
    }

    /// Identifiers of all regions currently marked inside, sorted.
    pub fn inside_regions(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .regions
            .iter()
            .filter(|(_, m)| m.inside)
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    fn entry(&mut self, region_id: &str) -> &mut RegionMembership {
        self.regions.entry(region_id.to_string()).or_default()
    }
}

/// Advance `state` by one sample.
///
/// Each region is checked independently; a region produces an event only
/// when its containment differs from the recorded membership. Events are
/// returned in the order of `regions`. Re-evaluating the same sample is a
/// no-op because the recorded membership already matches.
pub fn evaluate(
    state: &mut MembershipState,
    regions: &[Region],
    sample: &PositionSample,
) -> Vec<TransitionEvent> {
    let point = sample.point();
    let mut events = Vec::new();

    for region in regions {
        let is_inside = region.contains(point);
        let membership = state.entry(&region.id);

        let kind = match (membership.inside, is_inside) {
            (false, true) => TransitionKind::Enter,
            (true, false) => TransitionKind::Exit,
            _ => continue,
        };

        membership.inside = is_inside;
        membership.last_transition_at = Some(sample.at);

        tracing::debug!(
            region_id = %region.id,
            kind = %kind,
            lat = sample.latitude,
            lon = sample.longitude,
            "Region transition"
        );

        events.push(TransitionEvent {
            region_id: region.id.clone(),
            kind,
            at: sample.at,
        });
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{offset_north, GeoPoint};
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-03-01T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn region_a() -> Region {
        Region::new("A", GeoPoint::new(1.0, 1.0), 100.0)
    }

    fn sample_at(point: GeoPoint, secs: i64) -> PositionSample {
        PositionSample::with_timestamp(
            point.latitude,
            point.longitude,
            t0() + Duration::seconds(secs),
        )
    }

    #[test]
    fn test_initial_state_is_outside() {
        let state = MembershipState::for_regions(&[region_a()]);
        assert!(!state.is_inside("A"));
        assert_eq!(state.get("A").last_transition_at, None);
        assert!(!MembershipState::new().is_inside("unknown"));
    }

    #[test]
    fn test_first_inside_sample_emits_enter() {
        let regions = vec![region_a()];
        let mut state = MembershipState::for_regions(&regions);

        let events = evaluate(&mut state, &regions, &sample_at(regions[0].center, 0));

        assert_eq!(events, vec![TransitionEvent::enter("A", t0())]);
        assert!(state.is_inside("A"));
        assert_eq!(state.get("A").last_transition_at, Some(t0()));
    }

    #[test]
    fn test_outside_sample_from_initial_state_is_silent() {
        let regions = vec![region_a()];
        let mut state = MembershipState::for_regions(&regions);
        let far = offset_north(regions[0].center, 1.0);

        let events = evaluate(&mut state, &regions, &sample_at(far, 0));

        assert!(events.is_empty());
        assert_eq!(state.get("A"), RegionMembership::default());
    }

    #[test]
    fn test_inside_outside_inside_sequence() {
        let regions = vec![region_a()];
        let mut state = MembershipState::for_regions(&regions);
        let center = regions[0].center;
        let far = offset_north(center, 1.0);

        let mut events = Vec::new();
        events.extend(evaluate(&mut state, &regions, &sample_at(center, 0)));
        events.extend(evaluate(&mut state, &regions, &sample_at(far, 10)));
        events.extend(evaluate(&mut state, &regions, &sample_at(center, 20)));

        let kinds: Vec<_> = events.iter().map(|e| (e.region_id.as_str(), e.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("A", TransitionKind::Enter),
                ("A", TransitionKind::Exit),
                ("A", TransitionKind::Enter),
            ]
        );
        assert_eq!(
            state.get("A").last_transition_at,
            Some(t0() + Duration::seconds(20))
        );
    }

    #[test]
    fn test_replaying_sample_is_noop() {
        let regions = vec![region_a()];
        let mut state = MembershipState::for_regions(&regions);
        let sample = sample_at(regions[0].center, 0);

        assert_eq!(evaluate(&mut state, &regions, &sample).len(), 1);
        assert!(evaluate(&mut state, &regions, &sample).is_empty());
        assert!(evaluate(&mut state, &regions, &sample).is_empty());
    }

    #[test]
    fn test_staying_inside_keeps_transition_time() {
        let regions = vec![region_a()];
        let mut state = MembershipState::for_regions(&regions);
        let center = regions[0].center;
        let nearby = offset_north(center, 0.05);

        evaluate(&mut state, &regions, &sample_at(center, 0));
        let events = evaluate(&mut state, &regions, &sample_at(nearby, 30));

        assert!(events.is_empty());
        assert_eq!(state.get("A").last_transition_at, Some(t0()));
    }

    #[test]
    fn test_regions_are_independent() {
        let a = region_a();
        let b = Region::new("B", offset_north(a.center, 0.15), 100.0);
        let regions = vec![a.clone(), b.clone()];
        let mut state = MembershipState::for_regions(&regions);

        // Midway point lies in both circles
        let both = offset_north(a.center, 0.075);
        let events = evaluate(&mut state, &regions, &sample_at(both, 0));
        assert_eq!(events.len(), 2);
        assert_eq!(state.inside_regions(), vec!["A", "B"]);

        // Move to B's center: exit A only
        let events = evaluate(&mut state, &regions, &sample_at(b.center, 10));
        assert_eq!(events, vec![TransitionEvent::exit("A", t0() + Duration::seconds(10))]);
        assert_eq!(state.inside_regions(), vec!["B"]);
    }

    #[test]
    fn test_unknown_region_is_tracked_on_demand() {
        let regions = vec![region_a()];
        let mut state = MembershipState::new();

        let events = evaluate(&mut state, &regions, &sample_at(regions[0].center, 0));

        assert_eq!(events.len(), 1);
        assert!(state.is_inside("A"));
    }
}
