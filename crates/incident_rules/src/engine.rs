//! Single-pass violation engine.

use crate::checks;
use crate::error::Result;
use crate::violation::Violation;
use incident_log::{Event, EventKind};
use incident_scenario::{RuleSet, Scenario};
use std::borrow::Borrow;
use tracing::{debug, info};

/// Tolerance applied to every threshold comparison.
pub const EPSILON: f64 = 1e-9;

/// Speed above which a stopped vehicle counts as moving again (mph).
pub const MOVING_SPEED_MPH: f64 = 1.0;

/// Evaluates a driving log against a scenario's road rules.
///
/// Rules are resolved once, up front; a missing or non-numeric rule fails
/// the whole run before any event is read.
///
/// # Errors
///
/// Returns [`Error::Config`](crate::Error::Config) if the road rules cannot be
/// resolved. Malformed event arguments are skipped, never reported.
///
/// # Example
///
/// ```rust
/// use incident_log::Event;
/// use incident_rules::detect_violations;
/// use incident_scenario::{RuleSet, Scenario};
///
/// let scenario = Scenario::from_rule_set(&RuleSet::new(30.0, 5.0, 3.0));
/// let events = vec![Event::speed(10.0, "35.0"), Event::follow_distance(5.0, "4.0")];
///
/// let violations = detect_violations(&scenario, events).unwrap();
/// assert_eq!(violations[0].time, "00:05.0");
/// assert_eq!(violations[1].time, "00:10.0");
/// ```
pub fn detect_violations<I, E>(scenario: &Scenario, events: I) -> Result<Vec<Violation>>
where
    I: IntoIterator<Item = E>,
    E: Borrow<Event>,
{
    Ok(RuleEngine::new(scenario)?.run(events))
}

/// Rule thresholds resolved for one scenario.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleEngine {
    rules: RuleSet,
    speed_limit: f64,
}

/// Per-run state. Created fresh for every [`RuleEngine::run`].
#[derive(Debug, Clone, Copy)]
struct RunState {
    last_follow_dist: f64,
    stop_sign_time: Option<f64>,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            last_follow_dist: f64::INFINITY,
            stop_sign_time: None,
        }
    }
}

impl RuleEngine {
    /// Resolves the scenario's road rules and speed zones.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a road rule or zone limit is missing
    /// or not numeric.
    pub fn new(scenario: &Scenario) -> Result<Self> {
        let rules = scenario.rule_set()?;
        let speed_limit = rules.effective_speed_limit(&scenario.speed_zones)?;
        Ok(Self::with_rules(rules, speed_limit))
    }

    /// Builds an engine from already resolved rules and speed limit.
    #[must_use]
    pub const fn with_rules(rules: RuleSet, speed_limit: f64) -> Self {
        Self { rules, speed_limit }
    }

    /// Returns the resolved rules.
    #[must_use]
    pub const fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Returns the effective speed limit (global limit lowered by every zone).
    #[must_use]
    pub const fn speed_limit(&self) -> f64 {
        self.speed_limit
    }

    /// Runs the rules over `events` in delivery order.
    ///
    /// The input is iterated exactly once. The result is sorted by formatted
    /// time; ties keep the order in which they were detected.
    pub fn run<I, E>(&self, events: I) -> Vec<Violation>
    where
        I: IntoIterator<Item = E>,
        E: Borrow<Event>,
    {
        let mut state = RunState::default();
        let mut violations = Vec::new();
        let mut seen = 0usize;

        for event in events {
            seen += 1;
            let event = event.borrow();
            let before = violations.len();
            self.apply(&mut state, event, &mut violations);
            for v in &violations[before..] {
                debug!(kind = %v.kind, time = %v.time, details = %v.details, "Violation");
            }
        }

        violations.sort_by(|a, b| a.time.cmp(&b.time));
        info!("Detected {} violations in {} events", violations.len(), seen);
        violations
    }

    fn apply(&self, state: &mut RunState, event: &Event, out: &mut Vec<Violation>) {
        match event.kind {
            EventKind::Speed => {
                let Some(speed) = parse_reading(event) else {
                    return;
                };
                out.extend(checks::check_speeding(event.time, speed, self.speed_limit));

                if let Some(stopped_at) = state.stop_sign_time {
                    if speed > MOVING_SPEED_MPH + EPSILON {
                        let waited = event.time - stopped_at;
                        out.extend(checks::check_rolling_stop(
                            event.time,
                            waited,
                            self.rules.stop_sign_wait,
                        ));
                        state.stop_sign_time = None;
                    }
                }
            }
            EventKind::FollowDistance => {
                let Some(distance) = parse_reading(event) else {
                    return;
                };
                state.last_follow_dist = distance;
                out.extend(checks::check_tailgating(
                    event.time,
                    distance,
                    self.rules.min_follow_distance,
                ));
            }
            EventKind::LaneChange => {
                out.extend(checks::check_lane_change(
                    event.time,
                    state.last_follow_dist,
                    self.rules.min_follow_distance,
                ));
            }
            EventKind::StopSignDetected => {
                // Overwrites any sign that has not been resolved yet.
                state.stop_sign_time = Some(event.time);
            }
        }
    }
}

fn parse_reading(event: &Event) -> Option<f64> {
    let value = event.numeric_argument();
    if value.is_none() {
        debug!(
            kind = %event.kind,
            time = event.time,
            argument = %event.argument,
            "Skipping event with non-numeric argument"
        );
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::violation::ViolationKind;
    use incident_scenario::SpeedZone;
    use std::cell::Cell;
    use proptest::prelude::*;
    use serde_json::json;

    fn scenario(max_speed: f64, min_follow: f64, stop_wait: f64) -> Scenario {
        Scenario::from_rule_set(&RuleSet::new(max_speed, min_follow, stop_wait))
    }

    fn default_scenario() -> Scenario {
        scenario(30.0, 5.0, 3.0)
    }

    fn kinds(violations: &[Violation]) -> Vec<ViolationKind> {
        violations.iter().map(|v| v.kind).collect()
    }

    #[test]
    fn speeding_over_global_limit() {
        let v = detect_violations(&default_scenario(), vec![Event::speed(0.0, "31.0")]).unwrap();
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].kind, ViolationKind::Speeding);
        assert_eq!(v[0].details, "31.0 mph in 30 mph zone");
    }

    #[test]
    fn speed_at_limit_is_compliant() {
        let v = detect_violations(&default_scenario(), vec![Event::speed(0.0, "30.0")]).unwrap();
        assert!(v.is_empty());
    }

    #[test]
    fn speeding_in_speed_zone() {
        let scenario = scenario(35.0, 5.0, 3.0).with_speed_zone(SpeedZone::new(0.0, 1.0, 25.0));
        let v = detect_violations(&scenario, vec![Event::speed(0.0, "26.0")]).unwrap();
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].details, "26.0 mph in 25 mph zone");
    }

    #[test]
    fn zones_apply_regardless_of_mile_range() {
        let scenario = scenario(35.0, 5.0, 3.0)
            .with_speed_zone(SpeedZone::new(100.0, 101.0, 20.0))
            .with_speed_zone(SpeedZone::new(0.0, 1.0, 50.0));
        let engine = RuleEngine::new(&scenario).unwrap();
        assert!((engine.speed_limit() - 20.0).abs() < f64::EPSILON);

        let v = engine.run(vec![Event::speed(0.0, "21.0")]);
        assert_eq!(v[0].details, "21.0 mph in 20 mph zone");
    }

    #[test]
    fn each_speeding_event_is_reported() {
        let events = vec![
            Event::speed(1.0, "31.0"),
            Event::speed(2.0, "45.3"),
            Event::speed(3.0, "29.0"),
            Event::speed(4.0, "30.06"),
        ];
        let v = detect_violations(&default_scenario(), events).unwrap();
        let details: Vec<_> = v.iter().map(|v| v.details.as_str()).collect();
        assert_eq!(
            details,
            [
                "31.0 mph in 30 mph zone",
                "45.3 mph in 30 mph zone",
                "30.1 mph in 30 mph zone",
            ]
        );
        let times: Vec<_> = v.iter().map(|v| v.time.as_str()).collect();
        assert_eq!(times, ["00:01.0", "00:02.0", "00:04.0"]);
    }

    #[test]
    fn tailgating_detected() {
        let v = detect_violations(&default_scenario(), vec![Event::follow_distance(0.0, "4.9")])
            .unwrap();
        assert_eq!(kinds(&v), [ViolationKind::Tailgating]);
        assert_eq!(v[0].details, "4.9 m < 5.0 m");
    }

    #[test]
    fn follow_distance_at_minimum_is_compliant() {
        let events = vec![Event::follow_distance(0.0, "5.0"), Event::lane_change(1.0, "LEFT")];
        assert!(detect_violations(&default_scenario(), events).unwrap().is_empty());
    }

    #[test]
    fn rolling_stop_detected() {
        let events = vec![
            Event::stop_sign(0.0),
            Event::speed(1.0, "0.0"),
            Event::speed(2.0, "2.0"),
        ];
        let v = detect_violations(&default_scenario(), events).unwrap();
        assert_eq!(kinds(&v), [ViolationKind::RollingStop]);
        assert_eq!(v[0].details, "Stopped 2.0s; required 3.0s");
        assert_eq!(v[0].time, "00:02.0");
    }

    #[test]
    fn full_stop_is_compliant() {
        let events = vec![
            Event::stop_sign(0.0),
            Event::speed(1.0, "0.0"),
            Event::speed(2.0, "0.0"),
            Event::speed(3.0, "0.0"),
            Event::speed(4.0, "2.0"),
        ];
        assert!(detect_violations(&default_scenario(), events).unwrap().is_empty());
    }

    #[test]
    fn waiting_exactly_the_required_time_is_compliant() {
        let events = vec![Event::stop_sign(10.0), Event::speed(13.0, "5.0")];
        assert!(detect_violations(&default_scenario(), events).unwrap().is_empty());
    }

    #[test]
    fn creeping_at_one_mph_does_not_resolve_the_stop() {
        let events = vec![
            Event::stop_sign(0.0),
            Event::speed(0.5, "1.0"),
            Event::speed(1.5, "1.5"),
        ];
        let v = detect_violations(&default_scenario(), events).unwrap();
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].details, "Stopped 1.5s; required 3.0s");
    }

    #[test]
    fn stop_sign_resolves_on_first_acceleration() {
        let events = vec![
            Event::stop_sign(0.0),
            Event::speed(1.0, "5.0"),
            Event::speed(1.5, "0.0"),
            Event::speed(2.0, "5.0"),
        ];
        let v = detect_violations(&default_scenario(), events).unwrap();
        assert_eq!(kinds(&v), [ViolationKind::RollingStop]);
    }

    #[test]
    fn second_stop_sign_overwrites_pending_one() {
        let events = vec![
            Event::stop_sign(0.0),
            Event::stop_sign(2.5),
            Event::speed(4.0, "10.0"),
        ];
        let v = detect_violations(&default_scenario(), events).unwrap();
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].details, "Stopped 1.5s; required 3.0s");
    }

    #[test]
    fn speeding_and_rolling_stop_from_one_reading() {
        let events = vec![Event::stop_sign(0.0), Event::speed(1.0, "40.0")];
        let v = detect_violations(&default_scenario(), events).unwrap();
        assert_eq!(
            kinds(&v),
            [ViolationKind::Speeding, ViolationKind::RollingStop]
        );
    }

    #[test]
    fn unsafe_lane_change_after_close_follow() {
        let events = vec![Event::follow_distance(0.0, "4.9"), Event::lane_change(1.0, "LEFT")];
        let v = detect_violations(&default_scenario(), events).unwrap();
        assert_eq!(
            kinds(&v),
            [ViolationKind::Tailgating, ViolationKind::UnsafeLaneChange]
        );
        assert_eq!(v[1].details, "follow 4.9 m < 5.0 m");
    }

    #[test]
    fn lane_change_without_follow_reading_is_safe() {
        let events = vec![Event::lane_change(1.0, "RIGHT")];
        assert!(detect_violations(&default_scenario(), events).unwrap().is_empty());
    }

    #[test]
    fn lane_change_uses_latest_distance() {
        let events = vec![
            Event::follow_distance(0.0, "3.0"),
            Event::follow_distance(1.0, "8.0"),
            Event::lane_change(2.0, "LEFT"),
        ];
        let v = detect_violations(&default_scenario(), events).unwrap();
        assert_eq!(kinds(&v), [ViolationKind::Tailgating]);
    }

    #[test]
    fn out_of_order_events_are_sorted_by_time() {
        let events = vec![Event::speed(10.0, "35.0"), Event::follow_distance(5.0, "4.0")];
        let v = detect_violations(&default_scenario(), events).unwrap();
        assert_eq!(kinds(&v), [ViolationKind::Tailgating, ViolationKind::Speeding]);
        assert_eq!(v[0].time, "00:05.0");
        assert_eq!(v[1].time, "00:10.0");
    }

    #[test]
    fn malformed_readings_are_skipped() {
        let events = vec![
            Event::follow_distance(0.0, "4.0"),
            Event::follow_distance(1.0, "close"),
            Event::speed(2.0, "fast"),
            Event::lane_change(3.0, "LEFT"),
        ];
        let v = detect_violations(&default_scenario(), events).unwrap();
        // The bad distance must not replace the last good one.
        assert_eq!(
            kinds(&v),
            [ViolationKind::Tailgating, ViolationKind::UnsafeLaneChange]
        );
        assert_eq!(v[1].details, "follow 4.0 m < 5.0 m");
    }

    #[test]
    fn malformed_speed_does_not_resolve_stop_sign() {
        let events = vec![
            Event::stop_sign(0.0),
            Event::speed(1.0, "n/a"),
            Event::speed(5.0, "10.0"),
        ];
        assert!(detect_violations(&default_scenario(), events).unwrap().is_empty());
    }

    #[test]
    fn empty_log_yields_no_violations() {
        let events: Vec<Event> = Vec::new();
        assert!(detect_violations(&default_scenario(), events).unwrap().is_empty());
    }

    #[test]
    fn missing_rule_fails_before_processing() {
        let mut scenario = default_scenario();
        scenario.road_rules.remove("stop_sign_wait");
        let err = detect_violations(&scenario, vec![Event::speed(0.0, "99")]).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn non_numeric_rule_is_a_config_error() {
        let mut scenario = default_scenario();
        scenario
            .road_rules
            .insert("max_speed".to_string(), json!("thirty"));
        assert!(matches!(
            RuleEngine::new(&scenario),
            Err(crate::Error::Config(_))
        ));
    }

    #[test]
    fn numeric_string_rules_are_coerced() {
        let mut scenario = default_scenario();
        scenario.road_rules.insert("max_speed".to_string(), json!("25"));
        let v = detect_violations(&scenario, vec![Event::speed(0.0, "26")]).unwrap();
        assert_eq!(v[0].details, "26.0 mph in 25 mph zone");
    }

    #[test]
    fn string_zone_limit_is_coerced() {
        let mut scenario = scenario(35.0, 5.0, 3.0);
        scenario.speed_zones.push(SpeedZone {
            start_mile: 0.0,
            end_mile: 1.0,
            speed_limit: json!("25"),
        });
        let v = detect_violations(&scenario, vec![Event::speed(0.0, "26.0")]).unwrap();
        assert_eq!(v[0].details, "26.0 mph in 25 mph zone");
    }

    #[test]
    fn non_numeric_zone_limit_is_a_config_error() {
        let mut scenario = default_scenario();
        scenario.speed_zones.push(SpeedZone {
            start_mile: 0.0,
            end_mile: 1.0,
            speed_limit: json!(null),
        });
        let err = detect_violations(&scenario, vec![Event::speed(0.0, "99")]).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn lazy_event_stream_is_consumed_once() {
        let pulled = Cell::new(0);
        let events = (0..5u8)
            .map(|i| Event::speed(f64::from(i), "31.0"))
            .inspect(|_| pulled.set(pulled.get() + 1));

        let v = detect_violations(&default_scenario(), events).unwrap();
        assert_eq!(v.len(), 5);
        assert_eq!(pulled.get(), 5);
        assert_eq!(v[4].time, "00:04.0");
    }

    #[test]
    fn engine_accepts_borrowed_events() {
        let events = [Event::speed(0.0, "31.0")];
        let engine = RuleEngine::new(&default_scenario()).unwrap();
        assert_eq!(engine.run(&events).len(), 1);
        // State does not leak between runs.
        assert_eq!(engine.run(&events).len(), 1);
    }

    #[test]
    fn state_is_fresh_per_run() {
        let engine = RuleEngine::new(&default_scenario()).unwrap();
        assert_eq!(engine.run(vec![Event::follow_distance(0.0, "1.0")]).len(), 1);
        assert!(engine.run(vec![Event::lane_change(1.0, "LEFT")]).is_empty());
        assert!(engine.run(vec![Event::stop_sign(0.0)]).is_empty());
        assert!(engine.run(vec![Event::speed(0.5, "10.0")]).is_empty());
    }

    fn arb_event() -> impl Strategy<Value = Event> {
        let time = 0u32..50_000;
        prop_oneof![
            (time.clone(), 0u32..800).prop_map(|(t, s)| {
                Event::speed(f64::from(t) / 10.0, format!("{:.1}", f64::from(s) / 10.0))
            }),
            (time.clone(), 0u32..200).prop_map(|(t, d)| {
                Event::follow_distance(f64::from(t) / 10.0, format!("{:.1}", f64::from(d) / 10.0))
            }),
            time.clone()
                .prop_map(|t| Event::lane_change(f64::from(t) / 10.0, "LEFT")),
            time.prop_map(|t| Event::stop_sign(f64::from(t) / 10.0)),
        ]
    }

    proptest! {
        #[test]
        fn output_is_sorted_by_time(events in prop::collection::vec(arb_event(), 0..64)) {
            let v = detect_violations(&default_scenario(), events).unwrap();
            prop_assert!(v.windows(2).all(|w| w[0].time <= w[1].time));
        }

        #[test]
        fn speed_at_or_below_limit_never_speeds(limit in 1u32..120, below in 0u32..50) {
            let limit = f64::from(limit);
            let speed = (limit - f64::from(below)).max(0.0);
            let scenario = scenario(limit, 5.0, 3.0);
            let v = detect_violations(&scenario, vec![Event::speed(0.0, speed.to_string())]).unwrap();
            prop_assert!(v.is_empty());
        }

        #[test]
        fn follow_at_minimum_never_violates(min in 1u32..100) {
            let min = f64::from(min) / 10.0;
            let scenario = scenario(30.0, min, 3.0);
            let events = vec![
                Event::follow_distance(0.0, min.to_string()),
                Event::lane_change(1.0, "RIGHT"),
            ];
            prop_assert!(detect_violations(&scenario, events).unwrap().is_empty());
        }
    }
}
