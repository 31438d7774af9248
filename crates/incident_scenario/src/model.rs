//! Typed scenario model.
//!
//! A [`Scenario`] keeps its `road_rules` and zone limits as the raw JSON
//! values they were loaded from. Numeric coercion happens in
//! [`RuleSet::from_road_rules`] and [`SpeedZone::limit`], so that a bad value
//! is reported as a configuration error at the point the rules are actually
//! needed.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys every `road_rules` mapping must carry.
pub const REQUIRED_RULES: [&str; 3] = ["max_speed", "min_follow_distance", "stop_sign_wait"];

/// A driving scenario: road rules plus optional speed zones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Human-readable scenario name.
    #[serde(default)]
    pub name: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Raw road-rule mapping (`max_speed`, `min_follow_distance`, `stop_sign_wait`).
    pub road_rules: Map<String, Value>,
    /// Speed zones. Every zone caps the speed limit regardless of its mile range.
    #[serde(default)]
    pub speed_zones: Vec<SpeedZone>,
}

/// A speed zone declared by a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedZone {
    /// First mile marker of the zone.
    #[serde(default)]
    pub start_mile: f64,
    /// Last mile marker of the zone.
    #[serde(default)]
    pub end_mile: f64,
    /// Raw speed limit inside the zone (mph), a number or numeric string.
    pub speed_limit: Value,
}

/// Numeric road-rule thresholds for one engine run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Global speed limit (mph).
    pub max_speed: f64,
    /// Minimum following distance (meters).
    pub min_follow_distance: f64,
    /// Required wait at a stop sign (seconds).
    pub stop_sign_wait: f64,
}

impl Scenario {
    /// Creates a scenario from a raw road-rule mapping.
    #[must_use]
    pub const fn new(road_rules: Map<String, Value>) -> Self {
        Self {
            name: None,
            description: None,
            road_rules,
            speed_zones: Vec::new(),
        }
    }

    /// Creates a scenario whose road rules mirror the given rule set.
    #[must_use]
    pub fn from_rule_set(rules: &RuleSet) -> Self {
        let mut road_rules = Map::new();
        road_rules.insert("max_speed".to_string(), Value::from(rules.max_speed));
        road_rules.insert(
            "min_follow_distance".to_string(),
            Value::from(rules.min_follow_distance),
        );
        road_rules.insert(
            "stop_sign_wait".to_string(),
            Value::from(rules.stop_sign_wait),
        );
        Self::new(road_rules)
    }

    /// Sets the scenario name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the scenario description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a speed zone.
    #[must_use]
    pub fn with_speed_zone(mut self, zone: SpeedZone) -> Self {
        self.speed_zones.push(zone);
        self
    }

    /// Resolves the raw road rules into numeric thresholds.
    ///
    /// # Errors
    ///
    /// Returns an error if a required rule is missing or not numeric.
    pub fn rule_set(&self) -> Result<RuleSet> {
        RuleSet::from_road_rules(&self.road_rules)
    }

    /// Returns the display name, falling back to `"Unnamed"`.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unnamed")
    }
}

impl SpeedZone {
    /// Creates a new speed zone.
    #[must_use]
    pub fn new(start_mile: f64, end_mile: f64, speed_limit: f64) -> Self {
        Self {
            start_mile,
            end_mile,
            speed_limit: Value::from(speed_limit),
        }
    }

    /// Resolves the zone's speed limit, coercing numeric strings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if the limit is not numeric.
    pub fn limit(&self) -> Result<f64> {
        coerce_number("speed_zones.speed_limit", &self.speed_limit)
    }
}

impl RuleSet {
    /// Creates a rule set from explicit thresholds.
    #[must_use]
    pub const fn new(max_speed: f64, min_follow_distance: f64, stop_sign_wait: f64) -> Self {
        Self {
            max_speed,
            min_follow_distance,
            stop_sign_wait,
        }
    }

    /// Resolves a raw `road_rules` mapping.
    ///
    /// Numbers are taken as-is; strings are accepted when they parse as a
    /// float (`"30"`, `" 2.5 "`). Anything else is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] for an absent key and
    /// [`Error::InvalidValue`] for a non-numeric one.
    pub fn from_road_rules(road_rules: &Map<String, Value>) -> Result<Self> {
        let rule = |key: &str| -> Result<f64> {
            let value = road_rules
                .get(key)
                .ok_or_else(|| Error::MissingField(format!("road_rules.{key}")))?;
            coerce_number(key, value)
        };

        Ok(Self {
            max_speed: rule("max_speed")?,
            min_follow_distance: rule("min_follow_distance")?,
            stop_sign_wait: rule("stop_sign_wait")?,
        })
    }

    /// Returns the effective speed limit: the global limit lowered by every zone.
    ///
    /// Zones are folded in unconditionally; their mile ranges are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if any zone limit is not numeric.
    pub fn effective_speed_limit(&self, zones: &[SpeedZone]) -> Result<f64> {
        zones
            .iter()
            .try_fold(self.max_speed, |limit, zone| Ok(limit.min(zone.limit()?)))
    }
}

fn coerce_number(field: &str, value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| Error::invalid_value(field, format!("{n} is out of range"))),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::invalid_value(field, format!("'{s}' is not a number"))),
        other => Err(Error::invalid_value(
            field,
            format!("expected a number, found {other}"),
        )),
    }
}
