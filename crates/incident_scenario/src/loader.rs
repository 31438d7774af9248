//! Scenario loading from JSON files.
//!
//! ```json
//! {
//!   "name": "School zone",
//!   "road_rules": { "max_speed": 35, "min_follow_distance": 5, "stop_sign_wait": 3 },
//!   "speed_zones": [ { "start_mile": 0.0, "end_mile": 1.0, "speed_limit": 25 } ]
//! }
//! ```

use crate::error::{Error, Result};
use crate::model::{Scenario, SpeedZone, REQUIRED_RULES};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

/// Raw scenario document, before required-field validation.
#[derive(Debug, Deserialize)]
struct RawScenario {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    road_rules: Option<Value>,
    #[serde(default)]
    speed_zones: Option<Vec<SpeedZone>>,
}

impl RawScenario {
    fn into_scenario(self) -> Result<Scenario> {
        let road_rules = match self.road_rules {
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(Error::Validation(format!(
                    "'road_rules' must be an object, found {other}"
                )))
            }
            None => return Err(Error::MissingField("road_rules".to_string())),
        };

        for key in REQUIRED_RULES {
            if !road_rules.contains_key(key) {
                return Err(Error::MissingField(format!("road_rules.{key}")));
            }
        }

        Ok(Scenario {
            name: self.name,
            description: self.description,
            road_rules,
            speed_zones: self.speed_zones.unwrap_or_default(),
        })
    }
}

/// Loads and validates a scenario from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid JSON, or lacks
/// a required road rule.
pub fn load_scenario(path: impl AsRef<Path>) -> Result<Scenario> {
    let path = path.as_ref();
    info!("Loading scenario from {}", path.display());

    let content = std::fs::read_to_string(path)?;
    parse_scenario(&content)
}

/// Parses and validates a scenario from a JSON string.
///
/// Only the presence of the required road rules is checked here; their
/// numeric values are resolved later by [`Scenario::rule_set`].
///
/// # Errors
///
/// Returns an error if the JSON is invalid or a required field is missing.
///
/// # Example
///
/// ```rust
/// use incident_scenario::parse_scenario;
///
/// let scenario = parse_scenario(r#"{
///     "road_rules": {"max_speed": 30, "min_follow_distance": 5, "stop_sign_wait": 3}
/// }"#).unwrap();
/// assert!(scenario.speed_zones.is_empty());
/// ```
pub fn parse_scenario(json: &str) -> Result<Scenario> {
    let raw: RawScenario = serde_json::from_str(json)?;
    let scenario = raw.into_scenario()?;
    debug!(
        name = scenario.display_name(),
        zones = scenario.speed_zones.len(),
        "Parsed scenario"
    );
    Ok(scenario)
}
