use serde_json::{Map, Value};
use std::fmt;

use crate::error::{ApiErrorResponse, ParseError};

const OBSERVATIONS: &str = "current_observations";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperature {
    pub celsius: f64,
    pub fahrenheit: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wind {
    pub speed_kph: f64,
    pub direction_deg: f64,
}

/// The weather field groups a payload can carry, in dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Temperature,
    Condition,
    Wind,
    Pressure,
    Humidity,
}

impl FieldKind {
    pub const ALL: [FieldKind; 5] = [
        FieldKind::Temperature,
        FieldKind::Condition,
        FieldKind::Wind,
        FieldKind::Pressure,
        FieldKind::Humidity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Temperature => "temperature",
            FieldKind::Condition => "condition",
            FieldKind::Wind => "wind",
            FieldKind::Pressure => "pressure",
            FieldKind::Humidity => "humidity",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observation's worth of weather fields, each independently present or absent.
///
/// Two-part groups (temperature, wind) are only present when both parts are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions {
    pub temperature: Option<Temperature>,
    pub condition: Option<String>,
    pub wind: Option<Wind>,
    pub pressure_hpa: Option<f64>,
    pub humidity_percent: Option<u8>,
}

impl Conditions {
    /// Decodes a current-conditions payload.
    ///
    /// Fails only when the document itself is unusable: not JSON, an API error
    /// object, or no `current_observations` object. Unreadable fields inside the
    /// observations are reported as absent.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ParseError> {
        let root: Value = serde_json::from_slice(bytes)?;

        match root.get(OBSERVATIONS).and_then(Value::as_object) {
            Some(observations) => Ok(Self::from_observations(observations)),
            None => Err(api_error(root).unwrap_or(ParseError::MissingObservations)),
        }
    }

    fn from_observations(obs: &Map<String, Value>) -> Self {
        let number = |key: &str| obs.get(key).and_then(as_number);

        Self {
            temperature: number("temp_c")
                .zip(number("temp_f"))
                .map(|(celsius, fahrenheit)| Temperature {
                    celsius,
                    fahrenheit,
                }),
            condition: obs.get("weather").and_then(as_text),
            wind: number("wind_kph")
                .zip(number("wind_degrees"))
                .map(|(speed_kph, direction_deg)| Wind {
                    speed_kph,
                    direction_deg,
                }),
            pressure_hpa: number("pressure_mb"),
            humidity_percent: obs.get("relative_humidity").and_then(as_percent),
        }
    }

    pub fn has(&self, kind: FieldKind) -> bool {
        match kind {
            FieldKind::Temperature => self.temperature.is_some(),
            FieldKind::Condition => self.condition.is_some(),
            FieldKind::Wind => self.wind.is_some(),
            FieldKind::Pressure => self.pressure_hpa.is_some(),
            FieldKind::Humidity => self.humidity_percent.is_some(),
        }
    }

    pub fn is_empty(&self) -> bool {
        !FieldKind::ALL.iter().any(|k| self.has(*k))
    }
}

fn api_error(root: Value) -> Option<ParseError> {
    let (kind, description) = serde_json::from_value::<ApiErrorResponse>(root)
        .ok()?
        .summary()?;
    Some(ParseError::Api { kind, description })
}

// Numbers sometimes arrive quoted.
fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// Accepts 87, 87.5, "87", "87.5" and "87%"; fractions are truncated.
fn as_percent(value: &Value) -> Option<u8> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            s.strip_suffix('%').unwrap_or(s).trim_end().parse::<f64>().ok()
        }
        _ => None,
    }?;
    (n.is_finite() && (0.0..=100.0).contains(&n)).then_some(n as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn parse(value: Value) -> Result<Conditions, ParseError> {
        Conditions::from_slice(value.to_string().as_bytes())
    }

    fn full_observations() -> Value {
        json!({
            "current_observations": {
                "temp_c": 21.5,
                "temp_f": 70.7,
                "weather": "Partly Cloudy",
                "wind_kph": 12.0,
                "wind_degrees": 270,
                "pressure_mb": "1013",
                "relative_humidity": "87%"
            }
        })
    }

    #[test]
    fn full_payload_yields_every_field() {
        let c = parse(full_observations()).unwrap();
        assert_eq!(
            c.temperature,
            Some(Temperature {
                celsius: 21.5,
                fahrenheit: 70.7
            })
        );
        assert_eq!(c.condition.as_deref(), Some("Partly Cloudy"));
        assert_eq!(
            c.wind,
            Some(Wind {
                speed_kph: 12.0,
                direction_deg: 270.0
            })
        );
        assert_eq!(c.pressure_hpa, Some(1013.0));
        assert_eq!(c.humidity_percent, Some(87));
    }

    #[test]
    fn temperature_needs_both_scales() {
        let mut payload = full_observations();
        payload["current_observations"]
            .as_object_mut()
            .unwrap()
            .remove("temp_f");

        let c = parse(payload).unwrap();
        assert_eq!(c.temperature, None);
        assert!(c.has(FieldKind::Wind));
        assert!(c.has(FieldKind::Humidity));
    }

    #[test]
    fn wind_needs_speed_and_direction() {
        let mut payload = full_observations();
        payload["current_observations"]["wind_degrees"] = json!("variable");

        let c = parse(payload).unwrap();
        assert_eq!(c.wind, None);
        assert!(c.has(FieldKind::Temperature));
    }

    #[rstest]
    #[case(json!("87"), Some(87))]
    #[case(json!("87%"), Some(87))]
    #[case(json!(" 42 % "), Some(42))]
    #[case(json!(63), Some(63))]
    #[case(json!("87.5"), Some(87))]
    #[case(json!("87.0%"), Some(87))]
    #[case(json!(87.0), Some(87))]
    #[case(json!(87.4), Some(87))]
    #[case(json!("100"), Some(100))]
    #[case(json!("0%"), Some(0))]
    #[case(json!("N/A"), None)]
    #[case(json!(""), None)]
    #[case(json!("-5%"), None)]
    #[case(json!("140"), None)]
    #[case(json!(null), None)]
    fn humidity_coercion(#[case] raw: Value, #[case] expected: Option<u8>) {
        let c = parse(json!({ "current_observations": { "relative_humidity": raw } })).unwrap();
        assert_eq!(c.humidity_percent, expected);
    }

    #[rstest]
    #[case(json!(1009.5), Some(1009.5))]
    #[case(json!("1009.5"), Some(1009.5))]
    #[case(json!("--"), None)]
    #[case(json!("NaN"), None)]
    #[case(json!([1]), None)]
    fn pressure_coercion(#[case] raw: Value, #[case] expected: Option<f64>) {
        let c = parse(json!({ "current_observations": { "pressure_mb": raw } })).unwrap();
        assert_eq!(c.pressure_hpa, expected);
    }

    #[test]
    fn empty_observations_parse_to_empty_snapshot() {
        let c = parse(json!({ "current_observations": {} })).unwrap();
        assert!(c.is_empty());
    }

    #[test]
    fn non_json_is_malformed() {
        let err = Conditions::from_slice(b"<html>503</html>").unwrap_err();
        assert!(matches!(err, ParseError::MalformedJson(_)));
    }

    #[test]
    fn missing_container_is_reported() {
        let err = parse(json!({ "current_observation": { "temp_c": 1 } })).unwrap_err();
        assert!(matches!(err, ParseError::MissingObservations));

        let err = parse(json!({ "current_observations": "nope" })).unwrap_err();
        assert!(matches!(err, ParseError::MissingObservations));
    }

    #[test]
    fn in_band_api_error_is_reported() {
        let err = parse(json!({
            "response": {
                "error": {
                    "type": "querynotfound",
                    "description": "No cities match your search query"
                }
            }
        }))
        .unwrap_err();

        match err {
            ParseError::Api { kind, description } => {
                assert_eq!(kind, "querynotfound");
                assert!(description.starts_with("No cities"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
