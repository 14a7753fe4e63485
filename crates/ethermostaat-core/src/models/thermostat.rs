use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A reading of the thermostat as returned by `GET /data`.
///
/// The portal names the target temperature `temperature1` and the measured
/// room temperature `temperature2`. Anything else in the payload is kept in
/// `extra` so callers can inspect it without a model change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermostatSnapshot {
    #[serde(rename = "temperature1", deserialize_with = "deserialize_temperature")]
    pub target_temperature: f64,
    #[serde(rename = "temperature2", deserialize_with = "deserialize_temperature")]
    pub measured_temperature: f64,
    #[serde(default, deserialize_with = "deserialize_string_or_number", skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ThermostatSnapshot {
    pub fn new(target_temperature: f64, measured_temperature: f64) -> Self {
        Self {
            target_temperature,
            measured_temperature,
            uid: None,
            extra: Map::new(),
        }
    }
}

// The portal is not consistent about numbers: temperatures show up as 19.5 or "19.5"
fn deserialize_temperature<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de;

    struct TemperatureVisitor;

    impl<'de> de::Visitor<'de> for TemperatureVisitor {
        type Value = f64;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a number or numeric string")
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
            Ok(v)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
            Ok(v as f64)
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(v as f64)
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            v.trim()
                .parse::<f64>()
                .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }

    deserializer.deserialize_any(TemperatureVisitor)
}

// Helper to deserialize string or number as Option<String>
pub(crate) fn deserialize_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de;

    struct StringOrNumberVisitor;

    impl<'de> de::Visitor<'de> for StringOrNumberVisitor {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string or number")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
            if v.is_empty() {
                Ok(None)
            } else {
                Ok(Some(v.to_string()))
            }
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(StringOrNumberVisitor)
}
