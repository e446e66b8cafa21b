use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Display;

use crate::types::ExerciseType;

/// Identifier of a library exercise. Older data stored numeric ids, newer
/// data may hold any string; both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ExerciseId(pub String);

impl ExerciseId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ExerciseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ExerciseId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ExerciseId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for ExerciseId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl Serialize for ExerciseId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.parse::<u64>() {
            Ok(n) if n.to_string() == self.0 => serializer.serialize_u64(n),
            _ => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for ExerciseId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        de::text(deserializer).map(ExerciseId)
    }
}

/// One logged (or planned) set. `weight`, `reps` and `rir` keep the text the
/// user typed; reps and rir hold durations for timed exercise types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRecord {
    #[serde(default, deserialize_with = "de::text")]
    pub weight: String,
    #[serde(default, deserialize_with = "de::text")]
    pub reps: String,
    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub rir: Option<String>,
    #[serde(default, deserialize_with = "de::flag")]
    pub done: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_warmup: bool,
    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "de::opt_timestamp", skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

impl SetRecord {
    pub fn new(weight: impl Into<String>, reps: impl Into<String>) -> Self {
        Self {
            weight: weight.into(),
            reps: reps.into(),
            ..Default::default()
        }
    }

    /// Completed working set: the only kind that feeds records and tonnage.
    pub fn counts(&self) -> bool {
        self.done && !self.is_warmup
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseInstance {
    #[serde(default)]
    pub exercise_id: ExerciseId,
    #[serde(default)]
    pub sets: Vec<SetRecord>,
    #[serde(default, deserialize_with = "de::text")]
    pub target_reps: String,
    #[serde(default, deserialize_with = "de::seconds")]
    pub rest: u32,
    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub target_rir: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub notes: String,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_bonus: bool,
}

impl ExerciseInstance {
    pub fn new(exercise_id: impl Into<ExerciseId>) -> Self {
        Self {
            exercise_id: exercise_id.into(),
            ..Default::default()
        }
    }
}

/// A training session. The id is the creation timestamp in milliseconds;
/// program and session names are copies, not references.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    #[serde(deserialize_with = "de::timestamp")]
    pub id: i64,
    #[serde(default, deserialize_with = "de::text")]
    pub program_name: String,
    #[serde(default, deserialize_with = "de::text")]
    pub session_name: String,
    #[serde(default, deserialize_with = "de::timestamp")]
    pub start_time: i64,
    #[serde(default, deserialize_with = "de::opt_timestamp", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub body_weight: Option<String>,
    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub fatigue: Option<String>,
    #[serde(default)]
    pub exercises: Vec<ExerciseInstance>,
}

impl WorkoutSession {
    pub fn duration_ms(&self) -> Option<i64> {
        self.end_time.map(|end| end - self.start_time)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechniqueTips {
    #[serde(default)]
    pub setup: Vec<String>,
    #[serde(default)]
    pub execution: Vec<String>,
    #[serde(default)]
    pub mistakes: Vec<String>,
}

impl TechniqueTips {
    pub fn is_empty(&self) -> bool {
        self.setup.is_empty() && self.execution.is_empty() && self.mistakes.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryExercise {
    pub id: ExerciseId,
    #[serde(default, deserialize_with = "de::text")]
    pub name: String,
    #[serde(default, deserialize_with = "de::text")]
    pub muscle: String,
    #[serde(default, deserialize_with = "de::text")]
    pub equipment: String,
    #[serde(rename = "type", default)]
    pub kind: ExerciseType,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_favorite: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tips: Option<TechniqueTips>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramExercise {
    pub exercise_id: ExerciseId,
    #[serde(default, deserialize_with = "de::seconds")]
    pub sets: u32,
    #[serde(default, deserialize_with = "de::text")]
    pub reps: String,
    #[serde(default, deserialize_with = "de::seconds")]
    pub rest: u32,
    #[serde(default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub target_rir: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramSession {
    #[serde(default, deserialize_with = "de::text")]
    pub name: String,
    #[serde(default)]
    pub exercises: Vec<ProgramExercise>,
}

/// A reusable template. Starting one of its sessions copies the values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    #[serde(deserialize_with = "de::text")]
    pub id: String,
    #[serde(default, deserialize_with = "de::text")]
    pub name: String,
    #[serde(default)]
    pub sessions: Vec<ProgramSession>,
}

/// Lenient field decoders. Persisted data went through several hands and
/// mixes numbers, strings and nulls for the same field.
pub(crate) mod de {
    use serde::de::{self, Deserializer, Visitor};
    use std::fmt;

    struct TextVisitor;

    impl<'de> Visitor<'de> for TextVisitor {
        type Value = Option<String>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a string, a number or null")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(crate::utils::format_number(v)))
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
            d.deserialize_any(TextVisitor)
        }
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(d.deserialize_any(TextVisitor)?.unwrap_or_default())
    }

    /// Empty strings and nulls both read as absent.
    pub fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(d.deserialize_any(TextVisitor)?.filter(|s| !s.is_empty()))
    }

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        struct FlagVisitor;

        impl<'de> Visitor<'de> for FlagVisitor {
            type Value = bool;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a boolean, 0/1 or null")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
                Ok(v)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
                Ok(v != 0)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
                Ok(v != 0)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
                Ok(matches!(v, "true" | "1"))
            }

            fn visit_none<E: de::Error>(self) -> Result<bool, E> {
                Ok(false)
            }

            fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
                Ok(false)
            }

            fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<bool, D::Error> {
                d.deserialize_any(FlagVisitor)
            }
        }

        d.deserialize_any(FlagVisitor)
    }

    /// Milliseconds since the epoch, from a number, a numeric string or an
    /// RFC 3339 date.
    pub fn opt_timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        let Some(raw) = d.deserialize_any(TextVisitor)? else {
            return Ok(None);
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        if let Ok(ms) = raw.parse::<f64>() {
            return Ok(Some(ms as i64));
        }
        chrono::DateTime::parse_from_rfc3339(raw)
            .map(|d| Some(d.timestamp_millis()))
            .map_err(|_| de::Error::custom(format!("invalid timestamp `{raw}`")))
    }

    pub fn timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        Ok(opt_timestamp(d)?.unwrap_or_default())
    }

    /// Non-negative whole number (rest seconds, set counts).
    pub fn seconds<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        let raw = text(d)?;
        let v = crate::utils::parse_number(&raw);
        Ok(if v > 0.0 { v.round() as u32 } else { 0 })
    }
}
