//! Compact storage representation.
//!
//! Entities are written with short keys, coded enums and without falsy
//! fields. Reading accepts that compact shape as well as the older
//! full-name shape, decided per object: an object carrying any full-name
//! key of its type is legacy, anything else is compact. Keys neither shape
//! knows are ignored.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::models::{
    ExerciseId, ExerciseInstance, LibraryExercise, Program, ProgramExercise, ProgramSession,
    SetRecord, TechniqueTips, WorkoutSession, de,
};
use crate::types::{ExerciseType, muscle_code, muscle_from_code};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed {kind}: {source}")]
    Malformed {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode {kind}: {source}")]
    Encode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// An entity with a compact persisted counterpart.
pub trait Codec: Clone + DeserializeOwned {
    const KIND: &'static str;
    /// Full-name keys that never occur in the compact shape.
    const LEGACY_KEYS: &'static [&'static str];
    type Packed: Serialize + DeserializeOwned;

    fn dehydrate(&self) -> Self::Packed;
    fn from_packed(packed: Self::Packed) -> Self;
}

/// Entity as persisted: serializes compact, deserializes either shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Stored<T>(pub T);

impl<T> Stored<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Codec> Serialize for Stored<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.dehydrate().serialize(serializer)
    }
}

impl<'de, T: Codec> Deserialize<'de> for Stored<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let decoded = if is_legacy::<T>(&raw) {
            T::deserialize(raw)
        } else {
            T::Packed::deserialize(raw).map(T::from_packed)
        };
        decoded.map(Stored).map_err(serde::de::Error::custom)
    }
}

fn is_legacy<T: Codec>(raw: &Value) -> bool {
    raw.as_object()
        .is_some_and(|obj| T::LEGACY_KEYS.iter().any(|k| obj.contains_key(*k)))
}

fn stored_vec<T: Clone>(items: &[T]) -> Vec<Stored<T>> {
    items.iter().cloned().map(Stored).collect()
}

fn unstored_vec<T>(items: Vec<Stored<T>>) -> Vec<T> {
    items.into_iter().map(Stored::into_inner).collect()
}

fn is_false(v: &bool) -> bool {
    !*v
}

fn is_zero(v: &u32) -> bool {
    *v == 0
}

fn is_zero_ts(v: &i64) -> bool {
    *v == 0
}

fn id_is_empty(id: &ExerciseId) -> bool {
    id.as_str().is_empty()
}

pub fn dehydrate<T: Codec>(entity: &T) -> Result<Value, CodecError> {
    serde_json::to_value(entity.dehydrate()).map_err(|source| CodecError::Encode {
        kind: T::KIND,
        source,
    })
}

pub fn hydrate<T: Codec>(raw: Value) -> Result<T, CodecError> {
    serde_json::from_value::<Stored<T>>(raw)
        .map(Stored::into_inner)
        .map_err(|source| CodecError::Malformed {
            kind: T::KIND,
            source,
        })
}

/// Encodes a whole collection as a JSON array.
pub fn dehydrate_list<T: Codec>(items: &[T]) -> Result<String, CodecError> {
    let packed: Vec<T::Packed> = items.iter().map(Codec::dehydrate).collect();
    serde_json::to_string(&packed).map_err(|source| CodecError::Encode {
        kind: T::KIND,
        source,
    })
}

/// Decodes a persisted JSON array. Never fails: unreadable text yields an
/// empty collection and entries of neither shape are skipped.
pub fn hydrate_list<T: Codec>(raw: &str) -> Vec<T> {
    let values: Vec<Value> = match serde_json::from_str(raw) {
        Ok(Value::Array(values)) => values,
        Ok(other) => {
            warn!(kind = T::KIND, found = %value_kind(&other), "expected a JSON array; treating as empty");
            return Vec::new();
        }
        Err(e) => {
            warn!(kind = T::KIND, error = %e, "unreadable collection; treating as empty");
            return Vec::new();
        }
    };

    values
        .into_iter()
        .enumerate()
        .filter_map(|(idx, v)| match hydrate::<T>(v) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(index = idx, error = %e, "skipping unreadable entry");
                None
            }
        })
        .collect()
}

fn value_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

//
// Sets
//

#[derive(Debug, Serialize, Deserialize)]
pub struct PackedSet {
    #[serde(rename = "w", default, deserialize_with = "de::text", skip_serializing_if = "String::is_empty")]
    pub weight: String,
    #[serde(rename = "r", default, deserialize_with = "de::text", skip_serializing_if = "String::is_empty")]
    pub reps: String,
    #[serde(rename = "i", default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub rir: Option<String>,
    #[serde(rename = "d", default, deserialize_with = "de::flag", skip_serializing_if = "is_false")]
    pub done: bool,
    #[serde(rename = "wu", default, deserialize_with = "de::flag", skip_serializing_if = "is_false")]
    pub is_warmup: bool,
    #[serde(rename = "n", default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "t", default, deserialize_with = "de::opt_timestamp", skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

impl Codec for SetRecord {
    const KIND: &'static str = "set";
    const LEGACY_KEYS: &'static [&'static str] = &["weight", "reps", "rir", "done", "isWarmup", "notes", "completedAt"];
    type Packed = PackedSet;

    fn dehydrate(&self) -> PackedSet {
        PackedSet {
            weight: self.weight.clone(),
            reps: self.reps.clone(),
            rir: self.rir.clone().filter(|s| !s.is_empty()),
            done: self.done,
            is_warmup: self.is_warmup,
            notes: self.notes.clone().filter(|s| !s.is_empty()),
            completed_at: self.completed_at,
        }
    }

    fn from_packed(p: PackedSet) -> Self {
        SetRecord {
            weight: p.weight,
            reps: p.reps,
            rir: p.rir,
            done: p.done,
            is_warmup: p.is_warmup,
            notes: p.notes,
            completed_at: p.completed_at,
        }
    }
}

//
// Exercise instances
//

#[derive(Debug, Serialize, Deserialize)]
pub struct PackedExercise {
    #[serde(rename = "e", default, skip_serializing_if = "id_is_empty")]
    pub exercise_id: ExerciseId,
    #[serde(rename = "s", default, skip_serializing_if = "Vec::is_empty")]
    pub sets: Vec<Stored<SetRecord>>,
    #[serde(rename = "tr", default, deserialize_with = "de::text", skip_serializing_if = "String::is_empty")]
    pub target_reps: String,
    #[serde(rename = "rs", default, deserialize_with = "de::seconds", skip_serializing_if = "is_zero")]
    pub rest: u32,
    #[serde(rename = "ti", default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub target_rir: Option<String>,
    #[serde(rename = "n", default, deserialize_with = "de::text", skip_serializing_if = "String::is_empty")]
    pub notes: String,
    #[serde(rename = "b", default, deserialize_with = "de::flag", skip_serializing_if = "is_false")]
    pub is_bonus: bool,
}

impl Codec for ExerciseInstance {
    const KIND: &'static str = "exercise";
    const LEGACY_KEYS: &'static [&'static str] = &["exerciseId", "sets", "targetReps", "rest", "targetRir", "notes", "isBonus"];
    type Packed = PackedExercise;

    fn dehydrate(&self) -> PackedExercise {
        PackedExercise {
            exercise_id: self.exercise_id.clone(),
            sets: stored_vec(&self.sets),
            target_reps: self.target_reps.clone(),
            rest: self.rest,
            target_rir: self.target_rir.clone().filter(|s| !s.is_empty()),
            notes: self.notes.clone(),
            is_bonus: self.is_bonus,
        }
    }

    fn from_packed(p: PackedExercise) -> Self {
        ExerciseInstance {
            exercise_id: p.exercise_id,
            sets: unstored_vec(p.sets),
            target_reps: p.target_reps,
            rest: p.rest,
            target_rir: p.target_rir,
            notes: p.notes,
            is_bonus: p.is_bonus,
        }
    }
}

//
// Sessions
//

#[derive(Debug, Serialize, Deserialize)]
pub struct PackedSession {
    #[serde(deserialize_with = "de::timestamp")]
    pub id: i64,
    #[serde(rename = "p", default, deserialize_with = "de::text", skip_serializing_if = "String::is_empty")]
    pub program_name: String,
    #[serde(rename = "sn", default, deserialize_with = "de::text", skip_serializing_if = "String::is_empty")]
    pub session_name: String,
    #[serde(rename = "st", default, deserialize_with = "de::timestamp", skip_serializing_if = "is_zero_ts")]
    pub start_time: i64,
    #[serde(rename = "et", default, deserialize_with = "de::opt_timestamp", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    #[serde(rename = "bw", default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub body_weight: Option<String>,
    #[serde(rename = "f", default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub fatigue: Option<String>,
    #[serde(rename = "x", default, skip_serializing_if = "Vec::is_empty")]
    pub exercises: Vec<Stored<ExerciseInstance>>,
}

impl Codec for WorkoutSession {
    const KIND: &'static str = "session";
    const LEGACY_KEYS: &'static [&'static str] = &["programName", "sessionName", "startTime", "endTime", "bodyWeight", "fatigue", "exercises"];
    type Packed = PackedSession;

    fn dehydrate(&self) -> PackedSession {
        PackedSession {
            id: self.id,
            program_name: self.program_name.clone(),
            session_name: self.session_name.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            body_weight: self.body_weight.clone().filter(|s| !s.is_empty()),
            fatigue: self.fatigue.clone().filter(|s| !s.is_empty()),
            exercises: stored_vec(&self.exercises),
        }
    }

    fn from_packed(p: PackedSession) -> Self {
        WorkoutSession {
            id: p.id,
            program_name: p.program_name,
            session_name: p.session_name,
            start_time: p.start_time,
            end_time: p.end_time,
            body_weight: p.body_weight,
            fatigue: p.fatigue,
            exercises: unstored_vec(p.exercises),
        }
    }
}

//
// Library
//

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PackedTips {
    #[serde(rename = "s", alias = "setup", default, skip_serializing_if = "Vec::is_empty")]
    pub setup: Vec<String>,
    #[serde(rename = "e", alias = "execution", default, skip_serializing_if = "Vec::is_empty")]
    pub execution: Vec<String>,
    #[serde(rename = "m", alias = "mistakes", default, skip_serializing_if = "Vec::is_empty")]
    pub mistakes: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PackedLibraryExercise {
    pub id: ExerciseId,
    #[serde(rename = "n", default, deserialize_with = "de::text", skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "m", default, deserialize_with = "de::text", skip_serializing_if = "String::is_empty")]
    pub muscle: String,
    #[serde(rename = "eq", default, deserialize_with = "de::text", skip_serializing_if = "String::is_empty")]
    pub equipment: String,
    #[serde(rename = "t", default, deserialize_with = "de::text")]
    pub kind: String,
    #[serde(rename = "fv", default, deserialize_with = "de::flag", skip_serializing_if = "is_false")]
    pub is_favorite: bool,
    #[serde(rename = "ar", default, deserialize_with = "de::flag", skip_serializing_if = "is_false")]
    pub is_archived: bool,
    #[serde(rename = "tp", default, skip_serializing_if = "Option::is_none")]
    pub tips: Option<PackedTips>,
}

impl Codec for LibraryExercise {
    const KIND: &'static str = "library exercise";
    const LEGACY_KEYS: &'static [&'static str] = &["name", "muscle", "equipment", "type", "isFavorite", "isArchived", "tips"];
    type Packed = PackedLibraryExercise;

    fn dehydrate(&self) -> PackedLibraryExercise {
        PackedLibraryExercise {
            id: self.id.clone(),
            name: self.name.clone(),
            muscle: muscle_code(&self.muscle),
            equipment: self.equipment.clone(),
            kind: self.kind.code().to_string(),
            is_favorite: self.is_favorite,
            is_archived: self.is_archived,
            tips: self
                .tips
                .as_ref()
                .filter(|t| !t.is_empty())
                .map(|t| PackedTips {
                    setup: t.setup.clone(),
                    execution: t.execution.clone(),
                    mistakes: t.mistakes.clone(),
                }),
        }
    }

    fn from_packed(p: PackedLibraryExercise) -> Self {
        LibraryExercise {
            id: p.id,
            name: p.name,
            muscle: muscle_from_code(&p.muscle),
            equipment: p.equipment,
            kind: ExerciseType::from_code(&p.kind),
            is_favorite: p.is_favorite,
            is_archived: p.is_archived,
            tips: p.tips.map(|t| TechniqueTips {
                setup: t.setup,
                execution: t.execution,
                mistakes: t.mistakes,
            }),
        }
    }
}

//
// Programs
//

#[derive(Debug, Serialize, Deserialize)]
pub struct PackedProgramExercise {
    #[serde(rename = "e", default, skip_serializing_if = "id_is_empty")]
    pub exercise_id: ExerciseId,
    #[serde(rename = "s", default, deserialize_with = "de::seconds", skip_serializing_if = "is_zero")]
    pub sets: u32,
    #[serde(rename = "r", default, deserialize_with = "de::text", skip_serializing_if = "String::is_empty")]
    pub reps: String,
    #[serde(rename = "rs", default, deserialize_with = "de::seconds", skip_serializing_if = "is_zero")]
    pub rest: u32,
    #[serde(rename = "ti", default, deserialize_with = "de::opt_text", skip_serializing_if = "Option::is_none")]
    pub target_rir: Option<String>,
}

impl Codec for ProgramExercise {
    const KIND: &'static str = "program exercise";
    const LEGACY_KEYS: &'static [&'static str] = &["exerciseId", "sets", "reps", "rest", "targetRir"];
    type Packed = PackedProgramExercise;

    fn dehydrate(&self) -> PackedProgramExercise {
        PackedProgramExercise {
            exercise_id: self.exercise_id.clone(),
            sets: self.sets,
            reps: self.reps.clone(),
            rest: self.rest,
            target_rir: self.target_rir.clone().filter(|s| !s.is_empty()),
        }
    }

    fn from_packed(p: PackedProgramExercise) -> Self {
        ProgramExercise {
            exercise_id: p.exercise_id,
            sets: p.sets,
            reps: p.reps,
            rest: p.rest,
            target_rir: p.target_rir,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PackedProgramSession {
    #[serde(rename = "n", default, deserialize_with = "de::text", skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "x", default, skip_serializing_if = "Vec::is_empty")]
    pub exercises: Vec<Stored<ProgramExercise>>,
}

impl Codec for ProgramSession {
    const KIND: &'static str = "program session";
    const LEGACY_KEYS: &'static [&'static str] = &["name", "exercises"];
    type Packed = PackedProgramSession;

    fn dehydrate(&self) -> PackedProgramSession {
        PackedProgramSession {
            name: self.name.clone(),
            exercises: stored_vec(&self.exercises),
        }
    }

    fn from_packed(p: PackedProgramSession) -> Self {
        ProgramSession {
            name: p.name,
            exercises: unstored_vec(p.exercises),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PackedProgram {
    #[serde(deserialize_with = "de::text")]
    pub id: String,
    #[serde(rename = "n", default, deserialize_with = "de::text", skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "s", default, skip_serializing_if = "Vec::is_empty")]
    pub sessions: Vec<Stored<ProgramSession>>,
}

impl Codec for Program {
    const KIND: &'static str = "program";
    const LEGACY_KEYS: &'static [&'static str] = &["name", "sessions"];
    type Packed = PackedProgram;

    fn dehydrate(&self) -> PackedProgram {
        PackedProgram {
            id: self.id.clone(),
            name: self.name.clone(),
            sessions: stored_vec(&self.sessions),
        }
    }

    fn from_packed(p: PackedProgram) -> Self {
        Program {
            id: p.id,
            name: p.name,
            sessions: unstored_vec(p.sessions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn full_session() -> WorkoutSession {
        WorkoutSession {
            id: 1_700_000_000_000,
            program_name: "Upper/Lower".into(),
            session_name: "Upper A".into(),
            start_time: 1_700_000_000_000,
            end_time: Some(1_700_004_200_000),
            body_weight: Some("81.4".into()),
            fatigue: Some("3".into()),
            exercises: vec![
                ExerciseInstance {
                    exercise_id: ExerciseId::from(4),
                    sets: vec![
                        SetRecord {
                            weight: "40".into(),
                            reps: "10".into(),
                            rir: None,
                            done: true,
                            is_warmup: true,
                            notes: None,
                            completed_at: Some(1_700_000_100_000),
                        },
                        SetRecord {
                            weight: "85".into(),
                            reps: "5".into(),
                            rir: Some("2".into()),
                            done: true,
                            is_warmup: false,
                            notes: Some("belt, \"tight\"".into()),
                            completed_at: Some(1_700_000_400_000),
                        },
                        SetRecord::new("85", "5"),
                    ],
                    target_reps: "5".into(),
                    rest: 180,
                    target_rir: Some("1".into()),
                    notes: "paused".into(),
                    is_bonus: false,
                },
                ExerciseInstance {
                    exercise_id: ExerciseId::from("custom-plank"),
                    sets: vec![SetRecord::new("", "01:30")],
                    is_bonus: true,
                    ..Default::default()
                },
            ],
        }
    }

    #[test]
    fn session_round_trip() {
        let session = full_session();
        let packed = dehydrate(&session).unwrap();
        let back: WorkoutSession = hydrate(packed).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn session_round_trip_without_optionals() {
        let session = WorkoutSession {
            id: 5,
            start_time: 5,
            exercises: vec![ExerciseInstance::new(1)],
            ..Default::default()
        };
        let back: WorkoutSession = hydrate(dehydrate(&session).unwrap()).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn dehydrated_form_is_compact() {
        let packed = dehydrate(&full_session()).unwrap();
        let set = &packed["x"][0]["s"][2];
        assert_eq!(set, &json!({"w": "85", "r": "5"}));
        assert_eq!(packed["x"][1]["e"], json!("custom-plank"));
        assert_eq!(packed["x"][1]["b"], json!(true));
        assert!(packed.get("exercises").is_none());
        assert_eq!(packed["x"][0]["s"][0]["wu"], json!(true));
    }

    #[test]
    fn legacy_session_hydrates() {
        let raw = json!({
            "id": 1690000000000u64,
            "programName": "PPL",
            "sessionName": "Pull",
            "startTime": "2023-07-22T04:26:40Z",
            "endTime": null,
            "bodyWeight": 80,
            "exercises": [{
                "exerciseId": 12,
                "targetReps": "8-10",
                "rest": 120,
                "notes": "",
                "sets": [
                    {"weight": "60", "reps": "10", "done": true, "completedAt": 1690000300000u64},
                    {"weight": 62.5, "reps": 8, "done": false, "isWarmup": false}
                ]
            }]
        });
        let s: WorkoutSession = hydrate(raw).unwrap();
        assert_eq!(s.id, 1_690_000_000_000);
        assert_eq!(s.start_time, 1_690_000_000_000);
        assert_eq!(s.end_time, None);
        assert_eq!(s.body_weight.as_deref(), Some("80"));
        assert_eq!(s.exercises[0].exercise_id, ExerciseId::from(12));
        assert_eq!(s.exercises[0].sets.len(), 2);
        assert_eq!(s.exercises[0].sets[0].completed_at, Some(1_690_000_300_000));
        assert_eq!(s.exercises[0].sets[1].weight, "62.5");
        assert!(!s.exercises[0].sets[1].done);
    }

    #[test]
    fn compact_and_legacy_mix_per_level() {
        let raw = json!({
            "id": 9,
            "x": [
                {"e": 1, "s": [{"w": "50", "r": "5", "d": true}]},
                {"exerciseId": 2, "sets": [{"weight": "20", "reps": "12", "done": true}]}
            ]
        });
        let s: WorkoutSession = hydrate(raw).unwrap();
        assert_eq!(s.exercises.len(), 2);
        assert!(s.exercises[0].sets[0].done);
        assert_eq!(s.exercises[1].exercise_id, ExerciseId::from(2));
        assert_eq!(s.exercises[1].sets[0].reps, "12");
    }

    #[test]
    fn library_codes_and_fallbacks() {
        let item = LibraryExercise {
            id: ExerciseId::from(7),
            name: "Gainage".into(),
            muscle: "Abdominaux".into(),
            equipment: "PC".into(),
            kind: ExerciseType::Isometrique,
            is_favorite: true,
            is_archived: false,
            tips: Some(TechniqueTips {
                setup: vec!["Coudes sous les épaules".into()],
                execution: vec![],
                mistakes: vec!["Bassin trop haut".into()],
            }),
        };
        let packed = dehydrate(&item).unwrap();
        assert_eq!(packed["m"], json!("AB"));
        assert_eq!(packed["t"], json!("S"));
        assert!(packed.get("ar").is_none());
        let back: LibraryExercise = hydrate(packed).unwrap();
        assert_eq!(back, item);

        let odd: LibraryExercise = hydrate(json!({"id": 8, "n": "Odd", "m": "XX", "t": "Q"})).unwrap();
        assert_eq!(odd.muscle, "XX");
        assert_eq!(odd.kind, ExerciseType::Isolation);
    }

    #[test]
    fn legacy_library_item() {
        let item: LibraryExercise = hydrate(json!({
            "id": 3, "name": "Squat", "muscle": "Quadriceps", "equipment": "BB",
            "type": "Polyarticulaire", "isFavorite": true
        }))
        .unwrap();
        assert_eq!(item.kind, ExerciseType::Polyarticulaire);
        assert_eq!(item.muscle, "Quadriceps");
        assert!(item.is_favorite);
    }

    #[test]
    fn program_round_trip() {
        let program = Program {
            id: "b1f0".into(),
            name: "5x5".into(),
            sessions: vec![ProgramSession {
                name: "A".into(),
                exercises: vec![ProgramExercise {
                    exercise_id: ExerciseId::from(1),
                    sets: 5,
                    reps: "5".into(),
                    rest: 180,
                    target_rir: None,
                }],
            }],
        };
        let back: Program = hydrate(dehydrate(&program).unwrap()).unwrap();
        assert_eq!(back, program);
    }

    #[test]
    fn list_hydration_is_tolerant() {
        let sessions: Vec<WorkoutSession> = hydrate_list("not json");
        assert!(sessions.is_empty());

        let sessions: Vec<WorkoutSession> = hydrate_list(r#"{"id": 1}"#);
        assert!(sessions.is_empty());

        let sessions: Vec<WorkoutSession> = hydrate_list(r#"[{"id": 1}, 42, {"id": 2, "p": "X"}]"#);
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[1].program_name, "X");
    }

    #[test]
    fn list_round_trip() {
        let text = dehydrate_list(&[full_session()]).unwrap();
        let back: Vec<WorkoutSession> = hydrate_list(&text);
        assert_eq!(back, vec![full_session()]);
    }

    #[test]
    fn compact_set_with_unknown_key_keeps_data() {
        let raw = json!({"w": "80", "r": "5", "d": true, "wu": true, "t": 1700000000000u64, "z": 1});
        let set: SetRecord = hydrate(raw).unwrap();
        assert_eq!(set.weight, "80");
        assert_eq!(set.reps, "5");
        assert!(set.done);
        assert!(set.is_warmup);
        assert_eq!(set.completed_at, Some(1_700_000_000_000));
    }

    #[test]
    fn compact_session_with_unknown_key_keeps_data() {
        let mut raw = dehydrate(&full_session()).unwrap();
        raw["v"] = json!(2);
        let back: WorkoutSession = hydrate(raw).unwrap();
        assert_eq!(back, full_session());
    }

    #[test]
    fn one_full_name_key_selects_legacy() {
        let set: SetRecord = hydrate(json!({"weight": "100", "w": "1"})).unwrap();
        assert_eq!(set.weight, "100");
        assert!(hydrate::<SetRecord>(json!(42)).is_err());
    }
}
