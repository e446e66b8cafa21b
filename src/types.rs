use once_cell::sync::Lazy;
use std::{collections::HashMap, fmt::Display};
use strsim::jaro_winkler;

use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum)]
pub enum ExerciseType {
    Polyarticulaire,
    #[default]
    Isolation,
    Cardio,
    Isometrique,
    Etirement,
}

impl ExerciseType {
    pub const ALL: [ExerciseType; 5] = [
        Self::Polyarticulaire,
        Self::Isolation,
        Self::Cardio,
        Self::Isometrique,
        Self::Etirement,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Polyarticulaire => "Polyarticulaire",
            Self::Isolation => "Isolation",
            Self::Cardio => "Cardio",
            Self::Isometrique => "Isométrique",
            Self::Etirement => "Étirement",
        }
    }

    /// Single-letter storage code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Polyarticulaire => "P",
            Self::Isolation => "I",
            Self::Cardio => "C",
            Self::Isometrique => "S",
            Self::Etirement => "E",
        }
    }

    /// Unknown labels are treated as isolation work.
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(label.trim()))
            .unwrap_or_default()
    }

    /// Unknown codes are treated as isolation work.
    pub fn from_code(code: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .unwrap_or_default()
    }

    /// Whether a load/reps pair describes a strength effort worth a 1RM.
    pub fn supports_1rm(self) -> bool {
        !matches!(self, Self::Cardio | Self::Isometrique | Self::Etirement)
    }

    /// Reps hold a duration rather than a count.
    pub fn is_hold(self) -> bool {
        matches!(self, Self::Isometrique | Self::Etirement)
    }
}

impl Display for ExerciseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for ExerciseType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ExerciseType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|s| Self::from_label(&s)).unwrap_or_default())
    }
}

/// Muscle groups known to the storage code table, with their codes.
pub const MUSCLES: [(&str, &str); 16] = [
    ("Pectoraux", "PE"),
    ("Dos", "DO"),
    ("Épaules", "EP"),
    ("Biceps", "BI"),
    ("Triceps", "TR"),
    ("Avant-bras", "AV"),
    ("Abdominaux", "AB"),
    ("Lombaires", "LO"),
    ("Trapèzes", "TP"),
    ("Quadriceps", "QU"),
    ("Ischio-jambiers", "IJ"),
    ("Fessiers", "FE"),
    ("Mollets", "MO"),
    ("Adducteurs", "AD"),
    ("Cardio", "C"),
    ("Corps entier", "CE"),
];

static MUSCLE_TO_CODE: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| MUSCLES.iter().copied().collect());

static CODE_TO_MUSCLE: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| MUSCLES.iter().map(|(m, c)| (*c, *m)).collect());

/// Storage code for a muscle name; names outside the table are stored raw.
pub fn muscle_code(muscle: &str) -> String {
    MUSCLE_TO_CODE
        .get(muscle)
        .map(|c| c.to_string())
        .unwrap_or_else(|| muscle.to_string())
}

/// Muscle name for a storage code; unknown codes are returned as stored.
pub fn muscle_from_code(code: &str) -> String {
    CODE_TO_MUSCLE
        .get(code)
        .map(|m| m.to_string())
        .unwrap_or_else(|| code.to_string())
}

/// Returns the canonical muscle name, matched case-insensitively.
pub fn canonical_muscle<S: AsRef<str>>(m: S) -> Option<&'static str> {
    let raw = m.as_ref().trim();
    MUSCLES
        .iter()
        .map(|(name, _)| *name)
        .find(|name| name.to_lowercase() == raw.to_lowercase())
}

/// Return the closest known muscle for `input`
/// if similarity ≥ 0.80 *and* clearly better than the runner-up.
pub fn best_muscle_suggestion(input: &str) -> Option<&'static str> {
    let inp = input.trim().to_lowercase();
    if inp.is_empty() {
        return None;
    }

    let mut scores: Vec<(&'static str, f64)> = MUSCLES
        .iter()
        .map(|(m, _)| (*m, jaro_winkler(&inp, &m.to_lowercase())))
        .collect();

    // Highest score first.
    scores.sort_by(|a, b| b.1.total_cmp(&a.1));

    let (best_muscle, best_score) = scores[0];
    let second_score = scores.get(1).map(|(_, s)| *s).unwrap_or(0.0);

    const MIN_SCORE: f64 = 0.80;
    const GAP: f64 = 0.02;

    if best_score >= MIN_SCORE && best_score - second_score >= GAP {
        Some(best_muscle)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFmt {
    Text,
    Json,
}

/// Prints `value` as JSON or hands over to the text renderer.
pub fn emit<T: Serialize>(fmt: OutputFmt, value: &T, text: impl FnOnce()) {
    match fmt {
        OutputFmt::Json => match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{s}"),
            Err(e) => tracing::error!(error = %e, "could not serialize output"),
        },
        OutputFmt::Text => text(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_codes_round_trip() {
        for t in ExerciseType::ALL {
            assert_eq!(ExerciseType::from_code(t.code()), t);
            assert_eq!(ExerciseType::from_label(t.label()), t);
        }
    }

    #[test]
    fn unknown_type_falls_back_to_isolation() {
        assert_eq!(ExerciseType::from_code("Z"), ExerciseType::Isolation);
        assert_eq!(ExerciseType::from_label("Yoga"), ExerciseType::Isolation);
    }

    #[test]
    fn type_serde_uses_labels() {
        let json = serde_json::to_string(&ExerciseType::Isometrique).unwrap();
        assert_eq!(json, "\"Isométrique\"");
        let back: ExerciseType = serde_json::from_str("\"Cardio\"").unwrap();
        assert_eq!(back, ExerciseType::Cardio);
        let null: ExerciseType = serde_json::from_str("null").unwrap();
        assert_eq!(null, ExerciseType::Isolation);
    }

    #[test]
    fn muscle_codes() {
        assert_eq!(muscle_code("Pectoraux"), "PE");
        assert_eq!(muscle_from_code("PE"), "Pectoraux");
        assert_eq!(muscle_code("Cou"), "Cou");
        assert_eq!(muscle_from_code("Cou"), "Cou");
    }

    #[test]
    fn muscle_lookup() {
        assert_eq!(canonical_muscle("pectoraux"), Some("Pectoraux"));
        assert_eq!(canonical_muscle("ÉPAULES"), Some("Épaules"));
        assert_eq!(canonical_muscle("neck"), None);
        assert_eq!(best_muscle_suggestion("quadricep"), Some("Quadriceps"));
        assert_eq!(best_muscle_suggestion(""), None);
    }
}
