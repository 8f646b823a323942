use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_INTENSITY: u8 = 100;
pub const DEFAULT_INTENSITY: u8 = 50;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum InteractionType {
    #[serde(rename = "Rhythmic Pulse")]
    RhythmicPulse,
    #[serde(rename = "Wave Pattern")]
    WavePattern,
    #[serde(rename = "Random Sparkle")]
    RandomSparkle,
    #[serde(rename = "Concentric Circles")]
    ConcentricCircles,
    #[serde(rename = "Custom Sequence")]
    CustomSequence,
}

impl InteractionType {
    pub const ALL: [InteractionType; 5] = [
        InteractionType::RhythmicPulse,
        InteractionType::WavePattern,
        InteractionType::RandomSparkle,
        InteractionType::ConcentricCircles,
        InteractionType::CustomSequence,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionType::RhythmicPulse => "Rhythmic Pulse",
            InteractionType::WavePattern => "Wave Pattern",
            InteractionType::RandomSparkle => "Random Sparkle",
            InteractionType::ConcentricCircles => "Concentric Circles",
            InteractionType::CustomSequence => "Custom Sequence",
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionType {
    type Err = DraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DraftError::MissingInteractionType);
        }
        InteractionType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DraftError::UnknownInteractionType(s.to_string()))
    }
}

/// A stored pattern. The `id` is the suffix of its record key and is not part of the
/// record payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pattern {
    pub id: String,
    /// Opaque encrypted blob, never inspected here.
    pub data: String,
    /// Seconds since epoch.
    pub timestamp: i64,
    pub owner: String,
    pub interaction_type: InteractionType,
    pub intensity: u8,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DraftError {
    #[error("Please select an interaction type")]
    MissingInteractionType,

    #[error("Unknown interaction type '{0}'")]
    UnknownInteractionType(String),

    #[error("Intensity must be between 0 and 100, got {0}")]
    IntensityOutOfRange(u32),
}

/// Creation input as submitted from the form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternDraft {
    pub interaction_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_intensity_level")]
    pub intensity_level: u32,
}

fn default_intensity_level() -> u32 {
    DEFAULT_INTENSITY as u32
}

/// A draft whose fields have passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidDraft {
    pub interaction_type: InteractionType,
    pub description: String,
    pub intensity: u8,
}

#[cfg(test)]
impl PatternDraft {
    pub fn new(interaction_type: impl Into<String>, intensity_level: u32) -> Self {
        Self {
            interaction_type: interaction_type.into(),
            description: String::new(),
            intensity_level,
        }
    }
}

impl PatternDraft {
    pub fn validate(&self) -> Result<ValidDraft, DraftError> {
        let interaction_type: InteractionType = self.interaction_type.parse()?;
        let intensity = u8::try_from(self.intensity_level)
            .ok()
            .filter(|i| *i <= MAX_INTENSITY)
            .ok_or(DraftError::IntensityOutOfRange(self.intensity_level))?;
        Ok(ValidDraft {
            interaction_type,
            description: self.description.clone(),
            intensity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_draft() {
        let draft = PatternDraft::new("Wave Pattern", 42);
        let valid = draft.validate().unwrap();
        assert_eq!(valid.interaction_type, InteractionType::WavePattern);
        assert_eq!(valid.intensity, 42);
    }

    #[test]
    fn test_empty_interaction_type_rejected() {
        assert_eq!(
            PatternDraft::new("", 50).validate().unwrap_err(),
            DraftError::MissingInteractionType
        );
        assert_eq!(
            PatternDraft::new("   ", 50).validate().unwrap_err(),
            DraftError::MissingInteractionType
        );
    }

    #[test]
    fn test_unknown_interaction_type_rejected() {
        let err = PatternDraft::new("Strobe", 50).validate().unwrap_err();
        assert_eq!(err, DraftError::UnknownInteractionType("Strobe".into()));
    }

    #[test]
    fn test_intensity_bounds() {
        assert!(PatternDraft::new("Random Sparkle", 0).validate().is_ok());
        assert!(PatternDraft::new("Random Sparkle", 100).validate().is_ok());
        assert_eq!(
            PatternDraft::new("Random Sparkle", 101)
                .validate()
                .unwrap_err(),
            DraftError::IntensityOutOfRange(101)
        );
        assert!(PatternDraft::new("Random Sparkle", 70_000).validate().is_err());
    }

    #[test]
    fn test_draft_intensity_defaults_when_omitted() {
        let draft: PatternDraft =
            serde_json::from_str(r#"{"interaction_type": "Custom Sequence"}"#).unwrap();
        assert_eq!(draft.intensity_level, 50);
        assert!(draft.description.is_empty());
    }

    #[test]
    fn test_interaction_type_display_matches_wire_name() {
        for t in InteractionType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{t}\""));
        }
    }
}
