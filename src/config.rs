use chrono::{NaiveDate, Utc};
use serde_json::Value;

use crate::error::ConfigError;
use crate::models::{ComponentScores, EventTag};

pub const DEFAULT_HALF_LIFE_DAYS: f64 = 30.0;
pub const DEFAULT_MIN_SESSIONS: usize = 1;
pub const DEFAULT_RATING_SCALE_MAX: f64 = 5.0;

/// Applied as-is, never renormalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub recency: f64,
    pub volume: f64,
    pub coverage: f64,
    pub minutes: f64,
    pub specialty: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            recency: 0.4,
            volume: 0.3,
            coverage: 0.15,
            minutes: 0.1,
            specialty: 0.05,
        }
    }
}

impl Weights {
    pub const KEYS: [&'static str; 5] = ["recency", "volume", "coverage", "minutes", "specialty"];

    pub fn zero() -> Self {
        Self {
            recency: 0.0,
            volume: 0.0,
            coverage: 0.0,
            minutes: 0.0,
            specialty: 0.0,
        }
    }

    /// Missing keys are 0. Unrecognized keys are returned alongside.
    pub fn from_entries<'a, I>(entries: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut weights = Self::zero();
        let mut ignored = Vec::new();
        for (key, value) in entries {
            match key {
                "recency" => weights.recency = value,
                "volume" => weights.volume = value,
                "coverage" => weights.coverage = value,
                "minutes" => weights.minutes = value,
                "specialty" => weights.specialty = value,
                other => ignored.push(other.to_string()),
            }
        }
        (weights, ignored)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| ConfigError::MalformedWeights(e.to_string()))?;
        let Value::Object(map) = value else {
            return Err(ConfigError::MalformedWeights(
                "expected a JSON object".to_string(),
            ));
        };

        let mut entries = Vec::with_capacity(map.len());
        for (key, value) in &map {
            let number = value.as_f64().ok_or_else(|| {
                ConfigError::MalformedWeights(format!("{key:?} is not a number"))
            })?;
            entries.push((key.as_str(), number));
        }

        let (weights, ignored) = Self::from_entries(entries);
        for key in ignored {
            tracing::warn!(key = %key, "ignoring unknown weight key");
        }
        weights.validate()?;
        Ok(weights)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in Self::KEYS.into_iter().zip(self.values()) {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { key, value });
            }
        }
        Ok(())
    }

    pub fn combine(&self, scores: &ComponentScores) -> f64 {
        self.recency * scores.recency
            + self.volume * scores.volume
            + self.coverage * scores.coverage
            + self.minutes * scores.minutes
            + self.specialty * scores.specialty
    }

    fn values(&self) -> [f64; 5] {
        [
            self.recency,
            self.volume,
            self.coverage,
            self.minutes,
            self.specialty,
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    pub as_of: NaiveDate,
    pub half_life_days: f64,
    pub min_sessions: usize,
    pub event: Option<EventTag>,
    pub weights: Weights,
    pub rating_scale_max: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            as_of: Utc::now().date_naive(),
            half_life_days: DEFAULT_HALF_LIFE_DAYS,
            min_sessions: DEFAULT_MIN_SESSIONS,
            event: None,
            weights: Weights::default(),
            rating_scale_max: DEFAULT_RATING_SCALE_MAX,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.half_life_days.is_finite() || self.half_life_days <= 0.0 {
            return Err(ConfigError::InvalidHalfLife(self.half_life_days));
        }
        if !self.rating_scale_max.is_finite() || self.rating_scale_max <= 0.0 {
            return Err(ConfigError::InvalidRatingScale(self.rating_scale_max));
        }
        self.weights.validate()
    }
}
