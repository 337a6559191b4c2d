use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Sessions,
    Roster,
    Coaches,
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dataset::Sessions => "sessions",
            Dataset::Roster => "roster",
            Dataset::Coaches => "coaches",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("{dataset} is missing required columns: {}", .columns.join(", "))]
    MissingColumns {
        dataset: Dataset,
        columns: Vec<String>,
    },

    #[error("{dataset} row {row}: invalid {field} {value:?}: {reason}")]
    InvalidField {
        dataset: Dataset,
        row: usize,
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("coach {coach:?} has more than one profile")]
    DuplicateCoach { coach: String },

    #[error("failed to read {dataset}: {source}")]
    Read {
        dataset: Dataset,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("roster is empty; coverage cannot be computed")]
    EmptyRoster,

    #[error("half_life_days must be a positive number, got {0}")]
    InvalidHalfLife(f64),

    #[error("rating_scale_max must be a positive number, got {0}")]
    InvalidRatingScale(f64),

    #[error("weight {key:?} must be a non-negative number, got {value}")]
    InvalidWeight { key: &'static str, value: f64 },

    #[error("weights must be a JSON object of numbers: {0}")]
    MalformedWeights(String),
}

#[derive(Debug, Error)]
pub enum MatchError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = MatchError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_columns_lists_every_column() {
        let err = DataError::MissingColumns {
            dataset: Dataset::Sessions,
            columns: vec!["date".to_string(), "minutes".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "sessions is missing required columns: date, minutes"
        );
    }

    #[test]
    fn invalid_field_names_row_and_value() {
        let err = DataError::InvalidField {
            dataset: Dataset::Sessions,
            row: 4,
            field: "minutes",
            value: "-5".to_string(),
            reason: "must be non-negative",
        };
        assert_eq!(
            err.to_string(),
            "sessions row 4: invalid minutes \"-5\": must be non-negative"
        );
    }

    #[test]
    fn match_error_is_transparent() {
        let err: MatchError = ConfigError::EmptyRoster.into();
        assert_eq!(
            err.to_string(),
            "roster is empty; coverage cannot be computed"
        );
    }
}
