use crate::aggregate;
use crate::config::ScoringConfig;
use crate::error::{ConfigError, Result};
use crate::models::{
    CoachAggregate, CoachDirectory, RecommendationRow, Roster, ScoredCoach, SessionRecord,
};
use crate::report;
use crate::scoring;

#[derive(Debug, Clone, Copy)]
pub struct MatchInputs<'a> {
    pub sessions: &'a [SessionRecord],
    pub roster: &'a Roster,
    pub coaches: &'a CoachDirectory,
}

fn preflight(inputs: &MatchInputs<'_>, config: &ScoringConfig) -> Result<(), ConfigError> {
    config.validate()?;
    if inputs.roster.is_empty() {
        return Err(ConfigError::EmptyRoster);
    }
    Ok(())
}

pub fn aggregates(inputs: &MatchInputs<'_>, config: &ScoringConfig) -> Result<Vec<CoachAggregate>> {
    preflight(inputs, config)?;
    let aggregates = aggregate::aggregate_sessions(
        inputs.sessions,
        inputs.roster,
        config.event.as_ref(),
        config.min_sessions,
    )?;
    Ok(aggregates)
}

pub fn score_coaches(inputs: &MatchInputs<'_>, config: &ScoringConfig) -> Result<Vec<ScoredCoach>> {
    let aggregates = aggregates(inputs, config)?;
    let scored =
        scoring::score_aggregates(aggregates, inputs.roster.len(), inputs.coaches, config)?;
    tracing::debug!(
        coaches = scored.len(),
        profiles = inputs.coaches.len(),
        "scored coaches"
    );
    Ok(scored)
}

pub fn recommend(
    inputs: &MatchInputs<'_>,
    config: &ScoringConfig,
    tournament: &str,
) -> Result<Vec<RecommendationRow>> {
    let scored = score_coaches(inputs, config)?;
    Ok(report::build_rows(scored, tournament, config.event.as_ref()))
}
