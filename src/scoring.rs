use chrono::NaiveDate;

use crate::config::ScoringConfig;
use crate::error::ConfigError;
use crate::models::{
    CoachAggregate, CoachDirectory, CoachNote, CoachProfile, ComponentScores, EventTag,
    ScoredCoach,
};

const EVENT_MATCH_SHARE: f64 = 0.7;
const RATING_SHARE: f64 = 0.3;
const UNRATED: f64 = 0.5;
const RECENT_THRESHOLD: f64 = 0.8;
const MAJORITY_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub max_sessions: usize,
    pub max_minutes: f64,
    pub roster_size: usize,
}

impl Normalization {
    pub fn from_aggregates(aggregates: &[CoachAggregate], roster_size: usize) -> Self {
        Self {
            max_sessions: aggregates.iter().map(|a| a.sessions).max().unwrap_or(0),
            max_minutes: aggregates
                .iter()
                .map(|a| a.total_minutes)
                .fold(0.0, f64::max),
            roster_size,
        }
    }
}

pub fn recency_score(
    aggregate: &CoachAggregate,
    as_of: NaiveDate,
    half_life_days: f64,
) -> Result<f64, ConfigError> {
    if !half_life_days.is_finite() || half_life_days <= 0.0 {
        return Err(ConfigError::InvalidHalfLife(half_life_days));
    }
    let days_since = (as_of - aggregate.most_recent_date).num_days().max(0);
    Ok(0.5_f64.powf(days_since as f64 / half_life_days))
}

pub fn volume_score(aggregate: &CoachAggregate, norm: &Normalization) -> f64 {
    if norm.max_sessions == 0 {
        return 0.0;
    }
    aggregate.sessions as f64 / norm.max_sessions as f64
}

pub fn coverage_score(aggregate: &CoachAggregate, norm: &Normalization) -> Result<f64, ConfigError> {
    if norm.roster_size == 0 {
        return Err(ConfigError::EmptyRoster);
    }
    Ok(aggregate.students_covered.len() as f64 / norm.roster_size as f64)
}

pub fn minutes_score(aggregate: &CoachAggregate, norm: &Normalization) -> f64 {
    if norm.max_minutes <= 0.0 {
        return 0.0;
    }
    aggregate.total_minutes / norm.max_minutes
}

pub fn specialty_score(
    profile: Option<&CoachProfile>,
    event: Option<&EventTag>,
    rating_scale_max: f64,
) -> f64 {
    let event_match = match event {
        None => 1.0,
        Some(event) if profile.is_some_and(|p| p.has_specialty(event)) => 1.0,
        Some(_) => 0.0,
    };
    let rating = match profile.and_then(|p| p.rating) {
        Some(rating) => (rating / rating_scale_max).clamp(0.0, 1.0),
        None => UNRATED,
    };
    EVENT_MATCH_SHARE * event_match + RATING_SHARE * rating
}

pub fn note_for(
    aggregate: &CoachAggregate,
    scores: &ComponentScores,
    norm: &Normalization,
) -> Option<CoachNote> {
    let recent = scores.recency >= RECENT_THRESHOLD;
    let entire_group = scores.coverage >= 1.0;

    if entire_group && recent {
        Some(CoachNote::EntireGroupRecently)
    } else if scores.coverage >= MAJORITY_THRESHOLD && recent {
        Some(CoachNote::MajorityRecently)
    } else if entire_group {
        Some(CoachNote::EntireGroup)
    } else if aggregate.sessions == norm.max_sessions {
        Some(CoachNote::HighestVolume)
    } else {
        None
    }
}

pub fn component_scores(
    aggregate: &CoachAggregate,
    norm: &Normalization,
    coaches: &CoachDirectory,
    config: &ScoringConfig,
) -> Result<ComponentScores, ConfigError> {
    Ok(ComponentScores {
        recency: recency_score(aggregate, config.as_of, config.half_life_days)?,
        volume: volume_score(aggregate, norm),
        coverage: coverage_score(aggregate, norm)?,
        minutes: minutes_score(aggregate, norm),
        specialty: specialty_score(
            coaches.get(&aggregate.coach),
            config.event.as_ref(),
            config.rating_scale_max,
        ),
    })
}

pub fn score_aggregates(
    aggregates: Vec<CoachAggregate>,
    roster_size: usize,
    coaches: &CoachDirectory,
    config: &ScoringConfig,
) -> Result<Vec<ScoredCoach>, ConfigError> {
    let norm = Normalization::from_aggregates(&aggregates, roster_size);
    aggregates
        .into_iter()
        .map(|aggregate| {
            let scores = component_scores(&aggregate, &norm, coaches, config)?;
            Ok(ScoredCoach {
                combined_score: config.weights.combine(&scores),
                note: note_for(&aggregate, &scores, &norm),
                aggregate,
                scores,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    const EPS: f64 = 1e-9;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn aggregate(coach: &str, sessions: usize, students: &[&str], minutes: f64) -> CoachAggregate {
        CoachAggregate {
            coach: coach.to_string(),
            sessions,
            students_covered: students.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            total_minutes: minutes,
            most_recent_date: date(2024, 1, 15),
        }
    }

    fn norm(max_sessions: usize, max_minutes: f64, roster_size: usize) -> Normalization {
        Normalization {
            max_sessions,
            max_minutes,
            roster_size,
        }
    }

    #[test]
    fn recency_is_one_on_or_after_as_of() {
        let agg = aggregate("c", 1, &["A"], 10.0);
        assert_eq!(recency_score(&agg, date(2024, 1, 15), 30.0).unwrap(), 1.0);
        assert_eq!(recency_score(&agg, date(2024, 1, 1), 30.0).unwrap(), 1.0);
    }

    #[test]
    fn recency_halves_after_one_half_life() {
        let agg = aggregate("c", 1, &["A"], 10.0);
        let score = recency_score(&agg, date(2024, 2, 14), 30.0).unwrap();
        assert!((score - 0.5).abs() < EPS);
        let score = recency_score(&agg, date(2024, 3, 15), 30.0).unwrap();
        assert!((score - 0.25).abs() < EPS);
    }

    #[test]
    fn recency_rejects_non_positive_half_life() {
        let agg = aggregate("c", 1, &["A"], 10.0);
        assert_eq!(
            recency_score(&agg, date(2024, 1, 20), 0.0),
            Err(ConfigError::InvalidHalfLife(0.0))
        );
        assert!(recency_score(&agg, date(2024, 1, 20), -2.0).is_err());
    }

    #[test]
    fn volume_and_minutes_top_coach_scores_one() {
        let aggs = vec![
            aggregate("a", 4, &["A"], 120.0),
            aggregate("b", 2, &["A"], 30.0),
        ];
        let n = Normalization::from_aggregates(&aggs, 2);
        assert_eq!(n.max_sessions, 4);
        assert_eq!(volume_score(&aggs[0], &n), 1.0);
        assert_eq!(volume_score(&aggs[1], &n), 0.5);
        assert_eq!(minutes_score(&aggs[0], &n), 1.0);
        assert_eq!(minutes_score(&aggs[1], &n), 0.25);
    }

    #[test]
    fn zero_minutes_do_not_produce_nan() {
        let agg = aggregate("a", 1, &["A"], 0.0);
        assert_eq!(minutes_score(&agg, &norm(1, 0.0, 1)), 0.0);
    }

    #[test]
    fn coverage_is_fraction_of_roster() {
        let agg = aggregate("a", 3, &["A", "B"], 10.0);
        assert_eq!(coverage_score(&agg, &norm(3, 10.0, 4)).unwrap(), 0.5);
        assert_eq!(
            coverage_score(&agg, &norm(3, 10.0, 0)),
            Err(ConfigError::EmptyRoster)
        );
    }

    #[test]
    fn specialty_blends_event_match_and_rating() {
        let event = EventTag::parse("LD");
        let ld = CoachProfile::new("c", ["ld", "pf"], Some(5.0));
        let pf = CoachProfile::new("c", ["PF"], Some(2.5));
        let unrated = CoachProfile::new("c", ["LD"], None);
        let overrated = CoachProfile::new("c", ["LD"], Some(9.0));

        assert!((specialty_score(Some(&ld), event.as_ref(), 5.0) - 1.0).abs() < EPS);
        assert!((specialty_score(Some(&pf), event.as_ref(), 5.0) - 0.15).abs() < EPS);
        assert!((specialty_score(Some(&unrated), event.as_ref(), 5.0) - 0.85).abs() < EPS);
        assert!((specialty_score(Some(&overrated), event.as_ref(), 5.0) - 1.0).abs() < EPS);
    }

    #[test]
    fn specialty_without_event_or_profile() {
        let pf = CoachProfile::new("c", ["PF"], Some(2.5));
        assert!((specialty_score(Some(&pf), None, 5.0) - 0.85).abs() < EPS);
        assert!((specialty_score(None, None, 5.0) - 0.85).abs() < EPS);
        let event = EventTag::parse("LD");
        assert!((specialty_score(None, event.as_ref(), 5.0) - 0.15).abs() < EPS);
    }

    #[test]
    fn notes_follow_priority_order() {
        let agg = aggregate("a", 2, &["A"], 10.0);
        let n = norm(5, 10.0, 2);
        let scores = |coverage, recency| ComponentScores {
            coverage,
            recency,
            ..ComponentScores::default()
        };

        assert_eq!(
            note_for(&agg, &scores(1.0, 0.9), &n),
            Some(CoachNote::EntireGroupRecently)
        );
        assert_eq!(
            note_for(&agg, &scores(0.5, 0.8), &n),
            Some(CoachNote::MajorityRecently)
        );
        assert_eq!(
            note_for(&agg, &scores(1.0, 0.2), &n),
            Some(CoachNote::EntireGroup)
        );
        assert_eq!(note_for(&agg, &scores(0.4, 0.9), &n), None);
        assert_eq!(
            note_for(&agg, &scores(0.4, 0.9), &norm(2, 10.0, 2)),
            Some(CoachNote::HighestVolume)
        );
    }

    #[test]
    fn combined_score_matches_weighted_sum() {
        let aggs = vec![
            aggregate("a", 4, &["A", "B"], 120.0),
            aggregate("b", 1, &["A"], 30.0),
        ];
        let coaches =
            CoachDirectory::from_profiles([CoachProfile::new("a", ["LD"], Some(4.0))]).unwrap();
        let config = ScoringConfig {
            as_of: date(2024, 1, 15),
            ..ScoringConfig::default()
        };

        let scored = score_aggregates(aggs, 2, &coaches, &config).unwrap();
        for coach in &scored {
            let s = coach.scores;
            let w = config.weights;
            let expected = w.recency * s.recency
                + w.volume * s.volume
                + w.coverage * s.coverage
                + w.minutes * s.minutes
                + w.specialty * s.specialty;
            assert!((coach.combined_score - expected).abs() < EPS);
            for value in [s.recency, s.volume, s.coverage, s.minutes, s.specialty] {
                assert!((0.0..=1.0).contains(&value));
            }
        }
    }
}
