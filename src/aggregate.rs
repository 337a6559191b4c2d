use std::collections::{BTreeMap, BTreeSet};

use crate::error::DataError;
use crate::models::{normalize_student, CoachAggregate, EventTag, Roster, SessionRecord};

pub fn qualifies(session: &SessionRecord, roster: &Roster, event: Option<&EventTag>) -> bool {
    roster.contains(&session.student)
        && event.map_or(true, |event| event.matches(&session.drill_type))
}

/// Every session is checked before grouping, so one bad record fails the run.
pub fn aggregate_sessions(
    sessions: &[SessionRecord],
    roster: &Roster,
    event: Option<&EventTag>,
    min_sessions: usize,
) -> Result<Vec<CoachAggregate>, DataError> {
    for (idx, session) in sessions.iter().enumerate() {
        session.check(idx + 1)?;
    }

    let mut by_coach: BTreeMap<&str, CoachAggregate> = BTreeMap::new();
    let mut qualifying = 0usize;

    for session in sessions.iter().filter(|s| qualifies(s, roster, event)) {
        qualifying += 1;
        let entry = by_coach
            .entry(session.coach.as_str())
            .or_insert_with(|| CoachAggregate {
                coach: session.coach.clone(),
                sessions: 0,
                students_covered: BTreeSet::new(),
                total_minutes: 0.0,
                most_recent_date: session.date,
            });

        entry.sessions += 1;
        entry.students_covered.insert(normalize_student(&session.student));
        entry.total_minutes += session.minutes;
        entry.most_recent_date = entry.most_recent_date.max(session.date);
    }

    let grouped = by_coach.len();
    let aggregates: Vec<CoachAggregate> = by_coach
        .into_values()
        .filter(|agg| agg.sessions >= min_sessions.max(1))
        .collect();

    tracing::debug!(
        sessions = sessions.len(),
        qualifying,
        coaches = grouped,
        kept = aggregates.len(),
        min_sessions,
        "aggregated sessions"
    );

    Ok(aggregates)
}
