use std::fmt::Write;
use std::io;

use crate::models::{EventTag, RecommendationRow, ScoredCoach};

pub const COLUMNS: [&str; 14] = [
    "coach",
    "tournament",
    "event",
    "sessions",
    "students_covered",
    "total_minutes",
    "recency_score",
    "volume_score",
    "coverage_score",
    "minutes_score",
    "specialty_score",
    "combined_score",
    "percent_of_group_covered",
    "notes",
];

/// Orders by combined score desc, sessions desc, then coach name asc.
pub fn rank(scored: &mut [ScoredCoach]) {
    scored.sort_by(|a, b| {
        b.combined_score
            .total_cmp(&a.combined_score)
            .then_with(|| b.aggregate.sessions.cmp(&a.aggregate.sessions))
            .then_with(|| a.aggregate.coach.cmp(&b.aggregate.coach))
    });
}

pub fn percent_covered(coverage_score: f64) -> f64 {
    (coverage_score * 1000.0).round() / 10.0
}

pub fn build_rows(
    mut scored: Vec<ScoredCoach>,
    tournament: &str,
    event: Option<&EventTag>,
) -> Vec<RecommendationRow> {
    rank(&mut scored);
    scored
        .into_iter()
        .map(|coach| RecommendationRow {
            tournament: tournament.to_string(),
            event: event.map(|e| e.label().to_string()),
            sessions: coach.aggregate.sessions,
            students_covered: coach.aggregate.students_covered.len(),
            total_minutes: coach.aggregate.total_minutes,
            recency_score: coach.scores.recency,
            volume_score: coach.scores.volume,
            coverage_score: coach.scores.coverage,
            minutes_score: coach.scores.minutes,
            specialty_score: coach.scores.specialty,
            combined_score: coach.combined_score,
            percent_of_group_covered: percent_covered(coach.scores.coverage),
            notes: coach.note.map(|n| n.to_string()).unwrap_or_default(),
            coach: coach.aggregate.coach,
        })
        .collect()
}

pub fn build_summary(rows: &[RecommendationRow], limit: usize) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Top Recommendations:");
    if rows.is_empty() {
        let _ = writeln!(output, "No coaches met the session threshold for this group.");
        return output;
    }

    for (rank, row) in rows.iter().take(limit).enumerate() {
        let _ = write!(
            output,
            "{:>2}. {} score {:.3} across {} sessions, {} students ({:.1}% of group), {:.0} min",
            rank + 1,
            row.coach,
            row.combined_score,
            row.sessions,
            row.students_covered,
            row.percent_of_group_covered,
            row.total_minutes
        );
        if row.notes.is_empty() {
            let _ = writeln!(output);
        } else {
            let _ = writeln!(output, " - {}", row.notes);
        }
    }

    output
}

/// The header is written even when there are no rows.
pub fn write_csv<W: io::Write>(writer: W, rows: &[RecommendationRow]) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
