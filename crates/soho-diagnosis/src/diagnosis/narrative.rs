use super::domain::Grade;
use super::grade::ScoreComponent;
use super::matcher::{format_krw, ProgramEvaluation};

const STRENGTH_CUTOFF: f64 = 0.5;
const MAX_REASONS: usize = 2;

pub(crate) struct NarrativeInput<'a> {
    pub grade: Grade,
    pub points: f64,
    pub max_points: f64,
    pub max_loan_limit: u64,
    pub components: &'a [ScoreComponent],
    pub programs: &'a [ProgramEvaluation],
}

/// Template-filled commentary shown alongside the grade.
pub(crate) fn compose(input: &NarrativeInput<'_>) -> String {
    let mut sentences = Vec::new();

    sentences.push(format!(
        "SOHO grade {} ({:.1} of {:.0} points).",
        input.grade, input.points, input.max_points
    ));
    sentences.push(format!(
        "Estimated maximum loan limit: {} KRW.",
        format_krw(i64::try_from(input.max_loan_limit).unwrap_or(i64::MAX))
    ));

    let eligible: Vec<&ProgramEvaluation> = input
        .programs
        .iter()
        .filter(|program| program.eligible)
        .collect();

    match (eligible.first(), input.programs.first()) {
        (Some(best), _) => sentences.push(format!(
            "{} of {} programs eligible; best match: {} (up to {} KRW, {}).",
            eligible.len(),
            input.programs.len(),
            best.program_name,
            format_krw(i64::try_from(best.max_amount).unwrap_or(i64::MAX)),
            best.interest_rate_label
        )),
        (None, Some(closest)) => {
            let missing = closest
                .failed_conditions()
                .map(|condition| condition.label.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            sentences.push(format!(
                "No program is currently eligible; closest is {} ({}/{} conditions met, short on {}).",
                closest.program_name, closest.pass_count, closest.total_count, missing
            ));
        }
        (None, None) => sentences.push("No policy programs are available to match.".to_string()),
    }

    let mut ranked: Vec<&ScoreComponent> = input.components.iter().collect();
    ranked.sort_by(|left, right| {
        right
            .attainment()
            .partial_cmp(&left.attainment())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let strengths: Vec<&str> = ranked
        .iter()
        .filter(|component| component.attainment() >= STRENGTH_CUTOFF)
        .take(MAX_REASONS)
        .map(|component| component.notes.as_str())
        .collect();
    let weaknesses: Vec<&str> = ranked
        .iter()
        .rev()
        .filter(|component| component.attainment() < STRENGTH_CUTOFF)
        .take(MAX_REASONS)
        .map(|component| component.notes.as_str())
        .collect();

    if !strengths.is_empty() {
        sentences.push(format!("Strengths: {}.", strengths.join("; ")));
    }
    if !weaknesses.is_empty() {
        sentences.push(format!("Watch points: {}.", weaknesses.join("; ")));
    }

    sentences.join(" ")
}
