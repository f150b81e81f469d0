use crate::models::Response;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRate {
    pub responded_count: usize,
    /// Percentage in `[0, 100]`, left unrounded.
    pub response_rate: f64,
}

/// Response rate over every candidate respondent, missing responses included.
pub fn calculate(all_responses: &[Response]) -> ResponseRate {
    if all_responses.is_empty() {
        return ResponseRate::default();
    }
    let responded_count = all_responses.iter().filter(|r| r.is_valid()).count();
    ResponseRate {
        responded_count,
        response_rate: responded_count as f64 / all_responses.len() as f64 * 100.0,
    }
}
