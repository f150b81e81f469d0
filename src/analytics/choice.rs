use crate::analytics::labels::LabelMap;
use crate::analytics::rounding::{percentage, ratio, SHARE_DECIMALS};
use crate::models::OTHER_LABEL;
use serde::Serialize;
use std::collections::HashSet;

/// One single-select answer: the chosen label, or the free-text "other" slot.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleSelection {
    pub answer: String,
    pub is_other: bool,
}

/// One multi-select answer: every ticked label plus an independent "other" flag.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiSelection {
    pub answers: Vec<String>,
    pub is_other: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceStatistics {
    pub choices: Vec<String>,
    pub answer_frequency: LabelMap<usize>,
    pub percentage_per_option: LabelMap<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiChoiceStatistics {
    #[serde(flatten)]
    pub tally: ChoiceStatistics,
    pub total_selections: usize,
    pub average_selections_per_response: f64,
}

/// Configured categories followed by "Other" when enabled. A configured label
/// that collides with "Other" is folded into the trailing slot.
fn category_labels(categories: &[String], other_enabled: bool) -> Vec<&str> {
    let mut labels: Vec<&str> = categories
        .iter()
        .map(String::as_str)
        .filter(|label| !(other_enabled && *label == OTHER_LABEL))
        .collect();
    if other_enabled {
        labels.push(OTHER_LABEL);
    }
    labels
}

fn finish(frequency: LabelMap<usize>, valid_responses: usize) -> ChoiceStatistics {
    let percentage_per_option = frequency.map_values(|_, &count| percentage(count, valid_responses));
    ChoiceStatistics {
        choices: frequency.labels().to_vec(),
        answer_frequency: frequency,
        percentage_per_option,
    }
}

/// Single-select tally. `valid_responses` is the number of non-missing
/// responses and may exceed `selections.len()` when some payloads were unreadable.
pub fn tally_single(
    categories: &[String],
    other_enabled: bool,
    selections: &[SingleSelection],
    valid_responses: usize,
) -> ChoiceStatistics {
    // Every configured choice (and "Other") starts at zero
    let mut frequency = LabelMap::with_labels(category_labels(categories, other_enabled), 0usize);

    for selection in selections {
        // Free-text answers land in the "Other" slot
        let key = if selection.is_other {
            OTHER_LABEL
        } else {
            selection.answer.as_str()
        };
        if !frequency.increment(key) {
            log::debug!("Ignoring answer '{}' outside the configured choices", key);
        }
    }

    finish(frequency, valid_responses)
}

/// Multi-select tally; `valid_responses` as in [`tally_single`].
pub fn tally_multiple(
    categories: &[String],
    other_enabled: bool,
    selections: &[MultiSelection],
    valid_responses: usize,
) -> MultiChoiceStatistics {
    let mut frequency = LabelMap::with_labels(category_labels(categories, other_enabled), 0usize);
    let configured: HashSet<&str> = categories
        .iter()
        .map(String::as_str)
        .filter(|label| !(other_enabled && *label == OTHER_LABEL))
        .collect();
    let mut total_selections = 0usize;

    for selection in selections {
        // A response ticks each label at most once.
        let mut seen: HashSet<&str> = HashSet::new();
        for answer in &selection.answers {
            let answer = answer.as_str();
            if !configured.contains(answer) || !seen.insert(answer) {
                continue;
            }
            if frequency.increment(answer) {
                total_selections += 1;
            }
        }

        // Count the "Other" tick only when the question offers it
        if selection.is_other && other_enabled && frequency.increment(OTHER_LABEL) {
            total_selections += 1;
        }
    }

    MultiChoiceStatistics {
        tally: finish(frequency, valid_responses),
        total_selections,
        average_selections_per_response: ratio(
            total_selections as f64,
            valid_responses,
            SHARE_DECIMALS,
        ),
    }
}
