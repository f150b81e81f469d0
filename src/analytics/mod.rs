pub mod choice;
pub mod labels;
pub mod numeric;
pub mod point_allocation;
pub mod response_rate;
pub mod rounding;

use crate::models::{Question, QuestionDetails, QuestionType, Response, ResponseDetails};
use choice::{ChoiceStatistics, MultiChoiceStatistics, MultiSelection, SingleSelection};
use log::warn;
use numeric::NumericSummary;
use point_allocation::PointAllocationStatistics;
use response_rate::ResponseRate;
use serde::Serialize;

/// Type-specific statistics for one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StatisticsRecord {
    ChoiceSingle(ChoiceStatistics),
    ChoiceMultiple(MultiChoiceStatistics),
    NumericScale(NumericSummary),
    PointAllocation(PointAllocationStatistics),
    Contribution(NumericSummary),
}

/// Everything computed for one question in a single pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnalytics {
    pub question_id: String,
    pub question_type: QuestionType,
    pub response_rate: ResponseRate,
    /// `None` for question types without type-specific statistics.
    pub statistics: Option<StatisticsRecord>,
}

pub fn compute_question_analytics(question: &Question, all_responses: &[Response]) -> QuestionAnalytics {
    let response_rate = response_rate::calculate(all_responses);
    let valid: Vec<&Response> = all_responses.iter().filter(|r| r.is_valid()).collect();

    let statistics = match &question.details {
        QuestionDetails::ChoiceSingle {
            choices,
            other_enabled,
        } => {
            let selections = extract(question, &valid, |details| match details {
                ResponseDetails::ChoiceSingle { answer, is_other } => Some(SingleSelection {
                    answer: answer.clone(),
                    is_other: *is_other,
                }),
                _ => None,
            });
            Some(StatisticsRecord::ChoiceSingle(choice::tally_single(
                choices,
                *other_enabled,
                &selections,
                valid.len(),
            )))
        }
        QuestionDetails::ChoiceMultiple {
            choices,
            other_enabled,
        } => {
            let selections = extract(question, &valid, |details| match details {
                ResponseDetails::ChoiceMultiple { answers, is_other } => Some(MultiSelection {
                    answers: answers.clone(),
                    is_other: *is_other,
                }),
                _ => None,
            });
            Some(StatisticsRecord::ChoiceMultiple(choice::tally_multiple(
                choices,
                *other_enabled,
                &selections,
                valid.len(),
            )))
        }
        QuestionDetails::NumericScale => {
            let values = extract(question, &valid, |details| match details {
                ResponseDetails::NumericScale { answer } => finite(*answer),
                _ => None,
            });
            Some(StatisticsRecord::NumericScale(numeric::summarize(values)))
        }
        QuestionDetails::PointAllocationEven { options }
        | QuestionDetails::PointAllocationOptions { options }
        | QuestionDetails::PointAllocationRecipients { options } => {
            let allocations: Vec<Vec<Option<f64>>> = extract(question, &valid, |details| match details {
                ResponseDetails::PointAllocation { answers } => {
                    Some(answers.iter().map(|points| finite(*points)).collect())
                }
                _ => None,
            });
            Some(StatisticsRecord::PointAllocation(point_allocation::aggregate(
                options,
                &allocations,
                valid.len(),
            )))
        }
        QuestionDetails::Contribution => {
            let values = extract(question, &valid, |details| match details {
                ResponseDetails::Contribution { answer } => finite(*answer),
                _ => None,
            });
            Some(StatisticsRecord::Contribution(numeric::summarize(values)))
        }
        QuestionDetails::Other => None,
    };

    QuestionAnalytics {
        question_id: question.id.clone(),
        question_type: question.question_type(),
        response_rate,
        statistics,
    }
}

/// Pulls the typed answer out of each valid response, skipping entries whose
/// payload does not fit the question. Choice and point aggregates still divide
/// by every valid response; numeric summaries only see the extracted values.
fn extract<T, F>(question: &Question, valid: &[&Response], read: F) -> Vec<T>
where
    F: Fn(&ResponseDetails) -> Option<T>,
{
    let mut out = Vec::with_capacity(valid.len());
    for (i, response) in valid.iter().enumerate() {
        match read(&response.details) {
            Some(value) => out.push(value),
            None => warn!(
                "Skipping malformed response #{} for question {} ({:?}): {:?}",
                i,
                question.id,
                question.question_type(),
                response.details
            ),
        }
    }
    out
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}
