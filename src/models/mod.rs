use serde::{Deserialize, Deserializer, Serialize};

/// Label of the synthetic category added to choice questions with "other" enabled.
pub const OTHER_LABEL: &str = "Other";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    ChoiceSingle,
    ChoiceMultiple,
    NumericScale,
    PointAllocationEven,
    PointAllocationOptions,
    PointAllocationRecipients,
    Contribution,
    Other,
}

/// Type-specific question configuration. The `questionType` tag doubles as the
/// question's type, so a question can never disagree with its own details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "questionType")]
pub enum QuestionDetails {
    #[serde(rename = "MCQ")]
    ChoiceSingle {
        #[serde(rename = "mcqChoices", default)]
        choices: Vec<String>,
        #[serde(rename = "otherEnabled", default)]
        other_enabled: bool,
    },
    #[serde(rename = "MSQ")]
    ChoiceMultiple {
        #[serde(rename = "msqChoices", default)]
        choices: Vec<String>,
        #[serde(rename = "otherEnabled", default)]
        other_enabled: bool,
    },
    #[serde(rename = "NUMSCALE")]
    NumericScale,
    #[serde(rename = "CONSTSUM")]
    PointAllocationEven {
        #[serde(rename = "constSumOptions", default)]
        options: Vec<String>,
    },
    #[serde(rename = "CONSTSUM_OPTIONS")]
    PointAllocationOptions {
        #[serde(rename = "constSumOptions", default)]
        options: Vec<String>,
    },
    #[serde(rename = "CONSTSUM_RECIPIENTS")]
    PointAllocationRecipients {
        #[serde(rename = "constSumOptions", default)]
        options: Vec<String>,
    },
    #[serde(rename = "CONTRIB")]
    Contribution,
    #[serde(other)]
    Other,
}

impl QuestionDetails {
    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionDetails::ChoiceSingle { .. } => QuestionType::ChoiceSingle,
            QuestionDetails::ChoiceMultiple { .. } => QuestionType::ChoiceMultiple,
            QuestionDetails::NumericScale => QuestionType::NumericScale,
            QuestionDetails::PointAllocationEven { .. } => QuestionType::PointAllocationEven,
            QuestionDetails::PointAllocationOptions { .. } => QuestionType::PointAllocationOptions,
            QuestionDetails::PointAllocationRecipients { .. } => {
                QuestionType::PointAllocationRecipients
            }
            QuestionDetails::Contribution => QuestionType::Contribution,
            QuestionDetails::Other => QuestionType::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "feedbackQuestionId")]
    pub id: String,
    #[serde(rename = "questionNumber", default)]
    pub number: u32,
    #[serde(rename = "questionBrief", default)]
    pub brief: String,
    #[serde(rename = "questionDetails")]
    pub details: QuestionDetails,
}

impl Question {
    pub fn new(id: impl Into<String>, number: u32, details: QuestionDetails) -> Self {
        Self {
            id: id.into(),
            number,
            brief: String::new(),
            details,
        }
    }

    pub fn question_type(&self) -> QuestionType {
        self.details.question_type()
    }
}

/// Answer payload of one response. Every field a respondent may leave out is
/// optional or defaulted so a sparse payload still decodes, and the tally code
/// decides how to treat the gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "questionType")]
pub enum ResponseDetails {
    #[serde(rename = "MCQ")]
    ChoiceSingle {
        #[serde(default)]
        answer: String,
        #[serde(rename = "isOther", default)]
        is_other: bool,
    },
    #[serde(rename = "MSQ")]
    ChoiceMultiple {
        #[serde(default)]
        answers: Vec<String>,
        #[serde(rename = "isOther", default)]
        is_other: bool,
    },
    #[serde(rename = "NUMSCALE")]
    NumericScale {
        #[serde(default)]
        answer: Option<f64>,
    },
    #[serde(
        rename = "CONSTSUM",
        alias = "CONSTSUM_OPTIONS",
        alias = "CONSTSUM_RECIPIENTS"
    )]
    PointAllocation {
        #[serde(default)]
        answers: Vec<Option<f64>>,
    },
    #[serde(rename = "CONTRIB")]
    Contribution {
        #[serde(default)]
        answer: Option<f64>,
    },
    #[serde(other)]
    Other,
}

impl Default for ResponseDetails {
    fn default() -> Self {
        ResponseDetails::Other
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "isMissingResponse", default)]
    pub is_missing: bool,
    #[serde(rename = "responseDetails", default, deserialize_with = "lenient_details")]
    pub details: ResponseDetails,
}

/// Decodes one response's details without failing the whole result set: a
/// payload that does not fit any known shape becomes `ResponseDetails::Other`.
fn lenient_details<'de, D>(deserializer: D) -> Result<ResponseDetails, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match ResponseDetails::deserialize(value) {
        Ok(details) => Ok(details),
        Err(err) => {
            log::warn!("Unreadable response details, treating as unknown: {}", err);
            Ok(ResponseDetails::Other)
        }
    }
}

impl Response {
    pub fn answered(details: ResponseDetails) -> Self {
        Self {
            is_missing: false,
            details,
        }
    }

    pub fn missing(details: ResponseDetails) -> Self {
        Self {
            is_missing: true,
            details,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.is_missing
    }
}

/// One question's block inside a session result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResults {
    #[serde(rename = "feedbackQuestion")]
    pub question: Question,
    #[serde(rename = "allResponses", default)]
    pub all_responses: Vec<Response>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionResults {
    #[serde(default)]
    pub questions: Vec<QuestionResults>,
}

impl SessionResults {
    pub fn find_question(&self, question_id: &str) -> Option<&QuestionResults> {
        self.questions
            .iter()
            .find(|block| block.question.id == question_id)
    }
}

/// Detail level requested from the results provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    FullDetail,
    InstructorResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_results_wire_shape() {
        let raw = r#"{
            "questions": [{
                "feedbackQuestion": {
                    "feedbackQuestionId": "q-1",
                    "questionNumber": 2,
                    "questionDetails": {
                        "questionType": "MCQ",
                        "mcqChoices": ["A", "B"],
                        "otherEnabled": true
                    }
                },
                "allResponses": [
                    {
                        "isMissingResponse": false,
                        "responseDetails": {"questionType": "MCQ", "answer": "A", "isOther": false}
                    },
                    {
                        "isMissingResponse": true,
                        "responseDetails": {"questionType": "MCQ"}
                    }
                ]
            }]
        }"#;

        let results: SessionResults = serde_json::from_str(raw).unwrap();
        let block = results.find_question("q-1").unwrap();
        assert_eq!(block.question.number, 2);
        assert_eq!(block.question.question_type(), QuestionType::ChoiceSingle);
        assert_eq!(block.all_responses.len(), 2);
        assert!(block.all_responses[1].is_missing);
        assert_eq!(
            block.all_responses[1].details,
            ResponseDetails::ChoiceSingle {
                answer: String::new(),
                is_other: false
            }
        );
    }

    #[test]
    fn unknown_question_tags_decode_as_other() {
        let raw = r#"{"questionType": "TEXT", "recommendedLength": 100}"#;
        let details: QuestionDetails = serde_json::from_str(raw).unwrap();
        assert_eq!(details, QuestionDetails::Other);
        assert_eq!(details.question_type(), QuestionType::Other);
    }

    #[test]
    fn point_allocation_responses_accept_every_constsum_tag() {
        for tag in ["CONSTSUM", "CONSTSUM_OPTIONS", "CONSTSUM_RECIPIENTS"] {
            let raw = format!(r#"{{"questionType": "{tag}", "answers": [10, null, 5]}}"#);
            let details: ResponseDetails = serde_json::from_str(&raw).unwrap();
            assert_eq!(
                details,
                ResponseDetails::PointAllocation {
                    answers: vec![Some(10.0), None, Some(5.0)]
                }
            );
        }
    }

    #[test]
    fn unreadable_response_details_decode_as_other() {
        let raw = r#"{
            "feedbackQuestion": {
                "feedbackQuestionId": "q-scale",
                "questionDetails": {"questionType": "NUMSCALE"}
            },
            "allResponses": [
                {"isMissingResponse": false, "responseDetails": {"questionType": "NUMSCALE", "answer": 3}},
                {"isMissingResponse": false, "responseDetails": {"questionType": "NUMSCALE", "answer": "five"}},
                {"isMissingResponse": false, "responseDetails": {"answer": 4}}
            ]
        }"#;

        let block: QuestionResults = serde_json::from_str(raw).unwrap();
        assert_eq!(block.all_responses.len(), 3);
        assert_eq!(
            block.all_responses[0].details,
            ResponseDetails::NumericScale { answer: Some(3.0) }
        );
        assert_eq!(block.all_responses[1].details, ResponseDetails::Other);
        assert_eq!(block.all_responses[2].details, ResponseDetails::Other);
        assert!(block.all_responses.iter().all(Response::is_valid));
    }
}
