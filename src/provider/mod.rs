use crate::error::ProviderError;
use crate::models::{Intent, SessionResults};
use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Key of one results request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsRequest {
    pub course_id: String,
    pub session_name: String,
    pub intent: Intent,
    /// Restrict the result set to one question; `None` returns every question.
    pub question_id: Option<String>,
}

impl ResultsRequest {
    pub fn for_question(course_id: &str, session_name: &str, question_id: &str) -> Self {
        Self {
            course_id: course_id.to_string(),
            session_name: session_name.to_string(),
            intent: Intent::FullDetail,
            question_id: Some(question_id.to_string()),
        }
    }

    pub fn for_session(course_id: &str, session_name: &str) -> Self {
        Self {
            course_id: course_id.to_string(),
            session_name: session_name.to_string(),
            intent: Intent::InstructorResult,
            question_id: None,
        }
    }
}

/// Source of session results (questions with every response, missing ones included).
#[async_trait]
pub trait SessionResultsProvider: Send + Sync {
    async fn fetch_results(&self, request: &ResultsRequest) -> Result<SessionResults, ProviderError>;
}

/// Error body returned by the results API.
#[derive(Debug, Deserialize)]
struct ErrorMessageOutput {
    message: String,
}

/// Decodes a results payload, turning an error body into [`ProviderError::Rejected`].
pub fn decode_results(raw: &str) -> Result<SessionResults, ProviderError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    if value.get("questions").is_none() {
        if let Ok(body) = ErrorMessageOutput::deserialize(&value) {
            return Err(ProviderError::Rejected {
                message: body.message,
            });
        }
    }
    Ok(serde_json::from_value(value)?)
}

fn narrow(mut results: SessionResults, request: &ResultsRequest) -> SessionResults {
    if let Some(question_id) = &request.question_id {
        results
            .questions
            .retain(|block| &block.question.id == question_id);
    }
    results
}

/// Reads session results from a JSON document on disk.
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionResultsProvider for JsonFileProvider {
    async fn fetch_results(&self, request: &ResultsRequest) -> Result<SessionResults, ProviderError> {
        debug!(
            "Reading results for {}/{} from {}",
            request.course_id,
            request.session_name,
            self.path.display()
        );
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let results = decode_results(&raw)?;
        info!(
            "Loaded {} question block(s) from {}",
            results.questions.len(),
            self.path.display()
        );
        Ok(narrow(results, request))
    }
}

/// Keeps session results in memory, keyed by (course, session).
#[derive(Default)]
pub struct InMemoryProvider {
    sessions: Mutex<HashMap<(String, String), SessionResults>>,
    failure: Mutex<Option<String>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_session(&self, course_id: &str, session_name: &str, results: SessionResults) {
        lock_or_recover(&self.sessions)
            .insert((course_id.to_string(), session_name.to_string()), results);
    }

    /// Makes every following fetch fail with `message`; `None` restores normal service.
    pub fn set_failure(&self, message: Option<&str>) {
        *lock_or_recover(&self.failure) = message.map(str::to_string);
    }
}

/// Stored values are replaced whole, so a poisoned guard still holds consistent data.
fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        warn!("Recovering in-memory results store after a panic");
        poisoned.into_inner()
    })
}

#[async_trait]
impl SessionResultsProvider for InMemoryProvider {
    async fn fetch_results(&self, request: &ResultsRequest) -> Result<SessionResults, ProviderError> {
        if let Some(message) = lock_or_recover(&self.failure).clone() {
            return Err(ProviderError::Rejected { message });
        }
        let sessions = lock_or_recover(&self.sessions);
        let key = (request.course_id.clone(), request.session_name.clone());
        match sessions.get(&key) {
            Some(results) => Ok(narrow(results.clone(), request)),
            None => Err(ProviderError::Rejected {
                message: format!(
                    "Feedback session {} does not exist in course {}",
                    request.session_name, request.course_id
                ),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn poison<T>(mutex: &Mutex<T>) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = mutex.lock().unwrap();
            panic!("writer panicked while holding the lock");
        }));
        assert!(mutex.is_poisoned());
    }

    #[test]
    fn error_bodies_become_rejections() {
        let err = decode_results(r#"{"message": "You are not authorized"}"#).unwrap_err();
        assert!(matches!(err, ProviderError::Rejected { .. }));
        assert_eq!(err.message(), "You are not authorized");
    }

    #[test]
    fn garbage_is_a_json_error() {
        let err = decode_results("not json").unwrap_err();
        assert!(matches!(err, ProviderError::Json(_)));
    }

    #[test]
    fn empty_object_is_an_empty_result_set() {
        let results = decode_results("{}").unwrap();
        assert!(results.questions.is_empty());
    }

    #[test]
    fn one_unreadable_response_does_not_fail_the_result_set() {
        let raw = r#"{"questions": [{
            "feedbackQuestion": {"feedbackQuestionId": "q", "questionDetails": {"questionType": "NUMSCALE"}},
            "allResponses": [
                {"responseDetails": {"questionType": "NUMSCALE", "answer": 3}},
                {"responseDetails": {"questionType": "NUMSCALE", "answer": "five"}}
            ]
        }]}"#;
        let results = decode_results(raw).unwrap();
        let block = results.find_question("q").unwrap();
        let analytics = crate::compute_question_analytics(&block.question, &block.all_responses);
        assert_eq!(analytics.response_rate.responded_count, 2);
        let Some(crate::StatisticsRecord::NumericScale(summary)) = analytics.statistics else {
            panic!("expected numeric scale statistics");
        };
        assert_eq!(summary.values, vec![3.0]);
    }

    #[test]
    fn session_listings_ask_for_instructor_results() {
        let listing = ResultsRequest::for_session("CS101", "Week 1");
        assert_eq!(listing.intent, Intent::InstructorResult);
        assert!(listing.question_id.is_none());

        let single = ResultsRequest::for_question("CS101", "Week 1", "q-1");
        assert_eq!(single.intent, Intent::FullDetail);
        assert_eq!(single.question_id.as_deref(), Some("q-1"));
    }

    #[tokio::test]
    async fn writes_survive_a_poisoned_store() {
        let provider = InMemoryProvider::new();
        poison(&provider.sessions);
        poison(&provider.failure);

        provider.insert_session("CS101", "Week 1", SessionResults::default());
        let results = provider
            .fetch_results(&ResultsRequest::for_session("CS101", "Week 1"))
            .await
            .unwrap();
        assert!(results.questions.is_empty());

        provider.set_failure(Some("Session is closed"));
        let err = provider
            .fetch_results(&ResultsRequest::for_session("CS101", "Week 1"))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Session is closed");
    }
}
