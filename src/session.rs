use crate::controller::{AnalyticsState, QuestionAnalyticsController, StatusNotifier};
use crate::error::AnalyticsError;
use crate::models::{Question, SessionResults};
use crate::provider::{ResultsRequest, SessionResultsProvider};
use log::info;
use std::sync::Arc;
use std::time::Duration;

/// Questions of a session in display order (by question number).
pub fn ordered_questions(results: &SessionResults) -> Vec<Question> {
    let mut questions: Vec<Question> = results
        .questions
        .iter()
        .map(|block| block.question.clone())
        .collect();
    questions.sort_by_key(|question| question.number);
    questions
}

/// Analytics for every question of one feedback session, one controller per question.
pub struct SessionAnalytics {
    course_id: String,
    session_name: String,
    controllers: Vec<QuestionAnalyticsController>,
}

impl SessionAnalytics {
    /// Lists the session's questions. A failed listing is reported to
    /// `notifier` and returned.
    pub async fn load(
        provider: Arc<dyn SessionResultsProvider>,
        notifier: Arc<dyn StatusNotifier>,
        course_id: &str,
        session_name: &str,
        fetch_timeout: Duration,
    ) -> Result<Self, AnalyticsError> {
        let request = ResultsRequest::for_session(course_id, session_name);
        let listing = match tokio::time::timeout(fetch_timeout, provider.fetch_results(&request)).await {
            Ok(Ok(results)) => Ok(results),
            Ok(Err(err)) => Err(AnalyticsError::FetchFailure(err)),
            Err(_) => Err(AnalyticsError::Timeout(fetch_timeout)),
        };
        let results = match listing {
            Ok(results) => results,
            Err(err) => {
                notifier.show_error(&err.user_message());
                return Err(err);
            }
        };

        let questions = ordered_questions(&results);
        info!(
            "Session {}/{} has {} question(s)",
            course_id,
            session_name,
            questions.len()
        );

        let mut controllers = Vec::with_capacity(questions.len());
        for question in questions {
            let controller = QuestionAnalyticsController::new(
                Arc::clone(&provider),
                Arc::clone(&notifier),
                course_id,
                session_name,
            )
            .with_fetch_timeout(fetch_timeout);
            // Seed the slot without fetching; `refresh_all` triggers the loads.
            controller.assign(question);
            controllers.push(controller);
        }

        Ok(Self {
            course_id: course_id.to_string(),
            session_name: session_name.to_string(),
            controllers,
        })
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    pub fn controllers(&self) -> &[QuestionAnalyticsController] {
        &self.controllers
    }

    /// Loads every question in display order and returns the settled states.
    pub async fn refresh_all(&self) -> Vec<AnalyticsState> {
        let mut states = Vec::with_capacity(self.controllers.len());
        for controller in &self.controllers {
            if let Some(state) = controller.retry().await {
                states.push(state);
            }
        }
        states
    }
}
