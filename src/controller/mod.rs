use crate::analytics::{compute_question_analytics, QuestionAnalytics};
use crate::error::AnalyticsError;
use crate::models::Question;
use crate::provider::{ResultsRequest, SessionResultsProvider};
use chrono::{DateTime, Utc};
use log::{debug, error, warn};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// What the display boundary sees for one question. Each value is published
/// whole; a new load replaces the previous statistics before anything else.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum AnalyticsState {
    Idle,
    Loading {
        question_id: String,
    },
    Ready {
        analytics: QuestionAnalytics,
        computed_at: DateTime<Utc>,
    },
    /// The session results did not include the question.
    NotFound {
        question_id: String,
    },
    Failed {
        question_id: String,
        message: String,
    },
}

impl AnalyticsState {
    pub fn analytics(&self) -> Option<&QuestionAnalytics> {
        match self {
            AnalyticsState::Ready { analytics, .. } => Some(analytics),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, AnalyticsState::Loading { .. })
    }
}

/// Toast-style status boundary for failures.
pub trait StatusNotifier: Send + Sync {
    fn show_error(&self, message: &str);
}

/// Notifier that writes failures to the log.
pub struct LogNotifier;

impl StatusNotifier for LogNotifier {
    fn show_error(&self, message: &str) {
        error!("{}", message);
    }
}

/// Fetches the question's results and computes its analytics.
pub async fn fetch_question_analytics(
    provider: &dyn SessionResultsProvider,
    request: &ResultsRequest,
    question: &Question,
    fetch_timeout: Duration,
) -> Result<QuestionAnalytics, AnalyticsError> {
    let results = tokio::time::timeout(fetch_timeout, provider.fetch_results(request))
        .await
        .map_err(|_| AnalyticsError::Timeout(fetch_timeout))??;

    let block = results
        .find_question(&question.id)
        .ok_or_else(|| AnalyticsError::QuestionNotFound {
            question_id: question.id.clone(),
        })?;

    Ok(compute_question_analytics(question, &block.all_responses))
}

/// Drives analytics for one question slot: `Idle → Loading → {Ready, NotFound, Failed}`,
/// back to `Loading` on every question change or retry.
pub struct QuestionAnalyticsController {
    provider: Arc<dyn SessionResultsProvider>,
    notifier: Arc<dyn StatusNotifier>,
    course_id: String,
    session_name: String,
    fetch_timeout: Duration,
    latest_token: AtomicU64,
    current: Mutex<Option<Question>>,
    state: watch::Sender<AnalyticsState>,
}

impl QuestionAnalyticsController {
    pub fn new(
        provider: Arc<dyn SessionResultsProvider>,
        notifier: Arc<dyn StatusNotifier>,
        course_id: impl Into<String>,
        session_name: impl Into<String>,
    ) -> Self {
        let (state, _) = watch::channel(AnalyticsState::Idle);
        Self {
            provider,
            notifier,
            course_id: course_id.into(),
            session_name: session_name.into(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            latest_token: AtomicU64::new(0),
            current: Mutex::new(None),
            state,
        }
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<AnalyticsState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> AnalyticsState {
        self.state.borrow().clone()
    }

    pub fn question(&self) -> Option<Question> {
        self.current_question().clone()
    }

    /// Sets the current question without loading it.
    pub fn assign(&self, question: Question) {
        *self.current_question() = Some(question);
    }

    fn current_question(&self) -> MutexGuard<'_, Option<Question>> {
        self.current.lock().unwrap_or_else(|poisoned| {
            warn!("Current question lock was poisoned; keeping the last stored question");
            poisoned.into_inner()
        })
    }

    /// Switches to `question` and loads its analytics. Returns the published
    /// state once this load settles; if a newer load started meanwhile, its
    /// state is returned instead and this result is dropped.
    pub async fn set_question(&self, question: Question) -> AnalyticsState {
        self.assign(question.clone());
        self.load(question).await
    }

    /// Re-issues the fetch for the current question; `None` before any question was set.
    pub async fn retry(&self) -> Option<AnalyticsState> {
        let question = self.question()?;
        debug!("Reloading analytics for question {}", question.id);
        Some(self.load(question).await)
    }

    async fn load(&self, question: Question) -> AnalyticsState {
        // Claim a new request token and drop the previous statistics
        let token = self.latest_token.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(AnalyticsState::Loading {
            question_id: question.id.clone(),
        });

        let request = ResultsRequest::for_question(&self.course_id, &self.session_name, &question.id);
        let outcome =
            fetch_question_analytics(self.provider.as_ref(), &request, &question, self.fetch_timeout).await;

        // Not found is an empty state, only real failures reach the notifier
        let (next, failure) = match outcome {
            Ok(analytics) => (
                AnalyticsState::Ready {
                    analytics,
                    computed_at: Utc::now(),
                },
                None,
            ),
            Err(AnalyticsError::QuestionNotFound { question_id }) => {
                debug!("No results block for question {}", question_id);
                (AnalyticsState::NotFound { question_id }, None)
            }
            Err(err) => {
                let message = err.user_message();
                (
                    AnalyticsState::Failed {
                        question_id: question.id.clone(),
                        message: message.clone(),
                    },
                    Some(message),
                )
            }
        };

        // Publish only if no newer load has started
        let applied = self.state.send_if_modified(|state| {
            if self.latest_token.load(Ordering::SeqCst) != token {
                return false;
            }
            *state = next;
            true
        });

        if !applied {
            debug!(
                "Discarding stale analytics for question {} (request {})",
                question.id, token
            );
        } else if let Some(message) = failure {
            self.notifier.show_error(&message);
        }

        self.state()
    }
}
