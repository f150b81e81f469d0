pub mod analytics;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod provider;
pub mod session;

pub use analytics::{compute_question_analytics, QuestionAnalytics, StatisticsRecord};
pub use controller::{AnalyticsState, LogNotifier, QuestionAnalyticsController, StatusNotifier};
pub use error::{AnalyticsError, ConfigError, ProviderError};
pub use provider::{InMemoryProvider, JsonFileProvider, ResultsRequest, SessionResultsProvider};
