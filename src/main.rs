use feedback_analytics::config::AnalyticsConfig;
use feedback_analytics::session::SessionAnalytics;
use feedback_analytics::{
    JsonFileProvider, LogNotifier, SessionResultsProvider, StatusNotifier,
};
use log::{error, info};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize logging
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = match AnalyticsConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };

    let provider: Arc<dyn SessionResultsProvider> =
        Arc::new(JsonFileProvider::new(config.results_path.clone()));
    let notifier: Arc<dyn StatusNotifier> = Arc::new(LogNotifier);

    let session = match SessionAnalytics::load(
        provider,
        notifier,
        &config.course_id,
        &config.session_name,
        config.fetch_timeout,
    )
    .await
    {
        Ok(session) => session,
        Err(e) => {
            error!("Failed to load session: {}", e);
            return;
        }
    };

    for state in session.refresh_all().await {
        match serde_json::to_string_pretty(&state) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to render analytics: {}", e),
        }
    }

    info!(
        "Computed analytics for {} question(s) in {}/{}",
        session.controllers().len(),
        session.course_id(),
        session.session_name()
    );
}
