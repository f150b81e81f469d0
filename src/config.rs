use crate::controller::DEFAULT_FETCH_TIMEOUT;
use crate::error::ConfigError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const RESULTS_PATH_VAR: &str = "ANALYTICS_RESULTS_PATH";
pub const COURSE_ID_VAR: &str = "ANALYTICS_COURSE_ID";
pub const SESSION_NAME_VAR: &str = "ANALYTICS_SESSION_NAME";
pub const FETCH_TIMEOUT_VAR: &str = "ANALYTICS_FETCH_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsConfig {
    pub results_path: PathBuf,
    pub course_id: String,
    pub session_name: String,
    pub fetch_timeout: Duration,
}

impl AnalyticsConfig {
    /// Reads the process environment (call `dotenvy::dotenv()` first to pick up `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let results_path = lookup(RESULTS_PATH_VAR)
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from)
            .ok_or(ConfigError::Missing(RESULTS_PATH_VAR))?;

        let fetch_timeout = match lookup(FETCH_TIMEOUT_VAR) {
            None => DEFAULT_FETCH_TIMEOUT,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: FETCH_TIMEOUT_VAR,
                        value: raw,
                    })
                }
            },
        };

        Ok(Self {
            results_path,
            course_id: lookup(COURSE_ID_VAR).unwrap_or_default(),
            session_name: lookup(SESSION_NAME_VAR).unwrap_or_default(),
            fetch_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn results_path_is_required() {
        let err = AnalyticsConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(RESULTS_PATH_VAR)));
    }

    #[test]
    fn defaults_apply() {
        let config = AnalyticsConfig::from_lookup(lookup(&[(RESULTS_PATH_VAR, "results.json")])).unwrap();
        assert_eq!(config.results_path, PathBuf::from("results.json"));
        assert_eq!(config.fetch_timeout, DEFAULT_FETCH_TIMEOUT);
        assert!(config.course_id.is_empty());
    }

    #[test]
    fn reads_every_variable() {
        let config = AnalyticsConfig::from_lookup(lookup(&[
            (RESULTS_PATH_VAR, "/tmp/r.json"),
            (COURSE_ID_VAR, "CS101"),
            (SESSION_NAME_VAR, "Week 3 Feedback"),
            (FETCH_TIMEOUT_VAR, "5"),
        ]))
        .unwrap();
        assert_eq!(config.course_id, "CS101");
        assert_eq!(config.session_name, "Week 3 Feedback");
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
    }

    #[test]
    fn rejects_bad_timeouts() {
        for raw in ["0", "soon", "-3"] {
            let err = AnalyticsConfig::from_lookup(lookup(&[
                (RESULTS_PATH_VAR, "r.json"),
                (FETCH_TIMEOUT_VAR, raw),
            ]))
            .unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { .. }));
        }
    }
}
