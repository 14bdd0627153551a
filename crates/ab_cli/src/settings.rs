use std::str::FromStr;
use std::time::Duration;

use ab_core::{Error, Result};
use ab_inference::InferenceConfig;
use ab_pipeline::{GenerateOptions, PipelineConfig, ScheduleConfig};

/// Runtime settings read from `.env` and the process environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub storage: String,
    pub database_url: Option<String>,
    pub model: String,
    pub model_url: Option<String>,
    pub deepseek_api_key: Option<String>,
    pub oracle: String,
    pub port: u16,
    pub schedule_enabled: bool,
    pub schedule_interval: String,
    pub batch_delay: Duration,
    pub max_topic_attempts: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage: "memory".to_string(),
            database_url: None,
            model: "ollama".to_string(),
            model_url: None,
            deepseek_api_key: None,
            oracle: "lexical".to_string(),
            port: 3000,
            schedule_enabled: false,
            schedule_interval: "6h".to_string(),
            batch_delay: Duration::from_secs(5),
            max_topic_attempts: 10,
        }
    }
}

fn parse<T: FromStr>(key: &str, value: String) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("Invalid value for {}: {}", key, value)))
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        // A missing .env file is fine.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            storage: get("AUTOBLOG_STORAGE").unwrap_or(defaults.storage),
            database_url: get("DATABASE_URL"),
            model: get("AUTOBLOG_MODEL").unwrap_or(defaults.model),
            model_url: get("MODEL_URL"),
            deepseek_api_key: get("DEEPSEEK_API_KEY"),
            oracle: get("AUTOBLOG_ORACLE").unwrap_or(defaults.oracle),
            port: get("PORT").map(|v| parse("PORT", v)).transpose()?.unwrap_or(defaults.port),
            schedule_enabled: get("SCHEDULE_ENABLED")
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.schedule_enabled),
            schedule_interval: get("SCHEDULE_INTERVAL").unwrap_or(defaults.schedule_interval),
            batch_delay: get("BATCH_DELAY_SECS")
                .map(|v| parse("BATCH_DELAY_SECS", v).map(Duration::from_secs))
                .transpose()?
                .unwrap_or(defaults.batch_delay),
            max_topic_attempts: get("MAX_TOPIC_ATTEMPTS")
                .map(|v| parse("MAX_TOPIC_ATTEMPTS", v))
                .transpose()?
                .unwrap_or(defaults.max_topic_attempts),
        })
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_batch_delay(self.batch_delay)
            .with_max_topic_attempts(self.max_topic_attempts)
    }

    pub fn inference_config(&self) -> InferenceConfig {
        InferenceConfig {
            model_url: self.model_url.clone(),
            api_key: self.deepseek_api_key.clone(),
        }
    }

    pub fn schedule_config(&self) -> ScheduleConfig {
        ScheduleConfig {
            enabled: self.schedule_enabled,
            interval: self.schedule_interval.clone(),
            options: GenerateOptions::default(),
        }
    }
}
