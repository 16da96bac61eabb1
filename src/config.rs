use std::time::Duration;

use serde::Serialize;

use crate::pipeline::adjudication::TelangiectasiaPolicy;
use crate::pipeline::llm::RetryPolicy;

/// Application-level constants
pub const APP_NAME: &str = "priorauth";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Screening colonoscopy (flexible, diagnostic).
pub const DEFAULT_CPT: u32 = 45378;
/// Retrieval score a passage must exceed to count as corroboration.
pub const DEFAULT_MATCH_THRESHOLD: f32 = 16.0;
/// Year the medical record was written; ages are computed against it.
pub const DEFAULT_RECORD_YEAR: i32 = 2023;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "medgemma";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;

const ENV_OLLAMA_URL: &str = "PRIORAUTH_OLLAMA_URL";
const ENV_MODEL: &str = "PRIORAUTH_MODEL";
const ENV_LLM_TIMEOUT: &str = "PRIORAUTH_LLM_TIMEOUT_SECS";

/// Filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "priorauth=info,priorauth_lib=info"
}

/// Everything one claim review needs to know besides the record itself.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewConfig {
    pub cpt: u32,
    pub match_threshold: f32,
    pub record_year: i32,
    pub model: String,
    pub ollama_url: String,
    pub llm_timeout_secs: u64,
    #[serde(skip)]
    pub retry: RetryPolicy,
    pub telangiectasia_policy: TelangiectasiaPolicy,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            cpt: DEFAULT_CPT,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            record_year: DEFAULT_RECORD_YEAR,
            model: DEFAULT_MODEL.to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            llm_timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
            retry: RetryPolicy::default(),
            telangiectasia_policy: TelangiectasiaPolicy::default(),
        }
    }
}

impl ReviewConfig {
    /// Defaults overlaid with `PRIORAUTH_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_OLLAMA_URL).filter(|v| !v.trim().is_empty()) {
            config.ollama_url = url;
        }
        if let Some(model) = lookup(ENV_MODEL).filter(|v| !v.trim().is_empty()) {
            config.model = model;
        }
        match lookup(ENV_LLM_TIMEOUT).map(|v| v.parse::<u64>()) {
            Some(Ok(secs)) if secs > 0 => config.llm_timeout_secs = secs,
            Some(_) => tracing::warn!("{ENV_LLM_TIMEOUT} is not a positive integer, using default"),
            None => {}
        }

        config
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }
}
