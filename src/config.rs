//! # Configuration Module
//!
//! Runtime configuration for the bot and the meal analysis service,
//! read from environment variables (optionally loaded from a `.env` file).

use anyhow::{anyhow, Context, Result};

// Constants for analysis configuration
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_LOCALES_DIR: &str = "./locales";
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_MAX_TOKENS: u32 = 200;
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10MB limit for photos

/// Recovery configuration for error handling
#[derive(Debug, Clone)]
pub struct RecoveryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Base delay between retries in milliseconds
    pub base_retry_delay_ms: u64,
    /// Maximum delay between retries in milliseconds
    pub max_retry_delay_ms: u64,
    /// Timeout for a single analysis request in seconds
    pub operation_timeout_secs: u64,
    /// Circuit breaker failure threshold
    pub circuit_breaker_threshold: u32,
    /// Circuit breaker reset timeout in seconds
    pub circuit_breaker_reset_secs: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_retry_delay_ms: 1000,  // 1 second
            max_retry_delay_ms: 10000,  // 10 seconds
            operation_timeout_secs: 30, // 30 seconds
            circuit_breaker_threshold: 5,
            circuit_breaker_reset_secs: 60, // 1 minute
        }
    }
}

/// Configuration for the vision model client
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Bearer token for the chat completions API
    pub api_key: String,
    /// Base URL, without the trailing `/chat/completions`
    pub api_base: String,
    /// Vision-capable model name
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Maximum accepted photo size in bytes
    pub max_file_size: u64,
    /// Retry, timeout and circuit breaker settings
    pub recovery: RecoveryConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            max_file_size: MAX_FILE_SIZE,
            recovery: RecoveryConfig::default(),
        }
    }
}

/// Top-level bot configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram_token: String,
    pub locales_dir: String,
    pub analysis: AnalysisConfig,
}

impl BotConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Examples
    ///
    /// ```rust
    /// use food_coach::config::BotConfig;
    ///
    /// let config = BotConfig::from_lookup(|key| match key {
    ///     "TELEGRAM_BOT_TOKEN" => Some("123:abc".to_string()),
    ///     "OPENAI_API_KEY" => Some("sk-test".to_string()),
    ///     _ => None,
    /// })?;
    /// assert_eq!(config.analysis.model, "gpt-4o");
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let telegram_token = non_empty("TELEGRAM_BOT_TOKEN")
            .or_else(|| non_empty("TELEGRAM_TOKEN"))
            .ok_or_else(|| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;
        let api_key = non_empty("OPENAI_API_KEY").ok_or_else(|| anyhow!("OPENAI_API_KEY must be set"))?;

        let mut analysis = AnalysisConfig {
            api_key,
            ..Default::default()
        };
        if let Some(model) = non_empty("OPENAI_MODEL") {
            analysis.model = model;
        }
        if let Some(base) = non_empty("OPENAI_API_BASE") {
            analysis.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(timeout) = non_empty("ANALYSIS_TIMEOUT_SECS") {
            analysis.recovery.operation_timeout_secs = timeout
                .trim()
                .parse()
                .context("ANALYSIS_TIMEOUT_SECS must be a whole number of seconds")?;
        }
        if let Some(retries) = non_empty("ANALYSIS_MAX_RETRIES") {
            analysis.recovery.max_retries = retries
                .trim()
                .parse()
                .context("ANALYSIS_MAX_RETRIES must be a whole number")?;
        }

        Ok(Self {
            telegram_token,
            locales_dir: non_empty("LOCALES_DIR").unwrap_or_else(|| DEFAULT_LOCALES_DIR.to_string()),
            analysis,
        })
    }
}
