//! Application configuration. API credentials, paths.

use serde::Deserialize;

/// Default Gemini REST base URL.
pub const DEFAULT_AI_API_URL: &str = "https://generativelanguage.googleapis.com";

/// Default Gemini model.
pub const DEFAULT_AI_MODEL: &str = "gemini-3-flash-preview";

/// Default simulated latency for the offline mock adapter.
pub const DEFAULT_MOCK_DELAY_MS: u64 = 400;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Directory holding the snapshot files. Read from REVIBE_DATA_DIR.
    #[serde(default)]
    pub data_dir: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // AI Configuration
    // ─────────────────────────────────────────────────────────────────────────
    /// Gemini API key. Read from REVIBE_AI_API_KEY (falls back to GEMINI_API_KEY, then API_KEY).
    #[serde(default)]
    pub ai_api_key: Option<String>,

    /// Base URL of the generative API. Read from REVIBE_AI_API_URL.
    #[serde(default)]
    pub ai_api_url: Option<String>,

    /// Model name. Read from REVIBE_AI_MODEL.
    #[serde(default)]
    pub ai_model: Option<String>,

    /// Simulated latency of the mock adapter used when no key is set. Read from REVIBE_MOCK_DELAY_MS.
    #[serde(default)]
    pub mock_delay_ms: Option<u64>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("REVIBE"));
        if let Ok(path) = std::env::var("REVIBE_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        let mut cfg: Self = c.build()?.try_deserialize()?;
        // MOCK_DELAY_MS arrives as a string from the environment
        if let Ok(s) = std::env::var("REVIBE_MOCK_DELAY_MS") {
            if let Ok(ms) = s.parse::<u64>() {
                cfg.mock_delay_ms = Some(ms);
            }
        }
        Ok(cfg)
    }

    /// Returns the snapshot directory. Defaults to "./data".
    pub fn data_dir_or_default(&self) -> String {
        self.data_dir.clone().unwrap_or_else(|| "./data".to_string())
    }

    /// Returns the mock adapter latency. Defaults to DEFAULT_MOCK_DELAY_MS.
    pub fn mock_delay_ms_or_default(&self) -> u64 {
        self.mock_delay_ms.unwrap_or(DEFAULT_MOCK_DELAY_MS)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // AI Configuration Helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the API key if configured. Empty values count as unset.
    pub fn ai_api_key(&self) -> Option<String> {
        self.ai_api_key
            .clone()
            .or_else(|| std::env::var("REVIBE_AI_API_KEY").ok())
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .or_else(|| std::env::var("API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
    }

    /// Returns the API base URL. Defaults to the public Gemini endpoint.
    pub fn ai_api_url_or_default(&self) -> String {
        self.ai_api_url
            .clone()
            .or_else(|| std::env::var("REVIBE_AI_API_URL").ok())
            .unwrap_or_else(|| DEFAULT_AI_API_URL.to_string())
    }

    /// Returns the model name. Defaults to DEFAULT_AI_MODEL.
    pub fn ai_model_or_default(&self) -> String {
        self.ai_model
            .clone()
            .or_else(|| std::env::var("REVIBE_AI_MODEL").ok())
            .unwrap_or_else(|| DEFAULT_AI_MODEL.to_string())
    }

    /// Returns true if AI is configured (API key present).
    pub fn is_ai_configured(&self) -> bool {
        self.ai_api_key().is_some()
    }
}
