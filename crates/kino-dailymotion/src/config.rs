//! Adapter configuration
//!
//! `TechConfig` holds the process-wide settings for the embed (script
//! location, callback name, timeouts). `TechOptions` is what the host
//! hands over for a single player.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default location of the Dailymotion player API script
pub const DEFAULT_SCRIPT_URL: &str = "https://api.dmcdn.net/all.js";

/// Global function the player API script calls once it has initialized
pub const DEFAULT_GLOBAL_CALLBACK: &str = "dmAsyncInit";

/// Default base URL of the embed iframe
pub const DEFAULT_EMBED_BASE_URL: &str = "https://www.dailymotion.com/services/oembed";

/// Suffix appended to the host player id to build the tech element id
pub const DEFAULT_ID_SUFFIX: &str = "_dailymotion_api";

/// Adapter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechConfig {
    /// Player API script to inject
    pub script_url: String,
    /// Name of the global ready callback
    pub global_callback: String,
    /// Base URL for the iframe `src`
    pub embed_base_url: String,
    /// Suffix for the mount element id
    pub id_suffix: String,
    /// Give up on the script after this long (None = wait forever)
    pub script_load_timeout_ms: Option<u64>,
    /// Delay before reporting a mute change to the host
    pub muted_notify_delay_ms: u64,
}

impl Default for TechConfig {
    fn default() -> Self {
        Self {
            script_url: DEFAULT_SCRIPT_URL.to_string(),
            global_callback: DEFAULT_GLOBAL_CALLBACK.to_string(),
            embed_base_url: DEFAULT_EMBED_BASE_URL.to_string(),
            id_suffix: DEFAULT_ID_SUFFIX.to_string(),
            script_load_timeout_ms: Some(15_000),
            muted_notify_delay_ms: 50,
        }
    }
}

impl TechConfig {
    /// Parse a configuration from JSON, filling in defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: TechConfig =
            serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the adapter cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.script_url.trim().is_empty() {
            return Err(Error::InvalidConfig("script_url is empty".into()));
        }
        if self.embed_base_url.trim().is_empty() {
            return Err(Error::InvalidConfig("embed_base_url is empty".into()));
        }
        if self.global_callback.trim().is_empty() {
            return Err(Error::InvalidConfig("global_callback is empty".into()));
        }
        if self.script_load_timeout_ms == Some(0) {
            return Err(Error::InvalidConfig(
                "script_load_timeout_ms must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn script_load_timeout(&self) -> Option<Duration> {
        self.script_load_timeout_ms.map(Duration::from_millis)
    }

    pub fn muted_notify_delay(&self) -> Duration {
        Duration::from_millis(self.muted_notify_delay_ms)
    }
}

/// Per-player options supplied by the host framework
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechOptions {
    /// Host player element id
    #[serde(alias = "playerId")]
    pub player_id: String,
    /// Declared source URL
    #[serde(alias = "src", alias = "sourceUrl")]
    pub source_url: String,
    /// Start playback as soon as possible
    pub autoplay: bool,
    /// Use Dailymotion's own controls instead of the host chrome
    #[serde(alias = "dmControls", alias = "nativeControls")]
    pub native_controls: bool,
    /// Display width in pixels
    pub width: Option<u32>,
    /// Display height in pixels
    pub height: Option<u32>,
}

impl TechOptions {
    pub fn new(player_id: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            source_url: source_url.into(),
            ..Default::default()
        }
    }

    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    pub fn with_native_controls(mut self, native_controls: bool) -> Self {
        self.native_controls = native_controls;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}
