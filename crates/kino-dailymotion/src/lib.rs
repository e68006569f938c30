//! Kino Dailymotion - Dailymotion embed adapter for Kino
//!
//! Plays Dailymotion-hosted videos inside a Kino/video.js style player by
//! embedding Dailymotion's iframe player and translating its API into the
//! host's media element contract:
//! - One-time loading of the shared player API script
//! - Ordered attachment of players created before the script was ready
//! - Native event translation with state-change edge detection
//! - A uniform control surface that defers calls until the player is ready
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Kino Dailymotion                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │    Source    │  │    Embed     │  │    Script    │           │
//! │  │    Parser    │  │  Parameters  │  │    Loader    │           │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘           │
//! │         │                 │                 │                   │
//! │         └─────────────────┼─────────────────┘                   │
//! │                           │                                     │
//! │                    ┌──────┴──────┐                              │
//! │                    │ Dailymotion │                              │
//! │                    │    Tech     │                              │
//! │                    └──────┬──────┘                              │
//! │                           │                                     │
//! │  ┌──────────────┐  ┌──────┴──────┐  ┌──────────────┐            │
//! │  │    Intent    │  │    Event    │  │   Platform   │            │
//! │  │    Queue     │  │ Translator  │  │    / Host    │            │
//! │  └──────────────┘  └─────────────┘  └──────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The crate has no DOM dependency. Browsers are reached through the
//! [`Platform`], [`PlayerHandle`] and [`Host`] traits; `kino-dailymotion-wasm`
//! implements them with `web-sys`.

pub mod config;
pub mod error;
pub mod events;
pub mod intent;
pub mod loader;
pub mod params;
pub mod platform;
pub mod source;
pub mod tech;

pub use config::{TechConfig, TechOptions};
pub use error::{Error, Result};
pub use events::{
    EventTranslator, HostEvent, NativeEvent, NativeEventKind, NormalizedState, UiSignal,
};
pub use intent::{Intent, IntentQueue};
pub use loader::{LoaderStatus, ReadyQueue, ScriptLoader, Waiter};
pub use params::{EmbedParameters, ParamValue};
pub use platform::{Host, Listener, MountSpec, Platform, PlayerHandle, PlayerSpec, Task};
pub use source::{can_play_source, parse_playlist, parse_video_id, SourceUrl};
pub use tech::{DailymotionTech, TechCapabilities, TechId};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the library version once at startup
pub fn init() {
    tracing::info!(version = VERSION, "Kino Dailymotion initialized");
}
