//! Source URL parsing
//!
//! Recognized shapes:
//!
//! ```text
//! https://www.dailymotion.com/video/<id>[_slug][?query]
//! https://www.dailymotion.com/hub/<id>[_slug]
//! <any url>#video=<id>
//! ```
//!
//! The `#video=` fragment wins over the path form when both are present.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// MIME type the host uses to route sources to this tech
pub const SOURCE_MIME_TYPE: &str = "video/dailymotion";

/// Path form, only when dailymotion.com (or a subdomain) is the host
static PATH_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[A-Za-z][A-Za-z0-9+.-]*:)?//(?:[^/?#@]*\.)?dailymotion\.com/(?:video|hub)/([^_#?&/]+)",
    )
    .expect("valid path id pattern")
});

static FRAGMENT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#video=([^_&]+)").expect("valid fragment id pattern"));

static PLAYLIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]list=([^#&?]+)").expect("valid playlist pattern"));

/// Extract the video id from a Dailymotion URL
pub fn parse_video_id(src: &str) -> Option<String> {
    FRAGMENT_ID
        .captures(src)
        .or_else(|| PATH_ID.captures(src))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract the `list=` playlist id, if any
pub fn parse_playlist(src: &str) -> Option<String> {
    PLAYLIST
        .captures(src)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Returns true if the host should hand a source of this type to the tech
pub fn can_play_source(mime_type: &str) -> bool {
    mime_type.trim().eq_ignore_ascii_case(SOURCE_MIME_TYPE)
}

/// A declared source together with the ids parsed out of it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUrl {
    pub raw: String,
    pub video_id: Option<String>,
    pub playlist_id: Option<String>,
}

impl SourceUrl {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            video_id: parse_video_id(&raw),
            playlist_id: parse_playlist(&raw),
            raw,
        }
    }

    /// True when a player can be created for this source
    pub fn is_playable(&self) -> bool {
        self.video_id.is_some()
    }
}

impl std::fmt::Display for SourceUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}
