//! Embed parameters and query string building

use crate::{config::TechOptions, source::SourceUrl};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use url::Url;

/// Characters left untouched by `encodeURIComponent`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a query component the way browsers' `encodeURIComponent` does
pub fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, URI_COMPONENT).to_string()
}

/// Origin of the embedding page as the player expects it.
///
/// Pages served from `file:` have no usable origin and get `None`.
pub fn page_origin(href: &str) -> Option<String> {
    let url = Url::parse(href).ok()?;
    if url.scheme() == "file" {
        return None;
    }
    let host = url.host_str()?;
    Some(format!("{}://{}", url.scheme(), host))
}

/// A single embed parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(i64::from(v))
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Str(v) => write!(f, "{}", v),
        }
    }
}

/// Flag encoding used by the player (`1`/`0`)
fn flag(on: bool) -> ParamValue {
    ParamValue::Int(i64::from(on))
}

/// Ordered parameter set sent to the embed.
///
/// A key may be declared without a value; such keys are never serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbedParameters {
    entries: Vec<(String, Option<ParamValue>)>,
}

impl EmbedParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard parameter set for a player element
    pub fn for_source(
        element_id: &str,
        source: &SourceUrl,
        options: &TechOptions,
        origin: Option<String>,
    ) -> Self {
        let mut params = Self::new();
        params
            .set("id", element_id)
            .set("autoplay", flag(options.autoplay))
            .set("chromeless", flag(true))
            .set("html", flag(true))
            .set("info", flag(true))
            .set("logo", flag(true))
            .set("controls", flag(options.native_controls))
            .set("wmode", "opaque")
            .set("format", "json")
            .set("url", source.raw.as_str())
            .set_opt("origin", origin)
            .set_opt("list", source.playlist_id.clone());
        params
    }

    /// Set a value, keeping the key's original position if it exists
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.set_opt(key, Some(value.into()))
    }

    /// Set a value that may be absent
    pub fn set_opt<V: Into<ParamValue>>(
        &mut self,
        key: impl Into<String>,
        value: Option<V>,
    ) -> &mut Self {
        let key = key.into();
        let value = value.map(Into::into);
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_ref())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterate over the keys that carry a value
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.as_str(), v)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serialize as `key=value&...`, skipping absent values
    pub fn to_query_string(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(&v.to_string())))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Compose the iframe URL
    pub fn embed_url(&self, base: &str) -> String {
        let query = self.to_query_string();
        if query.is_empty() {
            base.to_string()
        } else {
            format!("{}?{}", base, query)
        }
    }
}
