//! `DailymotionTech` class exported to JavaScript

use crate::host::JsHost;
use crate::runtime;
use kino_dailymotion::{DailymotionTech, TechOptions};
use serde::Serialize;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

/// Point-in-time view of a tech, for debugging panels
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TechSnapshot {
    id: String,
    video_id: Option<String>,
    state: String,
    ready: bool,
    disposed: bool,
    embed_url: String,
    unavailable: Option<String>,
}

/// Dailymotion media tech
///
/// ```javascript
/// const tech = new DailymotionTech(
///   { playerId: 'vjs_video_3', src: 'https://www.dailymotion.com/video/x8abc' },
///   { trigger: (name, detail) => player.trigger(name, detail), signal: (name) => ui.apply(name) },
/// );
/// tech.play();
/// ```
#[wasm_bindgen(js_name = DailymotionTech)]
pub struct WasmDailymotionTech {
    inner: DailymotionTech,
}

#[wasm_bindgen(js_class = DailymotionTech)]
impl WasmDailymotionTech {
    /// Mount the embed and start waiting for the player API
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue, host: JsValue) -> Result<WasmDailymotionTech, JsError> {
        let options: TechOptions = serde_wasm_bindgen::from_value(options)?;
        let (config, loader, platform) = runtime::parts();
        let inner = DailymotionTech::new(
            options,
            config,
            platform,
            Rc::new(JsHost::new(host)),
            loader,
        )?;
        Ok(Self { inner })
    }

    pub fn id(&self) -> String {
        self.inner.id().to_string()
    }

    #[wasm_bindgen(js_name = videoId)]
    pub fn video_id(&self) -> Option<String> {
        self.inner.video_id()
    }

    #[wasm_bindgen(js_name = embedUrl)]
    pub fn embed_url(&self) -> String {
        self.inner.embed_url().to_string()
    }

    pub fn state(&self) -> String {
        self.inner.state().to_string()
    }

    #[wasm_bindgen(js_name = isReady)]
    pub fn is_ready(&self) -> bool {
        self.inner.is_ready()
    }

    /// Snapshot as a plain object
    pub fn snapshot(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(&self.capture())?)
    }

    /// Snapshot as a JSON string
    #[wasm_bindgen(js_name = toJson)]
    pub fn to_json(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.capture())?)
    }

    pub fn play(&self) -> Result<(), JsError> {
        Ok(self.inner.play()?)
    }

    pub fn pause(&self) -> Result<(), JsError> {
        Ok(self.inner.pause()?)
    }

    pub fn seek(&self, seconds: f64) -> Result<(), JsError> {
        Ok(self.inner.seek(seconds)?)
    }

    #[wasm_bindgen(js_name = currentTime)]
    pub fn current_time(&self) -> Result<f64, JsError> {
        Ok(self.inner.current_time()?)
    }

    pub fn duration(&self) -> Result<Option<f64>, JsError> {
        Ok(self.inner.duration()?)
    }

    pub fn volume(&self) -> Result<f64, JsError> {
        Ok(self.inner.volume()?)
    }

    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&self, volume: f64) -> Result<(), JsError> {
        Ok(self.inner.set_volume(volume)?)
    }

    pub fn muted(&self) -> Result<bool, JsError> {
        Ok(self.inner.muted()?)
    }

    #[wasm_bindgen(js_name = setMuted)]
    pub fn set_muted(&self, muted: bool) -> Result<(), JsError> {
        Ok(self.inner.set_muted(muted)?)
    }

    pub fn paused(&self) -> Result<bool, JsError> {
        Ok(self.inner.paused()?)
    }

    pub fn ended(&self) -> Result<bool, JsError> {
        Ok(self.inner.ended()?)
    }

    #[wasm_bindgen(js_name = setSource)]
    pub fn set_source(&self, src: &str) -> Result<(), JsError> {
        Ok(self.inner.set_source(src)?)
    }

    #[wasm_bindgen(js_name = currentSrc)]
    pub fn current_src(&self) -> Option<String> {
        self.inner.current_src()
    }

    pub fn dispose(&self) {
        self.inner.dispose();
    }
}

impl WasmDailymotionTech {
    fn capture(&self) -> TechSnapshot {
        TechSnapshot {
            id: self.inner.id().to_string(),
            video_id: self.inner.video_id(),
            state: self.inner.state().to_string(),
            ready: self.inner.is_ready(),
            disposed: self.inner.is_disposed(),
            embed_url: self.inner.embed_url().to_string(),
            unavailable: self.inner.unavailable_reason().map(|e| e.to_string()),
        }
    }
}
