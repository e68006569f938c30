//! Kino Dailymotion WASM - browser binding for the Dailymotion tech
//!
//! Wires the platform-independent core to a real page:
//! - iframe mounting and `<script>` injection through `web-sys`
//! - the `window.dmAsyncInit` hook that releases waiting players
//! - `DM.player` control through `js-sys` reflection
//! - host notifications through a plain JS object
//!
//! ## Integration with video.js
//!
//! ```javascript
//! import init, { DailymotionTech, canPlaySource } from '@kino/dailymotion';
//!
//! await init();
//! if (canPlaySource(source.type)) {
//!   const tech = new DailymotionTech({ playerId: player.id(), src: source.src }, host);
//! }
//! ```

use wasm_bindgen::prelude::*;

mod dom;
mod host;
mod player;
mod tech;

pub use dom::BrowserPlatform;
pub use host::JsHost;
pub use player::DmPlayer;
pub use tech::WasmDailymotionTech;

use kino_dailymotion::{Error, TechConfig};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&"[Kino Dailymotion] Initialized".into());
}

/// Library version
#[wasm_bindgen]
pub fn version() -> String {
    kino_dailymotion::VERSION.to_string()
}

/// Override the page-wide configuration.
///
/// Only allowed before the first tech is created, since every tech on
/// the page shares one script loader.
#[wasm_bindgen]
pub fn configure(config: JsValue) -> Result<(), JsError> {
    let config: TechConfig = serde_wasm_bindgen::from_value(config)?;
    runtime::install(config)?;
    Ok(())
}

/// Same as [`configure`], from a JSON string
#[wasm_bindgen(js_name = configureJson)]
pub fn configure_json(json: &str) -> Result<(), JsError> {
    runtime::install(TechConfig::from_json(json)?)?;
    Ok(())
}

/// Effective configuration as a plain object
#[wasm_bindgen(js_name = currentConfig)]
pub fn current_config() -> Result<JsValue, JsError> {
    let (config, _, _) = runtime::parts();
    Ok(serde_wasm_bindgen::to_value(&config)?)
}

/// True for the `video/dailymotion` source type
#[wasm_bindgen(js_name = canPlaySource)]
pub fn can_play_source(mime_type: &str) -> bool {
    kino_dailymotion::can_play_source(mime_type)
}

/// Video id of a Dailymotion URL, if it has one
#[wasm_bindgen(js_name = parseVideoId)]
pub fn parse_video_id(url: &str) -> Option<String> {
    kino_dailymotion::parse_video_id(url)
}

#[wasm_bindgen(js_name = isSupported)]
pub fn is_supported() -> bool {
    kino_dailymotion::DailymotionTech::is_supported()
}

/// Status of the shared script loader ("idle", "loading", "ready", "failed")
#[wasm_bindgen(js_name = loaderStatus)]
pub fn loader_status() -> String {
    let (_, loader, _) = runtime::parts();
    loader.status().to_string()
}

/// Page-wide state shared by every tech
mod runtime {
    use super::*;
    use crate::dom::{api_present, BrowserPlatform};
    use kino_dailymotion::{Platform, ScriptLoader};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Runtime {
        config: TechConfig,
        loader: ScriptLoader,
        platform: Rc<BrowserPlatform>,
    }

    impl Runtime {
        fn new(config: TechConfig) -> Self {
            let loader = ScriptLoader::new(&config);
            let platform = Rc::new(BrowserPlatform::new(
                loader.clone(),
                config.global_callback.clone(),
            ));
            // another copy of the API may already be on the page
            if api_present() {
                loader.on_global_ready();
            }
            Self {
                config,
                loader,
                platform,
            }
        }
    }

    thread_local! {
        static RUNTIME: RefCell<Option<Runtime>> = const { RefCell::new(None) };
    }

    pub(crate) fn install(config: TechConfig) -> kino_dailymotion::Result<()> {
        config.validate()?;
        RUNTIME.with(|runtime| {
            let mut runtime = runtime.borrow_mut();
            if runtime.is_some() {
                return Err(Error::InvalidConfig(
                    "configure must be called before the first tech is created".into(),
                ));
            }
            *runtime = Some(Runtime::new(config));
            Ok(())
        })
    }

    /// Shared config, loader and platform, created on first use
    pub(crate) fn parts() -> (TechConfig, ScriptLoader, Rc<dyn Platform>) {
        RUNTIME.with(|runtime| {
            let mut runtime = runtime.borrow_mut();
            let runtime = runtime.get_or_insert_with(|| Runtime::new(TechConfig::default()));
            let platform: Rc<dyn Platform> = runtime.platform.clone();
            (runtime.config.clone(), runtime.loader.clone(), platform)
        })
    }
}
