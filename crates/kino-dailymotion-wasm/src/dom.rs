//! Browser platform - DOM mounting, script injection, and timers

use crate::player::DmPlayer;
use kino_dailymotion::{
    params::page_origin, Error, MountSpec, ParamValue, Platform, PlayerHandle, PlayerSpec,
    Result, ScriptLoader, Task,
};
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlScriptElement, Window};

/// Render a thrown JS value as text
pub(crate) fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{:?}", value))
}

fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| Error::Mount("no window".into()))
}

fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| Error::Mount("no document".into()))
}

fn param_to_js(value: &ParamValue) -> JsValue {
    match value {
        ParamValue::Bool(v) => JsValue::from_bool(*v),
        ParamValue::Int(v) => JsValue::from_f64(*v as f64),
        ParamValue::Str(v) => JsValue::from_str(v),
    }
}

/// True if the page already has the Dailymotion API (`window.DM`)
pub(crate) fn api_present() -> bool {
    web_sys::window()
        .and_then(|w| js_sys::Reflect::get(&w, &JsValue::from_str("DM")).ok())
        .map(|dm| !dm.is_undefined() && !dm.is_null())
        .unwrap_or(false)
}

/// [`Platform`] backed by the real page
pub struct BrowserPlatform {
    loader: ScriptLoader,
    global_callback: String,
}

impl BrowserPlatform {
    pub fn new(loader: ScriptLoader, global_callback: impl Into<String>) -> Self {
        Self {
            loader,
            global_callback: global_callback.into(),
        }
    }

    /// Expose the loader's ready hook under the name the API script calls
    fn install_global_callback(&self, window: &Window) -> Result<()> {
        let loader = self.loader.clone();
        let callback = Closure::<dyn FnMut()>::new(move || loader.on_global_ready());
        js_sys::Reflect::set(
            window,
            &JsValue::from_str(&self.global_callback),
            callback.as_ref(),
        )
        .map_err(|e| Error::ScriptLoadFailed(describe(&e)))?;
        // lives as long as the page
        callback.forget();
        Ok(())
    }
}

impl Platform for BrowserPlatform {
    fn page_origin(&self) -> Option<String> {
        let href = web_sys::window()?.location().href().ok()?;
        page_origin(&href)
    }

    fn mount(&self, spec: &MountSpec) -> Result<()> {
        let document = document()?;
        let parent = document
            .get_element_by_id(&spec.parent_id)
            .ok_or_else(|| Error::Mount(format!("player element #{} not found", spec.parent_id)))?;

        let element = document
            .create_element(spec.tag)
            .map_err(|e| Error::Mount(describe(&e)))?;
        element.set_id(&spec.element_id);
        element.set_class_name(spec.class_name);
        for (name, value) in &spec.attributes {
            element
                .set_attribute(name, value)
                .map_err(|e| Error::Mount(describe(&e)))?;
        }
        element
            .set_attribute("src", &spec.src)
            .map_err(|e| Error::Mount(describe(&e)))?;

        parent
            .insert_before(&element, parent.first_child().as_ref())
            .map_err(|e| Error::Mount(describe(&e)))?;
        Ok(())
    }

    fn unmount(&self, element_id: &str) {
        if let Some(element) = document()
            .ok()
            .and_then(|d| d.get_element_by_id(element_id))
        {
            element.remove();
        }
    }

    fn inject_script(&self, url: &str) -> Result<()> {
        let window = window()?;
        let document = document()?;
        self.install_global_callback(&window)?;

        let script: HtmlScriptElement = document
            .create_element("script")
            .map_err(|e| Error::ScriptLoadFailed(describe(&e)))?
            .dyn_into()
            .map_err(|_| Error::ScriptLoadFailed("not a script element".into()))?;
        script.set_src(url);
        script.set_async(true);

        let loader = self.loader.clone();
        let src = url.to_string();
        let on_error = Closure::once_into_js(move || {
            loader.on_script_error(format!("could not load {}", src));
        });
        script.set_onerror(Some(on_error.unchecked_ref()));

        let first_script = document.get_elements_by_tag_name("script").item(0);
        let parent = first_script.as_ref().and_then(|s| s.parent_node());
        let inserted = match (first_script, parent) {
            (Some(first), Some(parent)) => {
                let first: &web_sys::Node = first.as_ref();
                parent.insert_before(&script, Some(first))
            }
            _ => {
                let head = document
                    .head()
                    .ok_or_else(|| Error::ScriptLoadFailed("document has no <head>".into()))?;
                head.append_child(&script)
            }
        };
        inserted.map_err(|e| Error::ScriptLoadFailed(describe(&e)))?;
        Ok(())
    }

    fn create_player(&self, spec: &PlayerSpec) -> Result<Rc<dyn PlayerHandle>> {
        let window = window()?;
        let dm = js_sys::Reflect::get(&window, &JsValue::from_str("DM"))
            .map_err(|e| Error::PlayerCreation(describe(&e)))?;
        let constructor: js_sys::Function = js_sys::Reflect::get(&dm, &JsValue::from_str("player"))
            .map_err(|e| Error::PlayerCreation(describe(&e)))?
            .dyn_into()
            .map_err(|_| Error::PlayerCreation("DM.player is not a constructor".into()))?;

        let params = js_sys::Object::new();
        for (key, value) in spec.params.iter() {
            js_sys::Reflect::set(&params, &JsValue::from_str(key), &param_to_js(value))
                .map_err(|e| Error::PlayerCreation(describe(&e)))?;
        }

        let options = js_sys::Object::new();
        let fields: [(&str, JsValue); 4] = [
            ("video", JsValue::from_str(&spec.video_id)),
            ("width", spec.width.map(JsValue::from).unwrap_or(JsValue::UNDEFINED)),
            ("height", spec.height.map(JsValue::from).unwrap_or(JsValue::UNDEFINED)),
            ("params", params.into()),
        ];
        for (key, value) in fields.iter() {
            if !value.is_undefined() {
                js_sys::Reflect::set(&options, &JsValue::from_str(key), value)
                    .map_err(|e| Error::PlayerCreation(describe(&e)))?;
            }
        }

        let args = js_sys::Array::of2(&JsValue::from_str(&spec.element_id), &options);
        let player = js_sys::Reflect::construct(&constructor, &args)
            .map_err(|e| Error::PlayerCreation(describe(&e)))?;
        Ok(Rc::new(DmPlayer::new(player)))
    }

    fn set_timeout(&self, delay: Duration, task: Task) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let callback = Closure::once_into_js(move || task());
        let millis = delay.as_millis().min(i32::MAX as u128) as i32;
        if let Err(e) = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis)
        {
            web_sys::console::warn_1(&format!("[Kino Dailymotion] setTimeout failed: {}", describe(&e)).into());
        }
    }
}
