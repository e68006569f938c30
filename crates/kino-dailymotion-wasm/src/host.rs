//! Bridge from tech events to the host player object

use crate::dom::describe;
use kino_dailymotion::{Host, HostEvent, UiSignal};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Host supplied from JS.
///
/// The object is expected to expose `trigger(name, detail)` and
/// `signal(name)`; either may be missing.
pub struct JsHost {
    target: JsValue,
}

impl JsHost {
    pub fn new(target: JsValue) -> Self {
        Self { target }
    }

    fn invoke(&self, method: &str, args: &[JsValue]) {
        let function = js_sys::Reflect::get(&self.target, &JsValue::from_str(method))
            .ok()
            .and_then(|f| f.dyn_into::<js_sys::Function>().ok());
        let Some(function) = function else {
            return;
        };
        let args: js_sys::Array = args.iter().collect();
        if let Err(e) = function.apply(&self.target, &args) {
            web_sys::console::error_1(
                &format!("[Kino Dailymotion] host {} threw: {}", method, describe(&e)).into(),
            );
        }
    }
}

fn object(fields: &[(&str, JsValue)]) -> Result<JsValue, JsValue> {
    let object = js_sys::Object::new();
    for (key, value) in fields {
        js_sys::Reflect::set(&object, &JsValue::from_str(key), value)?;
    }
    Ok(object.into())
}

fn detail(event: &HostEvent) -> Result<JsValue, JsValue> {
    match event {
        HostEvent::StateChanged { from, to } => object(&[
            ("from", JsValue::from_str(&from.to_string())),
            ("to", JsValue::from_str(&to.to_string())),
        ]),
        HostEvent::Native(native) => match &native.detail {
            Some(message) => object(&[("message", JsValue::from_str(message))]),
            None => Ok(JsValue::UNDEFINED),
        },
        HostEvent::Error(error) => object(&[
            ("code", JsValue::from_str(error.error_code())),
            ("message", JsValue::from_str(&error.to_string())),
        ]),
        _ => Ok(JsValue::UNDEFINED),
    }
}

impl Host for JsHost {
    fn trigger(&self, event: HostEvent) {
        let detail = detail(&event).unwrap_or_else(|e| {
            web_sys::console::warn_1(
                &format!("[Kino Dailymotion] dropping {} detail: {}", event.name(), describe(&e))
                    .into(),
            );
            JsValue::UNDEFINED
        });
        self.invoke("trigger", &[JsValue::from_str(event.name()), detail]);
    }

    fn signal(&self, signal: UiSignal) {
        self.invoke("signal", &[JsValue::from_str(signal.as_str())]);
    }
}
