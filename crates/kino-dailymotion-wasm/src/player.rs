//! `DM.player` wrapper

use crate::dom::describe;
use kino_dailymotion::{Listener, NativeEvent, NativeEventKind, PlayerHandle};
use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

type JsListener = Closure<dyn FnMut(JsValue)>;

/// Live Dailymotion player object.
///
/// Listener closures are owned here so they stay callable until
/// [`PlayerHandle::remove_event_listeners`] detaches them.
pub struct DmPlayer {
    player: JsValue,
    listeners: RefCell<Vec<(NativeEventKind, JsListener)>>,
}

impl DmPlayer {
    pub fn new(player: JsValue) -> Self {
        Self {
            player,
            listeners: RefCell::new(Vec::new()),
        }
    }

    fn get(&self, name: &str) -> JsValue {
        js_sys::Reflect::get(&self.player, &JsValue::from_str(name)).unwrap_or(JsValue::UNDEFINED)
    }

    fn number(&self, name: &str) -> f64 {
        self.get(name).as_f64().unwrap_or(f64::NAN)
    }

    fn flag(&self, name: &str) -> bool {
        self.get(name).as_bool().unwrap_or(false)
    }

    fn call(&self, method: &str, args: &[JsValue]) {
        let function = match self.get(method).dyn_into::<js_sys::Function>() {
            Ok(function) => function,
            Err(_) => {
                web_sys::console::warn_1(
                    &format!("[Kino Dailymotion] player has no method {}", method).into(),
                );
                return;
            }
        };
        let args: js_sys::Array = args.iter().collect();
        if let Err(e) = function.apply(&self.player, &args) {
            web_sys::console::warn_1(
                &format!("[Kino Dailymotion] {} failed: {}", method, describe(&e)).into(),
            );
        }
    }

    /// Message of the player's current error, if it exposes one
    fn error_detail(&self, event: &JsValue) -> Option<String> {
        let from = |value: &JsValue| {
            js_sys::Reflect::get(value, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        };
        from(event).or_else(|| {
            let error = self.get("error");
            if error.is_object() {
                from(&error)
            } else {
                None
            }
        })
    }
}

impl PlayerHandle for DmPlayer {
    fn add_event_listener(&self, kind: NativeEventKind, listener: Listener) {
        let player = self.player.clone();
        let handle = DmPlayer::new(player);
        let closure = JsListener::new(move |event: JsValue| {
            let native = match kind {
                NativeEventKind::Error => match handle.error_detail(&event) {
                    Some(detail) => NativeEvent::with_detail(kind, detail),
                    None => NativeEvent::new(kind),
                },
                _ => NativeEvent::new(kind),
            };
            listener(native);
        });
        self.call(
            "addEventListener",
            &[JsValue::from_str(kind.as_str()), closure.as_ref().clone()],
        );
        self.listeners.borrow_mut().push((kind, closure));
    }

    fn remove_event_listeners(&self) {
        let listeners = std::mem::take(&mut *self.listeners.borrow_mut());
        for (kind, closure) in &listeners {
            self.call(
                "removeEventListener",
                &[JsValue::from_str(kind.as_str()), closure.as_ref().clone()],
            );
        }
    }

    fn play(&self) {
        self.call("play", &[]);
    }

    fn pause(&self) {
        self.call("pause", &[]);
    }

    fn seek(&self, seconds: f64) {
        self.call("seek", &[JsValue::from_f64(seconds)]);
    }

    fn load(&self, video_id: &str) {
        self.call("load", &[JsValue::from_str(video_id)]);
    }

    fn current_time(&self) -> f64 {
        self.number("currentTime")
    }

    fn duration(&self) -> f64 {
        self.number("duration")
    }

    fn paused(&self) -> bool {
        self.flag("paused")
    }

    fn ended(&self) -> bool {
        self.flag("ended")
    }

    fn volume(&self) -> f64 {
        self.number("volume")
    }

    fn set_volume(&self, volume: f64) {
        self.call("setVolume", &[JsValue::from_f64(volume)]);
    }

    fn muted(&self) -> bool {
        self.flag("muted")
    }

    fn set_muted(&self, muted: bool) {
        self.call("setMuted", &[JsValue::from_bool(muted)]);
    }
}
