//! Seams to the outside world
//!
//! The tech never touches the DOM or the Dailymotion API directly. It goes
//! through three traits:
//!
//! - [`Platform`] - the page: element mounting, script injection, timers,
//!   and construction of player handles
//! - [`PlayerHandle`] - the subset of the `DM.player` object the tech uses
//! - [`Host`] - the host player framework that receives events
//!
//! Everything runs on a single event loop, so none of these are `Send`.
//! Implementations use interior mutability; every method takes `&self`.

use crate::{
    events::{HostEvent, NativeEvent, NativeEventKind, UiSignal},
    params::EmbedParameters,
    Result,
};
use std::rc::Rc;
use std::time::Duration;

/// Callback invoked by a player handle for each native event
pub type Listener = Rc<dyn Fn(NativeEvent)>;

/// Deferred work scheduled on the event loop
pub type Task = Box<dyn FnOnce()>;

/// Control surface of a live Dailymotion player
pub trait PlayerHandle {
    fn add_event_listener(&self, kind: NativeEventKind, listener: Listener);

    /// Drop every listener registered through this handle
    fn remove_event_listeners(&self);

    fn play(&self);
    fn pause(&self);
    fn seek(&self, seconds: f64);

    /// Load a different video into the same player
    fn load(&self, video_id: &str);

    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;
    fn paused(&self) -> bool;
    fn ended(&self) -> bool;

    fn volume(&self) -> f64;
    fn set_volume(&self, volume: f64);
    fn muted(&self) -> bool;
    fn set_muted(&self, muted: bool);
}

/// Element inserted into the host player before the API is available
#[derive(Debug, Clone, PartialEq)]
pub struct MountSpec {
    /// Id of the host player element to insert into
    pub parent_id: String,
    /// Id of the new element
    pub element_id: String,
    pub tag: &'static str,
    pub class_name: &'static str,
    pub attributes: Vec<(&'static str, String)>,
    pub src: String,
}

impl MountSpec {
    /// Borderless, fullscreen-capable iframe
    pub fn iframe(parent_id: &str, element_id: &str, src: String) -> Self {
        Self {
            parent_id: parent_id.to_string(),
            element_id: element_id.to_string(),
            tag: "iframe",
            class_name: "vjs-tech",
            attributes: vec![
                ("scrolling", "no".to_string()),
                ("marginwidth", "0".to_string()),
                ("marginheight", "0".to_string()),
                ("frameborder", "0".to_string()),
                ("webkitallowfullscreen", String::new()),
                ("mozallowfullscreen", String::new()),
                ("allowfullscreen", String::new()),
            ],
            src,
        }
    }
}

/// Arguments for `new DM.player(...)`
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSpec {
    pub element_id: String,
    pub video_id: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub params: EmbedParameters,
}

/// Page-level services
pub trait Platform {
    /// Origin of the embedding page, `None` for `file:` pages
    fn page_origin(&self) -> Option<String>;

    fn mount(&self, spec: &MountSpec) -> Result<()>;
    fn unmount(&self, element_id: &str);

    /// Insert a `<script>` tag for the player API
    fn inject_script(&self, url: &str) -> Result<()>;

    fn create_player(&self, spec: &PlayerSpec) -> Result<Rc<dyn PlayerHandle>>;

    /// Run `task` on the event loop after `delay`
    fn set_timeout(&self, delay: Duration, task: Task);
}

/// Host player framework
pub trait Host {
    fn trigger(&self, event: HostEvent);
    fn signal(&self, signal: UiSignal);
}
