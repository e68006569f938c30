//! In-memory page, player, and host used by the integration tests

#![allow(dead_code)]

use kino_dailymotion::{
    Error, Host, HostEvent, Listener, MountSpec, NativeEvent, NativeEventKind, Platform,
    PlayerHandle, PlayerSpec, Result, Task, UiSignal,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

// =============================================================================
// Player handle
// =============================================================================

#[derive(Debug, Clone)]
pub struct PlayerProps {
    pub current_time: f64,
    pub duration: f64,
    pub paused: bool,
    pub ended: bool,
    pub volume: f64,
    pub muted: bool,
}

impl Default for PlayerProps {
    fn default() -> Self {
        Self {
            current_time: 0.0,
            duration: 0.0,
            paused: true,
            ended: false,
            volume: 1.0,
            muted: false,
        }
    }
}

pub struct FakeHandle {
    pub spec: PlayerSpec,
    pub props: RefCell<PlayerProps>,
    calls: RefCell<Vec<String>>,
    listeners: RefCell<Vec<(NativeEventKind, Listener)>>,
}

impl FakeHandle {
    fn new(spec: PlayerSpec) -> Self {
        Self {
            spec,
            props: RefCell::new(PlayerProps::default()),
            calls: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Deliver a native event to every listener registered for it
    pub fn emit(&self, event: impl Into<NativeEvent>) {
        let event = event.into();
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(kind, _)| *kind == event.kind)
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(event.clone());
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.as_str() == name).count()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    fn log(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }
}

impl PlayerHandle for FakeHandle {
    fn add_event_listener(&self, kind: NativeEventKind, listener: Listener) {
        self.listeners.borrow_mut().push((kind, listener));
    }

    fn remove_event_listeners(&self) {
        self.listeners.borrow_mut().clear();
    }

    fn play(&self) {
        self.log("play");
        self.props.borrow_mut().paused = false;
    }

    fn pause(&self) {
        self.log("pause");
        self.props.borrow_mut().paused = true;
    }

    fn seek(&self, seconds: f64) {
        self.log(format!("seek:{}", seconds));
        self.props.borrow_mut().current_time = seconds;
    }

    fn load(&self, video_id: &str) {
        self.log(format!("load:{}", video_id));
    }

    fn current_time(&self) -> f64 {
        self.props.borrow().current_time
    }

    fn duration(&self) -> f64 {
        self.props.borrow().duration
    }

    fn paused(&self) -> bool {
        self.props.borrow().paused
    }

    fn ended(&self) -> bool {
        self.props.borrow().ended
    }

    fn volume(&self) -> f64 {
        self.props.borrow().volume
    }

    fn set_volume(&self, volume: f64) {
        self.log(format!("volume:{}", volume));
        self.props.borrow_mut().volume = volume;
    }

    fn muted(&self) -> bool {
        self.props.borrow().muted
    }

    fn set_muted(&self, muted: bool) {
        self.log(format!("muted:{}", muted));
        self.props.borrow_mut().muted = muted;
    }
}

// =============================================================================
// Page
// =============================================================================

#[derive(Default)]
pub struct FakePage {
    pub origin: Option<String>,
    pub fail_create: Cell<bool>,
    mounted: RefCell<Vec<MountSpec>>,
    unmounted: RefCell<Vec<String>>,
    scripts: RefCell<Vec<String>>,
    players: RefCell<Vec<Rc<FakeHandle>>>,
    now: Cell<Duration>,
    timers: RefCell<Vec<(Duration, Task)>>,
}

impl FakePage {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            origin: Some("https://kino.test".to_string()),
            ..Default::default()
        })
    }

    pub fn mounted(&self) -> Vec<MountSpec> {
        self.mounted.borrow().clone()
    }

    pub fn unmounted(&self) -> Vec<String> {
        self.unmounted.borrow().clone()
    }

    pub fn scripts(&self) -> Vec<String> {
        self.scripts.borrow().clone()
    }

    pub fn players(&self) -> Vec<Rc<FakeHandle>> {
        self.players.borrow().clone()
    }

    /// Player created for the given element id
    pub fn player(&self, element_id: &str) -> Option<Rc<FakeHandle>> {
        self.players
            .borrow()
            .iter()
            .find(|p| p.spec.element_id == element_id)
            .cloned()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Move the clock forward and run every timer that became due
    pub fn advance(&self, by: Duration) {
        let now = self.now.get() + by;
        self.now.set(now);

        let due: Vec<Task> = {
            let mut timers = self.timers.borrow_mut();
            timers.sort_by_key(|(at, _)| *at);
            let split = timers.iter().take_while(|(at, _)| *at <= now).count();
            timers.drain(..split).map(|(_, task)| task).collect()
        };
        for task in due {
            task();
        }
    }
}

impl Platform for FakePage {
    fn page_origin(&self) -> Option<String> {
        self.origin.clone()
    }

    fn mount(&self, spec: &MountSpec) -> Result<()> {
        self.mounted.borrow_mut().push(spec.clone());
        Ok(())
    }

    fn unmount(&self, element_id: &str) {
        self.unmounted.borrow_mut().push(element_id.to_string());
    }

    fn inject_script(&self, url: &str) -> Result<()> {
        self.scripts.borrow_mut().push(url.to_string());
        Ok(())
    }

    fn create_player(&self, spec: &PlayerSpec) -> Result<Rc<dyn PlayerHandle>> {
        if self.fail_create.get() {
            return Err(Error::PlayerCreation("DM is not defined".into()));
        }
        let handle = Rc::new(FakeHandle::new(spec.clone()));
        self.players.borrow_mut().push(handle.clone());
        Ok(handle)
    }

    fn set_timeout(&self, delay: Duration, task: Task) {
        let at = self.now.get() + delay;
        self.timers.borrow_mut().push((at, task));
    }
}

// =============================================================================
// Host
// =============================================================================

#[derive(Default)]
pub struct RecordingHost {
    events: RefCell<Vec<HostEvent>>,
    signals: RefCell<Vec<UiSignal>>,
}

impl RecordingHost {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.events.borrow().clone()
    }

    pub fn event_names(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(|e| e.name()).collect()
    }

    pub fn count(&self, predicate: impl Fn(&HostEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| predicate(e)).count()
    }

    pub fn signals(&self) -> Vec<UiSignal> {
        self.signals.borrow().clone()
    }

    pub fn errors(&self) -> Vec<Error> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                HostEvent::Error(error) => Some(error.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
        self.signals.borrow_mut().clear();
    }
}

impl Host for RecordingHost {
    fn trigger(&self, event: HostEvent) {
        self.events.borrow_mut().push(event);
    }

    fn signal(&self, signal: UiSignal) {
        self.signals.borrow_mut().push(signal);
    }
}
