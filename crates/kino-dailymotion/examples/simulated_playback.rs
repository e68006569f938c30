//! Simulated playback example
//!
//! Drives two Dailymotion techs through a fake page: both are created
//! before the API script has loaded, one of them asks to play early, and
//! the script then comes up and the players report their events.
//!
//! Run with: cargo run -p kino-dailymotion --example simulated_playback

use anyhow::Result;
use kino_dailymotion::{
    DailymotionTech, Host, HostEvent, Listener, MountSpec, NativeEvent, NativeEventKind,
    Platform, PlayerHandle, PlayerSpec, ScriptLoader, Task, TechConfig, TechOptions, UiSignal,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

/// Player that accepts calls and lets the example push events
#[derive(Default)]
struct SimPlayer {
    element_id: String,
    listeners: RefCell<Vec<(NativeEventKind, Listener)>>,
    volume: Cell<f64>,
    muted: Cell<bool>,
    paused: Cell<bool>,
}

impl SimPlayer {
    fn emit(&self, kind: NativeEventKind) {
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(NativeEvent::new(kind));
        }
    }
}

impl PlayerHandle for SimPlayer {
    fn add_event_listener(&self, kind: NativeEventKind, listener: Listener) {
        self.listeners.borrow_mut().push((kind, listener));
    }
    fn remove_event_listeners(&self) {
        self.listeners.borrow_mut().clear();
    }
    fn play(&self) {
        println!("  [{}] play()", self.element_id);
        self.paused.set(false);
    }
    fn pause(&self) {
        println!("  [{}] pause()", self.element_id);
        self.paused.set(true);
    }
    fn seek(&self, seconds: f64) {
        println!("  [{}] seek({})", self.element_id, seconds);
    }
    fn load(&self, video_id: &str) {
        println!("  [{}] load({})", self.element_id, video_id);
    }
    fn current_time(&self) -> f64 {
        0.0
    }
    fn duration(&self) -> f64 {
        212.0
    }
    fn paused(&self) -> bool {
        self.paused.get()
    }
    fn ended(&self) -> bool {
        false
    }
    fn volume(&self) -> f64 {
        self.volume.get()
    }
    fn set_volume(&self, volume: f64) {
        self.volume.set(volume);
    }
    fn muted(&self) -> bool {
        self.muted.get()
    }
    fn set_muted(&self, muted: bool) {
        self.muted.set(muted);
    }
}

#[derive(Default)]
struct SimPage {
    players: RefCell<Vec<Rc<SimPlayer>>>,
    timers: RefCell<Vec<Task>>,
}

impl SimPage {
    fn run_timers(&self) {
        let timers = std::mem::take(&mut *self.timers.borrow_mut());
        for task in timers {
            task();
        }
    }
}

impl Platform for SimPage {
    fn page_origin(&self) -> Option<String> {
        Some("https://kino-player.pages.dev".to_string())
    }
    fn mount(&self, spec: &MountSpec) -> kino_dailymotion::Result<()> {
        println!("  mount <{} id={}> into #{}", spec.tag, spec.element_id, spec.parent_id);
        Ok(())
    }
    fn unmount(&self, element_id: &str) {
        println!("  unmount #{}", element_id);
    }
    fn inject_script(&self, url: &str) -> kino_dailymotion::Result<()> {
        println!("  inject <script src={}>", url);
        Ok(())
    }
    fn create_player(&self, spec: &PlayerSpec) -> kino_dailymotion::Result<Rc<dyn PlayerHandle>> {
        println!("  new DM.player({}, video={})", spec.element_id, spec.video_id);
        let player = Rc::new(SimPlayer {
            element_id: spec.element_id.clone(),
            volume: Cell::new(1.0),
            paused: Cell::new(true),
            ..Default::default()
        });
        self.players.borrow_mut().push(player.clone());
        Ok(player)
    }
    fn set_timeout(&self, _delay: Duration, task: Task) {
        self.timers.borrow_mut().push(task);
    }
}

struct ConsoleHost(&'static str);

impl Host for ConsoleHost {
    fn trigger(&self, event: HostEvent) {
        match event {
            HostEvent::StateChanged { from, to } => println!("  {} <- statechange {} -> {}", self.0, from, to),
            other => println!("  {} <- {}", self.0, other.name()),
        }
    }
    fn signal(&self, signal: UiSignal) {
        println!("  {} <- ui:{}", self.0, signal.as_str());
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("kino_dailymotion=debug")
        .init();

    kino_dailymotion::init();

    let config = TechConfig::default();
    let page = Rc::new(SimPage::default());
    let loader = ScriptLoader::new(&config);

    println!("Creating techs before the API is loaded");
    println!("{}", "=".repeat(60));
    let first = DailymotionTech::new(
        TechOptions::new("player_1", "https://www.dailymotion.com/video/x7tgad0_kino-demo")
            .with_size(640, 360),
        config.clone(),
        page.clone(),
        Rc::new(ConsoleHost("player_1")),
        loader.clone(),
    )?;
    let second = DailymotionTech::new(
        TechOptions::new("player_2", "https://www.dailymotion.com/featured#video=x8abc")
            .with_autoplay(true),
        config.clone(),
        page.clone(),
        Rc::new(ConsoleHost("player_2")),
        loader.clone(),
    )?;

    first.play()?;
    first.set_volume(0.6)?;
    println!("  loader: {}, queued: {}", loader.status(), loader.queued_len());

    println!("\nAPI script ready");
    println!("{}", "=".repeat(60));
    loader.on_global_ready();

    println!("\nPlayers report apiready");
    println!("{}", "=".repeat(60));
    for player in page.players.borrow().iter() {
        player.emit(NativeEventKind::ApiReady);
    }

    println!("\nPlayback");
    println!("{}", "=".repeat(60));
    let players = page.players.borrow().clone();
    players[0].emit(NativeEventKind::Playing);
    players[0].emit(NativeEventKind::TimeUpdate);
    players[0].emit(NativeEventKind::TimeUpdate);
    first.set_muted(true)?;
    page.run_timers();
    println!("  duration: {:?}, volume: {}", first.duration()?, first.volume()?);

    println!("\nTeardown");
    println!("{}", "=".repeat(60));
    first.dispose();
    second.dispose();
    println!("  play after dispose: {:?}", first.play());

    Ok(())
}
