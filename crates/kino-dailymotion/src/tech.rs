//! Dailymotion tech - one embedded player
//!
//! Coordinates:
//! - Mount element creation (synchronous, at construction)
//! - Waiting on the shared [`ScriptLoader`]
//! - Player handle creation and event subscription
//! - Control calls, forwarded or deferred until ready
//! - Disposal

use crate::{
    config::{TechConfig, TechOptions},
    events::{EventTranslator, HostEvent, NativeEvent, NativeEventKind, NormalizedState, Reaction, UiSignal},
    intent::{Intent, IntentQueue},
    loader::{ScriptLoader, Waiter},
    params::EmbedParameters,
    platform::{Host, MountSpec, Platform, PlayerHandle, PlayerSpec},
    source::SourceUrl,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, info, instrument, warn};

/// Id of the tech's mount element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TechId(String);

impl TechId {
    pub fn new(player_id: &str, suffix: &str) -> Self {
        Self(format!("{}{}", player_id, suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TechId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Feature flags reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechCapabilities {
    /// The iframe follows the player size in fullscreen
    pub fullscreen_resize: bool,
    /// Native fullscreen API on the tech itself
    pub supports_fullscreen: bool,
}

impl Default for TechCapabilities {
    fn default() -> Self {
        Self {
            fullscreen_resize: true,
            supports_fullscreen: false,
        }
    }
}

/// Relationship between the tech and its player handle
enum Binding {
    /// Waiting for the API script
    Pending,
    /// Handle created, `apiready` not seen yet
    Attached(Rc<dyn PlayerHandle>),
    Ready(Rc<dyn PlayerHandle>),
    /// No handle will ever be created
    Unavailable(Error),
    Disposed,
}

impl Binding {
    fn handle(&self) -> Option<&Rc<dyn PlayerHandle>> {
        match self {
            Binding::Attached(handle) | Binding::Ready(handle) => Some(handle),
            _ => None,
        }
    }
}

struct TechState {
    source: SourceUrl,
    binding: Binding,
    translator: EventTranslator,
    intents: IntentQueue,
    volume: Option<f64>,
}

struct TechShared {
    id: TechId,
    options: TechOptions,
    config: TechConfig,
    params: EmbedParameters,
    embed_url: String,
    platform: Rc<dyn Platform>,
    host: Rc<dyn Host>,
    loader: ScriptLoader,
    state: RefCell<TechState>,
}

impl Waiter for TechShared {
    fn waiter_id(&self) -> &str {
        self.id.as_str()
    }

    fn on_script_ready(self: Rc<Self>) {
        DailymotionTech { shared: self }.attach();
    }

    fn on_script_failed(self: Rc<Self>, error: Error) {
        DailymotionTech { shared: self }.fail(error);
    }
}

/// Media tech backed by an embedded Dailymotion player.
///
/// Cloning is cheap and yields another reference to the same player.
#[derive(Clone)]
pub struct DailymotionTech {
    shared: Rc<TechShared>,
}

impl DailymotionTech {
    /// Create the tech, mount its element, and start waiting for the API.
    ///
    /// A source without a recognizable video id still yields a tech; it
    /// simply never gets a player.
    #[instrument(skip_all, fields(player = %options.player_id))]
    pub fn new(
        options: TechOptions,
        config: TechConfig,
        platform: Rc<dyn Platform>,
        host: Rc<dyn Host>,
        loader: ScriptLoader,
    ) -> Result<Self> {
        config.validate()?;

        let id = TechId::new(&options.player_id, &config.id_suffix);
        let source = SourceUrl::parse(options.source_url.clone());
        let params =
            EmbedParameters::for_source(id.as_str(), &source, &options, platform.page_origin());
        let embed_url = params.embed_url(&config.embed_base_url);

        platform.mount(&MountSpec::iframe(
            &options.player_id,
            id.as_str(),
            embed_url.clone(),
        ))?;

        let mut intents = IntentQueue::new();
        if options.autoplay {
            host.signal(UiSignal::HideStartAffordance);
            intents.record(Intent::Play);
        }

        let binding = match source.video_id {
            Some(_) => Binding::Pending,
            None => {
                warn!(src = %source, "No Dailymotion video id in source");
                Binding::Unavailable(Error::UnparsableSource(source.raw.clone()))
            }
        };
        let playable = matches!(binding, Binding::Pending);

        info!(id = %id, video_id = ?source.video_id, "Creating Dailymotion tech");

        let translator = EventTranslator::new(options.native_controls);
        let shared = Rc::new(TechShared {
            id,
            options,
            config,
            params,
            embed_url,
            platform,
            host,
            loader,
            state: RefCell::new(TechState {
                source,
                binding,
                translator,
                intents,
                volume: None,
            }),
        });
        let tech = DailymotionTech { shared };

        if playable {
            tech.register();
        }
        Ok(tech)
    }

    /// Always available; the API is loaded on demand
    pub fn is_supported() -> bool {
        true
    }

    pub fn id(&self) -> &TechId {
        &self.shared.id
    }

    pub fn options(&self) -> &TechOptions {
        &self.shared.options
    }

    pub fn params(&self) -> &EmbedParameters {
        &self.shared.params
    }

    /// URL the mount iframe was created with
    pub fn embed_url(&self) -> &str {
        &self.shared.embed_url
    }

    pub fn capabilities(&self) -> TechCapabilities {
        TechCapabilities::default()
    }

    pub fn video_id(&self) -> Option<String> {
        self.shared.state.borrow().source.video_id.clone()
    }

    /// Last normalized state seen from the player
    pub fn state(&self) -> NormalizedState {
        self.shared.state.borrow().translator.state()
    }

    /// True once the player has reported `apiready`
    pub fn is_ready(&self) -> bool {
        matches!(self.shared.state.borrow().binding, Binding::Ready(_))
    }

    /// True once a player handle exists
    pub fn has_handle(&self) -> bool {
        self.shared.state.borrow().binding.handle().is_some()
    }

    pub fn is_disposed(&self) -> bool {
        matches!(self.shared.state.borrow().binding, Binding::Disposed)
    }

    /// Why this tech will never get a player, if that is the case
    pub fn unavailable_reason(&self) -> Option<Error> {
        match &self.shared.state.borrow().binding {
            Binding::Unavailable(error) => Some(error.clone()),
            _ => None,
        }
    }

    /// Source URL once the player is ready
    pub fn current_src(&self) -> Option<String> {
        let state = self.shared.state.borrow();
        match state.binding {
            Binding::Ready(_) => Some(state.source.raw.clone()),
            _ => None,
        }
    }

    // ---------------------------------------------------------------------
    // Control surface
    // ---------------------------------------------------------------------

    pub fn play(&self) -> Result<()> {
        match self.ready_handle()? {
            Some(handle) => {
                debug!(id = %self.shared.id, "play");
                handle.play();
            }
            None => {
                self.record(Intent::Play);
                if !self.shared.options.native_controls {
                    // keep the start button until playback really starts
                    self.shared.host.signal(UiSignal::ShowStartAffordance);
                }
            }
        }
        Ok(())
    }

    pub fn pause(&self) -> Result<()> {
        match self.ready_handle()? {
            Some(handle) => handle.pause(),
            None => self.record(Intent::Pause),
        }
        Ok(())
    }

    /// Seek to `seconds` (negative values clamp to 0)
    pub fn seek(&self, seconds: f64) -> Result<()> {
        let seconds = seconds.max(0.0);
        match self.ready_handle()? {
            Some(handle) => {
                handle.seek(seconds);
                self.shared.host.trigger(HostEvent::TimeUpdate);
            }
            None => self.record(Intent::Seek(seconds)),
        }
        Ok(())
    }

    /// Playback position, 0 until ready
    pub fn current_time(&self) -> Result<f64> {
        Ok(self
            .ready_handle()?
            .map(|handle| handle.current_time())
            .unwrap_or(0.0))
    }

    /// Content duration, `None` while unknown
    pub fn duration(&self) -> Result<Option<f64>> {
        Ok(self
            .ready_handle()?
            .map(|handle| handle.duration())
            .filter(|d| d.is_finite() && *d > 0.0))
    }

    pub fn volume(&self) -> Result<f64> {
        let handle = self.ready_handle()?;
        let mut state = self.shared.state.borrow_mut();
        if let Some(volume) = state.volume {
            return Ok(volume);
        }
        match handle {
            Some(handle) => {
                let volume = handle.volume();
                state.volume = Some(volume);
                Ok(volume)
            }
            None => Ok(state.intents.pending_volume().unwrap_or(1.0)),
        }
    }

    /// Set the volume (0.0 - 1.0). Setting the current value again is a no-op.
    pub fn set_volume(&self, volume: f64) -> Result<()> {
        if volume.is_nan() {
            return Err(Error::InvalidVolume(volume));
        }
        let volume = volume.clamp(0.0, 1.0);
        let handle = self.ready_handle()?;

        {
            let state = self.shared.state.borrow();
            if state.volume == Some(volume) {
                return Ok(());
            }
            if handle.is_none() && state.intents.pending_volume() == Some(volume) {
                return Ok(());
            }
        }

        match handle {
            Some(handle) => {
                handle.set_volume(volume);
                self.shared.state.borrow_mut().volume = Some(volume);
                self.shared.host.trigger(HostEvent::VolumeChange);
            }
            None => self.record(Intent::SetVolume(volume)),
        }
        Ok(())
    }

    pub fn muted(&self) -> Result<bool> {
        match self.ready_handle()? {
            Some(handle) => Ok(handle.muted()),
            None => Ok(self
                .shared
                .state
                .borrow()
                .intents
                .pending_muted()
                .unwrap_or(false)),
        }
    }

    /// Mute or unmute. The host hears about it after the player had time
    /// to apply the change.
    pub fn set_muted(&self, muted: bool) -> Result<()> {
        match self.ready_handle()? {
            Some(handle) => {
                handle.set_muted(muted);
                let weak = Rc::downgrade(&self.shared);
                self.shared.platform.set_timeout(
                    self.shared.config.muted_notify_delay(),
                    Box::new(move || notify_volume_change(&weak)),
                );
            }
            None => self.record(Intent::SetMuted(muted)),
        }
        Ok(())
    }

    /// True until playback has started
    pub fn paused(&self) -> Result<bool> {
        Ok(self
            .ready_handle()?
            .map(|handle| handle.paused())
            .unwrap_or(true))
    }

    pub fn ended(&self) -> Result<bool> {
        Ok(self
            .ready_handle()?
            .map(|handle| handle.ended())
            .unwrap_or(false))
    }

    /// Switch to another Dailymotion video
    #[instrument(skip(self), fields(id = %self.shared.id))]
    pub fn set_source(&self, src: &str) -> Result<()> {
        let source = SourceUrl::parse(src);
        let Some(video_id) = source.video_id.clone() else {
            return Err(Error::UnparsableSource(src.to_string()));
        };

        let (handle, register) = {
            let mut state = self.shared.state.borrow_mut();
            if matches!(state.binding, Binding::Disposed) {
                return Err(Error::disposed(self.shared.id.as_str()));
            }
            let register = matches!(
                state.binding,
                Binding::Unavailable(Error::UnparsableSource(_))
            );
            if register {
                state.binding = Binding::Pending;
            }
            state.source = source;
            (state.binding.handle().cloned(), register)
        };

        info!(video_id = %video_id, "Changing source");
        if let Some(handle) = handle {
            handle.load(&video_id);
        }
        if register {
            self.register();
        }
        Ok(())
    }

    /// Remove the player from the page. Safe to call more than once.
    pub fn dispose(&self) {
        let previous = {
            let mut state = self.shared.state.borrow_mut();
            state.intents.clear();
            std::mem::replace(&mut state.binding, Binding::Disposed)
        };
        if matches!(previous, Binding::Disposed) {
            return;
        }

        self.shared.loader.cancel(self.shared.id.as_str());
        if let Some(handle) = previous.handle() {
            handle.remove_event_listeners();
        }
        self.shared.platform.unmount(self.shared.id.as_str());
        info!(id = %self.shared.id, "Disposed Dailymotion tech");
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    fn register(&self) {
        let waiter: Rc<dyn Waiter> = self.shared.clone();
        self.shared
            .loader
            .register(self.shared.platform.as_ref(), waiter);
    }

    /// Create the player handle and subscribe to its events
    fn attach(&self) {
        let spec = {
            let state = self.shared.state.borrow();
            if !matches!(state.binding, Binding::Pending) {
                debug!(id = %self.shared.id, "Skipping attach, tech no longer pending");
                return;
            }
            let Some(video_id) = state.source.video_id.clone() else {
                return;
            };
            PlayerSpec {
                element_id: self.shared.id.to_string(),
                video_id,
                width: self.shared.options.width,
                height: self.shared.options.height,
                params: self.shared.params.clone(),
            }
        };

        let handle = match self.shared.platform.create_player(&spec) {
            Ok(handle) => handle,
            Err(e) => {
                self.fail(e);
                return;
            }
        };

        for kind in NativeEventKind::ALL {
            let weak = Rc::downgrade(&self.shared);
            handle.add_event_listener(
                kind,
                Rc::new(move |event: NativeEvent| {
                    if let Some(shared) = weak.upgrade() {
                        DailymotionTech { shared }.handle_native_event(event);
                    }
                }),
            );
        }

        info!(id = %self.shared.id, video_id = %spec.video_id, "Player attached");
        self.shared.state.borrow_mut().binding = Binding::Attached(handle);
    }

    fn fail(&self, error: Error) {
        {
            let mut state = self.shared.state.borrow_mut();
            if !matches!(state.binding, Binding::Pending) {
                return;
            }
            state.binding = Binding::Unavailable(error.clone());
        }
        warn!(id = %self.shared.id, error = %error, "Player unavailable");
        self.shared.host.trigger(HostEvent::Error(error));
    }

    /// Entry point for every event coming from the player
    pub(crate) fn handle_native_event(&self, event: NativeEvent) {
        let translation = {
            let mut state = self.shared.state.borrow_mut();
            if state.binding.handle().is_none() {
                return;
            }
            if event.kind == NativeEventKind::VolumeChange {
                // changed from the embed's own controls; reread on demand
                state.volume = None;
            }
            let translation = state.translator.observe(event.kind);
            if translation.entered(NormalizedState::Ready) {
                let attached = match &state.binding {
                    Binding::Attached(handle) => Some(handle.clone()),
                    _ => None,
                };
                if let Some(handle) = attached {
                    state.binding = Binding::Ready(handle);
                }
            }
            translation
        };

        if let Some((from, to)) = translation.transition {
            debug!(id = %self.shared.id, from = %from, to = %to, "State transition");
        }

        for reaction in translation.reactions {
            match reaction {
                Reaction::Emit(host_event) => self.shared.host.trigger(host_event),
                Reaction::Signal(signal) => self.shared.host.signal(signal),
                Reaction::ReplayIntents => self.replay_intents(),
            }
        }

        let error = (event.kind == NativeEventKind::Error).then(|| {
            Error::Native(
                event
                    .detail
                    .clone()
                    .unwrap_or_else(|| "unknown player error".to_string()),
            )
        });
        self.shared.host.trigger(HostEvent::Native(event));
        if let Some(error) = error {
            self.shared.host.trigger(HostEvent::Error(error));
        }
    }

    fn replay_intents(&self) {
        let intents = self.shared.state.borrow_mut().intents.drain();
        if intents.is_empty() {
            return;
        }
        debug!(id = %self.shared.id, count = intents.len(), "Replaying deferred calls");

        for intent in intents {
            let result = match intent {
                Intent::Play => self.play(),
                Intent::Pause => self.pause(),
                Intent::Seek(seconds) => self.seek(seconds),
                Intent::SetVolume(volume) => self.set_volume(volume),
                Intent::SetMuted(muted) => self.set_muted(muted),
            };
            if let Err(e) = result {
                warn!(id = %self.shared.id, ?intent, error = %e, "Deferred call failed");
            }
        }
    }

    fn record(&self, intent: Intent) {
        if self.shared.state.borrow_mut().intents.record(intent) {
            debug!(id = %self.shared.id, ?intent, "Deferred until player is ready");
        }
    }

    /// `Ok(Some)` when ready, `Ok(None)` before, `Err` after disposal
    fn ready_handle(&self) -> Result<Option<Rc<dyn PlayerHandle>>> {
        match &self.shared.state.borrow().binding {
            Binding::Ready(handle) => Ok(Some(handle.clone())),
            Binding::Disposed => Err(Error::disposed(self.shared.id.as_str())),
            _ => Ok(None),
        }
    }
}

fn notify_volume_change(weak: &Weak<TechShared>) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let disposed = matches!(shared.state.borrow().binding, Binding::Disposed);
    if !disposed {
        shared.host.trigger(HostEvent::VolumeChange);
    }
}

impl std::fmt::Debug for DailymotionTech {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DailymotionTech")
            .field("id", &self.shared.id)
            .field("video_id", &self.video_id())
            .field("state", &self.state())
            .field("ready", &self.is_ready())
            .finish()
    }
}
