//! Native event vocabulary and translation into host events
//!
//! The Dailymotion player reports its lifecycle through a fixed set of
//! HTML5-style event names. Each one is mapped onto a [`NormalizedState`]
//! (or onto nothing, for purely informational events). The
//! [`EventTranslator`] keeps the last observed state and only reacts on
//! real transitions.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Events the player handle can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NativeEventKind {
    ApiReady,
    Play,
    Playing,
    Pause,
    Ended,
    CanPlay,
    CanPlayThrough,
    TimeUpdate,
    Progress,
    Seeking,
    Seeked,
    VolumeChange,
    DurationChange,
    FullscreenChange,
    Error,
}

impl NativeEventKind {
    /// Every event the tech subscribes to
    pub const ALL: [NativeEventKind; 15] = [
        NativeEventKind::ApiReady,
        NativeEventKind::Play,
        NativeEventKind::Playing,
        NativeEventKind::Pause,
        NativeEventKind::Ended,
        NativeEventKind::CanPlay,
        NativeEventKind::CanPlayThrough,
        NativeEventKind::TimeUpdate,
        NativeEventKind::Progress,
        NativeEventKind::Seeking,
        NativeEventKind::Seeked,
        NativeEventKind::VolumeChange,
        NativeEventKind::DurationChange,
        NativeEventKind::FullscreenChange,
        NativeEventKind::Error,
    ];

    /// Event name as used by the player API
    pub fn as_str(&self) -> &'static str {
        match self {
            NativeEventKind::ApiReady => "apiready",
            NativeEventKind::Play => "play",
            NativeEventKind::Playing => "playing",
            NativeEventKind::Pause => "pause",
            NativeEventKind::Ended => "ended",
            NativeEventKind::CanPlay => "canplay",
            NativeEventKind::CanPlayThrough => "canplaythrough",
            NativeEventKind::TimeUpdate => "timeupdate",
            NativeEventKind::Progress => "progress",
            NativeEventKind::Seeking => "seeking",
            NativeEventKind::Seeked => "seeked",
            NativeEventKind::VolumeChange => "volumechange",
            NativeEventKind::DurationChange => "durationchange",
            NativeEventKind::FullscreenChange => "fullscreenchange",
            NativeEventKind::Error => "error",
        }
    }

    /// Lifecycle state implied by this event, if any
    pub fn normalized_state(&self) -> Option<NormalizedState> {
        match self {
            NativeEventKind::ApiReady => Some(NormalizedState::Ready),
            NativeEventKind::Play | NativeEventKind::Playing | NativeEventKind::TimeUpdate => {
                Some(NormalizedState::Playing)
            }
            NativeEventKind::Pause => Some(NormalizedState::Paused),
            NativeEventKind::Ended => Some(NormalizedState::Ended),
            NativeEventKind::Error => Some(NormalizedState::Error),
            NativeEventKind::CanPlay
            | NativeEventKind::CanPlayThrough
            | NativeEventKind::Progress
            | NativeEventKind::Seeking
            | NativeEventKind::Seeked
            | NativeEventKind::VolumeChange
            | NativeEventKind::DurationChange
            | NativeEventKind::FullscreenChange => None,
        }
    }
}

impl FromStr for NativeEventKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NativeEventKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::Native(format!("unknown event: {}", s)))
    }
}

impl std::fmt::Display for NativeEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An event received from the player handle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeEvent {
    pub kind: NativeEventKind,
    /// Free-form payload (error message for `error` events)
    pub detail: Option<String>,
}

impl NativeEvent {
    pub fn new(kind: NativeEventKind) -> Self {
        Self { kind, detail: None }
    }

    pub fn with_detail(kind: NativeEventKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: Some(detail.into()),
        }
    }
}

impl From<NativeEventKind> for NativeEvent {
    fn from(kind: NativeEventKind) -> Self {
        NativeEvent::new(kind)
    }
}

/// Simplified playback lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizedState {
    #[default]
    Unstarted,
    Ready,
    Playing,
    Paused,
    Ended,
    Error,
}

impl std::fmt::Display for NormalizedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizedState::Unstarted => write!(f, "unstarted"),
            NormalizedState::Ready => write!(f, "ready"),
            NormalizedState::Playing => write!(f, "playing"),
            NormalizedState::Paused => write!(f, "paused"),
            NormalizedState::Ended => write!(f, "ended"),
            NormalizedState::Error => write!(f, "error"),
        }
    }
}

/// Events delivered to the host framework
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// The player API is usable
    TechReady,
    /// The tech finished its own setup
    Ready,
    DurationChange,
    VolumeChange,
    TimeUpdate,
    /// Normalized state moved (emitted once per transition)
    StateChanged {
        from: NormalizedState,
        to: NormalizedState,
    },
    /// Player event republished as-is
    Native(NativeEvent),
    Error(Error),
}

impl HostEvent {
    /// Event name the host dispatches on
    pub fn name(&self) -> &'static str {
        match self {
            HostEvent::TechReady => "techready",
            HostEvent::Ready => "ready",
            HostEvent::DurationChange => "durationchange",
            HostEvent::VolumeChange => "volumechange",
            HostEvent::TimeUpdate => "timeupdate",
            HostEvent::StateChanged { .. } => "statechange",
            HostEvent::Native(event) => event.kind.as_str(),
            HostEvent::Error(_) => "error",
        }
    }
}

/// Chrome hints for the host (start button, spinner)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiSignal {
    ShowStartAffordance,
    HideStartAffordance,
    HideLoadingIndicator,
}

impl UiSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            UiSignal::ShowStartAffordance => "show-start",
            UiSignal::HideStartAffordance => "hide-start",
            UiSignal::HideLoadingIndicator => "hide-loading",
        }
    }
}

/// What the tech should do in response to a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Reaction {
    Emit(HostEvent),
    Signal(UiSignal),
    /// Run the intents recorded before the player was ready
    ReplayIntents,
}

/// Result of observing one native event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Translation {
    /// `(from, to)` when the state actually changed
    pub transition: Option<(NormalizedState, NormalizedState)>,
    pub reactions: Vec<Reaction>,
}

impl Translation {
    pub fn changed(&self) -> bool {
        self.transition.is_some()
    }

    pub fn entered(&self, state: NormalizedState) -> bool {
        matches!(self.transition, Some((_, to)) if to == state)
    }
}

/// Edge detector over native events
#[derive(Debug, Clone, Default)]
pub struct EventTranslator {
    last: NormalizedState,
    /// Raw kind of the previous event, for progress edges
    last_kind: Option<NativeEventKind>,
    native_controls: bool,
}

impl EventTranslator {
    pub fn new(native_controls: bool) -> Self {
        Self {
            last: NormalizedState::Unstarted,
            last_kind: None,
            native_controls,
        }
    }

    /// Last observed state
    pub fn state(&self) -> NormalizedState {
        self.last
    }

    /// Feed a native event.
    ///
    /// State reactions are only produced on a state change. The loading
    /// indicator is hidden whenever `timeupdate` follows any other event,
    /// so playback resuming after a seek or stall clears it again.
    pub fn observe(&mut self, kind: NativeEventKind) -> Translation {
        let previous = self.last_kind.replace(kind);
        let progressed =
            kind == NativeEventKind::TimeUpdate && previous != Some(NativeEventKind::TimeUpdate);

        let mut translation = self.transition(kind);
        if progressed {
            translation
                .reactions
                .push(Reaction::Signal(UiSignal::HideLoadingIndicator));
        }
        translation
    }

    fn transition(&mut self, kind: NativeEventKind) -> Translation {
        let Some(next) = kind.normalized_state() else {
            return Translation::default();
        };
        if next == self.last {
            return Translation::default();
        }

        let from = std::mem::replace(&mut self.last, next);
        let mut reactions = vec![Reaction::Emit(HostEvent::StateChanged { from, to: next })];

        match next {
            NormalizedState::Ready => {
                reactions.push(Reaction::Emit(HostEvent::TechReady));
                reactions.push(Reaction::Emit(HostEvent::Ready));
                reactions.push(Reaction::Emit(HostEvent::DurationChange));
                reactions.push(Reaction::ReplayIntents);
            }
            NormalizedState::Ended if !self.native_controls => {
                reactions.push(Reaction::Signal(UiSignal::ShowStartAffordance));
            }
            _ => {}
        }

        Translation {
            transition: Some((from, next)),
            reactions,
        }
    }
}
