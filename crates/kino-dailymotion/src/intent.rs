//! Deferred control intents
//!
//! Calls made before the player is ready are recorded here and replayed,
//! in order, once the player reports `apiready`.

use serde::{Deserialize, Serialize};

/// A control call waiting for the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum Intent {
    Play,
    Pause,
    Seek(f64),
    SetVolume(f64),
    SetMuted(bool),
}

impl Intent {
    /// Intents that cancel each other out or replace one another
    fn supersedes(&self, other: &Intent) -> bool {
        use Intent::*;
        matches!(
            (self, other),
            (Play, Play)
                | (Play, Pause)
                | (Pause, Play)
                | (Pause, Pause)
                | (Seek(_), Seek(_))
                | (SetVolume(_), SetVolume(_))
                | (SetMuted(_), SetMuted(_))
        )
    }
}

/// Ordered, coalescing list of pending intents
#[derive(Debug, Clone, Default)]
pub struct IntentQueue {
    pending: Vec<Intent>,
    drained: bool,
}

impl IntentQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an intent; returns false once the queue has been replayed
    pub fn record(&mut self, intent: Intent) -> bool {
        if self.drained {
            return false;
        }
        self.pending.retain(|existing| !intent.supersedes(existing));
        self.pending.push(intent);
        true
    }

    pub fn contains(&self, intent: &Intent) -> bool {
        self.pending.contains(intent)
    }

    /// Latest pending value for a volume change
    pub fn pending_volume(&self) -> Option<f64> {
        self.pending.iter().rev().find_map(|intent| match intent {
            Intent::SetVolume(v) => Some(*v),
            _ => None,
        })
    }

    /// Latest pending value for a mute change
    pub fn pending_muted(&self) -> Option<bool> {
        self.pending.iter().rev().find_map(|intent| match intent {
            Intent::SetMuted(m) => Some(*m),
            _ => None,
        })
    }

    /// Take every intent for replay; the queue refuses new ones afterwards
    pub fn drain(&mut self) -> Vec<Intent> {
        self.drained = true;
        std::mem::take(&mut self.pending)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn is_drained(&self) -> bool {
        self.drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_recorded_once() {
        let mut queue = IntentQueue::new();
        queue.record(Intent::Play);
        queue.record(Intent::Play);
        assert_eq!(queue.drain(), vec![Intent::Play]);
    }

    #[test]
    fn test_pause_cancels_play() {
        let mut queue = IntentQueue::new();
        queue.record(Intent::Play);
        queue.record(Intent::SetMuted(true));
        queue.record(Intent::Pause);
        assert_eq!(queue.drain(), vec![Intent::SetMuted(true), Intent::Pause]);
    }

    #[test]
    fn test_last_value_wins_and_moves_to_end() {
        let mut queue = IntentQueue::new();
        queue.record(Intent::Seek(10.0));
        queue.record(Intent::SetVolume(0.2));
        queue.record(Intent::Seek(30.0));

        assert_eq!(queue.pending_volume(), Some(0.2));
        assert_eq!(queue.pending_muted(), None);
        assert_eq!(queue.drain(), vec![Intent::SetVolume(0.2), Intent::Seek(30.0)]);
    }

    #[test]
    fn test_drained_queue_refuses_intents() {
        let mut queue = IntentQueue::new();
        queue.record(Intent::Play);
        queue.drain();

        assert!(queue.is_drained());
        assert!(!queue.record(Intent::Play));
        assert!(queue.is_empty());
        assert!(queue.drain().is_empty());
    }
}
