//! Player API bootstrap
//!
//! The Dailymotion API script is shared by every player on the page. It is
//! injected once; players created before it has run wait in a
//! [`ReadyQueue`] and are attached in creation order when the script calls
//! its global ready callback.
//!
//! ```text
//!   Idle ──ensure_loaded──▶ Loading ──on_global_ready──▶ Ready
//!                              │
//!                              └──script error / timeout──▶ Failed
//! ```
//!
//! `Ready` and `Failed` are terminal. The loader is an explicit service
//! object: the browser binding keeps one per page, tests create their own.

use crate::{config::TechConfig, platform::Platform, Error};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Something waiting for the player API
pub trait Waiter {
    /// Stable id used to cancel a queued wait
    fn waiter_id(&self) -> &str;

    /// The API is usable; called at most once
    fn on_script_ready(self: Rc<Self>);

    /// The API will never become usable
    fn on_script_failed(self: Rc<Self>, error: Error);
}

/// Bootstrap status
#[derive(Debug, Clone, PartialEq)]
pub enum LoaderStatus {
    Idle,
    Loading,
    Ready,
    Failed(Error),
}

impl LoaderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoaderStatus::Ready | LoaderStatus::Failed(_))
    }
}

impl std::fmt::Display for LoaderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoaderStatus::Idle => write!(f, "idle"),
            LoaderStatus::Loading => write!(f, "loading"),
            LoaderStatus::Ready => write!(f, "ready"),
            LoaderStatus::Failed(_) => write!(f, "failed"),
        }
    }
}

struct QueueEntry {
    id: String,
    waiter: Weak<dyn Waiter>,
}

/// FIFO of waiters, drained exactly once.
///
/// Entries are weak: a waiter dropped while queued is skipped on drain.
#[derive(Default)]
pub struct ReadyQueue {
    entries: VecDeque<QueueEntry>,
    closed: bool,
}

impl ReadyQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a waiter. Refused once the queue is closed or if a live
    /// waiter with the same id is already queued.
    pub fn enqueue(&mut self, waiter: &Rc<dyn Waiter>) -> bool {
        let id = waiter.waiter_id();
        if self.closed {
            return false;
        }
        self.prune();
        if self.contains(id) {
            return false;
        }
        self.entries.push_back(QueueEntry {
            id: id.to_string(),
            waiter: Rc::downgrade(waiter),
        });
        true
    }

    /// Remove a queued waiter; returns true if it was present
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    /// True if a waiter with this id is queued and still alive
    pub fn contains(&self, id: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.id == id && entry.waiter.strong_count() > 0)
    }

    /// Forget waiters that were dropped without being cancelled
    fn prune(&mut self) {
        self.entries.retain(|entry| entry.waiter.strong_count() > 0);
    }

    /// Take every live waiter in insertion order and close the queue
    pub fn drain_all(&mut self) -> Vec<Rc<dyn Waiter>> {
        self.closed = true;
        self.entries
            .drain(..)
            .filter_map(|entry| entry.waiter.upgrade())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

struct LoaderInner {
    status: LoaderStatus,
    queue: ReadyQueue,
    script_url: String,
    timeout: Option<Duration>,
}

/// Shared, single-threaded loader for the player API script
#[derive(Clone)]
pub struct ScriptLoader {
    inner: Rc<RefCell<LoaderInner>>,
}

impl ScriptLoader {
    pub fn new(config: &TechConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(LoaderInner {
                status: LoaderStatus::Idle,
                queue: ReadyQueue::new(),
                script_url: config.script_url.clone(),
                timeout: config.script_load_timeout(),
            })),
        }
    }

    pub fn status(&self) -> LoaderStatus {
        self.inner.borrow().status.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.inner.borrow().status == LoaderStatus::Ready
    }

    pub fn queued_len(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    pub fn is_queued(&self, id: &str) -> bool {
        self.inner.borrow().queue.contains(id)
    }

    /// Hand a waiter its outcome now, or queue it until the script settles
    pub fn register(&self, platform: &dyn Platform, waiter: Rc<dyn Waiter>) {
        let status = self.status();
        match status {
            LoaderStatus::Ready => waiter.on_script_ready(),
            LoaderStatus::Failed(error) => waiter.on_script_failed(error),
            LoaderStatus::Idle | LoaderStatus::Loading => {
                let queued = self.inner.borrow_mut().queue.enqueue(&waiter);
                if !queued {
                    let id = waiter.waiter_id().to_string();
                    warn!(id = %id, "Tech id already waiting for player API");
                    waiter.on_script_failed(Error::DuplicateTech { id });
                    return;
                }
                debug!(id = waiter.waiter_id(), "Waiting for player API");
                self.ensure_loaded(platform);
            }
        }
    }

    /// Inject the API script unless it is loading or settled
    pub fn ensure_loaded(&self, platform: &dyn Platform) {
        let (url, timeout) = {
            let mut inner = self.inner.borrow_mut();
            if inner.status != LoaderStatus::Idle {
                return;
            }
            inner.status = LoaderStatus::Loading;
            (inner.script_url.clone(), inner.timeout)
        };

        info!(url = %url, "Injecting player API script");
        if let Err(e) = platform.inject_script(&url) {
            self.on_script_error(e.to_string());
            return;
        }

        if let Some(timeout) = timeout {
            let weak = Rc::downgrade(&self.inner);
            platform.set_timeout(
                timeout,
                Box::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        ScriptLoader { inner }.expire(timeout);
                    }
                }),
            );
        }
    }

    /// Global ready callback. Only the first call while loading has an effect.
    pub fn on_global_ready(&self) {
        let waiters = {
            let mut inner = self.inner.borrow_mut();
            match inner.status {
                LoaderStatus::Idle | LoaderStatus::Loading => {}
                ref settled => {
                    warn!(status = %settled, "Ignoring repeated player API ready callback");
                    return;
                }
            }
            inner.status = LoaderStatus::Ready;
            inner.queue.drain_all()
        };

        info!(waiting = waiters.len(), "Player API ready");
        for waiter in waiters {
            waiter.on_script_ready();
        }
    }

    /// Script failed to load (network error, blocked, ...)
    pub fn on_script_error(&self, reason: impl Into<String>) {
        self.fail(Error::ScriptLoadFailed(reason.into()));
    }

    /// Drop a queued waiter so a later drain never reaches it
    pub fn cancel(&self, id: &str) -> bool {
        let removed = self.inner.borrow_mut().queue.remove(id);
        if removed {
            debug!(id, "Removed from player API queue");
        }
        removed
    }

    fn expire(&self, after: Duration) {
        if self.status() == LoaderStatus::Loading {
            self.fail(Error::ScriptLoadTimeout {
                after_ms: after.as_millis() as u64,
            });
        }
    }

    fn fail(&self, error: Error) {
        let waiters = {
            let mut inner = self.inner.borrow_mut();
            if inner.status.is_terminal() {
                return;
            }
            inner.status = LoaderStatus::Failed(error.clone());
            inner.queue.drain_all()
        };

        warn!(error = %error, waiting = waiters.len(), "Player API unavailable");
        for waiter in waiters {
            waiter.on_script_failed(error.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{MountSpec, PlayerHandle, PlayerSpec, Task};
    use crate::Result;

    #[derive(Default)]
    struct Page {
        injected: RefCell<Vec<String>>,
        timers: RefCell<Vec<(Duration, Task)>>,
        fail_inject: bool,
    }

    impl Page {
        fn fire_timers(&self) {
            let timers = std::mem::take(&mut *self.timers.borrow_mut());
            for (_, task) in timers {
                task();
            }
        }
    }

    impl Platform for Page {
        fn page_origin(&self) -> Option<String> {
            None
        }
        fn mount(&self, _spec: &MountSpec) -> Result<()> {
            Ok(())
        }
        fn unmount(&self, _element_id: &str) {}
        fn inject_script(&self, url: &str) -> Result<()> {
            if self.fail_inject {
                return Err(Error::ScriptLoadFailed("blocked".into()));
            }
            self.injected.borrow_mut().push(url.to_string());
            Ok(())
        }
        fn create_player(&self, _spec: &PlayerSpec) -> Result<Rc<dyn PlayerHandle>> {
            Err(Error::PlayerCreation("not used".into()))
        }
        fn set_timeout(&self, delay: Duration, task: Task) {
            self.timers.borrow_mut().push((delay, task));
        }
    }

    type Log = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        id: String,
        log: Log,
    }

    impl Recorder {
        fn new(id: &str, log: &Log) -> Rc<dyn Waiter> {
            Rc::new(Recorder {
                id: id.to_string(),
                log: log.clone(),
            })
        }
    }

    impl Waiter for Recorder {
        fn waiter_id(&self) -> &str {
            &self.id
        }
        fn on_script_ready(self: Rc<Self>) {
            self.log.borrow_mut().push(format!("ready:{}", self.id));
        }
        fn on_script_failed(self: Rc<Self>, error: Error) {
            self.log
                .borrow_mut()
                .push(format!("failed:{}:{}", self.id, error.error_code()));
        }
    }

    #[test]
    fn test_queue_fifo_and_closed_after_drain() {
        let log = Log::default();
        let a = Recorder::new("a", &log);
        let b = Recorder::new("b", &log);
        let mut queue = ReadyQueue::new();

        assert!(queue.enqueue(&a));
        assert!(queue.enqueue(&b));
        assert!(!queue.enqueue(&a));
        assert_eq!(queue.len(), 2);

        let drained: Vec<String> = queue
            .drain_all()
            .iter()
            .map(|w| w.waiter_id().to_string())
            .collect();
        assert_eq!(drained, vec!["a", "b"]);
        assert!(queue.is_closed());
        assert!(!queue.enqueue(&a));
        assert!(queue.drain_all().is_empty());
    }

    #[test]
    fn test_empty_drain_is_noop() {
        let mut queue = ReadyQueue::new();
        assert!(queue.drain_all().is_empty());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_dropped_waiter_is_skipped() {
        let log = Log::default();
        let mut queue = ReadyQueue::new();
        let a = Recorder::new("a", &log);
        queue.enqueue(&a);
        {
            let b = Recorder::new("b", &log);
            queue.enqueue(&b);
        }
        assert_eq!(queue.drain_all().len(), 1);
    }

    #[test]
    fn test_dropped_waiter_frees_its_id() {
        let log = Log::default();
        let mut queue = ReadyQueue::new();
        {
            let stale = Recorder::new("a", &log);
            assert!(queue.enqueue(&stale));
        }
        assert!(!queue.contains("a"));

        let fresh = Recorder::new("a", &log);
        assert!(queue.enqueue(&fresh));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.drain_all().len(), 1);
    }

    #[test]
    fn test_duplicate_live_id_is_reported() {
        let page = Page::default();
        let loader = ScriptLoader::new(&TechConfig::default());
        let log = Log::default();
        let first = Recorder::new("a", &log);
        let second = Recorder::new("a", &log);

        loader.register(&page, first.clone());
        loader.register(&page, second.clone());

        assert_eq!(*log.borrow(), vec!["failed:a:DUPLICATE_TECH"]);
        assert_eq!(loader.queued_len(), 1);

        loader.on_global_ready();
        assert_eq!(log.borrow().last().unwrap(), "ready:a");
    }

    #[test]
    fn test_script_injected_once() {
        let page = Page::default();
        let loader = ScriptLoader::new(&TechConfig::default());
        let log = Log::default();
        let a = Recorder::new("a", &log);
        let b = Recorder::new("b", &log);

        loader.register(&page, a.clone());
        loader.register(&page, b.clone());
        loader.ensure_loaded(&page);

        assert_eq!(page.injected.borrow().len(), 1);
        assert_eq!(loader.status(), LoaderStatus::Loading);
        assert_eq!(loader.queued_len(), 2);

        loader.on_global_ready();
        loader.on_global_ready();
        assert_eq!(*log.borrow(), vec!["ready:a", "ready:b"]);
        assert!(loader.is_ready());
    }

    #[test]
    fn test_register_after_ready_attaches_immediately() {
        let page = Page::default();
        let loader = ScriptLoader::new(&TechConfig::default());
        loader.on_global_ready();

        let log = Log::default();
        loader.register(&page, Recorder::new("late", &log));

        assert_eq!(*log.borrow(), vec!["ready:late"]);
        assert!(page.injected.borrow().is_empty());
        assert_eq!(loader.queued_len(), 0);
    }

    #[test]
    fn test_cancelled_waiter_not_notified() {
        let page = Page::default();
        let loader = ScriptLoader::new(&TechConfig::default());
        let log = Log::default();
        let a = Recorder::new("a", &log);
        let b = Recorder::new("b", &log);
        loader.register(&page, a.clone());
        loader.register(&page, b.clone());

        assert!(loader.cancel("a"));
        assert!(!loader.cancel("a"));
        loader.on_global_ready();

        assert_eq!(*log.borrow(), vec!["ready:b"]);
    }

    #[test]
    fn test_timeout_fails_waiters() {
        let page = Page::default();
        let loader = ScriptLoader::new(&TechConfig::default());
        let log = Log::default();
        let a = Recorder::new("a", &log);
        loader.register(&page, a.clone());

        page.fire_timers();
        assert_eq!(*log.borrow(), vec!["failed:a:SCRIPT_LOAD_TIMEOUT"]);
        assert_eq!(
            loader.status(),
            LoaderStatus::Failed(Error::ScriptLoadTimeout { after_ms: 15_000 })
        );

        // late arrival does not revive the loader
        loader.on_global_ready();
        assert!(!loader.is_ready());

        let b = Recorder::new("b", &log);
        loader.register(&page, b.clone());
        assert_eq!(log.borrow().last().unwrap(), "failed:b:SCRIPT_LOAD_TIMEOUT");
    }

    #[test]
    fn test_timer_after_ready_is_noop() {
        let page = Page::default();
        let loader = ScriptLoader::new(&TechConfig::default());
        let log = Log::default();
        let a = Recorder::new("a", &log);
        loader.register(&page, a.clone());
        loader.on_global_ready();
        page.fire_timers();

        assert!(loader.is_ready());
        assert_eq!(*log.borrow(), vec!["ready:a"]);
    }

    #[test]
    fn test_no_timeout_configured() {
        let page = Page::default();
        let config = TechConfig {
            script_load_timeout_ms: None,
            ..Default::default()
        };
        let loader = ScriptLoader::new(&config);
        let log = Log::default();
        let a = Recorder::new("a", &log);
        loader.register(&page, a.clone());

        assert!(page.timers.borrow().is_empty());
        assert_eq!(loader.status(), LoaderStatus::Loading);
    }

    #[test]
    fn test_injection_failure() {
        let page = Page {
            fail_inject: true,
            ..Default::default()
        };
        let loader = ScriptLoader::new(&TechConfig::default());
        let log = Log::default();
        let a = Recorder::new("a", &log);
        loader.register(&page, a.clone());

        assert_eq!(*log.borrow(), vec!["failed:a:SCRIPT_LOAD_FAILED"]);
        assert!(matches!(loader.status(), LoaderStatus::Failed(_)));
    }
}
