//! Periodic polling registrar.
//!
//! Widgets register a data-source reader plus a consumer at a fixed interval.
//! Registrations sharing the same cache key and interval share one underlying
//! read per tick: the sample is read once and fanned out to every consumer.
//! Everything runs on the GLib main loop; no threads, no blocking reads.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use gtk4::glib::{self, SourceId};
use tracing::{debug, warn};

use super::callbacks::Callbacks;

/// One shared data source: reader plus its fan-out list.
struct SharedPoll<T> {
    reader: Box<dyn Fn() -> T>,
    callbacks: Callbacks<T>,
    timer: RefCell<Option<SourceId>>,
}

impl<T> SharedPoll<T> {
    fn new(reader: Box<dyn Fn() -> T>) -> Self {
        Self {
            reader,
            callbacks: Callbacks::new(),
            timer: RefCell::new(None),
        }
    }

    /// Read the source once and deliver the sample to every consumer.
    fn tick(&self) {
        let sample = (self.reader)();
        self.callbacks.notify(&sample);
    }

    fn cancel_timer(&self) {
        if let Some(source_id) = self.timer.borrow_mut().take() {
            source_id.remove();
        }
    }
}

/// Keeps a poll subscription alive; dropping it detaches the consumer and
/// cancels the shared timer once no consumers remain.
pub struct PollRegistration {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Drop for PollRegistration {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

/// Process-wide polling registrar.
pub struct Poller {
    sources: RefCell<HashMap<(String, u32), Rc<dyn Any>>>,
}

impl Poller {
    fn new() -> Rc<Self> {
        Rc::new(Self {
            sources: RefCell::new(HashMap::new()),
        })
    }

    /// Get the global Poller singleton.
    pub fn global() -> Rc<Self> {
        thread_local! {
            static INSTANCE: Rc<Poller> = Poller::new();
        }

        INSTANCE.with(|p| p.clone())
    }

    /// Register a consumer for a data source.
    ///
    /// Sources are shared by `(cache_key, interval_secs)`: the first
    /// registration installs the reader and starts the timer, later ones
    /// reuse it (their `reader` is ignored). The source is read immediately
    /// on registration so the consumer renders without waiting a full tick.
    pub fn register<T, R, F>(
        self: &Rc<Self>,
        cache_key: &str,
        interval_secs: u32,
        reader: R,
        consumer: F,
    ) -> PollRegistration
    where
        T: 'static,
        R: Fn() -> T + 'static,
        F: Fn(&T) + 'static,
    {
        let key = (cache_key.to_string(), interval_secs);

        // Private (non-map) sources must not evict the map entry on drop;
        // that entry belongs to whichever source legitimately owns the key.
        let mut in_sources_map = true;
        let existing = self.sources.borrow().get(&key).cloned();
        let shared: Rc<SharedPoll<T>> = match existing {
            Some(any) => match any.downcast::<SharedPoll<T>>() {
                Ok(shared) => shared,
                Err(_) => {
                    // Same key registered with a different sample type; keep
                    // this consumer on a private source instead of panicking.
                    warn!("Poll source '{}' re-registered with a different type", cache_key);
                    in_sources_map = false;
                    let shared = Rc::new(SharedPoll::new(Box::new(reader)));
                    start_timer(&shared, interval_secs);
                    shared
                }
            },
            None => {
                debug!("Starting poll source '{}' every {}s", cache_key, interval_secs);
                let shared = Rc::new(SharedPoll::new(Box::new(reader)));
                start_timer(&shared, interval_secs);
                self.sources
                    .borrow_mut()
                    .insert(key.clone(), shared.clone());
                shared
            }
        };

        let id = shared.callbacks.register(consumer);

        // Immediate read so the new consumer (and everyone sharing the
        // source) sees fresh data now rather than at the next tick.
        shared.tick();

        let poller = self.clone();
        let shared_for_detach = shared.clone();
        PollRegistration {
            detach: Some(Box::new(move || {
                shared_for_detach.callbacks.remove(id);
                if shared_for_detach.callbacks.is_empty() {
                    shared_for_detach.cancel_timer();
                    if in_sources_map {
                        poller.sources.borrow_mut().remove(&key);
                    }
                    debug!("Stopped poll source '{}'", key.0);
                }
            })),
        }
    }
}

fn start_timer<T: 'static>(shared: &Rc<SharedPoll<T>>, interval_secs: u32) {
    let shared_for_timer = shared.clone();
    let source_id = glib::timeout_add_seconds_local(interval_secs, move || {
        shared_for_timer.tick();
        glib::ControlFlow::Continue
    });
    *shared.timer.borrow_mut() = Some(source_id);
}
