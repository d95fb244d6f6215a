//! Where fired rules send their side effects.
//!
//! The rule engine never logs, captures or calls anything itself. It hands
//! every action to an [`ActionSink`]; hosts implement the trait over their own
//! logging, screenshot and callback machinery. [`TracingSink`] is the stock
//! implementation used by the binary and the tests.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local};
use parking_lot::Mutex;

use crate::debugger::MessageLevel;

/// Opaque reference to a callback registered with a [`CallbackRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackHandle(pub u32);

impl fmt::Display for CallbackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Receiver of rule actions.
///
/// Calls happen on the tick path and must return promptly; slow work such as
/// encoding a screenshot should be queued, not awaited.
pub trait ActionSink {
    /// Emit a formatted rule message.
    fn log(&mut self, level: MessageLevel, message: &str);

    /// Capture the screen to an already sanitized file name.
    fn capture_screenshot(&mut self, file_name: &str);

    /// Run the callbacks attached to a fired rule.
    fn invoke_callbacks(&mut self, callbacks: &[CallbackHandle]);

    /// Ask the host to pause, as a debugger breakpoint would.
    fn debug_break(&mut self) {
        tracing::debug!("Debug break requested but not supported by this sink");
    }
}

type Callback = Box<dyn FnMut() + Send>;

#[derive(Default)]
struct Callbacks {
    next: u32,
    entries: HashMap<u32, Callback>,
}

/// Shared table of host callbacks addressed by [`CallbackHandle`].
///
/// Clones share the same table, so one clone can live in the sink while the
/// host keeps another for registering.
#[derive(Clone, Default)]
pub struct CallbackRegistry {
    inner: Arc<Mutex<Callbacks>>,
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("len", &self.len())
            .finish()
    }
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a callback and return its handle.
    pub fn register<F>(&self, callback: F) -> CallbackHandle
    where
        F: FnMut() + Send + 'static,
    {
        let mut inner = self.inner.lock();
        let id = inner.next;
        inner.next = inner.next.wrapping_add(1);
        inner.entries.insert(id, Box::new(callback));
        CallbackHandle(id)
    }

    /// Drop a callback. Returns whether it existed.
    pub fn unregister(&self, handle: CallbackHandle) -> bool {
        self.inner.lock().entries.remove(&handle.0).is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run one callback. Returns `false` if the handle is unknown.
    ///
    /// The table is not locked while the callback runs, so a callback may
    /// register or unregister others.
    pub fn invoke(&self, handle: CallbackHandle) -> bool {
        let Some(mut callback) = self.inner.lock().entries.remove(&handle.0) else {
            return false;
        };
        callback();
        self.inner
            .lock()
            .entries
            .entry(handle.0)
            .or_insert(callback);
        true
    }
}

/// Action sink backed by `tracing`.
///
/// Messages go to the `framewatch::debugger` target. Screenshot requests and
/// break requests are recorded for the host to act on between frames.
#[derive(Debug, Default)]
pub struct TracingSink {
    callbacks: CallbackRegistry,
    screenshots: Vec<String>,
    break_requested: bool,
}

impl TracingSink {
    pub fn new(callbacks: CallbackRegistry) -> Self {
        Self {
            callbacks,
            ..Self::default()
        }
    }

    pub fn callbacks(&self) -> &CallbackRegistry {
        &self.callbacks
    }

    /// Take the screenshot file names requested since the last call.
    pub fn take_screenshots(&mut self) -> Vec<String> {
        std::mem::take(&mut self.screenshots)
    }

    /// Whether a break was requested since the last call, clearing the flag.
    pub fn take_break_request(&mut self) -> bool {
        std::mem::take(&mut self.break_requested)
    }
}

impl ActionSink for TracingSink {
    fn log(&mut self, level: MessageLevel, message: &str) {
        match level {
            MessageLevel::Log => tracing::info!(target: "framewatch::debugger", "{}", message),
            MessageLevel::Warning => tracing::warn!(target: "framewatch::debugger", "{}", message),
            MessageLevel::Error => tracing::error!(target: "framewatch::debugger", "{}", message),
        }
    }

    fn capture_screenshot(&mut self, file_name: &str) {
        tracing::info!(target: "framewatch::debugger", file = file_name, "Screenshot requested");
        self.screenshots.push(file_name.to_string());
    }

    fn invoke_callbacks(&mut self, callbacks: &[CallbackHandle]) {
        for handle in callbacks {
            if !self.callbacks.invoke(*handle) {
                tracing::warn!(target: "framewatch::debugger", callback = %handle, "Unknown callback");
            }
        }
    }

    fn debug_break(&mut self) {
        tracing::warn!(target: "framewatch::debugger", "Debug break requested");
        self.break_requested = true;
    }
}

/// Make a file name safe: path separators and colons become `-`, spaces `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '-',
            ' ' => '_',
            other => other,
        })
        .collect()
}

/// Build the sanitized `{stem}_{timestamp}.png` name for a screenshot.
pub fn screenshot_file_name(stem: &str, at: DateTime<Local>) -> String {
    let raw = format!("{}_{}.png", stem, at.format("%Y-%m-%d %H:%M:%S"));
    sanitize_file_name(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn sanitize_replaces_separators_spaces_and_colons() {
        assert_eq!(
            sanitize_file_name("shots/run 1\\12:30"),
            "shots-run_1-12-30"
        );
    }

    #[test]
    fn screenshot_name_has_stem_and_timestamp() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            screenshot_file_name("Low FPS", at),
            "Low_FPS_2024-03-09_14-05-07.png"
        );
    }

    #[test]
    fn registry_invokes_by_handle() {
        let hits = Arc::new(AtomicUsize::new(0));
        let registry = CallbackRegistry::new();
        let counter = hits.clone();
        let handle = registry.register(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(registry.invoke(handle));
        assert!(registry.invoke(handle));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert!(!registry.invoke(CallbackHandle(999)));
    }

    #[test]
    fn callback_may_use_registry() {
        let registry = CallbackRegistry::new();
        let inner = registry.clone();
        let handle = registry.register(move || {
            inner.register(|| {});
        });
        assert!(registry.invoke(handle));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn unregister_removes() {
        let registry = CallbackRegistry::new();
        let handle = registry.register(|| {});
        assert!(registry.unregister(handle));
        assert!(registry.is_empty());
        assert!(!registry.unregister(handle));
    }

    #[test]
    fn tracing_sink_queues_requests() {
        let mut sink = TracingSink::default();
        sink.capture_screenshot("a.png");
        sink.debug_break();
        sink.log(MessageLevel::Warning, "fps low");

        assert_eq!(sink.take_screenshots(), vec!["a.png".to_string()]);
        assert!(sink.take_screenshots().is_empty());
        assert!(sink.take_break_request());
        assert!(!sink.take_break_request());
    }

    #[test]
    fn tracing_sink_runs_shared_callbacks() {
        let hits = Arc::new(AtomicUsize::new(0));
        let registry = CallbackRegistry::new();
        let counter = hits.clone();
        let handle = registry.register(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let mut sink = TracingSink::new(registry.clone());
        sink.invoke_callbacks(&[handle, CallbackHandle(42)]);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
