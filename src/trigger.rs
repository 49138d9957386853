// ABOUTME: User-facing trigger controls for the banana-slides client
// ABOUTME: Tracks enabled, visible and label state with guaranteed re-enabling

use log::debug;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// A control the user can activate, such as the generate or download button
#[derive(Debug)]
pub struct Trigger {
    name: &'static str,
    enabled: AtomicBool,
    visible: AtomicBool,
    default_label: String,
    label: Mutex<String>,
    // Bumped on every label change so stale restores are skipped
    label_epoch: AtomicU64,
}

impl Trigger {
    pub fn new(name: &'static str, label: impl Into<String>, visible: bool) -> Arc<Self> {
        let label = label.into();
        Arc::new(Self {
            name,
            enabled: AtomicBool::new(true),
            visible: AtomicBool::new(visible),
            default_label: label.clone(),
            label: Mutex::new(label),
            label_epoch: AtomicU64::new(0),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    pub fn label(&self) -> String {
        self.label.lock().clone()
    }

    pub fn enable(&self) {
        debug!("Trigger {} enabled", self.name);
        self.enabled.store(true, Ordering::SeqCst);
    }

    pub fn show(&self) {
        self.visible.store(true, Ordering::SeqCst);
    }

    pub fn hide(&self) {
        self.visible.store(false, Ordering::SeqCst);
    }

    /// Disable the trigger until the returned guard is dropped.
    /// Returns `None` when the trigger is already disabled.
    pub fn disable(self: &Arc<Self>) -> Option<TriggerGuard> {
        if !self.enabled.swap(false, Ordering::SeqCst) {
            return None;
        }
        debug!("Trigger {} disabled", self.name);
        Some(TriggerGuard {
            trigger: Arc::clone(self),
        })
    }

    pub fn set_label(&self, text: impl Into<String>) {
        self.replace_label(text.into());
    }

    fn replace_label(&self, text: String) -> u64 {
        let mut label = self.label.lock();
        *label = text;
        self.label_epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn reset_label(&self) {
        self.set_label(self.default_label.clone());
    }

    /// Show `text` for `after`, then return to the default label unless
    /// the label was changed again in the meantime.
    pub fn flash_label(self: &Arc<Self>, text: impl Into<String>, after: Duration) {
        let epoch = self.replace_label(text.into());
        let trigger = Arc::clone(self);

        thread::spawn(move || {
            thread::sleep(after);
            let mut label = trigger.label.lock();
            if trigger.label_epoch.load(Ordering::SeqCst) == epoch {
                label.clone_from(&trigger.default_label);
                trigger.label_epoch.fetch_add(1, Ordering::SeqCst);
            }
        });
    }
}

/// Re-enables its trigger when dropped, on both success and error paths
#[derive(Debug)]
pub struct TriggerGuard {
    trigger: Arc<Trigger>,
}

impl Drop for TriggerGuard {
    fn drop(&mut self) {
        self.trigger.enable();
    }
}
