//! Notifier adapters

use parking_lot::Mutex;
use tracing::{error, info};

use crate::ports::{Notifier, Toast, ToastLevel};

/// Writes toasts to the tracing log
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, toast: Toast) {
        match toast.level {
            ToastLevel::Success => info!(title = %toast.title, "{}", toast.message),
            ToastLevel::Error => error!(title = %toast.title, "{}", toast.message),
        }
    }
}

/// Keeps every toast (for testing)
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl CollectingNotifier {
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().clone()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, toast: Toast) {
        self.toasts.lock().push(toast);
    }
}
