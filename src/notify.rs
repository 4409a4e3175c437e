use crate::config;
use notify_rust::{Notification, Timeout};

/// Delivers a short-lived, fire-and-forget message to the user.
pub trait Notifier {
    fn notify(&self, title: &str, message: &str);
}

/// Desktop toast notifications. Delivery failures are logged and swallowed;
/// a missed toast must never take the monitor down with it.
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, message: &str) {
        let result = Notification::new()
            .appname(config::APP_NAME)
            .summary(title)
            .body(message)
            .icon("network-wireless")
            .timeout(Timeout::Milliseconds(config::NOTIFY_TIMEOUT_MS))
            .show();
        if let Err(e) = result {
            log::warn!("could not deliver notification: {e}");
        }
    }
}
