//! Desktop notifications via notify-send (Linux) and osascript (macOS).
//!
//! Notification delivery is strictly best-effort: every failure is swallowed
//! and reported as `false`.

use std::time::Duration;

use crate::runner;

const SEND_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug)]
/// Notification urgency, mapped onto notify-send levels.
pub enum Urgency {
    Low,
    Normal,
    Critical,
}

impl Urgency {
    fn as_str(self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Normal => "normal",
            Urgency::Critical => "critical",
        }
    }
}

/// Desktop notification sender.
pub struct Notifier;

impl Notifier {
    /// Whether this platform has a usable notification channel.
    pub fn is_available() -> bool {
        match std::env::consts::OS {
            "linux" => runner::command_exists("notify-send"),
            // osascript ships with the OS.
            "macos" => true,
            _ => false,
        }
    }

    /// Send a notification; `true` only when the helper tool accepted it.
    pub fn send(title: &str, message: &str, urgency: Urgency, icon: Option<&str>) -> bool {
        match std::env::consts::OS {
            "linux" => send_linux(title, message, urgency, icon),
            "macos" => send_macos(title, message),
            _ => false,
        }
    }

    pub fn send_success(title: &str, message: &str) -> bool {
        Self::send(title, message, Urgency::Normal, Some("dialog-information"))
    }

    pub fn send_error(title: &str, message: &str) -> bool {
        Self::send(title, message, Urgency::Critical, Some("dialog-error"))
    }

    pub fn send_warning(title: &str, message: &str) -> bool {
        Self::send(title, message, Urgency::Normal, Some("dialog-warning"))
    }
}

fn send_linux(title: &str, message: &str, urgency: Urgency, icon: Option<&str>) -> bool {
    let mut args = vec!["-u", urgency.as_str()];
    if let Some(icon) = icon {
        args.extend(["-i", icon]);
    }
    args.extend([title, message]);
    runner::run_status("notify-send", &args, SEND_TIMEOUT)
        .map(|status| status.success())
        .unwrap_or(false)
}

fn send_macos(title: &str, message: &str) -> bool {
    let script = format!("display notification {message:?} with title {title:?}");
    runner::run_status("osascript", &["-e", &script], SEND_TIMEOUT)
        .map(|status| status.success())
        .unwrap_or(false)
}
