//! Best-effort classification of a request's user-agent into a small set of
//! human-readable device labels. This is presentation metadata for "your
//! sessions" style listings, not a security control.

use lazy_static::lazy_static;

lazy_static! {
    static ref MOBILE_REGEX: regex::Regex =
        regex::Regex::new(r"(?i)\b(iphone|ipad|ipod|android|mobile)\b").unwrap();
}

pub const UNKNOWN_DEVICE: &str = "Unknown device";

/// Maps a user-agent string to a fixed bucket. Absent or unrecognizable
/// user-agents map to [`UNKNOWN_DEVICE`].
pub fn device_label(user_agent: Option<&str>) -> &'static str {
    let ua = match user_agent {
        Some(ua) if !ua.trim().is_empty() => ua,
        _ => return UNKNOWN_DEVICE,
    };

    if MOBILE_REGEX.is_match(ua) {
        return "Mobile device";
    }

    // Order matters: Chrome UAs contain "Safari", Edge and Opera UAs contain
    // "Chrome".
    let lower = ua.to_lowercase();
    if lower.contains("edg/") || lower.contains("edge/") {
        "Edge"
    } else if lower.contains("opr/") || lower.contains("opera") {
        "Opera"
    } else if lower.contains("firefox/") {
        "Firefox"
    } else if lower.contains("chrome/") || lower.contains("chromium/") {
        "Chrome"
    } else if lower.contains("safari/") {
        "Safari"
    } else if lower.contains("windows")
        || lower.contains("macintosh")
        || lower.contains("x11")
        || lower.contains("linux")
    {
        "Desktop"
    } else {
        UNKNOWN_DEVICE
    }
}
