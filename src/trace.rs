//! Call-site stack capture.
//!
//! Uses the standard library's backtrace facility and strips the innermost
//! frames that belong to the capture itself and to the client's logging
//! methods, so the first line of a trace is the code that called `log`.

use std::backtrace::Backtrace;

use once_cell::sync::Lazy;

/// Frames produced by the backtrace implementation itself.
const MACHINERY_PREFIXES: &[&str] = &["std::backtrace", "backtrace::"];

/// Runtime frames that may sit between two internal frames (future polling,
/// closure shims) without ending the internal section.
const PLUMBING_PREFIXES: &[&str] = &["core::", "std::", "alloc::", "<unknown>", "<unresolved>"];

/// Modules of this crate whose frames are part of the logging call.
static INTERNAL_PREFIXES: Lazy<Vec<String>> = Lazy::new(|| {
    let krate = env!("CARGO_CRATE_NAME");
    ["trace::", "client::LogClient::", "payload::ErrorInfo::", "global::"]
        .iter()
        .map(|module| format!("{krate}::{module}"))
        .collect()
});

/// Capture the current call stack as newline-joined frames, excluding the
/// frames of the capture machinery and of this crate's logging entry points.
///
/// Frame text is platform dependent. When the platform cannot produce a
/// backtrace the result is an empty string.
#[inline(never)]
pub fn capture() -> String {
    let rendered = Backtrace::force_capture().to_string();
    let frames = parse_frames(&rendered);
    strip_internal_frames(&frames).join("\n")
}

/// Split the `Display` rendering of a [`Backtrace`] into one trimmed line
/// per frame, folding each `at file:line:col` location into its frame.
pub fn parse_frames(rendered: &str) -> Vec<String> {
    let mut frames: Vec<String> = Vec::new();

    for line in rendered.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(location) = line.strip_prefix("at ") {
            if let Some(last) = frames.last_mut() {
                last.push_str(" at ");
                last.push_str(location.trim());
            }
            continue;
        }

        match line.split_once(": ") {
            Some((index, symbol)) if !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()) => {
                frames.push(symbol.trim().to_string());
            }
            // Continuation text that is neither a frame header nor a location.
            _ => {}
        }
    }

    frames
}

/// Drop the leading frames that belong to the logging machinery.
///
/// Leading frames are consumed while they are either internal or runtime
/// plumbing; everything after the last internal frame in that prefix is
/// returned. If no internal frame is found the input is returned whole.
pub fn strip_internal_frames(frames: &[String]) -> &[String] {
    let mut cut = 0;
    for (i, frame) in frames.iter().enumerate() {
        if is_internal(frame) {
            cut = i + 1;
        } else if !has_prefix(frame, PLUMBING_PREFIXES) {
            break;
        }
    }
    &frames[cut..]
}

fn is_internal(frame: &str) -> bool {
    has_prefix(frame, MACHINERY_PREFIXES)
        || INTERNAL_PREFIXES
            .iter()
            .any(|prefix| symbol_of(frame).starts_with(prefix.as_str()))
}

fn has_prefix(frame: &str, prefixes: &[&str]) -> bool {
    let symbol = symbol_of(frame);
    prefixes.iter().any(|prefix| symbol.starts_with(prefix))
}

/// `<path::Type as Trait>::method` and `<path::Type>::method` start with `<`.
fn symbol_of(frame: &str) -> &str {
    frame.strip_prefix('<').unwrap_or(frame)
}
