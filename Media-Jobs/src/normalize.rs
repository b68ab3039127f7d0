//! Output normalization.
//!
//! Providers report the finished artifact in several shapes:
//! 1. A bare string: `"https://cdn/x.mp4"`
//! 2. A list of strings, often a preview image next to the video:
//!    `["https://cdn/poster.png", "https://cdn/x.mp4"]`
//! 3. An object with named fields: `{"video": "...", "url": "..."}`
//!
//! [`normalize_output`] folds all of them into a single location so the
//! rest of the crate never looks at the raw shape.

use serde_json::{Map, Value};

/// File extensions treated as video output, lowercase, without the dot.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "m4v", "mkv"];

/// The shapes a provider's `output` field comes in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawOutput<'a> {
    Single(&'a str),
    List(&'a [Value]),
    Keyed(&'a Map<String, Value>),
    /// `null`, numbers, booleans: nothing usable.
    Absent,
}

impl<'a> RawOutput<'a> {
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::String(s) => RawOutput::Single(s),
            Value::Array(items) => RawOutput::List(items),
            Value::Object(map) => RawOutput::Keyed(map),
            Value::Null | Value::Bool(_) | Value::Number(_) => RawOutput::Absent,
        }
    }
}

/// Resolve a provider `output` value to one result location.
///
/// Priority:
/// - string: the string itself
/// - list: first entry with a video extension, else first string entry
/// - object: `video`, then `url`
///
/// Empty strings never count as a location.
pub fn normalize_output(value: &Value) -> Option<String> {
    match RawOutput::classify(value) {
        RawOutput::Single(s) => non_empty(s),
        RawOutput::List(items) => {
            let strings = || items.iter().filter_map(Value::as_str).filter(|s| !s.is_empty());
            strings()
                .find(|s| has_video_extension(s))
                .or_else(|| strings().next())
                .map(String::from)
        }
        RawOutput::Keyed(map) => ["video", "url"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str).and_then(non_empty)),
        RawOutput::Absent => None,
    }
}

/// Whether the path part of `location` ends in a known video extension.
/// Query strings and fragments are ignored; case does not matter.
pub fn has_video_extension(location: &str) -> bool {
    let path = location
        .split(['?', '#'])
        .next()
        .unwrap_or(location);
    let file = path.rsplit('/').next().unwrap_or(path);
    match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => VIDEO_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known)),
        _ => false,
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
