//! Turning raw stack frames into readable trace lines.

use crate::frames::FrameSource;
use crate::paths::PathTrimmer;

/// Function name prefixes belonging to the language runtime and standard
/// library rather than to application code.
const RUNTIME_PREFIXES: &[&str] = &[
    "std::",
    "core::",
    "alloc::",
    "backtrace::",
    "__rust",
    "_start",
    "__libc",
];

/// Process and thread entry points from the C runtime and OS loader. These
/// never carry line info, even in debug builds.
const ENTRY_SYMBOLS: &[&str] = &[
    "main",
    "start",
    "start_thread",
    "thread_start",
    "_pthread_start",
    "clone",
    "clone3",
    "__clone",
    "__clone3",
    "BaseThreadInitThunk",
    "RtlUserThreadStart",
];

/// Marker for locations the compiler made up.
const SYNTHETIC_FILE_MARKER: &str = "<";

/// Stand-in file for frames whose symbol resolved without a source location,
/// as happens in builds without line tables.
const UNKNOWN_FILE: &str = "?";

/// Build a trace of the calling thread, innermost frame first, as
/// `file:line:function()` strings.
#[inline(never)]
pub fn build_trace(source: &dyn FrameSource, skip: usize, trimmer: &PathTrimmer) -> Vec<String> {
    let mut trace = Vec::new();
    for frame in source.frames(skip) {
        let Some(function) = frame.function else {
            continue;
        };
        if is_runtime_internal(&function) {
            continue;
        }

        let (file, line) = match (frame.file, frame.line) {
            (Some(file), Some(line)) if line > 0 => (trimmer.trim(&file.to_string_lossy()), line),
            _ => (UNKNOWN_FILE.to_string(), 0),
        };
        if file.starts_with(SYNTHETIC_FILE_MARKER) {
            continue;
        }
        trace.push(format!("{}:{}:{}()", file, line, short_name(&function)));
    }
    trace
}

fn is_runtime_internal(function: &str) -> bool {
    if ENTRY_SYMBOLS.contains(&function) {
        return true;
    }
    if RUNTIME_PREFIXES
        .iter()
        .any(|prefix| function.starts_with(prefix))
    {
        return true;
    }
    // Closure call shims, e.g. `<F as core::ops::function::FnOnce<()>>::call_once`.
    function.starts_with('<') && function.contains(" as core::ops::function::")
}

/// The last two path segments of a qualified function name, e.g.
/// `stowage::store::FsStore::stat` becomes `FsStore::stat`.
pub fn short_name(function: &str) -> String {
    let segments = split_path(function);
    let start = segments.len().saturating_sub(2);
    segments[start..].join("::")
}

/// Split on `::` outside of angle brackets, so trait impls such as
/// `<T as Trait>::method` keep their qualified self type intact.
fn split_path(function: &str) -> Vec<&str> {
    let bytes = function.as_bytes();
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                segments.push(&function[start..i]);
                i += 2;
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    segments.push(&function[start..]);
    segments
}
