//! Call-stack enumeration.
//!
//! A [`FrameSource`] snapshots the current thread's stack and hands back the
//! frames innermost-first. Symbol resolution is deferred until the iterator
//! reaches each frame.

use std::path::PathBuf;

/// One raw call-stack entry, as reported by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFrame {
    pub pc: usize,
    pub file: Option<PathBuf>,
    pub line: Option<u32>,
    pub function: Option<String>,
}

impl RawFrame {
    pub fn new(file: impl Into<PathBuf>, line: u32, function: impl Into<String>) -> Self {
        Self {
            pc: 0,
            file: Some(file.into()),
            line: Some(line),
            function: Some(function.into()),
        }
    }
}

pub type Frames = Box<dyn Iterator<Item = RawFrame>>;

/// Something that can enumerate the caller's stack.
pub trait FrameSource: Send + Sync {
    /// Frames of the calling thread, skipping the `skip` innermost frames
    /// above the source's own machinery.
    fn frames(&self, skip: usize) -> Frames;
}

/// Stack frames of the running process, via the `backtrace` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktraceFrames;

impl BacktraceFrames {
    fn is_capture_internal(frame: &RawFrame) -> bool {
        match frame.function.as_deref() {
            Some(name) => name.starts_with("backtrace::") || name.contains("BacktraceFrames"),
            None => false,
        }
    }

    fn resolve(frame: backtrace::Frame) -> Vec<RawFrame> {
        let pc = frame.ip() as usize;
        let mut symbols = Vec::new();
        backtrace::resolve_frame(&frame, |symbol| {
            symbols.push(RawFrame {
                pc,
                file: symbol.filename().map(|p| p.to_path_buf()),
                line: symbol.lineno(),
                function: symbol.name().map(|name| format!("{:#}", name)),
            });
        });
        if symbols.is_empty() {
            symbols.push(RawFrame {
                pc,
                ..RawFrame::default()
            });
        }
        symbols
    }
}

impl FrameSource for BacktraceFrames {
    #[inline(never)]
    fn frames(&self, skip: usize) -> Frames {
        let mut snapshot = Vec::new();
        backtrace::trace(|frame| {
            snapshot.push(frame.clone());
            true
        });

        let anchor = <Self as FrameSource>::frames as fn(&Self, usize) -> Frames as usize;
        callers_of_capture(
            snapshot,
            anchor,
            |frame| frame.symbol_address() as usize,
            Self::resolve,
            skip,
        )
    }
}

/// Drop everything up to and including the capturing function from an
/// innermost-first `snapshot`, then `skip` more frames.
///
/// The capturing function is found by its symbol address. Unwinders that
/// cannot report symbol addresses fall back to resolving the whole snapshot
/// and cutting after the last capture-internal frame by name.
fn callers_of_capture<T: 'static>(
    mut snapshot: Vec<T>,
    anchor: usize,
    symbol_address: fn(&T) -> usize,
    resolve: fn(T) -> Vec<RawFrame>,
    skip: usize,
) -> Frames {
    match snapshot
        .iter()
        .position(|frame| symbol_address(frame) == anchor)
    {
        Some(index) => {
            snapshot.drain(..=index);
            Box::new(snapshot.into_iter().flat_map(resolve).skip(skip))
        }
        None => {
            let mut resolved: Vec<RawFrame> = snapshot.into_iter().flat_map(resolve).collect();
            if let Some(last) = resolved
                .iter()
                .rposition(BacktraceFrames::is_capture_internal)
            {
                resolved.drain(..=last);
            }
            Box::new(resolved.into_iter().skip(skip))
        }
    }
}

/// A fixed, pre-recorded stack. Useful when traces must be reproducible.
#[derive(Debug, Clone, Default)]
pub struct FixedFrames {
    frames: Vec<RawFrame>,
}

impl FixedFrames {
    pub fn new(frames: Vec<RawFrame>) -> Self {
        Self { frames }
    }
}

impl FrameSource for FixedFrames {
    fn frames(&self, skip: usize) -> Frames {
        Box::new(self.frames.clone().into_iter().skip(skip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_frames_honors_skip() {
        let source = FixedFrames::new(vec![
            RawFrame::new("a.rs", 1, "a::one"),
            RawFrame::new("b.rs", 2, "b::two"),
            RawFrame::new("c.rs", 3, "c::three"),
        ]);

        let names: Vec<_> = source
            .frames(1)
            .filter_map(|f| f.function)
            .collect();
        assert_eq!(names, vec!["b::two", "c::three"]);
        assert_eq!(source.frames(5).count(), 0);
    }

    #[inline(never)]
    fn capture_here() -> Vec<RawFrame> {
        BacktraceFrames.frames(0).collect()
    }

    #[test]
    fn test_backtrace_frames_start_at_caller() {
        let frames = capture_here();
        assert!(!frames.is_empty());

        let first = frames[0].function.as_deref().unwrap_or_default();
        assert!(
            first.ends_with("capture_here"),
            "innermost frame should be the capturing function, got {first}"
        );
        assert!(frames
            .iter()
            .all(|f| !f.function.as_deref().unwrap_or_default().starts_with("backtrace::")));
    }

    #[inline(never)]
    fn capture_one_up() -> Vec<RawFrame> {
        BacktraceFrames.frames(1).collect()
    }

    #[inline(never)]
    fn call_capture_one_up() -> Vec<RawFrame> {
        capture_one_up()
    }

    #[test]
    fn test_backtrace_frames_skip_drops_innermost() {
        let frames = call_capture_one_up();
        let first = frames[0].function.as_deref().unwrap_or_default();
        assert!(
            first.ends_with("call_capture_one_up"),
            "skipping one frame should start at the caller's caller, got {first}"
        );
    }

    type Captured = (usize, Vec<RawFrame>);

    fn address(frame: &Captured) -> usize {
        frame.0
    }

    fn resolve(frame: Captured) -> Vec<RawFrame> {
        frame.1
    }

    fn named(function: &str) -> Vec<RawFrame> {
        vec![RawFrame::new("src/lib.rs", 1, function)]
    }

    /// Innermost first: unwinder, backtrace internals, the capture method,
    /// then the logger and its caller.
    fn snapshot() -> Vec<Captured> {
        vec![
            (0x100, named("_Unwind_Backtrace")),
            (0x200, named("backtrace::backtrace::libunwind::trace")),
            (0x300, named("backtrace::backtrace::trace")),
            (
                0x400,
                named("<stowage_logging::frames::BacktraceFrames as stowage_logging::frames::FrameSource>::frames"),
            ),
            (0x500, named("stowage_logging::trace::build_trace")),
            (
                0x600,
                vec![
                    RawFrame::new("src/store.rs", 7, "stowage::store::inlined_helper"),
                    RawFrame::new("src/main.rs", 9, "stowage::main"),
                ],
            ),
        ]
    }

    fn function_names(frames: Frames) -> Vec<String> {
        frames.filter_map(|f| f.function).collect()
    }

    #[test]
    fn test_capture_cut_at_anchor_address() {
        let frames = callers_of_capture(snapshot(), 0x400, address, resolve, 1);
        assert_eq!(
            function_names(frames),
            vec!["stowage::store::inlined_helper", "stowage::main"]
        );
    }

    #[test]
    fn test_capture_cut_by_name_without_anchor() {
        let frames = callers_of_capture(snapshot(), 0xdead, address, resolve, 0);
        assert_eq!(
            function_names(frames),
            vec![
                "stowage_logging::trace::build_trace",
                "stowage::store::inlined_helper",
                "stowage::main",
            ]
        );

        let frames = callers_of_capture(snapshot(), 0xdead, address, resolve, 2);
        assert_eq!(function_names(frames), vec!["stowage::main"]);
    }

    #[test]
    fn test_capture_without_internal_frames_keeps_everything() {
        let snapshot = vec![(0x10, named("stowage::a")), (0x20, named("stowage::b"))];
        let frames = callers_of_capture(snapshot, 0xdead, address, resolve, 0);
        assert_eq!(function_names(frames), vec!["stowage::a", "stowage::b"]);
    }
}
