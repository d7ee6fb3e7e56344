use crate::geom::{Dir, Point};

/// Pointer gestures recognized by the host's input layer.
///
/// Gesture detection itself happens outside this crate; views only consume
/// the decoded result.
#[derive(Debug, Clone, Copy)]
pub enum GestureEvent {
    Tap(Point),
    HoldFinger(Point),
    Swipe { dir: Dir, start: Point, end: Point },
}
