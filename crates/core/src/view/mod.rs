//! The view tree and its controllers.
//!
//! Views are owned trait objects (`Box<dyn View>`) arranged by a controller:
//! either a [`ViewStack`] with navigation history or a single-slot
//! [`BasicViewController`]. Events flow in three channels, following the
//! reader UI this crate grew out of:
//!
//! - the *hub* (`mpsc::Sender`), for events addressed to the application's
//!   main loop (e.g. [`Event::Back`] emitted by the navigation bar);
//! - the *bus* (`VecDeque`), for events bubbling between views during a
//!   single dispatch;
//! - the *render queue*, where views schedule regions for repaint instead
//!   of drawing immediately.
//!
//! [`ViewStack`]: view_stack::ViewStack
//! [`BasicViewController`]: controller::BasicViewController

pub mod controller;
pub mod filler;
pub mod nav_view;
pub mod view_stack;

pub use self::controller::{BasicViewController, ViewController};
pub use self::filler::Filler;
pub use self::nav_view::{BasicNavView, NavView};
pub use self::view_stack::ViewStack;

use crate::context::Context;
use crate::framebuffer::{Framebuffer, UpdateMode};
use crate::geom::{Dir, Rectangle};
use crate::gesture::GestureEvent;
use crate::input::{ButtonStatus, DeviceEvent};
use downcast_rs::{impl_downcast, Downcast};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;

/// Height of the navigation bar strip, in pixels.
pub const SMALL_BAR_HEIGHT: i32 = 48;
/// Separator thickness, in pixels.
pub const THICKNESS_MEDIUM: i32 = 2;

pub type Id = u64;

#[derive(Debug)]
pub struct IdFeeder {
    next: AtomicU64,
}

impl IdFeeder {
    pub fn next(&self) -> Id {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

pub static ID_FEEDER: IdFeeder = IdFeeder {
    next: AtomicU64::new(1),
};

pub type Hub = Sender<Event>;
pub type Bus = VecDeque<Event>;

#[derive(Debug, Clone, Copy)]
pub enum Event {
    Device(DeviceEvent),
    Gesture(GestureEvent),
    /// The navigation bar's back control was activated.
    Back,
    /// Ask the owner of the identified view to remove it.
    Close(Id),
}

impl Event {
    /// Direction of travel when this is a directional press, used for focus
    /// traversal between the content view and the navigation bar.
    pub fn direction(&self) -> Option<Dir> {
        match *self {
            Event::Device(DeviceEvent::Button { code, status })
                if status == ButtonStatus::Pressed =>
            {
                code.direction()
            }
            _ => None,
        }
    }
}

/// A region scheduled for repaint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderData {
    pub id: Id,
    pub rect: Rectangle,
    pub mode: UpdateMode,
}

impl RenderData {
    pub fn new(id: Id, rect: Rectangle, mode: UpdateMode) -> RenderData {
        RenderData { id, rect, mode }
    }
}

/// Queue of pending repaints, drained by the host once per event cycle.
#[derive(Debug, Default)]
pub struct RenderQueue {
    entries: Vec<RenderData>,
}

impl RenderQueue {
    pub fn new() -> RenderQueue {
        RenderQueue::default()
    }

    pub fn add(&mut self, data: RenderData) {
        self.entries.push(data);
    }

    pub fn drain(&mut self) -> Vec<RenderData> {
        self.entries.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The capability contract every screen, panel and widget implements.
///
/// A controller never looks past this interface: input arrives through
/// [`handle_event`](View::handle_event), drawing through
/// [`render`](View::render), layout through [`resize`](View::resize), and
/// the attach/dismiss hooks bracket the view's time under a controller.
pub trait View: Downcast {
    /// Offers an event; returns true when consumed.
    fn handle_event(
        &mut self,
        evt: &Event,
        hub: &Hub,
        bus: &mut Bus,
        rq: &mut RenderQueue,
        context: &mut Context,
    ) -> bool;

    fn render(&self, fb: &mut dyn Framebuffer, rect: Rectangle);

    /// Places the view inside `rect`. Must be idempotent: identical input
    /// rects yield identical layouts.
    fn resize(
        &mut self,
        rect: Rectangle,
        _hub: &Hub,
        _rq: &mut RenderQueue,
        _context: &mut Context,
    ) {
        *self.rect_mut() = rect;
    }

    /// Called once when ownership transfers to a controller, with the event
    /// that triggered the push.
    fn on_attach(&mut self, _evt: &Event, _hub: &Hub, _context: &mut Context) {}

    /// Called once when the controller removes the view, before it is
    /// dropped.
    fn on_dismiss(&mut self, _hub: &Hub, _context: &mut Context) {}

    fn rect(&self) -> &Rectangle;
    fn rect_mut(&mut self) -> &mut Rectangle;
    fn children(&self) -> &Vec<Box<dyn View>>;
    fn children_mut(&mut self) -> &mut Vec<Box<dyn View>>;
    fn id(&self) -> Id;

    /// Human-readable name, shown as the navigation bar title and usable
    /// for by-name stack lookups. Empty by default.
    fn label(&self) -> &str {
        ""
    }

    fn is_background(&self) -> bool {
        false
    }
}

impl_downcast!(View);
