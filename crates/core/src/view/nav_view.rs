//! Navigation-bar capability consumed by [`ViewStack`].
//!
//! The stack treats its bar through the [`NavView`] trait only: the View
//! contract plus a layout query and a little chrome control. Hosts with a
//! richer header (clock, battery, breadcrumbs) implement the trait
//! themselves; [`BasicNavView`] covers the common case of a back button and
//! a title strip.
//!
//! [`ViewStack`]: super::view_stack::ViewStack

use super::{Bus, Event, Hub, Id, RenderQueue, View, ID_FEEDER, SMALL_BAR_HEIGHT, THICKNESS_MEDIUM};
use crate::color::{BLACK, SEPARATOR_NORMAL, WHITE};
use crate::context::Context;
use crate::framebuffer::Framebuffer;
use crate::geom::Rectangle;
use crate::gesture::GestureEvent;
use crate::input::{ButtonCode, ButtonStatus, DeviceEvent};
use downcast_rs::impl_downcast;

const BACK_BUTTON_WIDTH: i32 = 56;

/// What a view stack needs from its navigation bar.
pub trait NavView: View {
    /// Region of `full` this bar occupies when visible; the stack subtracts
    /// it from the content rect during layout. Bars occupy a strip along
    /// the top edge.
    fn occupied_rect(&self, full: &Rectangle) -> Rectangle;

    fn set_title(&mut self, title: &str);

    fn show_back_button(&mut self, show: bool);

    /// Highlight state while the bar holds input focus.
    fn set_focused(&mut self, focused: bool);

    fn is_focused(&self) -> bool;
}

impl_downcast!(NavView);

/// A plain top strip: back chevron on the left, title, bottom separator.
///
/// Activating the back control (a tap on its region, or a confirm press
/// while the bar holds focus) sends [`Event::Back`] on the hub; the host
/// reacts by popping its view stack. The title is stored here and exposed
/// through [`title`](BasicNavView::title) for hosts that render text
/// through their own engine.
pub struct BasicNavView {
    id: Id,
    rect: Rectangle,
    children: Vec<Box<dyn View>>,
    title: String,
    back_visible: bool,
    focused: bool,
}

impl BasicNavView {
    pub fn new(title: &str) -> BasicNavView {
        BasicNavView {
            id: ID_FEEDER.next(),
            rect: Rectangle::default(),
            children: Vec::new(),
            title: title.to_string(),
            back_visible: false,
            focused: false,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn back_button_visible(&self) -> bool {
        self.back_visible
    }

    fn back_rect(&self) -> Rectangle {
        rect![
            self.rect.min.x,
            self.rect.min.y,
            self.rect.min.x + BACK_BUTTON_WIDTH,
            self.rect.max.y
        ]
    }

    fn draw_back_chevron(&self, fb: &mut dyn Framebuffer) {
        let back = self.back_rect();
        let center = back.center();
        let half = (back.height() as i32 / 6).max(4);
        // Left-pointing wedge: each column's vertical span grows with the
        // distance from the tip.
        for dx in 0..half {
            let x = center.x - half / 2 + dx;
            for dy in -dx..=dx {
                fb.set_pixel(x as u32, (center.y + dy) as u32, BLACK);
            }
        }
    }
}

impl View for BasicNavView {
    fn handle_event(
        &mut self,
        evt: &Event,
        hub: &Hub,
        _bus: &mut Bus,
        _rq: &mut RenderQueue,
        _context: &mut Context,
    ) -> bool {
        match *evt {
            Event::Gesture(GestureEvent::Tap(center))
                if self.back_visible && self.back_rect().includes(center) =>
            {
                hub.send(Event::Back).ok();
                true
            }
            Event::Device(DeviceEvent::Button {
                code: ButtonCode::Confirm,
                status: ButtonStatus::Pressed,
            }) if self.focused && self.back_visible => {
                hub.send(Event::Back).ok();
                true
            }
            _ => false,
        }
    }

    fn render(&self, fb: &mut dyn Framebuffer, _rect: Rectangle) {
        fb.draw_rectangle(&self.rect, WHITE);

        let separator = rect![
            self.rect.min.x,
            self.rect.max.y - THICKNESS_MEDIUM,
            self.rect.max.x,
            self.rect.max.y
        ];
        fb.draw_rectangle(&separator, SEPARATOR_NORMAL);

        if self.back_visible {
            self.draw_back_chevron(fb);
            if self.focused {
                fb.invert_region(&self.back_rect());
            }
        }
    }

    fn rect(&self) -> &Rectangle {
        &self.rect
    }

    fn rect_mut(&mut self) -> &mut Rectangle {
        &mut self.rect
    }

    fn children(&self) -> &Vec<Box<dyn View>> {
        &self.children
    }

    fn children_mut(&mut self) -> &mut Vec<Box<dyn View>> {
        &mut self.children
    }

    fn id(&self) -> Id {
        self.id
    }

    fn label(&self) -> &str {
        &self.title
    }
}

impl NavView for BasicNavView {
    fn occupied_rect(&self, full: &Rectangle) -> Rectangle {
        rect![
            full.min.x,
            full.min.y,
            full.max.x,
            full.min.y + SMALL_BAR_HEIGHT
        ]
    }

    fn set_title(&mut self, title: &str) {
        if self.title != title {
            self.title = title.to_string();
        }
    }

    fn show_back_button(&mut self, show: bool) {
        self.back_visible = show;
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn is_focused(&self) -> bool {
        self.focused
    }
}
