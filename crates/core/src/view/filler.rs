use super::{Bus, Event, Hub, Id, RenderQueue, View, ID_FEEDER};
use crate::color::Color;
use crate::context::Context;
use crate::framebuffer::Framebuffer;
use crate::geom::Rectangle;

/// A solid-color rectangle: separators, spacers, backgrounds.
pub struct Filler {
    id: Id,
    rect: Rectangle,
    children: Vec<Box<dyn View>>,
    color: Color,
}

impl Filler {
    pub fn new(rect: Rectangle, color: Color) -> Filler {
        Filler {
            id: ID_FEEDER.next(),
            rect,
            children: Vec::new(),
            color,
        }
    }
}

impl View for Filler {
    fn handle_event(
        &mut self,
        _evt: &Event,
        _hub: &Hub,
        _bus: &mut Bus,
        _rq: &mut RenderQueue,
        _context: &mut Context,
    ) -> bool {
        false
    }

    fn render(&self, fb: &mut dyn Framebuffer, _rect: Rectangle) {
        fb.draw_rectangle(&self.rect, self.color);
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
}
