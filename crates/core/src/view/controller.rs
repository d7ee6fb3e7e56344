//! The capability contract shared by every view controller.
//!
//! Hosts write against [`ViewController`] so a screen can be managed by a
//! full [`ViewStack`] or by the single-slot [`BasicViewController`]
//! interchangeably.
//!
//! [`ViewStack`]: super::view_stack::ViewStack

use super::{Bus, Event, Hub, Id, RenderData, RenderQueue, View};
use crate::context::Context;
use crate::framebuffer::{Framebuffer, UpdateMode};
use crate::geom::{Dir, Rectangle};

pub trait ViewController {
    /// Takes ownership of `view`, makes it the active one and places it.
    /// `needs_nav_view` is advisory; controllers without a navigation bar
    /// ignore it, and `None` inherits the controller's current policy.
    fn push_and_show(
        &mut self,
        view: Box<dyn View>,
        evt: &Event,
        needs_nav_view: Option<bool>,
        hub: &Hub,
        rq: &mut RenderQueue,
        context: &mut Context,
    );

    /// Removes the active view. A controller with nothing to remove does
    /// nothing.
    fn pop(&mut self, hub: &Hub, rq: &mut RenderQueue, context: &mut Context);

    /// Removes the active view and shows whatever it uncovered.
    fn pop_and_show(&mut self, hub: &Hub, rq: &mut RenderQueue, context: &mut Context);

    /// Dismisses the identified view, wherever the controller keeps it.
    fn dismiss_view(&mut self, id: Id, hub: &Hub, rq: &mut RenderQueue, context: &mut Context);

    fn handle_event(
        &mut self,
        evt: &Event,
        hub: &Hub,
        bus: &mut Bus,
        rq: &mut RenderQueue,
        context: &mut Context,
    ) -> bool;

    /// Moves input focus toward `direction`. Controllers with a single
    /// focusable element have nowhere to move.
    fn move_focus_to_next_view(
        &mut self,
        _evt: &Event,
        _direction: Dir,
        _hub: &Hub,
        _bus: &mut Bus,
        _rq: &mut RenderQueue,
        _context: &mut Context,
    ) -> bool {
        false
    }
}

/// Delegate invoked whenever the controller's slot is cleared or replaced.
pub type RemoveViewDelegate = Box<dyn FnMut()>;

/// A degenerate controller holding at most one view.
///
/// Used where navigation history is unnecessary: the emulation display, a
/// standalone prompt. Pushing replaces the held view, dropping the previous
/// one; popping clears the slot. Routing is trivially the held view.
pub struct BasicViewController {
    id: Id,
    view: Option<Box<dyn View>>,
    view_rect: Rectangle,
    on_remove_view: Option<RemoveViewDelegate>,
}

impl Default for BasicViewController {
    fn default() -> BasicViewController {
        BasicViewController::new()
    }
}

impl BasicViewController {
    pub fn new() -> BasicViewController {
        BasicViewController {
            id: super::ID_FEEDER.next(),
            view: None,
            view_rect: Rectangle::default(),
            on_remove_view: None,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn has_view(&self) -> bool {
        self.view.is_some()
    }

    pub fn view(&self) -> Option<&dyn View> {
        self.view.as_deref()
    }

    pub fn set_on_remove_view<F>(&mut self, del: F)
    where
        F: FnMut() + 'static,
    {
        self.on_remove_view = Some(Box::new(del));
    }

    /// Replaces the held view without placing the new one.
    pub fn push(&mut self, mut view: Box<dyn View>, evt: &Event, hub: &Hub, context: &mut Context) {
        self.clear_slot(hub, context);
        view.on_attach(evt, hub, context);
        self.view = Some(view);
    }

    pub fn resize(
        &mut self,
        rect: Rectangle,
        hub: &Hub,
        rq: &mut RenderQueue,
        context: &mut Context,
    ) {
        self.view_rect = rect;
        self.resize_current(hub, rq, context);
    }

    fn resize_current(&mut self, hub: &Hub, rq: &mut RenderQueue, context: &mut Context) {
        let rect = self.view_rect;
        if let Some(view) = self.view.as_mut() {
            view.resize(rect, hub, rq, context);
        }
    }

    pub fn render(&self, fb: &mut dyn Framebuffer, rect: Rectangle) {
        if let Some(view) = self.view.as_ref() {
            view.render(fb, rect);
        }
    }

    fn clear_slot(&mut self, hub: &Hub, context: &mut Context) {
        let Some(mut view) = self.view.take() else {
            return;
        };
        view.on_dismiss(hub, context);
        if let Some(mut del) = self.on_remove_view.take() {
            del();
            if self.on_remove_view.is_none() {
                self.on_remove_view = Some(del);
            }
        }
    }
}

impl ViewController for BasicViewController {
    fn push_and_show(
        &mut self,
        view: Box<dyn View>,
        evt: &Event,
        _needs_nav_view: Option<bool>,
        hub: &Hub,
        rq: &mut RenderQueue,
        context: &mut Context,
    ) {
        self.push(view, evt, hub, context);
        self.resize_current(hub, rq, context);
        rq.add(RenderData::new(self.id, self.view_rect, UpdateMode::Gui));
    }

    fn pop(&mut self, hub: &Hub, _rq: &mut RenderQueue, context: &mut Context) {
        self.clear_slot(hub, context);
    }

    fn pop_and_show(&mut self, hub: &Hub, rq: &mut RenderQueue, context: &mut Context) {
        self.clear_slot(hub, context);
        rq.add(RenderData::new(self.id, self.view_rect, UpdateMode::Gui));
    }

    fn dismiss_view(&mut self, id: Id, hub: &Hub, rq: &mut RenderQueue, context: &mut Context) {
        if self.view.as_ref().map(|v| v.id()) == Some(id) {
            self.pop_and_show(hub, rq, context);
        }
    }

    fn handle_event(
        &mut self,
        evt: &Event,
        hub: &Hub,
        bus: &mut Bus,
        rq: &mut RenderQueue,
        context: &mut Context,
    ) -> bool {
        match self.view.as_mut() {
            Some(view) => view.handle_event(evt, hub, bus, rq, context),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Display;
    use crate::input::{ButtonCode, ButtonStatus, DeviceEvent};
    use crate::settings::Settings;
    use crate::view::ID_FEEDER;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::mpsc;

    struct SlotView {
        id: Id,
        rect: Rectangle,
        children: Vec<Box<dyn View>>,
        name: &'static str,
        consumes_input: bool,
        dropped: Rc<RefCell<Vec<&'static str>>>,
    }

    impl SlotView {
        fn new(
            name: &'static str,
            consumes_input: bool,
            dropped: &Rc<RefCell<Vec<&'static str>>>,
        ) -> Box<SlotView> {
            Box::new(SlotView {
                id: ID_FEEDER.next(),
                rect: Rectangle::default(),
                children: Vec::new(),
                name,
                consumes_input,
                dropped: Rc::clone(dropped),
            })
        }
    }

    impl View for SlotView {
        fn handle_event(
            &mut self,
            _evt: &Event,
            _hub: &Hub,
            _bus: &mut Bus,
            _rq: &mut RenderQueue,
            _context: &mut Context,
        ) -> bool {
            self.consumes_input
        }

        fn render(&self, _fb: &mut dyn Framebuffer, _rect: Rectangle) {}

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
            self.name
        }
    }

    impl Drop for SlotView {
        fn drop(&mut self) {
            self.dropped.borrow_mut().push(self.name);
        }
    }

    fn test_context() -> Context {
        Context::new(Display { dims: (600, 800) }, Settings::default())
    }

    fn press_confirm() -> Event {
        Event::Device(DeviceEvent::Button {
            code: ButtonCode::Confirm,
            status: ButtonStatus::Pressed,
        })
    }

    #[test]
    fn pushing_replaces_the_previous_view() {
        let dropped = Rc::new(RefCell::new(Vec::new()));
        let (hub, _rx) = mpsc::channel();
        let mut rq = RenderQueue::new();
        let mut context = test_context();
        let mut controller = BasicViewController::new();

        controller.push_and_show(
            SlotView::new("first", false, &dropped),
            &press_confirm(),
            None,
            &hub,
            &mut rq,
            &mut context,
        );
        controller.push_and_show(
            SlotView::new("second", false, &dropped),
            &press_confirm(),
            None,
            &hub,
            &mut rq,
            &mut context,
        );

        assert!(controller.has_view());
        assert_eq!(controller.view().map(|v| v.label()), Some("second"));
        assert_eq!(*dropped.borrow(), vec!["first"]);
    }

    #[test]
    fn pop_clears_the_slot_and_fires_the_delegate() {
        let dropped = Rc::new(RefCell::new(Vec::new()));
        let (hub, _rx) = mpsc::channel();
        let mut rq = RenderQueue::new();
        let mut context = test_context();
        let mut controller = BasicViewController::new();

        let fired = Rc::new(RefCell::new(0));
        let fired_in_del = Rc::clone(&fired);
        controller.set_on_remove_view(move || {
            *fired_in_del.borrow_mut() += 1;
        });

        controller.push_and_show(
            SlotView::new("only", false, &dropped),
            &press_confirm(),
            None,
            &hub,
            &mut rq,
            &mut context,
        );
        controller.pop(&hub, &mut rq, &mut context);

        assert!(!controller.has_view());
        assert_eq!(*fired.borrow(), 1);

        // Popping the cleared slot again is a no-op.
        controller.pop(&hub, &mut rq, &mut context);
        assert_eq!(*fired.borrow(), 1);
    }

    #[test]
    fn events_route_to_the_held_view() {
        let dropped = Rc::new(RefCell::new(Vec::new()));
        let (hub, _rx) = mpsc::channel();
        let mut bus = Bus::new();
        let mut rq = RenderQueue::new();
        let mut context = test_context();
        let mut controller = BasicViewController::new();

        assert!(!controller.handle_event(&press_confirm(), &hub, &mut bus, &mut rq, &mut context));

        controller.push_and_show(
            SlotView::new("sink", true, &dropped),
            &press_confirm(),
            None,
            &hub,
            &mut rq,
            &mut context,
        );
        assert!(controller.handle_event(&press_confirm(), &hub, &mut bus, &mut rq, &mut context));
    }

    #[test]
    fn dismiss_only_matches_the_held_view() {
        let dropped = Rc::new(RefCell::new(Vec::new()));
        let (hub, _rx) = mpsc::channel();
        let mut rq = RenderQueue::new();
        let mut context = test_context();
        let mut controller = BasicViewController::new();

        let view = SlotView::new("held", false, &dropped);
        let id = view.id();
        controller.push_and_show(view, &press_confirm(), None, &hub, &mut rq, &mut context);

        controller.dismiss_view(id + 1, &hub, &mut rq, &mut context);
        assert!(controller.has_view());

        controller.dismiss_view(id, &hub, &mut rq, &mut context);
        assert!(!controller.has_view());
    }

    #[test]
    fn placement_follows_the_controller_rect() {
        let dropped = Rc::new(RefCell::new(Vec::new()));
        let (hub, _rx) = mpsc::channel();
        let mut rq = RenderQueue::new();
        let mut context = test_context();
        let mut controller = BasicViewController::new();

        controller.resize(rect![0, 0, 320, 240], &hub, &mut rq, &mut context);
        controller.push_and_show(
            SlotView::new("screen", false, &dropped),
            &press_confirm(),
            None,
            &hub,
            &mut rq,
            &mut context,
        );

        assert_eq!(controller.view().map(|v| *v.rect()), Some(rect![0, 0, 320, 240]));
    }
}
