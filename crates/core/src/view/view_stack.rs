//! A navigation controller owning an ordered stack of views.
//!
//! The stack owns every pushed view for its whole lifetime: ownership
//! transfers in on push and the view is dropped on pop. Only the tail entry
//! is active; it alone receives input and drawing, unless the navigation
//! bar currently holds focus. Each entry records at push time whether the
//! navigation bar should be visible while that entry is on top.
//!
//! # Event routing
//!
//! [`handle_event`](ViewStack::handle_event) offers the event to the
//! focused element first (navigation bar when it holds focus, tail view
//! otherwise). When the tail view declines a directional press toward the
//! bar's edge, focus transfers to the bar and the event is offered again.
//! An event declined by both is reported unhandled.
//!
//! # Re-entrancy
//!
//! Focus transfer is guarded: a transfer triggered from inside another
//! transfer's side effects fails instead of recursing. No other operation
//! is guarded; a view's event handler calling back into its own stack
//! synchronously is a documented hazard of the single-threaded model.

use super::controller::ViewController;
use super::nav_view::NavView;
use super::{Bus, Event, Hub, Id, RenderData, RenderQueue, View, ID_FEEDER};
use crate::context::Context;
use crate::framebuffer::{Framebuffer, UpdateMode};
use crate::geom::{Dir, Rectangle};
use tracing::debug;

/// Delegate invoked for every view the stack removes, after the view is
/// detached from the sequence and before it is dropped. Replace, don't
/// compose: setting a new delegate discards the previous one.
pub type RemoveViewDelegate = Box<dyn FnMut(&ViewStack, &mut dyn View)>;

struct ViewEntry {
    view: Box<dyn View>,
    needs_nav_view: bool,
}

pub struct ViewStack {
    id: Id,
    views: Vec<ViewEntry>,
    nav: Option<Box<dyn NavView>>,
    view_rect: Rectangle,
    custom_view_rect: Rectangle,
    on_remove_view: Option<RemoveViewDelegate>,
    show_nav_back_btn: bool,
    nav_view_shown: bool,
    nav_view_has_focus: bool,
    changing_view_focus: bool,
}

impl Default for ViewStack {
    fn default() -> ViewStack {
        ViewStack::new()
    }
}

impl ViewStack {
    pub fn new() -> ViewStack {
        ViewStack {
            id: ID_FEEDER.next(),
            views: Vec::new(),
            nav: None,
            view_rect: Rectangle::default(),
            custom_view_rect: Rectangle::default(),
            on_remove_view: None,
            show_nav_back_btn: true,
            nav_view_shown: true,
            nav_view_has_focus: false,
            changing_view_focus: false,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    /// Installs the navigation bar, replacing any previous one.
    pub fn set_nav_view(&mut self, nav: Box<dyn NavView>) {
        self.nav = Some(nav);
        self.sync_nav_chrome();
    }

    pub fn nav_view(&self) -> Option<&dyn NavView> {
        self.nav.as_deref()
    }

    pub fn size(&self) -> usize {
        self.views.len()
    }

    pub fn top(&self) -> Option<&dyn View> {
        self.views.last().map(|entry| entry.view.as_ref())
    }

    pub fn top_mut(&mut self) -> Option<&mut dyn View> {
        self.views.last_mut().map(|entry| entry.view.as_mut())
    }

    pub fn view_at(&self, idx: usize) -> Option<&dyn View> {
        self.views.get(idx).map(|entry| entry.view.as_ref())
    }

    /// Index of the identified view, 0 being the root.
    pub fn view_idx(&self, id: Id) -> Option<usize> {
        self.views.iter().position(|entry| entry.view.id() == id)
    }

    /// Index of the first view carrying `label`, 0 being the root.
    pub fn view_idx_by_label(&self, label: &str) -> Option<usize> {
        self.views
            .iter()
            .position(|entry| entry.view.label() == label)
    }

    pub fn contains(&self, id: Id) -> bool {
        self.view_idx(id).is_some()
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.view_idx_by_label(label).is_some()
    }

    /// True while the content view, not the navigation bar, receives input
    /// first.
    pub fn view_has_focus(&self) -> bool {
        !self.nav_view_has_focus
    }

    /// The tail entry's navigation-bar requirement; an empty stack reports
    /// the default policy for the next push.
    pub fn top_needs_nav_view(&self) -> bool {
        self.views.last().map_or(true, |entry| entry.needs_nav_view)
    }

    pub fn nav_view_is_active(&self) -> bool {
        self.nav.is_some() && self.nav_view_shown && self.top_needs_nav_view()
    }

    /// The rect left for content after navigation-bar subtraction.
    pub fn content_rect(&self) -> Rectangle {
        self.custom_view_rect
    }

    pub fn set_on_remove_view<F>(&mut self, del: F)
    where
        F: FnMut(&ViewStack, &mut dyn View) + 'static,
    {
        self.on_remove_view = Some(Box::new(del));
    }

    /// Appends a view without placing it; a later [`resize`] makes it
    /// visible. Ownership transfers unconditionally.
    ///
    /// [`resize`]: ViewStack::resize
    pub fn push(&mut self, mut view: Box<dyn View>, evt: &Event, hub: &Hub, context: &mut Context) {
        view.on_attach(evt, hub, context);
        self.views.push(ViewEntry {
            view,
            needs_nav_view: true,
        });
        self.sync_nav_chrome();
    }

    /// Pushes a view and immediately makes it the visible, placed tail.
    ///
    /// `needs_nav_view` records whether the navigation bar stays visible
    /// while this view is on top; `None` inherits the current top's policy.
    pub fn push_and_show(
        &mut self,
        mut view: Box<dyn View>,
        evt: &Event,
        needs_nav_view: Option<bool>,
        hub: &Hub,
        rq: &mut RenderQueue,
        context: &mut Context,
    ) {
        let needs_nav_view = needs_nav_view.unwrap_or_else(|| self.top_needs_nav_view());
        view.on_attach(evt, hub, context);
        self.views.push(ViewEntry {
            view,
            needs_nav_view,
        });
        self.sync_nav_chrome();
        self.resize_current(hub, rq, context);
        rq.add(RenderData::new(self.id, self.view_rect, UpdateMode::Gui));
    }

    /// Removes and drops the tail entry. Popping an empty stack is a
    /// no-op: event races legitimately double-fire.
    pub fn pop(&mut self, hub: &Hub, rq: &mut RenderQueue, context: &mut Context) {
        let Some(entry) = self.views.pop() else {
            debug!("pop on an empty view stack");
            return;
        };
        self.notify_removed(entry.view, hub, context);
        self.update_nav_chrome(rq);
    }

    /// Pops, then places and shows the uncovered view, if any.
    pub fn pop_and_show(&mut self, hub: &Hub, rq: &mut RenderQueue, context: &mut Context) {
        self.pop(hub, rq, context);
        if !self.views.is_empty() {
            self.resize_current(hub, rq, context);
        }
        rq.add(RenderData::new(self.id, self.view_rect, UpdateMode::Gui));
    }

    /// Removes every entry above the root.
    pub fn pop_to_root(&mut self, hub: &Hub, rq: &mut RenderQueue, context: &mut Context) {
        let above_root = self.views.len().saturating_sub(1);
        self.pop_views(above_root, hub, context);
        self.update_nav_chrome(rq);
        if !self.views.is_empty() {
            self.resize_current(hub, rq, context);
        }
        rq.add(RenderData::new(self.id, self.view_rect, UpdateMode::Gui));
    }

    /// Removes every entry, leaving the stack empty. The navigation bar is
    /// retained, but no content is drawn until the next push.
    pub fn pop_all(&mut self, hub: &Hub, rq: &mut RenderQueue, context: &mut Context) {
        self.pop_views(self.views.len(), hub, context);
        self.update_nav_chrome(rq);
        rq.add(RenderData::new(self.id, self.view_rect, UpdateMode::Gui));
    }

    /// Removes entries above the identified view, making it the tail. A
    /// view not on the stack leaves it unchanged.
    pub fn pop_to(&mut self, id: Id, hub: &Hub, rq: &mut RenderQueue, context: &mut Context) {
        let Some(idx) = self.view_idx(id) else {
            return;
        };
        self.pop_above(idx, hub, rq, context);
    }

    /// Like [`pop_to`](ViewStack::pop_to), locating the target by label.
    pub fn pop_to_label(
        &mut self,
        label: &str,
        hub: &Hub,
        rq: &mut RenderQueue,
        context: &mut Context,
    ) {
        let Some(idx) = self.view_idx_by_label(label) else {
            return;
        };
        self.pop_above(idx, hub, rq, context);
    }

    fn pop_above(&mut self, idx: usize, hub: &Hub, rq: &mut RenderQueue, context: &mut Context) {
        let num = self.views.len() - 1 - idx;
        if num == 0 {
            return;
        }
        self.pop_views(num, hub, context);
        self.update_nav_chrome(rq);
        self.resize_current(hub, rq, context);
        rq.add(RenderData::new(self.id, self.view_rect, UpdateMode::Gui));
    }

    /// Removes `num` entries from the tail, clamped to the available depth.
    /// Asking for more than the stack holds empties it without error.
    fn pop_views(&mut self, num: usize, hub: &Hub, context: &mut Context) {
        let num = num.min(self.views.len());
        for _ in 0..num {
            if let Some(entry) = self.views.pop() {
                self.notify_removed(entry.view, hub, context);
            }
        }
    }

    /// Dismisses a view by identity: the tail through a pop-and-show, a
    /// buried entry by plain removal. Unknown ids are ignored.
    pub fn dismiss_view(&mut self, id: Id, hub: &Hub, rq: &mut RenderQueue, context: &mut Context) {
        let Some(idx) = self.view_idx(id) else {
            return;
        };
        if idx + 1 == self.views.len() {
            self.pop_and_show(hub, rq, context);
        } else {
            let entry = self.views.remove(idx);
            self.notify_removed(entry.view, hub, context);
            self.update_nav_chrome(rq);
        }
    }

    fn notify_removed(&mut self, mut view: Box<dyn View>, hub: &Hub, context: &mut Context) {
        view.on_dismiss(hub, context);
        if let Some(mut del) = self.on_remove_view.take() {
            del(self, view.as_mut());
            // The delegate may have installed a replacement while running.
            if self.on_remove_view.is_none() {
                self.on_remove_view = Some(del);
            }
        }
    }

    /// Routes an event to the focused element first; see the module
    /// documentation for the full routing rule.
    pub fn handle_event(
        &mut self,
        evt: &Event,
        hub: &Hub,
        bus: &mut Bus,
        rq: &mut RenderQueue,
        context: &mut Context,
    ) -> bool {
        if self.nav_view_has_focus {
            if let Some(nav) = self.nav.as_mut() {
                if nav.handle_event(evt, hub, bus, rq, context) {
                    return true;
                }
            }
            if evt.direction() == Some(Dir::South) {
                return self.move_focus_to_next_view(evt, Dir::South, hub, bus, rq, context);
            }
            return false;
        }

        if let Some(entry) = self.views.last_mut() {
            if entry.view.handle_event(evt, hub, bus, rq, context) {
                return true;
            }
        }

        if evt.direction() == Some(Dir::North) && self.nav_view_is_active() {
            return self.move_focus_to_next_view(evt, Dir::North, hub, bus, rq, context);
        }

        false
    }

    /// Moves focus between the content view and the navigation bar.
    ///
    /// Succeeds only when a focusable neighbor exists in `direction` and no
    /// other transfer is in progress; the newly focused bar is offered the
    /// triggering event once the transfer is done.
    pub fn move_focus_to_next_view(
        &mut self,
        evt: &Event,
        direction: Dir,
        hub: &Hub,
        bus: &mut Bus,
        rq: &mut RenderQueue,
        context: &mut Context,
    ) -> bool {
        if self.changing_view_focus {
            return false;
        }
        self.changing_view_focus = true;

        let mut moved = false;
        if self.nav_view_has_focus {
            if direction == Dir::South && !self.views.is_empty() {
                self.nav_view_has_focus = false;
                if let Some(nav) = self.nav.as_mut() {
                    nav.set_focused(false);
                    rq.add(RenderData::new(nav.id(), *nav.rect(), UpdateMode::Gui));
                }
                moved = true;
            }
        } else if direction == Dir::North && self.nav_view_is_active() {
            self.nav_view_has_focus = true;
            if let Some(nav) = self.nav.as_mut() {
                nav.set_focused(true);
                nav.handle_event(evt, hub, bus, rq, context);
                rq.add(RenderData::new(nav.id(), *nav.rect(), UpdateMode::Gui));
            }
            moved = true;
        }

        self.changing_view_focus = false;
        moved
    }

    /// Lays the stack out inside `rect`: the navigation bar keeps its
    /// occupied strip and the tail view gets the rest. Idempotent.
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

    /// Re-places the navigation bar and the tail view within the current
    /// rects, after the tail or the bar's visibility changed.
    fn resize_current(&mut self, hub: &Hub, rq: &mut RenderQueue, context: &mut Context) {
        let full = self.view_rect;
        let mut content = full;

        if self.nav_view_is_active() {
            if let Some(nav) = self.nav.as_mut() {
                let occupied = nav.occupied_rect(&full);
                nav.resize(occupied, hub, rq, context);
                content = rect![full.min.x, occupied.max.y, full.max.x, full.max.y];
            }
        }

        self.custom_view_rect = content;
        if let Some(entry) = self.views.last_mut() {
            entry.view.resize(content, hub, rq, context);
        }
    }

    /// Draws back to front: the navigation bar strip first, then the active
    /// view in its content rect. The bar is never occluded because content
    /// is laid out outside its strip.
    pub fn render(&self, fb: &mut dyn Framebuffer, rect: Rectangle) {
        if self.nav_view_is_active() {
            if let Some(nav) = self.nav.as_ref() {
                nav.render(fb, rect);
            }
        }
        if let Some(entry) = self.views.last() {
            entry.view.render(fb, rect);
        }
    }

    /// Schedules a full repaint of the stack's region.
    pub fn show(&mut self, rq: &mut RenderQueue) {
        rq.add(RenderData::new(self.id, self.view_rect, UpdateMode::Full));
    }

    /// Shows or hides the navigation bar; the content rect follows.
    pub fn show_nav_view(
        &mut self,
        show: bool,
        hub: &Hub,
        rq: &mut RenderQueue,
        context: &mut Context,
    ) {
        self.nav_view_shown = show;
        self.sync_nav_chrome();
        self.resize_current(hub, rq, context);
        rq.add(RenderData::new(self.id, self.view_rect, UpdateMode::Gui));
    }

    /// Enables or disables the back button policy. The button still only
    /// appears while there is somewhere to go back to.
    pub fn set_show_nav_view_back_button(&mut self, show: bool, rq: &mut RenderQueue) {
        self.show_nav_back_btn = show;
        self.update_nav_chrome(rq);
    }

    /// Applies title and back-button state to the bar and drops bar focus
    /// when the bar is no longer active.
    fn sync_nav_chrome(&mut self) {
        let back = self.show_nav_back_btn && self.views.len() > 1;
        let title = self
            .views
            .last()
            .map_or(String::new(), |entry| entry.view.label().to_string());
        if let Some(nav) = self.nav.as_mut() {
            nav.show_back_button(back);
            nav.set_title(&title);
        }
        if self.nav_view_has_focus && !self.nav_view_is_active() {
            self.nav_view_has_focus = false;
            if let Some(nav) = self.nav.as_mut() {
                nav.set_focused(false);
            }
        }
    }

    fn update_nav_chrome(&mut self, rq: &mut RenderQueue) {
        self.sync_nav_chrome();
        if self.nav_view_is_active() {
            if let Some(nav) = self.nav.as_ref() {
                rq.add(RenderData::new(nav.id(), *nav.rect(), UpdateMode::Gui));
            }
        }
    }
}

impl ViewController for ViewStack {
    fn push_and_show(
        &mut self,
        view: Box<dyn View>,
        evt: &Event,
        needs_nav_view: Option<bool>,
        hub: &Hub,
        rq: &mut RenderQueue,
        context: &mut Context,
    ) {
        ViewStack::push_and_show(self, view, evt, needs_nav_view, hub, rq, context);
    }

    fn pop(&mut self, hub: &Hub, rq: &mut RenderQueue, context: &mut Context) {
        ViewStack::pop(self, hub, rq, context);
    }

    fn pop_and_show(&mut self, hub: &Hub, rq: &mut RenderQueue, context: &mut Context) {
        ViewStack::pop_and_show(self, hub, rq, context);
    }

    fn dismiss_view(&mut self, id: Id, hub: &Hub, rq: &mut RenderQueue, context: &mut Context) {
        ViewStack::dismiss_view(self, id, hub, rq, context);
    }

    fn handle_event(
        &mut self,
        evt: &Event,
        hub: &Hub,
        bus: &mut Bus,
        rq: &mut RenderQueue,
        context: &mut Context,
    ) -> bool {
        ViewStack::handle_event(self, evt, hub, bus, rq, context)
    }

    fn move_focus_to_next_view(
        &mut self,
        evt: &Event,
        direction: Dir,
        hub: &Hub,
        bus: &mut Bus,
        rq: &mut RenderQueue,
        context: &mut Context,
    ) -> bool {
        ViewStack::move_focus_to_next_view(self, evt, direction, hub, bus, rq, context)
    }
}
