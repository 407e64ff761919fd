use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use chromovis_protocol::{HitTarget, Point, Rect, RenderCommand, SharedStr, ThemeToken};
use serde::Serialize;

use crate::mapper::CoordinateMapper;
use crate::views::AXIS_SPACING;

const EDGE_WIDTH: f64 = 6.0;

pub type SelectorId = u64;

/// Shared handle to a live selection range.
pub type SelectorRef = Rc<RefCell<SelectionRange>>;

/// Called synchronously after every drag frame or programmatic move.
pub type RefreshHook = Rc<dyn Fn(&SelectorSnapshot)>;

/// Plain-value view of a selection, as carried by registry notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorSnapshot {
    pub id: SelectorId,
    pub owner: SharedStr,
    pub start_bp: u64,
    pub end_bp: u64,
}

/// The interactive drag region of a range, in pixels relative to the
/// selector group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushHandle {
    pub x0: f64,
    pub x1: f64,
    pub height: f64,
}

impl BrushHandle {
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }
}

/// One user-drawn interval on a chromosome.
///
/// The range is bound to a shared mapper it does not own. Deleting it
/// detaches its handle and makes every later call a no-op; removing it from
/// the registry is the caller's job.
pub struct SelectionRange {
    id: SelectorId,
    owner: SharedStr,
    start_bp: u64,
    end_bp: u64,
    vertical_offset: f64,
    track_height: f64,
    mapper: Rc<CoordinateMapper>,
    handle: Option<BrushHandle>,
    listener: Option<RefreshHook>,
}

impl fmt::Debug for SelectionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionRange")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("start_bp", &self.start_bp)
            .field("end_bp", &self.end_bp)
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl SelectionRange {
    /// Create a range snapped to whole base pairs, with its handle attached.
    pub fn create(
        id: SelectorId,
        owner: impl Into<SharedStr>,
        mapper: Rc<CoordinateMapper>,
        start_bp: f64,
        end_bp: f64,
        vertical_offset: f64,
        track_height: f64,
    ) -> Self {
        let (start_bp, end_bp) = snap(&mapper, start_bp, end_bp);
        let mut range = Self {
            id,
            owner: owner.into(),
            start_bp,
            end_bp,
            vertical_offset,
            track_height,
            mapper,
            handle: None,
            listener: None,
        };
        range.handle = Some(range.attach());
        range
    }

    pub fn with_listener(mut self, listener: RefreshHook) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn set_listener(&mut self, listener: Option<RefreshHook>) {
        self.listener = listener;
    }

    pub fn into_shared(self) -> SelectorRef {
        Rc::new(RefCell::new(self))
    }

    pub fn id(&self) -> SelectorId {
        self.id
    }

    pub fn owner(&self) -> &SharedStr {
        &self.owner
    }

    pub fn start_bp(&self) -> u64 {
        self.start_bp
    }

    pub fn end_bp(&self) -> u64 {
        self.end_bp
    }

    pub fn vertical_offset(&self) -> f64 {
        self.vertical_offset
    }

    pub fn mapper(&self) -> &Rc<CoordinateMapper> {
        &self.mapper
    }

    /// `None` once the range has been deleted.
    pub fn handle(&self) -> Option<&BrushHandle> {
        self.handle.as_ref()
    }

    pub fn is_live(&self) -> bool {
        self.handle.is_some()
    }

    pub fn snapshot(&self) -> SelectorSnapshot {
        SelectorSnapshot {
            id: self.id,
            owner: self.owner.clone(),
            start_bp: self.start_bp,
            end_bp: self.end_bp,
        }
    }

    /// Detach and reattach the handle against the current mapper.
    pub fn redraw(&mut self) -> &mut Self {
        if self.handle.is_some() {
            self.handle = Some(self.attach());
        }
        self
    }

    /// Bind to a freshly built mapper (after a resize or reload) and redraw.
    pub fn rebind(&mut self, mapper: Rc<CoordinateMapper>) {
        if self.handle.is_none() {
            return;
        }
        let (start_bp, end_bp) = snap(&mapper, self.start_bp as f64, self.end_bp as f64);
        self.mapper = mapper;
        self.start_bp = start_bp;
        self.end_bp = end_bp;
        self.redraw();
    }

    /// Apply one drag frame with the handle at `[px0, px1]` and notify.
    /// Returns `false` when the range is inert.
    pub fn drag_to(&mut self, px0: f64, px1: f64) -> bool {
        if !self.apply_drag(px0, px1) {
            return false;
        }
        self.notify();
        true
    }

    /// Reassign the extent through the held handle and notify.
    pub fn move_to(&mut self, start_bp: f64, end_bp: f64) -> bool {
        if !self.apply_move(start_bp, end_bp) {
            return false;
        }
        self.notify();
        true
    }

    /// [`drag_to`](Self::drag_to) on a shared range. The borrow is released
    /// before the listener runs, so the listener may read the registry.
    pub fn drag_shared(range: &SelectorRef, px0: f64, px1: f64) -> bool {
        let pending = {
            let mut r = range.borrow_mut();
            if !r.apply_drag(px0, px1) {
                return false;
            }
            r.pending_notification()
        };
        fire(pending);
        true
    }

    /// [`move_to`](Self::move_to) on a shared range.
    pub fn move_shared(range: &SelectorRef, start_bp: f64, end_bp: f64) -> bool {
        let pending = {
            let mut r = range.borrow_mut();
            if !r.apply_move(start_bp, end_bp) {
                return false;
            }
            r.pending_notification()
        };
        fire(pending);
        true
    }

    /// Remove the handle. Idempotent.
    pub fn delete(&mut self) {
        if self.handle.take().is_some() {
            log::debug!("selector {} of {} deleted", self.id, self.owner);
        }
    }

    pub fn render(&self) -> Vec<RenderCommand> {
        let Some(handle) = self.handle else {
            return Vec::new();
        };

        vec![
            RenderCommand::BeginGroup {
                id: SharedStr::from(format!("{}-selector-{}", self.owner, self.id)),
                class: Some("selector".into()),
            },
            RenderCommand::PushTransform {
                translate: Point::new(0.0, self.vertical_offset),
            },
            RenderCommand::DrawRect {
                rect: Rect::new(handle.x0, 0.0, handle.width(), handle.height),
                color: ThemeToken::SelectorFill,
                border_color: Some(ThemeToken::SelectorBorder),
                tooltip: Some(SharedStr::from(format!("{}-{}", self.start_bp, self.end_bp))),
                class: Some("extent".into()),
                hit: Some(HitTarget::Selector(self.id)),
            },
            self.edge(handle.x0, false, handle.height),
            self.edge(handle.x1, true, handle.height),
            RenderCommand::PopTransform,
            RenderCommand::EndGroup,
        ]
    }

    fn edge(&self, x: f64, right: bool, height: f64) -> RenderCommand {
        RenderCommand::DrawRect {
            rect: Rect::new(x - EDGE_WIDTH / 2.0, 0.0, EDGE_WIDTH, height),
            color: ThemeToken::SelectorHandle,
            border_color: None,
            tooltip: None,
            class: Some(if right { "resize e" } else { "resize w" }.into()),
            hit: Some(HitTarget::SelectorEdge {
                selector: self.id,
                right,
            }),
        }
    }

    fn attach(&self) -> BrushHandle {
        BrushHandle {
            x0: self.mapper.to_pixel(self.start_bp as f64),
            x1: self.mapper.to_pixel(self.end_bp as f64),
            height: self.track_height + AXIS_SPACING * 2.0,
        }
    }

    fn apply_drag(&mut self, px0: f64, px1: f64) -> bool {
        let Some(handle) = self.handle.as_mut() else {
            return false;
        };
        let (a, b) = (self.mapper.clamp_px(px0), self.mapper.clamp_px(px1));
        let (x0, x1) = if a <= b { (a, b) } else { (b, a) };
        handle.x0 = x0;
        handle.x1 = x1;
        self.start_bp = self.mapper.to_bp(x0).round() as u64;
        self.end_bp = self.mapper.to_bp(x1).round() as u64;
        true
    }

    fn apply_move(&mut self, start_bp: f64, end_bp: f64) -> bool {
        if self.handle.is_none() {
            return false;
        }
        let (start_bp, end_bp) = snap(&self.mapper, start_bp, end_bp);
        self.start_bp = start_bp;
        self.end_bp = end_bp;
        self.handle = Some(self.attach());
        true
    }

    fn pending_notification(&self) -> Option<(RefreshHook, SelectorSnapshot)> {
        self.listener.clone().map(|hook| (hook, self.snapshot()))
    }

    fn notify(&self) {
        fire(self.pending_notification());
    }
}

fn fire(pending: Option<(RefreshHook, SelectorSnapshot)>) {
    if let Some((hook, snapshot)) = pending {
        hook(&snapshot);
    }
}

/// Round to whole base pairs, order the ends, and clamp to the mapper's domain.
fn snap(mapper: &CoordinateMapper, start_bp: f64, end_bp: f64) -> (u64, u64) {
    let (lo, hi) = mapper.domain();
    let clamp = |bp: f64| bp.clamp(lo, hi).round() as u64;
    let (a, b) = (clamp(start_bp), clamp(end_bp));
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn mapper() -> Rc<CoordinateMapper> {
        Rc::new(CoordinateMapper::from_parts(0, 1000, 900.0))
    }

    fn range() -> SelectionRange {
        SelectionRange::create(1, "chr1", mapper(), 100.4, 199.6, 26.0, 20.0)
    }

    #[test]
    fn create_snaps_extent() {
        let r = range();
        assert_eq!((r.start_bp(), r.end_bp()), (100, 200));
        let handle = r.handle().copied().unwrap();
        assert_eq!(handle.x0, 90.0);
        assert_eq!(handle.x1, 180.0);
        assert_eq!(handle.height, 28.0);
    }

    #[test]
    fn reversed_input_is_ordered() {
        let r = SelectionRange::create(1, "chr1", mapper(), 500.0, 100.0, 26.0, 20.0);
        assert_eq!((r.start_bp(), r.end_bp()), (100, 500));
    }

    #[test]
    fn redraw_is_idempotent() {
        let mut r = range();
        r.redraw();
        let once = r.handle().copied();
        r.redraw();
        assert_eq!(r.handle().copied(), once);
        assert_eq!(r.render(), {
            let mut fresh = range();
            fresh.redraw();
            fresh.render()
        });
    }

    #[test]
    fn drag_updates_bp_and_notifies_synchronously() {
        let seen = Rc::new(Cell::new((0, 0)));
        let sink = seen.clone();
        let mut r = range().with_listener(Rc::new(move |s: &SelectorSnapshot| {
            sink.set((s.start_bp, s.end_bp));
        }));
        assert!(r.drag_to(450.0, 900.0));
        assert_eq!((r.start_bp(), r.end_bp()), (500, 1000));
        assert_eq!(seen.get(), (500, 1000));
    }

    #[test]
    fn drag_is_clamped_to_the_range() {
        let mut r = range();
        r.drag_to(-40.0, 2000.0);
        assert_eq!((r.start_bp(), r.end_bp()), (0, 1000));
        let handle = r.handle().copied().unwrap();
        assert_eq!((handle.x0, handle.x1), (0.0, 900.0));
    }

    #[test]
    fn move_to_reuses_handle() {
        let mut r = range();
        assert!(r.move_to(300.0, 400.0));
        let handle = r.handle().copied().unwrap();
        assert_eq!((handle.x0, handle.x1), (270.0, 360.0));
    }

    #[test]
    fn delete_makes_range_inert() {
        let mut r = range();
        r.delete();
        r.delete();
        assert!(!r.is_live());
        assert!(!r.drag_to(0.0, 10.0));
        assert!(!r.move_to(0.0, 10.0));
        assert!(r.render().is_empty());
        assert_eq!((r.start_bp(), r.end_bp()), (100, 200));
    }

    #[test]
    fn rebind_follows_new_mapper() {
        let mut r = range();
        r.rebind(Rc::new(CoordinateMapper::from_parts(0, 1000, 450.0)));
        let handle = r.handle().copied().unwrap();
        assert_eq!((handle.x0, handle.x1), (45.0, 90.0));
    }

    #[test]
    fn shared_drag_releases_borrow_before_listener() {
        let shared: SelectorRef = range().into_shared();
        let probe = Rc::downgrade(&shared);
        let read_back = Rc::new(Cell::new(0));
        let sink = read_back.clone();
        shared
            .borrow_mut()
            .set_listener(Some(Rc::new(move |_: &SelectorSnapshot| {
                if let Some(r) = probe.upgrade() {
                    sink.set(r.borrow().end_bp());
                }
            })));
        assert!(SelectionRange::drag_shared(&shared, 0.0, 90.0));
        assert_eq!(read_back.get(), 100);
    }

    #[test]
    fn render_draws_extent_and_edges() {
        let cmds = range().render();
        let hits: Vec<_> = cmds
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawRect { hit, .. } => *hit,
                _ => None,
            })
            .collect();
        assert_eq!(
            hits,
            [
                HitTarget::Selector(1),
                HitTarget::SelectorEdge { selector: 1, right: false },
                HitTarget::SelectorEdge { selector: 1, right: true },
            ]
        );
    }
}
