//! The chromosome widget: loads a segment, lays it out, and turns band
//! clicks into selectors shared through the scope's registry.

use std::rc::Rc;
use std::sync::mpsc::Receiver;

use chromovis_protocol::{RenderCommand, SharedStr};
use thiserror::Error;

use crate::mapper::{CoordinateMapper, ScalingMode};
use crate::model::{ConfigError, GenomeSegmentModel, Mode, ViewConfig, Width};
use crate::selection::{
    RefreshHook, SelectionRange, SelectionRegistry, SelectorEvent, SelectorId, SelectorRef,
    SelectorSnapshot,
};
use crate::source::{AnnotationSource, SourceError};
use crate::views::axis::render_bp_axis;
use crate::views::bands::{BandLayout, HoverLabel};
use crate::views::{AXIS_SPACING, PADDING};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("view {0} already has a load in flight")]
    LoadInFlight(String),
    #[error("view {0} has been torn down")]
    TornDown(String),
    #[error("view {view} has no selector {id}")]
    UnknownSelector { view: String, id: SelectorId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Uninitialized,
    Loading,
    /// Model loaded. Drawn blank when the segment had no bands.
    Rendered,
    ErrorDisplayed,
    TornDown,
}

/// Identifies one load request. Completions carrying an older ticket are
/// discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

/// Emitted for every click on a band.
#[derive(Debug, Clone)]
pub struct BandClicked {
    pub start_bp: u64,
    pub end_bp: u64,
    /// The selector the click created, if the mode allowed one.
    pub created: Option<SelectorRef>,
}

pub struct ChromosomeView {
    config: ViewConfig,
    id: SharedStr,
    registry: SelectionRegistry,
    events: Receiver<SelectorEvent>,
    state: ViewState,
    generation: u64,
    model: Option<GenomeSegmentModel>,
    mapper: Option<Rc<CoordinateMapper>>,
    layout: BandLayout,
    hover: Option<HoverLabel>,
    container_width: f64,
    refresh: Option<RefreshHook>,
}

impl ChromosomeView {
    pub fn new(config: ViewConfig, registry: SelectionRegistry) -> Result<Self, ConfigError> {
        config.validate()?;
        let events = registry.subscribe_deletions();
        Ok(Self {
            id: SharedStr::from(config.id.as_str()),
            config,
            registry,
            events,
            state: ViewState::Uninitialized,
            generation: 0,
            model: None,
            mapper: None,
            layout: BandLayout::default(),
            hover: None,
            container_width: 0.0,
            refresh: None,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn model(&self) -> Option<&GenomeSegmentModel> {
        self.model.as_ref()
    }

    pub fn mapper(&self) -> Option<&Rc<CoordinateMapper>> {
        self.mapper.as_ref()
    }

    pub fn layout(&self) -> &BandLayout {
        &self.layout
    }

    pub fn hover_label(&self) -> Option<&HoverLabel> {
        self.hover.as_ref()
    }

    /// Callback run synchronously whenever one of this view's selectors
    /// changes through dragging or moving.
    pub fn set_refresh_hook(&mut self, hook: RefreshHook) {
        for sel in self.selectors() {
            sel.borrow_mut().set_listener(Some(hook.clone()));
        }
        self.refresh = Some(hook);
    }

    /// Start a load. Only one may be in flight per view.
    pub fn begin_load(&mut self) -> Result<LoadTicket, ViewError> {
        match self.state {
            ViewState::TornDown => return Err(ViewError::TornDown(self.id.to_string())),
            ViewState::Loading => return Err(ViewError::LoadInFlight(self.id.to_string())),
            _ => {}
        }
        self.generation += 1;
        self.state = ViewState::Loading;
        log::debug!(
            "{}: loading chr{} (GRCh{})",
            self.id,
            self.config.chr,
            self.config.assembly
        );
        Ok(LoadTicket {
            generation: self.generation,
        })
    }

    /// Deliver the outcome of a load. Failures are logged and shown as
    /// [`ViewState::ErrorDisplayed`]; nothing is returned to the caller.
    ///
    /// A response without a segment counts as an empty model: the view is
    /// `Rendered` and blank. Selectors survive a failed load and are rebound
    /// by the next successful one.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<GenomeSegmentModel, SourceError>,
    ) {
        if self.state != ViewState::Loading || ticket.generation != self.generation {
            log::debug!("{}: discarding stale load result", self.id);
            return;
        }

        self.process_events();
        let result = match result {
            Err(SourceError::EmptySegment(what)) => {
                log::warn!("{}: no segment data for chr{} in {what}", self.id, self.config.chr);
                GenomeSegmentModel::new(self.config.chr.clone(), 0, 0, Vec::new())
                    .map_err(SourceError::from)
            }
            other => other,
        };

        match result {
            Ok(model) => {
                self.model = Some(model);
                self.rebuild();
                self.state = ViewState::Rendered;
            }
            Err(err) => {
                log::error!("{}: failed to load chr{}: {err}", self.id, self.config.chr);
                self.model = None;
                self.mapper = None;
                self.layout = BandLayout::default();
                self.hover = None;
                self.state = ViewState::ErrorDisplayed;
            }
        }
    }

    /// Fetch from `source` and complete in one step.
    pub fn load_from(&mut self, source: &dyn AnnotationSource) -> Result<(), ViewError> {
        let ticket = self.begin_load()?;
        let result = source.fetch_segment(&self.config.chr, self.config.assembly);
        self.complete_load(ticket, result);
        Ok(())
    }

    /// New measured container width. Rebuilds the mapper and moves the
    /// selectors onto it.
    pub fn resize(&mut self, container_width: f64) {
        self.process_events();
        self.container_width = container_width;
        if self.model.is_some() {
            self.rebuild();
        }
    }

    fn rebuild(&mut self) {
        self.hover = None;
        let Some(model) = &self.model else {
            return;
        };

        let measured = self.container_width;
        let mapper = match CoordinateMapper::for_segment(
            model,
            self.config.width,
            || measured,
            ScalingMode::from_rel_size(self.config.rel_size),
            PADDING,
        ) {
            Ok(mapper) => Rc::new(mapper),
            Err(err) => {
                log::warn!("{}: nothing to draw: {err}", self.id);
                self.mapper = None;
                self.layout = BandLayout::default();
                return;
            }
        };

        self.layout = BandLayout::layout(model.bands(), &mapper, self.config.height, PADDING);
        for sel in self.selectors() {
            sel.borrow_mut().rebind(mapper.clone());
        }
        self.mapper = Some(mapper);
    }

    /// Ignored unless the view is `Rendered`.
    pub fn hover(&mut self, band_index: usize) {
        if self.state != ViewState::Rendered {
            self.hover = None;
            return;
        }
        self.hover = self.layout.get(band_index).map(HoverLabel::for_band);
    }

    pub fn mouse_out(&mut self) {
        self.hover = None;
    }

    /// Click on the band at `band_index`. Creates a selector when the mode
    /// allows: always in `multi`, only with no selector of this view in
    /// `single`. Ignored unless the view is `Rendered`.
    pub fn click(&mut self, band_index: usize) -> Option<BandClicked> {
        self.process_events();
        if self.state != ViewState::Rendered {
            return None;
        }
        let mapper = self.mapper.clone()?;
        let band = self.layout.get(band_index)?;
        let (start_bp, end_bp) = (band.start_bp, band.end_bp);

        let allowed = match self.config.mode {
            Mode::Multi => true,
            Mode::Single => self.selectors().is_empty(),
        };
        let created = allowed.then(|| {
            let mut range = SelectionRange::create(
                self.registry.next_id(),
                self.id.clone(),
                mapper,
                start_bp as f64,
                end_bp as f64,
                PADDING - AXIS_SPACING,
                self.config.height,
            );
            range.set_listener(self.refresh.clone());
            range.redraw();
            let shared = range.into_shared();
            self.registry.add(shared.clone());
            shared
        });

        Some(BandClicked {
            start_bp,
            end_bp,
            created,
        })
    }

    /// Click at a canvas position; ignored unless it lands on a band.
    pub fn click_at(&mut self, x: f64, y: f64) -> Option<BandClicked> {
        if self.state != ViewState::Rendered {
            return None;
        }
        let index = self.layout.hit_test(x, y)?.index;
        self.click(index)
    }

    /// This view's selectors, in creation order.
    pub fn selectors(&self) -> Vec<SelectorRef> {
        self.registry.owned_by(&self.id)
    }

    pub fn selector(&self, id: SelectorId) -> Result<SelectorRef, ViewError> {
        self.registry
            .find(id)
            .filter(|s| s.borrow().owner() == &self.id)
            .ok_or_else(|| ViewError::UnknownSelector {
                view: self.id.to_string(),
                id,
            })
    }

    /// Detach the selector's handle and remove it from the registry.
    pub fn delete_selector(&mut self, sel: &SelectorRef) -> bool {
        self.process_events();
        sel.borrow_mut().delete();
        self.registry.delete(sel)
    }

    pub fn drag_selector(
        &mut self,
        id: SelectorId,
        px0: f64,
        px1: f64,
    ) -> Result<SelectorSnapshot, ViewError> {
        self.process_events();
        let sel = self.selector(id)?;
        SelectionRange::drag_shared(&sel, px0, px1);
        let snapshot = sel.borrow().snapshot();
        Ok(snapshot)
    }

    pub fn move_selector(
        &mut self,
        id: SelectorId,
        start_bp: f64,
        end_bp: f64,
    ) -> Result<SelectorSnapshot, ViewError> {
        self.process_events();
        let sel = self.selector(id)?;
        SelectionRange::move_shared(&sel, start_bp, end_bp);
        let snapshot = sel.borrow().snapshot();
        Ok(snapshot)
    }

    /// Drain registry clears and delete the handles of the removed
    /// selectors this view created. Every mutating operation drains first,
    /// so the queue only holds clears since the last call.
    pub fn process_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            handled += 1;
            if let SelectorEvent::Deleted(removed) = event {
                for sel in removed.iter().filter(|s| s.borrow().owner() == &self.id) {
                    sel.borrow_mut().delete();
                }
            }
        }
        handled
    }

    /// Mark the view destroyed. Late load completions are dropped and this
    /// view's selectors leave the registry.
    pub fn teardown(&mut self) {
        if self.state == ViewState::TornDown {
            return;
        }
        self.process_events();
        for sel in self.selectors() {
            self.delete_selector(&sel);
        }
        self.state = ViewState::TornDown;
        self.hover = None;
        log::debug!("{}: torn down", self.id);
    }

    pub fn canvas_width(&self) -> f64 {
        match self.config.width {
            Width::Pixels(px) => px,
            Width::Inherit => self.container_width,
        }
    }

    pub fn canvas_height(&self) -> f64 {
        if self.config.axis {
            self.config.height + 2.0 * PADDING
        } else {
            self.config.height + PADDING
        }
    }

    /// Bands, hover label, axis, and selectors, in paint order.
    pub fn render(&self) -> Vec<RenderCommand> {
        let Some(mapper) = self.mapper.as_deref() else {
            return Vec::new();
        };
        if self.state != ViewState::Rendered {
            return Vec::new();
        }

        let mut commands = Vec::with_capacity(self.layout.geometries.len() + 48);
        commands.push(RenderCommand::BeginGroup {
            id: SharedStr::from(format!("{}svg", self.id)),
            class: Some("chromosome".into()),
        });
        commands.extend(self.layout.render());
        if let Some(label) = &self.hover {
            commands.push(label.render());
        }
        if self.config.axis {
            commands.extend(render_bp_axis(
                mapper,
                self.config.height + PADDING + AXIS_SPACING,
            ));
        }
        for sel in self.selectors() {
            commands.extend(sel.borrow().render());
        }
        commands.push(RenderCommand::EndGroup);
        commands
    }
}

impl Drop for ChromosomeView {
    fn drop(&mut self) {
        self.teardown();
    }
}
