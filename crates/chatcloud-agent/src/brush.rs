use chatcloud_core::{Event, Selection, TimeBucket, TimeScale};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::frequency::frequencies;
use crate::layout::{LayoutConfig, LayoutPass};
use crate::store::EventStore;

/// Turns timeline brush gestures into selections and fresh layout passes.
/// Only the newest pass is current; starting one cancels its predecessor, and
/// dropping the controller cancels whatever is still running.
pub struct BrushController {
    scale: Option<TimeScale>,
    layout: LayoutConfig,
    next_pass: u64,
    current: Option<(u64, DropGuard)>,
}

impl BrushController {
    pub fn new(full_buckets: &[TimeBucket], timeline_width: f64, layout: LayoutConfig) -> Self {
        Self {
            scale: TimeScale::from_buckets(full_buckets, timeline_width),
            layout,
            next_pass: 1,
            current: None,
        }
    }

    pub fn current_pass(&self) -> Option<u64> {
        self.current.as_ref().map(|(id, _)| *id)
    }

    pub fn is_current(&self, pass: u64) -> bool {
        self.current_pass() == Some(pass)
    }

    pub fn selection_for(&self, x0: f64, x1: f64) -> Option<Selection> {
        self.scale.map(|scale| scale.selection(x0, x1))
    }

    /// Applies the brushed interval to the store. Store subscribers pick up
    /// the new active set and start the next pass. With no timeline (empty
    /// dataset) there is nothing to select, so the brush falls back to the
    /// full set.
    pub fn on_brush_end(&mut self, store: &mut EventStore, x0: f64, x1: f64) {
        match self.selection_for(x0, x1) {
            Some(selection) => {
                store.apply_selection(selection);
            }
            None => {
                store.clear_selection();
            }
        }
    }

    pub fn on_brush_clear(&mut self, store: &mut EventStore) {
        store.clear_selection();
    }

    pub fn start_pass(&mut self, active: &[Event]) -> LayoutPass {
        self.cancel_current();
        let id = self.next_pass;
        self.next_pass += 1;
        let token = CancellationToken::new();
        self.current = Some((id, token.clone().drop_guard()));

        let words = frequencies(active);
        tracing::debug!(pass = id, words = words.len(), "layout pass started");
        LayoutPass::new(id, words, self.layout, token)
    }

    pub fn cancel_current(&mut self) {
        if let Some((id, guard)) = self.current.take() {
            drop(guard);
            tracing::debug!(pass = id, "layout pass superseded");
        }
    }
}
