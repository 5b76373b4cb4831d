use chatcloud_core::{Msg, Placement, Selection, TimeBucket};

use crate::net::{Incoming, IncomingKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassProgress {
    pub pass: u64,
    pub placed: usize,
    pub attempted: usize,
    pub total: usize,
}

/// A finished layout. Only complete passes ever become the visible cloud.
#[derive(Debug, Clone, PartialEq)]
pub struct Cloud {
    pub pass: u64,
    pub placements: Vec<Placement>,
    pub dropped: usize,
}

/// What changed after applying a message, so the UI knows what to redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    Nothing,
    Status,
    Timeline,
    Progress,
    Cloud,
}

#[derive(Debug, Default)]
pub struct ViewerState {
    pub connected: bool,
    pub agent_version: Option<String>,
    /// Full-range timeline; fixes the axis the brush is measured against.
    pub axis: Vec<TimeBucket>,
    pub active: Vec<TimeBucket>,
    pub selection: Option<Selection>,
    pub progress: Option<PassProgress>,
    pub cloud: Option<Cloud>,
    pub last_error: Option<String>,
    newest_pass: u64,
}

impl ViewerState {
    pub fn apply(&mut self, incoming: Incoming) -> Update {
        let Incoming { stream, kind } = incoming;
        match kind {
            IncomingKind::Connected => {
                self.connected = true;
                self.last_error = None;
                Update::Status
            }
            IncomingKind::Disconnected => {
                self.connected = false;
                self.progress = None;
                Update::Status
            }
            IncomingKind::Error(message) => {
                tracing::debug!(%stream, error = %message, "agent link error");
                self.last_error = Some(message);
                Update::Status
            }
            IncomingKind::Timeline(msg) | IncomingKind::Layout(msg) | IncomingKind::Other(msg) => {
                self.apply_msg(msg)
            }
        }
    }

    fn apply_msg(&mut self, msg: Msg) -> Update {
        match msg {
            Msg::Hello { version, .. } => {
                self.agent_version = Some(version);
                Update::Status
            }
            Msg::Timeline { buckets, selection } => {
                if selection.is_none() {
                    self.axis = buckets.clone();
                }
                self.active = buckets;
                self.selection = selection;
                Update::Timeline
            }
            Msg::LayoutProgress {
                pass,
                placed,
                attempted,
                total,
            } => {
                if !self.admit(pass) {
                    return Update::Nothing;
                }
                self.progress = Some(PassProgress {
                    pass,
                    placed,
                    attempted,
                    total,
                });
                Update::Progress
            }
            Msg::LayoutDone {
                pass,
                placements,
                dropped,
            } => {
                if !self.admit(pass) {
                    return Update::Nothing;
                }
                self.progress = None;
                self.cloud = Some(Cloud {
                    pass,
                    placements,
                    dropped,
                });
                Update::Cloud
            }
            Msg::Error { message } => {
                self.last_error = Some(message);
                Update::Status
            }
            Msg::Pong => Update::Nothing,
            other => {
                tracing::debug!(msg = ?std::mem::discriminant(&other), "ignoring message");
                Update::Nothing
            }
        }
    }

    /// Output from a pass older than one already seen is stale.
    fn admit(&mut self, pass: u64) -> bool {
        if pass < self.newest_pass {
            return false;
        }
        self.newest_pass = pass;
        true
    }

    /// Active count per axis bucket; buckets outside the selection count zero.
    pub fn active_counts(&self) -> Vec<usize> {
        self.axis
            .iter()
            .map(|bucket| {
                self.active
                    .iter()
                    .find(|b| b.start == bucket.start)
                    .map_or(0, |b| b.count)
            })
            .collect()
    }
}
