use chatcloud_core::Msg;

/// What the socket thread hands to the UI loop.
#[derive(Debug, Clone, PartialEq)]
pub struct Incoming {
    pub stream: String,
    pub kind: IncomingKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IncomingKind {
    Connected,
    Disconnected,
    Timeline(Msg),
    Layout(Msg),
    Other(Msg),
    Error(String),
}

impl Incoming {
    pub fn connected(stream: String) -> Self {
        Self {
            stream,
            kind: IncomingKind::Connected,
        }
    }

    pub fn disconnected(stream: String) -> Self {
        Self {
            stream,
            kind: IncomingKind::Disconnected,
        }
    }

    /// Sorts a decoded message into the lane the UI cares about.
    pub fn message(stream: String, msg: Msg) -> Self {
        let kind = match &msg {
            Msg::Timeline { .. } => IncomingKind::Timeline(msg),
            Msg::LayoutProgress { .. } | Msg::LayoutDone { .. } => IncomingKind::Layout(msg),
            _ => IncomingKind::Other(msg),
        };
        Self { stream, kind }
    }

    pub fn error(stream: String, msg: String) -> Self {
        Self {
            stream,
            kind: IncomingKind::Error(msg),
        }
    }
}
