use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub mod scale;

pub use scale::TimeScale;

/// Wall-clock time as written in the record file (no zone attached).
pub type Timestamp = NaiveDateTime;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub time: Timestamp,
    pub user_id: String,
    pub text: String,
    pub words: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeBucket {
    pub start: Timestamp,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct WordCount {
    pub word: String,
    pub count: u32,
}

impl WordCount {
    pub fn new(word: impl Into<String>, count: u32) -> Self {
        Self {
            word: word.into(),
            count,
        }
    }
}

/// Axis-aligned rectangle, `x0 <= x1` and `y0 <= y1`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn centered(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        let hw = width.max(0.0) / 2.0;
        let hh = height.max(0.0) / 2.0;
        Self {
            x0: cx - hw,
            y0: cy - hh,
            x1: cx + hw,
            y1: cy + hh,
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Strict overlap: rectangles sharing only an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }

    pub fn contains(&self, other: &Rect) -> bool {
        other.x0 >= self.x0 && other.x1 <= self.x1 && other.y0 >= self.y0 && other.y1 <= self.y1
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Placement {
    pub word: WordCount,
    /// Centre of the word box, relative to the canvas centre.
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    /// Degrees.
    pub rotation: f64,
    pub bounds: Rect,
}

/// Closed time interval; both ends are included.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Selection {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Selection {
    pub fn new(a: Timestamp, b: Timestamp) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn contains(&self, t: Timestamp) -> bool {
        self.start <= t && t <= self.end
    }
}

/// Drawing surface sizes announced by a viewer, in pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Viewport {
    pub timeline_width: f64,
    pub cloud_width: f64,
    pub cloud_height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            timeline_width: 700.0,
            cloud_width: 800.0,
            cloud_height: 600.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum Msg {
    Hello {
        version: String,
        #[serde(default)]
        viewport: Option<Viewport>,
    },
    Brush {
        x0: f64,
        x1: f64,
    },
    ClearBrush,
    Timeline {
        buckets: Vec<TimeBucket>,
        selection: Option<Selection>,
    },
    LayoutProgress {
        pass: u64,
        placed: usize,
        attempted: usize,
        total: usize,
    },
    LayoutDone {
        pass: u64,
        placements: Vec<Placement>,
        dropped: usize,
    },
    Ping,
    Pong,
    Error {
        message: String,
    },
}
