//! Word-cloud placement.
//!
//! A [`LayoutPass`] places words in the order given (heaviest first). Each word
//! walks an Archimedean spiral out from the canvas centre and takes the first
//! spot whose padded box stays inside the canvas and overlaps nothing already
//! placed. Words whose spiral runs past half the canvas diagonal are dropped.
//!
//! Work is split into chunks of `chunk_size` words. The pass checks its
//! cancellation token before every chunk, never inside a word's search.

pub mod glyph;
pub mod quadtree;
pub mod scale;
pub mod spiral;

use chatcloud_core::{Placement, Rect, WordCount};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use glyph::{rotated_extent, GlyphMetrics};
use quadtree::QuadTree;
use scale::{SizeMapping, SqrtScale};
use spiral::ArchimedeanSpiral;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub width: f64,
    pub height: f64,
    pub font_min: f64,
    pub font_max: f64,
    pub spiral_step: f64,
    pub padding: f64,
    pub chunk_size: usize,
    /// A chunk also ends once this much time has gone by (after at least one word).
    pub chunk_budget: Option<Duration>,
    pub seed: u64,
    /// Start-point jitter as a fraction of the canvas size; 0 starts every word at the centre.
    pub jitter: f64,
    pub metrics: GlyphMetrics,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            font_min: 10.0,
            font_max: 200.0,
            spiral_step: 2.0,
            padding: 1.0,
            chunk_size: 32,
            chunk_budget: Some(Duration::from_millis(10)),
            seed: 0,
            jitter: 0.0,
            metrics: GlyphMetrics::default(),
        }
    }
}

impl LayoutConfig {
    pub fn with_canvas(mut self, width: f64, height: f64) -> Self {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self
    }

    pub fn canvas(&self) -> Rect {
        Rect::centered(0.0, 0.0, self.width, self.height)
    }

    fn aspect(&self) -> f64 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    fn search_radius(&self) -> f64 {
        self.width.hypot(self.height) / 2.0
    }
}

/// Picks a rotation in degrees for each word.
pub trait RotationPolicy: Send {
    fn rotation(&mut self, word: &WordCount, rng: &mut StdRng) -> f64;
}

impl<F> RotationPolicy for F
where
    F: FnMut(&WordCount, &mut StdRng) -> f64 + Send,
{
    fn rotation(&mut self, word: &WordCount, rng: &mut StdRng) -> f64 {
        self(word, rng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedRotation(pub f64);

impl RotationPolicy for FixedRotation {
    fn rotation(&mut self, _word: &WordCount, _rng: &mut StdRng) -> f64 {
        self.0
    }
}

/// 0 or 90 degrees, chosen from the seeded source.
#[derive(Debug, Clone, Copy, Default)]
#[allow(dead_code)]
pub struct RandomOrthogonal;

impl RotationPolicy for RandomOrthogonal {
    fn rotation(&mut self, _word: &WordCount, rng: &mut StdRng) -> f64 {
        if rng.gen_bool(0.5) {
            0.0
        } else {
            90.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutProgress {
    pub pass: u64,
    pub placed: usize,
    pub attempted: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    pub pass: u64,
    pub placements: Vec<Placement>,
    pub dropped: Vec<WordCount>,
}

#[derive(Debug)]
pub enum LayoutStep {
    Progress(LayoutProgress),
    Done(LayoutResult),
    Cancelled,
}

pub struct LayoutPass {
    id: u64,
    words: Vec<WordCount>,
    cursor: usize,
    config: LayoutConfig,
    canvas: Rect,
    index: QuadTree,
    placements: Vec<Placement>,
    dropped: Vec<WordCount>,
    /// Padded boxes whose spiral search found nothing; none dominates another.
    failed: Vec<(f64, f64)>,
    searches: usize,
    rng: StdRng,
    size: Box<dyn SizeMapping>,
    rotation: Box<dyn RotationPolicy>,
    cancel: CancellationToken,
    finished: bool,
}

impl LayoutPass {
    pub fn new(id: u64, words: Vec<WordCount>, config: LayoutConfig, cancel: CancellationToken) -> Self {
        let canvas = config.canvas();
        let size = SqrtScale::for_words(&words, config.font_min, config.font_max);
        Self {
            id,
            cursor: 0,
            canvas,
            index: QuadTree::new(canvas),
            placements: Vec::with_capacity(words.len()),
            dropped: Vec::new(),
            failed: Vec::new(),
            searches: 0,
            rng: StdRng::seed_from_u64(config.seed),
            size: Box::new(size),
            rotation: Box::new(FixedRotation(0.0)),
            words,
            config,
            cancel,
            finished: false,
        }
    }

    #[allow(dead_code)]
    pub fn with_size_mapping(mut self, size: impl SizeMapping + 'static) -> Self {
        self.size = Box::new(size);
        self
    }

    #[allow(dead_code)]
    pub fn with_rotation(mut self, rotation: impl RotationPolicy + 'static) -> Self {
        self.rotation = Box::new(rotation);
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn progress(&self) -> LayoutProgress {
        LayoutProgress {
            pass: self.id,
            placed: self.placements.len(),
            attempted: self.cursor,
            total: self.words.len(),
        }
    }

    /// Places the next chunk. A pass that already returned `Done` or
    /// `Cancelled` is spent and keeps answering `Cancelled`.
    pub fn step(&mut self) -> LayoutStep {
        if self.finished || self.cancel.is_cancelled() {
            if !self.finished {
                tracing::debug!(pass = self.id, attempted = self.cursor, "layout pass cancelled");
            }
            self.finished = true;
            self.placements.clear();
            self.dropped.clear();
            return LayoutStep::Cancelled;
        }

        let started = Instant::now();
        let end = (self.cursor + self.config.chunk_size.max(1)).min(self.words.len());
        while self.cursor < end {
            let word = self.words[self.cursor].clone();
            self.place_word(word);
            self.cursor += 1;
            if self.config.chunk_budget.is_some_and(|budget| started.elapsed() >= budget) {
                break;
            }
        }

        if self.cursor < self.words.len() {
            return LayoutStep::Progress(self.progress());
        }

        self.finished = true;
        tracing::debug!(
            pass = self.id,
            placed = self.placements.len(),
            dropped = self.dropped.len(),
            searches = self.searches,
            "layout pass complete"
        );
        LayoutStep::Done(LayoutResult {
            pass: self.id,
            placements: std::mem::take(&mut self.placements),
            dropped: std::mem::take(&mut self.dropped),
        })
    }

    /// Runs to completion, yielding to the scheduler between chunks.
    /// `None` when the pass was cancelled.
    pub async fn run<F>(mut self, mut on_progress: F) -> Option<LayoutResult>
    where
        F: FnMut(&LayoutProgress),
    {
        loop {
            match self.step() {
                LayoutStep::Progress(progress) => {
                    on_progress(&progress);
                    tokio::task::yield_now().await;
                }
                LayoutStep::Done(result) => return Some(result),
                LayoutStep::Cancelled => return None,
            }
        }
    }

    /// Runs to completion without yielding.
    pub fn place_all(mut self) -> Option<LayoutResult> {
        loop {
            match self.step() {
                LayoutStep::Progress(_) => continue,
                LayoutStep::Done(result) => return Some(result),
                LayoutStep::Cancelled => return None,
            }
        }
    }

    fn start_point(&mut self) -> (f64, f64) {
        if self.config.jitter <= 0.0 {
            return (0.0, 0.0);
        }
        let jx = (self.rng.gen::<f64>() - 0.5) * self.config.jitter * self.config.width;
        let jy = (self.rng.gen::<f64>() - 0.5) * self.config.jitter * self.config.height;
        (jx, jy)
    }

    fn fits_canvas(&self, bw: f64, bh: f64) -> bool {
        bw <= self.canvas.width() && bh <= self.canvas.height()
    }

    /// Every spiral position was rejected for a box no larger than this one,
    /// and placed boxes are never removed, so the search would fail again.
    /// Only holds while every search starts at the same point.
    fn known_to_fail(&self, bw: f64, bh: f64) -> bool {
        self.config.jitter <= 0.0 && self.failed.iter().any(|&(fw, fh)| bw >= fw && bh >= fh)
    }

    fn record_failure(&mut self, bw: f64, bh: f64) {
        if self.config.jitter > 0.0 {
            return;
        }
        self.failed.retain(|&(fw, fh)| !(fw >= bw && fh >= bh));
        self.failed.push((bw, bh));
    }

    fn place_word(&mut self, word: WordCount) {
        let font_size = self.size.font_size(word.count);
        let rotation = self.rotation.rotation(&word, &mut self.rng);
        let (w, h) = self.config.metrics.measure(&word.word, font_size);
        let pad = self.config.padding.max(0.0) * 2.0;
        let (bw, bh) = rotated_extent(w + pad, h + pad, rotation);
        let (ox, oy) = self.start_point();

        if self.fits_canvas(bw, bh) && !self.known_to_fail(bw, bh) {
            self.searches += 1;
            let spiral = ArchimedeanSpiral::new(
                self.config.spiral_step,
                self.config.aspect(),
                self.config.search_radius(),
            );
            for (dx, dy) in spiral {
                let (x, y) = (ox + dx, oy + dy);
                let bounds = Rect::centered(x, y, bw, bh);
                if !self.canvas.contains(&bounds) || self.index.intersects_any(&bounds) {
                    continue;
                }
                self.index.insert(bounds);
                self.placements.push(Placement {
                    word,
                    x,
                    y,
                    font_size,
                    rotation,
                    bounds,
                });
                return;
            }
            self.record_failure(bw, bh);
        }

        tracing::trace!(pass = self.id, word = %word.word, font_size, "word dropped");
        self.dropped.push(word);
    }
}
