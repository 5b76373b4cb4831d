use chatcloud_core::WordCount;

/// Maps a word count to a font size in px.
pub trait SizeMapping: Send {
    fn font_size(&self, count: u32) -> f64;
}

impl<F> SizeMapping for F
where
    F: Fn(u32) -> f64 + Send,
{
    fn font_size(&self, count: u32) -> f64 {
        self(count)
    }
}

/// Square-root scale from `[0, max_count]` onto `[min_size, max_size]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SqrtScale {
    max_count: u32,
    min_size: f64,
    max_size: f64,
}

impl SqrtScale {
    pub fn new(max_count: u32, min_size: f64, max_size: f64) -> Self {
        Self {
            max_count,
            min_size,
            max_size,
        }
    }

    pub fn for_words(words: &[WordCount], min_size: f64, max_size: f64) -> Self {
        let max_count = words.iter().map(|w| w.count).max().unwrap_or(0);
        Self::new(max_count, min_size, max_size)
    }
}

impl SizeMapping for SqrtScale {
    fn font_size(&self, count: u32) -> f64 {
        if self.max_count == 0 {
            return self.min_size;
        }
        let t = (f64::from(count) / f64::from(self.max_count)).sqrt();
        self.min_size + (self.max_size - self.min_size) * t
    }
}
