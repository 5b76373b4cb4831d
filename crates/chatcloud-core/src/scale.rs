use chrono::Duration;

use crate::{Selection, TimeBucket, Timestamp};

/// Linear mapping between a time domain and a horizontal pixel range `[0, width]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    start: Timestamp,
    end: Timestamp,
    width: f64,
}

impl TimeScale {
    pub fn new(start: Timestamp, end: Timestamp, width: f64) -> Self {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        Self {
            start,
            end,
            width: if width.is_finite() { width.max(0.0) } else { 0.0 },
        }
    }

    /// Domain spans the first to the last bucket. `None` when there is nothing to scale.
    pub fn from_buckets(buckets: &[TimeBucket], width: f64) -> Option<Self> {
        let first = buckets.first()?;
        let last = buckets.last()?;
        Some(Self::new(first.start, last.start, width))
    }

    pub fn domain(&self) -> (Timestamp, Timestamp) {
        (self.start, self.end)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    fn span_ms(&self) -> i64 {
        (self.end - self.start).num_milliseconds()
    }

    pub fn apply(&self, t: Timestamp) -> f64 {
        let span = self.span_ms();
        if span == 0 || self.width <= 0.0 {
            return 0.0;
        }
        (t - self.start).num_milliseconds() as f64 / span as f64 * self.width
    }

    /// Pixel to time. Pixels outside the range are clamped; a degenerate domain
    /// maps everything onto its start.
    pub fn invert(&self, px: f64) -> Timestamp {
        let span = self.span_ms();
        if span == 0 || self.width <= 0.0 || !px.is_finite() {
            return self.start;
        }
        let px = px.clamp(0.0, self.width);
        let ms = (px / self.width * span as f64).round() as i64;
        self.start + Duration::milliseconds(ms)
    }

    pub fn selection(&self, x0: f64, x1: f64) -> Selection {
        Selection::new(self.invert(x0), self.invert(x1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(h, m, 0))
            .expect("valid time")
    }

    fn bucket(h: u32) -> TimeBucket {
        TimeBucket {
            start: at(h, 0),
            count: 1,
        }
    }

    #[test]
    fn empty_buckets_have_no_scale() {
        assert!(TimeScale::from_buckets(&[], 100.0).is_none());
    }

    #[test]
    fn single_bucket_inverts_to_its_start() {
        let scale = TimeScale::from_buckets(&[bucket(10)], 300.0).expect("scale");
        assert_eq!(scale.invert(0.0), at(10, 0));
        assert_eq!(scale.invert(299.0), at(10, 0));
        assert_eq!(scale.apply(at(10, 0)), 0.0);
    }

    #[test]
    fn invert_is_linear_and_clamped() {
        let scale = TimeScale::from_buckets(&[bucket(10), bucket(11), bucket(12)], 120.0)
            .expect("scale");
        assert_eq!(scale.invert(60.0), at(11, 0));
        assert_eq!(scale.invert(30.0), at(10, 30));
        assert_eq!(scale.invert(-50.0), at(10, 0));
        assert_eq!(scale.invert(500.0), at(12, 0));
        assert_eq!(scale.apply(at(11, 0)), 60.0);
    }

    #[test]
    fn reversed_pixel_interval_is_swapped() {
        let scale = TimeScale::from_buckets(&[bucket(10), bucket(12)], 120.0).expect("scale");
        let sel = scale.selection(90.0, 30.0);
        assert_eq!(sel.start, at(10, 30));
        assert_eq!(sel.end, at(11, 30));
    }
}
