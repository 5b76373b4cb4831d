use unicode_width::UnicodeWidthChar;

/// Per-character advance estimates in em units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphMetrics {
    pub wide_advance: f64,
    pub upper_advance: f64,
    pub narrow_advance: f64,
    pub gap_advance: f64,
    pub line_height: f64,
}

impl Default for GlyphMetrics {
    fn default() -> Self {
        Self {
            wide_advance: 1.0,
            upper_advance: 0.62,
            narrow_advance: 0.55,
            gap_advance: 0.3,
            line_height: 1.0,
        }
    }
}

impl GlyphMetrics {
    pub fn advance(&self, c: char) -> f64 {
        match c.width() {
            None | Some(0) => 0.0,
            Some(w) if w >= 2 => self.wide_advance,
            _ if c.is_whitespace() || c.is_ascii_punctuation() => self.gap_advance,
            _ if c.is_uppercase() || c.is_ascii_digit() => self.upper_advance,
            _ => self.narrow_advance,
        }
    }

    /// Unrotated (width, height) of `text` at `font_size` px.
    pub fn measure(&self, text: &str, font_size: f64) -> (f64, f64) {
        let ems: f64 = text.chars().map(|c| self.advance(c)).sum();
        (ems * font_size, self.line_height * font_size)
    }
}

/// Axis-aligned extent of a `width` x `height` box rotated by `degrees`.
pub fn rotated_extent(width: f64, height: f64, degrees: f64) -> (f64, f64) {
    if degrees == 0.0 {
        return (width, height);
    }
    let (sin, cos) = degrees.to_radians().sin_cos();
    (
        (width * cos).abs() + (height * sin).abs(),
        (width * sin).abs() + (height * cos).abs(),
    )
}
