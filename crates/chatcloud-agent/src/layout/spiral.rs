use std::f64::consts::TAU;

/// Archimedean spiral offsets from the origin: `r = (step / 2π) * θ`, so
/// neighbouring turns are `step` px apart, walked in arcs of about `step` px.
/// x is stretched by `aspect` (canvas width / height). Ends once `r` passes
/// `max_radius`.
#[derive(Debug, Clone)]
pub struct ArchimedeanSpiral {
    step: f64,
    growth: f64,
    aspect: f64,
    max_radius: f64,
    theta: f64,
    started: bool,
}

impl ArchimedeanSpiral {
    pub fn new(step: f64, aspect: f64, max_radius: f64) -> Self {
        let step = if step.is_finite() && step > 0.0 { step } else { 2.0 };
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        Self {
            step,
            growth: step / TAU,
            aspect,
            max_radius,
            theta: 0.0,
            started: false,
        }
    }

    pub fn radius(&self) -> f64 {
        self.growth * self.theta
    }
}

impl Iterator for ArchimedeanSpiral {
    type Item = (f64, f64);

    fn next(&mut self) -> Option<(f64, f64)> {
        if !self.started {
            self.started = true;
            return Some((0.0, 0.0));
        }
        let r = self.radius();
        self.theta += self.step / r.max(self.step);
        let r = self.radius();
        if r > self.max_radius {
            return None;
        }
        let (sin, cos) = self.theta.sin_cos();
        Some((self.aspect * r * cos, r * sin))
    }
}
