// Counts a number of seconds and reports completion once.

#[derive(Debug, Clone, PartialEq)]
pub struct Timer {
    pub duration: f32,
    pub elapsed: f32,
    fired: bool,
}

impl Timer {
    pub fn new(duration: f32) -> Self {
        Timer {
            duration,
            elapsed: 0.0,
            fired: false,
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.fired = false;
    }

    /// Advance by `dt`. Returns `true` on the tick the timer completes, and
    /// never again until [`Timer::reset`].
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.fired {
            return false;
        }
        self.elapsed += dt.max(0.0);
        if self.elapsed >= self.duration {
            self.elapsed = self.duration;
            self.fired = true;
            return true;
        }
        false
    }

    /// Completed fraction in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    pub fn finished(&self) -> bool {
        self.fired
    }
}
