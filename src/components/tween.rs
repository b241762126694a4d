//! Alpha fades for panel transitions.
//!
//! A [`Fade`] interpolates an alpha value between two endpoints over a fixed
//! duration. It is an explicit state machine: the owner calls
//! [`Fade::advance`] with the frame delta and reads the current value back.
//! Replacing a fade mid-flight simply drops the old one.

/// Easing functions for smooth interpolation.
///
/// These functions transform a linear `t` value (0.0 to 1.0) to create
/// different acceleration/deceleration curves.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Easing {
    /// Constant speed (no easing).
    #[default]
    Linear,
    /// Starts slow, accelerates (quadratic).
    QuadIn,
    /// Starts fast, decelerates (quadratic).
    QuadOut,
}

/// Apply an easing function to a normalized time value.
///
/// The input `t` is clamped to [0.0, 1.0] and transformed according to the
/// easing curve.
pub fn ease(e: Easing, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    match e {
        Easing::Linear => t,
        Easing::QuadIn => t * t,
        Easing::QuadOut => t * (2.0 - t),
    }
}

/// Linearly interpolate between two floats.
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Interpolates an alpha value from `from` to `to` over `duration` seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct Fade {
    /// Starting alpha.
    pub from: f32,
    /// Ending alpha.
    pub to: f32,
    /// Duration in seconds.
    pub duration: f32,
    /// Easing function to use.
    pub easing: Easing,
    /// Current time within the fade.
    pub time: f32,
}

impl Fade {
    pub fn new(from: f32, to: f32, duration: f32) -> Self {
        Fade {
            from,
            to,
            duration,
            easing: Easing::Linear,
            time: 0.0,
        }
    }

    pub fn fade_in(duration: f32) -> Self {
        Fade::new(0.0, 1.0, duration)
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Advance by `dt` seconds and return the new value.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.time = (self.time + dt.max(0.0)).min(self.duration.max(0.0));
        self.value()
    }

    pub fn value(&self) -> f32 {
        if self.duration <= 0.0 {
            return self.to;
        }
        lerp_f32(self.from, self.to, ease(self.easing, self.time / self.duration))
    }

    pub fn finished(&self) -> bool {
        self.time >= self.duration
    }
}
