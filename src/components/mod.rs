//! ECS components and small value types.
//!
//! Submodules overview:
//! - [`timer`] – countdown used by panels
//! - [`tween`] – easing curves and alpha fades
//! - [`unit`] – battle unit stats built from the units table
pub mod timer;
pub mod tween;
pub mod unit;
