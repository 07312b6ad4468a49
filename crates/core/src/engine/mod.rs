//! Pure evaluation: no I/O, no clock, no shared state.

pub mod advice;
pub mod alerts;
pub mod lifecycle;
pub mod narration;
pub mod risk;
