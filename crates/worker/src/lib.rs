//! Shared async primitives for the filter controllers.
//!
//! * [`spawn`]: task spawning labelled with a [`TaskClass`].
//! * [`GenerationClock`]: monotonic request stamps for stale-response guards.
//! * [`Debouncer`]: trailing-edge debounce with explicit cancel.

mod class;
mod debounce;
mod spawn;
mod token;

pub use class::TaskClass;
pub use debounce::Debouncer;
pub use spawn::spawn;
pub use token::GenerationClock;
