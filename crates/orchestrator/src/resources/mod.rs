//! RAII resource guards for automatic cleanup.

mod inflight_guard;

pub use inflight_guard::{InFlightGuard, InFlightRegistry};
