//! Output ports the domain depends on besides storage.

pub mod clock;

pub use clock::{Clock, FixedClock, SystemClock};
