pub mod engine;
pub mod result;

pub use engine::{DEFAULT_POLL_INTERVAL, LocatorResolver};
pub use result::Resolution;
