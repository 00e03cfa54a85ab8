//! Chromium implementation of the runner's browser capability, driven over
//! the DevTools protocol.

pub mod backend;
pub mod cdp;
mod inject;
mod intercept;

pub use backend::HeadlessBackend;
