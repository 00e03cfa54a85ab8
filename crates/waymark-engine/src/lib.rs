pub mod backend;
pub mod builtin;
pub mod config;
pub mod evidence;
pub mod flow;
pub mod mock;
pub mod orchestrator;
pub mod resolution;
pub mod verifier;

pub use waymark_common::flow as steps;
pub use waymark_common::query;
pub use waymark_common::report;
pub use waymark_common::scenario;
