pub mod error;
pub mod flow;
pub mod mock;
pub mod query;
pub mod report;
pub mod scenario;

pub use error::backend_error::BackendError;
