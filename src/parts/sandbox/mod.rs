pub mod error;
pub mod io;
pub mod model;
pub mod query;
pub mod refresh;
pub mod store;

pub use error::{Result, SandboxError};
