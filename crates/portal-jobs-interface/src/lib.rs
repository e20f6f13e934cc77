//! Job queue interface

#![warn(missing_docs)]
#![warn(clippy::all)]

mod errors;
mod interface;
mod job;

pub use errors::{JobError, Result};
#[cfg(any(test, feature = "testkit"))]
pub use interface::MockJobQueueService;
pub use interface::JobQueueService;
pub use job::Job;
