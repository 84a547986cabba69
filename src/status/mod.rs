//! Commit status delivery.
//!
//! Callers describe the status they want as a [`StatusRequest`]. Once the
//! commit and branch are known it becomes a [`ResolvedStatusRequest`], which
//! either goes straight to a [`StatusWrite`] implementation or through the
//! [`StatusScheduler`] for frequent in-progress updates.

mod model;
pub mod scheduler;
mod writer;

pub use model::{
    DESCRIPTION_LIMIT, ResolvedStatusRequest, StatusContext, StatusRequest, StatusState, UnknownStatusState,
};
pub use scheduler::{SchedulerTiming, StatusScheduler};
pub use writer::{RemoteStatusWriter, StatusWrite};

#[cfg(test)]
pub use writer::MockStatusWrite;
