//! Application services for registry synchronization.

mod debounce;
mod event_processor;
mod purge;
mod reconciler;
mod synchronizer;

pub use debounce::{DebounceTable, SerialGuard};
pub use event_processor::{EventProcessor, EventProcessorError};
pub use purge::unregister_all;
pub use reconciler::{Reconciler, ReconcilerError, ReconcilerResult};
pub use synchronizer::{Synchronizer, SynchronizerError};
