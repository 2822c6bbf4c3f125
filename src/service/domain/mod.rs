//! Domain model for registry service descriptions.

mod description;
mod error;
mod ids;
mod prefix;

pub use description::ServiceDescription;
pub use error::ServiceDomainError;
pub use ids::ServiceId;
pub use prefix::{DEFAULT_LABEL_PREFIX, LabelPrefix};
