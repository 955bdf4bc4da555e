pub mod record;
pub mod store;
pub mod target;

pub use record::{GenerationRecord, StoredGeneration};
pub use store::GenerationStore;
pub use target::{ConnectionParams, DatabaseTarget};
