pub mod assistant;

pub use assistant::{AssistantConfig, SearchSettings, StoreBackend, StoreSettings};
