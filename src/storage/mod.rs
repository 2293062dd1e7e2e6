mod local;
mod schema;
mod types;

pub use local::MAX_VALUE_BYTES;
pub use schema::LocalStore;
pub use types::{keys, StoreError};
