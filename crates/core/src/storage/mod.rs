mod error;
mod traits;
mod types;

pub use error::{Result, StoreError};
pub use traits::TableBackend;
pub use types::{Key, KeyPart, WriteCondition};
