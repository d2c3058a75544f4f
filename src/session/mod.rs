//! Session state for the dashboard client: the persisted bearer credential,
//! the claims decoded from it, and the single store that owns both.
//! Keep the public surface thin and split implementation across sub-modules.

mod claims;
mod storage;
mod store;

pub use claims::{decode_claims, Claims, Role};
pub use storage::{CredentialStorage, FileCredentialStorage, MemoryCredentialStorage};
pub use store::SessionStore;
