//! Store traits (ports) - the narrow persistence interface the services depend on

mod stores;

pub use stores::{CredentialStore, RepoResult, ResetTokenStore};
