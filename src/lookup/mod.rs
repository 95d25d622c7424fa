pub mod credential_lookup;

pub use credential_lookup::{CredentialLookup, CredentialResult, CredentialStatus};
