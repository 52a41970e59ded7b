pub mod error;
pub use error::AccessError;

pub mod identity_store;
pub use identity_store::{IdentityStore, UserLookup};

pub mod identity_store_impl;
pub use identity_store_impl::SeaOrmIdentityStore;

pub mod checkpoint_registry;
pub use checkpoint_registry::CheckpointRegistry;

pub mod checkpoint_registry_impl;
pub use checkpoint_registry_impl::SeaOrmCheckpointRegistry;

pub mod entry_attempt_ledger;
pub use entry_attempt_ledger::EntryAttemptLedger;

pub mod entry_attempt_ledger_impl;
pub use entry_attempt_ledger_impl::SeaOrmEntryAttemptLedger;

pub mod totp;
pub use totp::{RfcTotpEngine, TotpEngine, TotpEnrollment};

pub mod session;
pub use session::{AdminSession, SessionAuthority, SessionClaims};

pub mod access;
pub use access::{AccessService, Registration, RegistrationRequest, RfidCheckOutcome};
