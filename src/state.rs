use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AccessService, CheckpointRegistry, EntryAttemptLedger, IdentityStore, RfcTotpEngine,
    SeaOrmCheckpointRegistry, SeaOrmEntryAttemptLedger, SeaOrmIdentityStore, SessionAuthority,
    TotpEngine,
};

/// Everything a request handler or CLI command needs, wired from one `Config`.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub access: Arc<AccessService>,

    pub sessions: Arc<SessionAuthority>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_url,
            config.general.max_db_connections,
            config.general.min_db_connections,
            Duration::from_secs(config.general.db_acquire_timeout_seconds),
        )
        .await?;

        Self::with_store(config, store)
    }

    pub fn with_store(config: Config, store: Store) -> anyhow::Result<Self> {
        let identities: Arc<dyn IdentityStore> =
            Arc::new(SeaOrmIdentityStore::new(store.clone()));
        let check_points: Arc<dyn CheckpointRegistry> =
            Arc::new(SeaOrmCheckpointRegistry::new(store.clone()));
        let attempts: Arc<dyn EntryAttemptLedger> =
            Arc::new(SeaOrmEntryAttemptLedger::new(store.clone()));
        let totp: Arc<dyn TotpEngine> = Arc::new(RfcTotpEngine::new(&config.totp));

        let sessions = Arc::new(SessionAuthority::new(
            identities.clone(),
            &config.security.session_secret,
            Duration::from_secs(config.security.session_ttl_hours.saturating_mul(3600)),
            &config.security,
        )?);

        let access = Arc::new(AccessService::new(
            identities,
            check_points,
            attempts,
            totp,
            config.security.clone(),
        ));

        Ok(Self {
            config: Arc::new(config),
            store,
            access,
            sessions,
        })
    }
}
