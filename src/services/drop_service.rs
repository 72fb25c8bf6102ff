use crate::config::DropConfig;
use crate::models::{FileRecord, FileSummary};
use crate::services::{
    access_code::AccessCodeGenerator,
    authorization::AuthorizationGate,
    clock::{Clock, SystemClock},
    error::{DropError, DropResult},
    identity::{Credential, IdentityMode, IdentityResolver, ResolvedIdentity, resolver_for},
    reaper::ExpiryReaper,
    record_store::RecordStore,
};
use crate::utils::keyed_mutex::KeyedMutex;
use crate::utils::validation::{sanitize_filename, validate_file_size};
use bytes::Bytes;
use std::sync::Arc;
use uuid::Uuid;

/// How many fresh codes to try before giving up on a collision
pub const MAX_CODE_ATTEMPTS: usize = 8;

/// A result plus the session token minted while resolving the caller, if
/// any. The boundary layer must hand that token back to the client.
#[derive(Debug)]
pub struct Resolved<T> {
    pub value: T,
    pub minted_session: Option<String>,
}

impl<T> Resolved<T> {
    fn new(value: T, identity: ResolvedIdentity) -> Self {
        Self {
            value,
            minted_session: identity.minted_session,
        }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Entry point for the boundary layer: put, list, get, and reap.
pub struct DropService {
    store: Arc<dyn RecordStore>,
    identity: Arc<dyn IdentityResolver>,
    clock: Arc<dyn Clock>,
    codes: AccessCodeGenerator,
    gate: AuthorizationGate,
    reaper: ExpiryReaper,
    max_file_size: usize,
    owner_locks: KeyedMutex,
}

impl DropService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        identity: Arc<dyn IdentityResolver>,
        clock: Arc<dyn Clock>,
        config: &DropConfig,
    ) -> Self {
        Self {
            reaper: ExpiryReaper::new(store.clone(), config.retention()),
            store,
            identity,
            clock,
            codes: AccessCodeGenerator::new(config.access_code_length),
            gate: AuthorizationGate,
            max_file_size: config.max_file_size,
            owner_locks: KeyedMutex::new(),
        }
    }

    /// Wire the service from configuration with the system clock
    pub fn from_config(store: Arc<dyn RecordStore>, config: &DropConfig) -> DropResult<Self> {
        let identity = resolver_for(config.identity_mode, &config.identity_salt)?;
        Ok(Self::new(store, identity, Arc::new(SystemClock), config))
    }

    pub fn identity_mode(&self) -> IdentityMode {
        self.identity.mode()
    }

    pub fn retention(&self) -> chrono::Duration {
        self.reaper.retention()
    }

    /// Store a payload for the caller. The returned record carries the
    /// access code; this is the only time the caller receives it.
    pub async fn put(
        &self,
        credential: &Credential,
        filename: &str,
        content: Bytes,
    ) -> DropResult<Resolved<FileRecord>> {
        self.reap().await?;

        let identity = self.identity.resolve(credential)?;
        let filename = sanitize_filename(filename)?;
        validate_file_size(content.len(), self.max_file_size)?;

        // Code choice and insert must not interleave with another put of the same owner
        let _guard = self.owner_locks.lock(identity.owner.as_str()).await;
        let access_code = self.fresh_access_code(&identity).await?;

        let record = FileRecord {
            id: Uuid::new_v4().to_string(),
            filename,
            owner: identity.owner.clone(),
            access_code,
            content,
            created_at: self.clock.now(),
        };

        if let Err(e) = self.store.insert(record.clone()).await {
            if let DropError::DuplicateId(ref id) = e {
                tracing::error!("Generated file id {} already exists", id);
            }
            return Err(e);
        }

        tracing::info!(
            "📦 Stored file {} ({}, {} bytes)",
            record.id,
            record.filename,
            record.size()
        );

        Ok(Resolved::new(record, identity))
    }

    async fn fresh_access_code(&self, identity: &ResolvedIdentity) -> DropResult<String> {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = self.codes.generate();
            if !self.store.access_code_in_use(&identity.owner, &code).await? {
                return Ok(code);
            }
            tracing::debug!("Access code collision on attempt {}, retrying", attempt);
        }
        Err(DropError::Internal(format!(
            "no unused access code after {} attempts",
            MAX_CODE_ATTEMPTS
        )))
    }

    /// Everything the caller owns that has not expired, newest first.
    pub async fn list(&self, credential: &Credential) -> DropResult<Resolved<Vec<FileSummary>>> {
        self.reap().await?;

        let identity = self.identity.resolve(credential)?;
        let owner = self.gate.authorize_list(&identity.owner);
        let now = self.clock.now();

        let files: Vec<FileSummary> = self
            .store
            .list_by_owner(owner)
            .await?
            .into_iter()
            .filter(|summary| !self.reaper.is_expired(summary.created_at, now))
            .collect();

        tracing::debug!("Listed {} file(s)", files.len());
        Ok(Resolved::new(files, identity))
    }

    /// Fetch a record's payload. Requires both the owning identity and the
    /// exact access code.
    pub async fn get(
        &self,
        credential: &Credential,
        id: &str,
        supplied_code: Option<&str>,
    ) -> DropResult<Resolved<FileRecord>> {
        self.reap().await?;

        let identity = self.identity.resolve(credential)?;
        let record = self.store.get_by_id(id).await?;

        if self.reaper.is_expired(record.created_at, self.clock.now()) {
            return Err(DropError::NotFound);
        }

        if let Err(denial) = self
            .gate
            .authorize_fetch(&record, &identity.owner, supplied_code)
        {
            tracing::warn!("Denied fetch of file {}: {}", id, denial);
            return Err(denial.into());
        }

        tracing::debug!("Serving file {} ({} bytes)", record.id, record.size());
        Ok(Resolved::new(record, identity))
    }

    /// Remove everything past the retention window. Returns the number removed.
    pub async fn reap(&self) -> DropResult<u64> {
        self.reaper.reap(self.clock.now()).await
    }

    /// Drop per-owner locks that are no longer in use
    pub fn prune_locks(&self) -> usize {
        self.owner_locks.cleanup()
    }
}
