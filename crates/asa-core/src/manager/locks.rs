use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use asa_model::TenantId;

/// One async mutex per tenant.
///
/// Mutexes are created lazily and never removed; distinct tenants never contend.
#[derive(Debug, Default)]
pub(crate) struct TenantLocks {
    inner: DashMap<TenantId, Arc<Mutex<()>>>,
}

impl TenantLocks {
    /// Wait for the tenant's exclusive section.
    pub(crate) async fn lock(&self, tenant: &TenantId) -> OwnedMutexGuard<()> {
        let mutex = self
            .inner
            .entry(tenant.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();
        mutex.lock_owned().await
    }
}
