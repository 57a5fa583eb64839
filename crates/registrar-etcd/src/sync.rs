// Cluster membership refresh run before every store operation

use tracing::warn;

use crate::adapter::Binding;

/// What to do about cluster membership before touching the store
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncPolicy {
    /// Refresh the member list; on failure log a warning and carry on with
    /// the members already known
    #[default]
    WarnAndContinue,
    /// Never refresh; the configured endpoint is used as-is
    Disabled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    Synced,
    Failed,
    Skipped,
}

impl SyncPolicy {
    /// Run the guard. Never fails the calling operation.
    pub async fn apply(self, binding: &Binding) -> SyncOutcome {
        match self {
            SyncPolicy::Disabled => SyncOutcome::Skipped,
            SyncPolicy::WarnAndContinue => {
                if binding.sync_cluster().await {
                    SyncOutcome::Synced
                } else {
                    warn!("etcd: sync cluster was unsuccessful");
                    SyncOutcome::Failed
                }
            }
        }
    }
}
