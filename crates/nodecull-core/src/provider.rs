//! Collaborator traits implemented by cloud and cluster adapters.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{ProviderError, ProviderResult, RemovalError};
use crate::model::{Candidate, InstanceAttributes, InstanceId, NodeRef};

/// Cloud provider operations used by the pipeline.
///
/// Implementations must be safe to share across concurrent probe tasks.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// List one page of instances registered in the network scope.
    async fn list_instances(
        &self,
        scope: &str,
        page_size: u32,
        page_number: u32,
    ) -> ProviderResult<Vec<Candidate>>;

    /// Describe billing and lifecycle attributes of one instance.
    async fn describe_instance(&self, id: &InstanceId) -> ProviderResult<InstanceAttributes>;

    /// Stop one instance. With `dry_run` the provider validates only.
    async fn stop_instance(&self, id: &InstanceId, dry_run: bool) -> ProviderResult<()>;

    /// Delete a batch of instances under an idempotency token.
    async fn delete_instances(
        &self,
        ids: &[InstanceId],
        client_token: &str,
        dry_run: bool,
    ) -> ProviderResult<()>;
}

/// Removes nodes from the cluster's scheduling pool.
#[async_trait]
pub trait ClusterRemover: Send + Sync {
    /// Remove every node in `nodes` in a single invocation.
    async fn remove_nodes(&self, nodes: &[NodeRef]) -> Result<(), RemovalError>;
}

/// Run a provider call under a deadline, mapping expiry to [`ProviderError::Timeout`].
pub(crate) async fn with_deadline<T, Fut>(
    operation: &'static str,
    after: Duration,
    call: Fut,
) -> ProviderResult<T>
where
    Fut: Future<Output = ProviderResult<T>>,
{
    tokio::time::timeout(after, call)
        .await
        .map_err(|_| ProviderError::Timeout { operation, after })?
}
