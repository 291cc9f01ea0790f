use crate::core::{
    k8s::{corev1, netv1},
    NetworkPolicy, Pod,
};
use anyhow::{Context, Result};
use kube::{
    api::{Api, ListParams},
    Client,
};
use tokio::time;
use tracing::{debug, instrument};

/// Reads pods and network policies from a single namespace.
pub(crate) struct Cluster {
    pods: Api<corev1::Pod>,
    policies: Api<netv1::NetworkPolicy>,
    timeout: time::Duration,
}

// === impl Cluster ===

impl Cluster {
    pub(crate) fn new(client: Client, namespace: &str, timeout: time::Duration) -> Self {
        Self {
            pods: Api::namespaced(client.clone(), namespace),
            policies: Api::namespaced(client, namespace),
            timeout,
        }
    }

    #[instrument(skip(self))]
    pub(crate) async fn pods(&self) -> Result<Vec<Pod>> {
        let list = time::timeout(self.timeout, self.pods.list(&ListParams::default()))
            .await
            .context("timed out listing pods")?
            .context("failed to list pods")?;
        debug!(pods = list.items.len(), "Listed pods");
        Ok(list.items.into_iter().map(Pod::from).collect())
    }

    #[instrument(skip(self))]
    pub(crate) async fn pod(&self, name: &str) -> Result<Pod> {
        let pod = time::timeout(self.timeout, self.pods.get(name))
            .await
            .with_context(|| format!("timed out getting pod {name}"))?
            .with_context(|| format!("failed to get pod {name}"))?;
        Ok(pod.into())
    }

    #[instrument(skip(self))]
    pub(crate) async fn policies(&self) -> Result<Vec<NetworkPolicy>> {
        let list = time::timeout(self.timeout, self.policies.list(&ListParams::default()))
            .await
            .context("timed out listing network policies")?
            .context("failed to list network policies")?;
        debug!(policies = list.items.len(), "Listed network policies");
        Ok(list.items.into_iter().map(NetworkPolicy::from).collect())
    }

    #[instrument(skip(self))]
    pub(crate) async fn policy(&self, name: &str) -> Result<NetworkPolicy> {
        let np = time::timeout(self.timeout, self.policies.get(name))
            .await
            .with_context(|| format!("timed out getting network policy {name}"))?
            .with_context(|| format!("failed to get network policy {name}"))?;
        Ok(np.into())
    }
}
