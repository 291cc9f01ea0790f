use crate::pod::default_namespace;
use k8s_openapi::{
    api::networking::v1 as netv1, apimachinery::pkg::apis::meta::v1::LabelSelector,
};
use serde::Serialize;
use std::{fmt, str::FromStr};

/// An ingress allow-list entry. Its peers and ports are carried as-is.
pub type IngressRule = netv1::NetworkPolicyIngressRule;

/// An egress allow-list entry. Its peers and ports are carried as-is.
pub type EgressRule = netv1::NetworkPolicyEgressRule;

/// A traffic direction a policy may declare that it governs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum PolicyType {
    Ingress,
    Egress,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown network policy type: {0}")]
pub struct UnknownPolicyType(String);

/// A namespaced network policy.
///
/// `policy_types`, `ingress` and `egress` distinguish an absent list from an empty one: a policy
/// that declares `Egress` with no egress rules denies all egress, whereas a policy that declares no
/// types at all only governs egress when it carries egress rules.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkPolicy {
    pub name: String,
    pub namespace: String,

    /// Selects the pods, in the policy's namespace, that this policy governs.
    pub pod_selector: LabelSelector,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_types: Option<Vec<PolicyType>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingress: Option<Vec<IngressRule>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub egress: Option<Vec<EgressRule>>,
}

// === impl PolicyType ===

impl FromStr for PolicyType {
    type Err = UnknownPolicyType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Ingress" => Ok(Self::Ingress),
            "Egress" => Ok(Self::Egress),
            s => Err(UnknownPolicyType(s.to_string())),
        }
    }
}

impl fmt::Display for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ingress => f.write_str("ingress"),
            Self::Egress => f.write_str("egress"),
        }
    }
}

// === impl NetworkPolicy ===

impl NetworkPolicy {
    /// Indicates whether the policy explicitly declares the given direction.
    pub fn declares(&self, ty: PolicyType) -> Option<bool> {
        self.policy_types.as_ref().map(|types| types.contains(&ty))
    }
}

impl From<netv1::NetworkPolicy> for NetworkPolicy {
    fn from(np: netv1::NetworkPolicy) -> Self {
        let netv1::NetworkPolicy { metadata, spec, .. } = np;
        let spec = spec.unwrap_or_default();

        // Unknown types are rejected by the API server; they are ignored here rather than being
        // treated as if no types were declared.
        let policy_types = spec.policy_types.map(|types| {
            types
                .iter()
                .filter_map(|ty| match ty.parse() {
                    Ok(ty) => Some(ty),
                    Err(error) => {
                        tracing::debug!(%error, policy = ?metadata.name, "Ignoring policy type");
                        None
                    }
                })
                .collect()
        });

        // Newer API versions make the pod selector optional; absent selects every pod.
        let pod_selector: Option<LabelSelector> = spec.pod_selector.into();

        Self {
            name: metadata.name.unwrap_or_default(),
            namespace: metadata.namespace.unwrap_or_else(default_namespace),
            pod_selector: pod_selector.unwrap_or_default(),
            policy_types,
            ingress: spec.ingress,
            egress: spec.egress,
        }
    }
}
