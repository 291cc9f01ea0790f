use crate::{
    applicability::{is_policy_applicable_to_egress, is_policy_applicable_to_ingress},
    matcher::selects,
    NetworkPolicy, Pod, Result,
};

/// Describes whether a pod is isolated in each direction, i.e. whether any policy that selects the
/// pod governs that direction.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct Selected {
    pub ingress: bool,
    pub egress: bool,
}

/// Indicates whether `pod` is selected for ingress and for egress by any of `policies`.
///
/// Policies are walked in order until both directions are known to be selected.
pub fn is_pod_selected(pod: &Pod, policies: &[NetworkPolicy]) -> Result<Selected> {
    let mut selected = Selected::default();
    for policy in policies {
        if !selects(policy, pod)? {
            continue;
        }

        selected.ingress |= is_policy_applicable_to_ingress(policy);
        selected.egress |= is_policy_applicable_to_egress(policy);
        if selected == Selected::BOTH {
            break;
        }
    }
    Ok(selected)
}

/// Indicates whether `pod` is selected for ingress by any of `policies`.
///
/// Walks the same policies as [`is_pod_selected`], so both report the same result, errors included.
pub fn is_pod_selected_ingress(pod: &Pod, policies: &[NetworkPolicy]) -> Result<bool> {
    is_pod_selected(pod, policies).map(|s| s.ingress)
}

/// Indicates whether `pod` is selected for egress by any of `policies`.
pub fn is_pod_selected_egress(pod: &Pod, policies: &[NetworkPolicy]) -> Result<bool> {
    is_pod_selected(pod, policies).map(|s| s.egress)
}

// === impl Selected ===

impl Selected {
    const BOTH: Self = Self {
        ingress: true,
        egress: true,
    };
}
