use crate::{NetworkPolicy, PolicyType};

/// Indicates whether a policy governs ingress traffic.
///
/// Policies that do not declare `policyTypes` always govern ingress.
pub fn is_policy_applicable_to_ingress(policy: &NetworkPolicy) -> bool {
    policy.declares(PolicyType::Ingress).unwrap_or(true)
}

/// Indicates whether a policy governs egress traffic.
///
/// Policies that do not declare `policyTypes` govern egress only when they have at least one egress
/// rule; an empty rule list counts as no rules here.
pub fn is_policy_applicable_to_egress(policy: &NetworkPolicy) -> bool {
    policy
        .declares(PolicyType::Egress)
        .unwrap_or_else(|| policy.egress.as_ref().is_some_and(|rules| !rules.is_empty()))
}
