use crate::{
    applicability::{is_policy_applicable_to_egress, is_policy_applicable_to_ingress},
    matcher::list_policies_per_pod,
    EgressRule, IngressRule, NetworkPolicy, Pod, Result,
};
use tracing::{instrument, trace};

/// Lists the ingress rules that apply to `pod`.
///
/// Returns `None` when no policy selecting the pod governs ingress, in which case all ingress is
/// allowed. Otherwise returns the rules of every such policy, in policy order. An empty list means
/// that all ingress to the pod is denied.
#[instrument(level = "trace", skip_all, fields(ns = %pod.namespace, pod = %pod.name))]
pub fn list_ingress_rules_per_pod<'p>(
    pod: &Pod,
    policies: &'p [NetworkPolicy],
) -> Result<Option<Vec<&'p IngressRule>>> {
    aggregate(pod, policies, is_policy_applicable_to_ingress, |np| {
        np.ingress.as_deref()
    })
}

/// Lists the egress rules that apply to `pod`.
///
/// Returns `None` when no policy selecting the pod governs egress, in which case all egress is
/// allowed. Otherwise returns the rules of every such policy, in policy order. An empty list means
/// that all egress from the pod is denied.
#[instrument(level = "trace", skip_all, fields(ns = %pod.namespace, pod = %pod.name))]
pub fn list_egress_rules_per_pod<'p>(
    pod: &Pod,
    policies: &'p [NetworkPolicy],
) -> Result<Option<Vec<&'p EgressRule>>> {
    aggregate(pod, policies, is_policy_applicable_to_egress, |np| {
        np.egress.as_deref()
    })
}

fn aggregate<'p, R>(
    pod: &Pod,
    policies: &'p [NetworkPolicy],
    applies: fn(&NetworkPolicy) -> bool,
    rules: fn(&'p NetworkPolicy) -> Option<&'p [R]>,
) -> Result<Option<Vec<&'p R>>> {
    let mut aggregated = None;
    for policy in list_policies_per_pod(pod, policies)? {
        if !applies(policy) {
            trace!(policy = %policy.name, "Policy does not govern this direction");
            continue;
        }

        // A policy without rules still makes the direction restricted.
        let rules = rules(policy).unwrap_or_default();
        trace!(policy = %policy.name, rules = rules.len(), "Policy governs this direction");
        aggregated.get_or_insert_with(Vec::new).extend(rules);
    }
    Ok(aggregated)
}
