use crate::{k8s::Selector, Labels, NetworkPolicy, Pod, Result};
use tracing::trace;

/// Lists the policies that select `pod`, in the order they were given.
///
/// An invalid pod selector on any policy in the pod's namespace fails the whole lookup.
pub fn list_policies_per_pod<'p>(
    pod: &Pod,
    policies: &'p [NetworkPolicy],
) -> Result<Vec<&'p NetworkPolicy>> {
    let mut matched = Vec::new();
    for policy in policies {
        if selects(policy, pod)? {
            matched.push(policy);
        }
    }
    Ok(matched)
}

/// Lists the pods that `policy` selects, in the order they were given.
///
/// Only pods in the policy's namespace are considered.
pub fn list_pods_per_policy<'p>(policy: &NetworkPolicy, pods: &'p [Pod]) -> Result<Vec<&'p Pod>> {
    let selector = Selector::try_from(&policy.pod_selector)?;
    let matched = pods
        .iter()
        .filter(|pod| in_namespace(policy, pod) && matches(&selector, policy, &pod.labels))
        .collect();
    Ok(matched)
}

/// Indicates whether `policy` selects `pod`.
///
/// The namespaces are compared first, so selectors of policies in other namespaces are never
/// evaluated.
pub(crate) fn selects(policy: &NetworkPolicy, pod: &Pod) -> Result<bool> {
    if !in_namespace(policy, pod) {
        return Ok(false);
    }

    let selector = Selector::try_from(&policy.pod_selector)?;
    Ok(matches(&selector, policy, &pod.labels))
}

/// Policies only ever select pods in their own namespace.
#[inline]
fn in_namespace(policy: &NetworkPolicy, pod: &Pod) -> bool {
    policy.namespace == pod.namespace
}

fn matches(selector: &Selector, policy: &NetworkPolicy, labels: &Labels) -> bool {
    let matched = selector.matches(labels);
    trace!(
        ns = %policy.namespace,
        policy = %policy.name,
        %selector,
        ?labels,
        matched,
        "Evaluated pod selector"
    );
    matched
}
