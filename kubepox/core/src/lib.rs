//! Network policy query engine
//!
//! Answers which `NetworkPolicy` resources govern a pod, which pods a policy governs, and which
//! ingress and egress rules apply to a pod once every governing policy is taken into account.
//!
//! - A policy selects a pod when both are in the same namespace and the policy's pod selector
//!   matches the pod's labels. An empty selector selects every pod in the namespace.
//! - A policy without `policyTypes` always governs ingress, and governs egress only when it carries
//!   egress rules. A policy with `policyTypes` governs exactly the declared directions, even when it
//!   has no rules for them (which denies all traffic in that direction).
//! - The rules that apply to a pod are the union of the rules of every policy that selects it and
//!   governs the direction. When no such policy exists the direction is unrestricted, which is
//!   reported as `None` rather than as an empty list.
//!
//! ```text
//! [ Pod ] <- namespace + podSelector <- [ NetworkPolicy ] -> policyTypes -> [ ingress | egress ]
//! ```
//!
//! All operations are pure functions over the inputs they are given; results borrow from those
//! inputs and preserve their order.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod applicability;
mod matcher;
mod rules;
mod selection;
pub mod selector;


pub use self::{
    applicability::{is_policy_applicable_to_egress, is_policy_applicable_to_ingress},
    matcher::{list_policies_per_pod, list_pods_per_policy},
    rules::{list_egress_rules_per_pod, list_ingress_rules_per_pod},
    selection::{is_pod_selected, is_pod_selected_egress, is_pod_selected_ingress, Selected},
};
pub use kubepox_k8s_api as k8s;
pub use kubepox_k8s_api::{
    EgressRule, IngressRule, Labels, NetworkPolicy, Pod, PolicyType, SelectorError,
};

pub type Result<T, E = SelectorError> = std::result::Result<T, E>;
