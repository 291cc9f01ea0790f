#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod labels;
pub mod network_policy;
pub mod pod;

pub use self::{
    labels::{Labels, Selector, SelectorError},
    network_policy::{EgressRule, IngressRule, NetworkPolicy, PolicyType},
    pod::{Pod, DEFAULT_NAMESPACE},
};
pub use k8s_openapi::{
    api::{self, core::v1 as corev1, networking::v1 as netv1},
    apimachinery::pkg::apis::meta::v1::{LabelSelector, LabelSelectorRequirement},
};
