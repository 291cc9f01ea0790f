use crate::labels::Labels;
use k8s_openapi::api::core::v1 as corev1;
use serde::Serialize;

/// The namespace assumed for resources that do not set one.
pub const DEFAULT_NAMESPACE: &str = "default";

/// The parts of a pod that network policies select on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Pod {
    pub name: String,
    pub namespace: String,
    pub labels: Labels,
}

// === impl Pod ===

impl Pod {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, labels: Labels) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            labels,
        }
    }
}

impl From<corev1::Pod> for Pod {
    fn from(pod: corev1::Pod) -> Self {
        let meta = pod.metadata;
        Self {
            name: meta.name.unwrap_or_default(),
            namespace: meta.namespace.unwrap_or_else(default_namespace),
            labels: meta.labels.into(),
        }
    }
}

pub(crate) fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_k8s() {
        let pod = serde_json::from_value::<corev1::Pod>(serde_json::json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": {
                "name": "frontend",
                "namespace": "demo",
                "labels": { "role": "WebFrontend" }
            },
            "spec": {
                "containers": [{ "name": "redismaster", "image": "redis" }]
            }
        }))
        .unwrap();

        assert_eq!(
            Pod::from(pod),
            Pod::new(
                "demo",
                "frontend",
                maplit::btreemap! { "role".to_string() => "WebFrontend".to_string() }.into(),
            )
        );
    }

    #[test]
    fn namespace_defaults() {
        let pod = corev1::Pod {
            metadata: k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta {
                name: Some("unlabeled".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        let pod = Pod::from(pod);
        assert_eq!(pod.namespace, DEFAULT_NAMESPACE);
        assert!(pod.labels.as_ref().is_empty());
    }
}
