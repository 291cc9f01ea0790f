use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, LabelSelectorRequirement};
use serde::{Serialize, Serializer};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    sync::Arc,
};

#[derive(Clone, Debug, Eq, Default)]
pub struct Labels(Arc<Map>);

pub type Map = BTreeMap<String, String>;

pub type Expressions = Vec<Expression>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expression {
    key: String,
    operator: Operator,
    values: BTreeSet<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operator {
    In,
    NotIn,
    Exists,
    DoesNotExist,
}

/// A compiled pod selector.
///
/// Built from a Kubernetes `LabelSelector`. Every `matchLabels` entry and every `matchExpressions`
/// requirement must hold for a set of labels to match, so the empty selector matches everything.
#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct Selector {
    match_labels: Option<Map>,
    match_expressions: Option<Expressions>,
}

/// Indicates that a `LabelSelector` cannot be evaluated.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("invalid label selector operator {operator:?} for key {key:?}")]
    UnknownOperator { key: String, operator: String },

    #[error("label selector operator {operator} for key {key:?} requires at least one value")]
    MissingValues { key: String, operator: Operator },

    #[error("label selector operator {operator} for key {key:?} must not have values")]
    UnexpectedValues { key: String, operator: Operator },
}

// === Selector ===

impl Selector {
    pub fn from_expressions(exprs: Expressions) -> Self {
        Self {
            match_labels: None,
            match_expressions: Some(exprs),
        }
    }

    pub fn from_map(map: Map) -> Self {
        Self {
            match_labels: Some(map),
            match_expressions: None,
        }
    }

    /// Returns true when the selector has no requirements and therefore selects all pods.
    pub fn is_empty(&self) -> bool {
        self.match_labels.iter().all(|m| m.is_empty())
            && self.match_expressions.iter().all(|e| e.is_empty())
    }

    pub fn matches(&self, labels: &Labels) -> bool {
        for expr in self.match_expressions.iter().flatten() {
            if !expr.matches(labels.as_ref()) {
                return false;
            }
        }

        if let Some(match_labels) = self.match_labels.as_ref() {
            for (k, v) in match_labels.iter() {
                if labels.0.get(k) != Some(v) {
                    return false;
                }
            }
        }

        true
    }
}

impl TryFrom<&LabelSelector> for Selector {
    type Error = SelectorError;

    fn try_from(selector: &LabelSelector) -> Result<Self, Self::Error> {
        let match_expressions = selector
            .match_expressions
            .as_ref()
            .map(|reqs| reqs.iter().map(Expression::try_from).collect())
            .transpose()?;

        Ok(Self {
            match_labels: selector.match_labels.clone(),
            match_expressions,
        })
    }
}

impl std::iter::FromIterator<(&'static str, &'static str)> for Selector {
    fn from_iter<T: IntoIterator<Item = (&'static str, &'static str)>>(iter: T) -> Self {
        Self::from_map(
            iter.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl std::iter::FromIterator<Expression> for Selector {
    fn from_iter<T: IntoIterator<Item = Expression>>(iter: T) -> Self {
        Self::from_expressions(iter.into_iter().collect())
    }
}

/// Renders the selector the way `kubectl` does, e.g. `role=web,tier in (a,b),!legacy`.
impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("<all>");
        }

        let labels = self
            .match_labels
            .iter()
            .flatten()
            .map(|(k, v)| format!("{k}={v}"));
        let exprs = self
            .match_expressions
            .iter()
            .flatten()
            .map(|e| e.to_string());
        let parts = labels.chain(exprs).collect::<Vec<_>>();
        f.write_str(&parts.join(","))
    }
}

// === Labels ===

impl From<Map> for Labels {
    #[inline]
    fn from(labels: Map) -> Self {
        Self(Arc::new(labels))
    }
}

impl From<Option<Map>> for Labels {
    #[inline]
    fn from(labels: Option<Map>) -> Self {
        labels.map(Self::from).unwrap_or_default()
    }
}

impl AsRef<Map> for Labels {
    #[inline]
    fn as_ref(&self) -> &Map {
        self.0.as_ref()
    }
}

impl<T: AsRef<Map>> std::cmp::PartialEq<T> for Labels {
    #[inline]
    fn eq(&self, t: &T) -> bool {
        self.0.as_ref().eq(t.as_ref())
    }
}

impl std::iter::FromIterator<(String, String)> for Labels {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(Arc::new(iter.into_iter().collect()))
    }
}

impl std::iter::FromIterator<(&'static str, &'static str)> for Labels {
    fn from_iter<T: IntoIterator<Item = (&'static str, &'static str)>>(iter: T) -> Self {
        iter.into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

impl Serialize for Labels {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

// === Expression ===

impl Expression {
    pub fn new(
        key: impl Into<String>,
        operator: Operator,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self, SelectorError> {
        let key = key.into();
        let values = values.into_iter().map(Into::into).collect::<BTreeSet<String>>();
        match operator {
            Operator::In | Operator::NotIn if values.is_empty() => {
                Err(SelectorError::MissingValues { key, operator })
            }
            Operator::Exists | Operator::DoesNotExist if !values.is_empty() => {
                Err(SelectorError::UnexpectedValues { key, operator })
            }
            _ => Ok(Self {
                key,
                operator,
                values,
            }),
        }
    }

    fn matches(&self, labels: &Map) -> bool {
        match self.operator {
            Operator::In => {
                if let Some(v) = labels.get(&self.key) {
                    return self.values.contains(v);
                }
            }
            Operator::NotIn => {
                return match labels.get(&self.key) {
                    Some(v) => !self.values.contains(v),
                    None => true,
                }
            }
            Operator::Exists => return labels.contains_key(&self.key),
            Operator::DoesNotExist => return !labels.contains_key(&self.key),
        }

        false
    }
}

impl TryFrom<&LabelSelectorRequirement> for Expression {
    type Error = SelectorError;

    fn try_from(req: &LabelSelectorRequirement) -> Result<Self, Self::Error> {
        let operator = match req.operator.as_str() {
            "In" => Operator::In,
            "NotIn" => Operator::NotIn,
            "Exists" => Operator::Exists,
            "DoesNotExist" => Operator::DoesNotExist,
            op => {
                return Err(SelectorError::UnknownOperator {
                    key: req.key.clone(),
                    operator: op.to_string(),
                })
            }
        };
        Self::new(req.key.clone(), operator, req.values.iter().flatten().cloned())
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = || self.values.iter().cloned().collect::<Vec<_>>().join(",");
        match self.operator {
            Operator::In => write!(f, "{} in ({})", self.key, values()),
            Operator::NotIn => write!(f, "{} notin ({})", self.key, values()),
            Operator::Exists => f.write_str(&self.key),
            Operator::DoesNotExist => write!(f, "!{}", self.key),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operator::In => "In",
            Operator::NotIn => "NotIn",
            Operator::Exists => "Exists",
            Operator::DoesNotExist => "DoesNotExist",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(key: &str, operator: Operator, values: &[&str]) -> Expression {
        Expression::new(key, operator, values.iter().copied()).unwrap()
    }

    fn requirement(key: &str, operator: &str, values: Option<&[&str]>) -> LabelSelectorRequirement {
        LabelSelectorRequirement {
            key: key.to_string(),
            operator: operator.to_string(),
            values: values.map(|vs| vs.iter().map(|v| v.to_string()).collect()),
        }
    }

    #[test]
    fn test_matches() {
        for (selector, labels, matches, msg) in &[
            (Selector::default(), Labels::default(), true, "empty match"),
            (
                Selector::default(),
                Labels::from_iter(Some(("foo", "bar"))),
                true,
                "empty selector matches any labels",
            ),
            (
                Selector::from_iter(Some(("foo", "bar"))),
                Labels::from_iter(Some(("foo", "bar"))),
                true,
                "exact label match",
            ),
            (
                Selector::from_iter(Some(("foo", "bar"))),
                Labels::from_iter(vec![("foo", "bar"), ("bah", "baz")]),
                true,
                "sufficient label match",
            ),
            (
                Selector::from_iter(Some(("foo", "bar"))),
                Labels::from_iter(Some(("foo", "baz"))),
                false,
                "label value mismatch",
            ),
            (
                Selector::from_iter(vec![("foo", "bar"), ("bah", "baz")]),
                Labels::from_iter(Some(("foo", "bar"))),
                false,
                "missing label",
            ),
            (
                Selector::from_iter(Some(expr("foo", Operator::In, &["bar"]))),
                Labels::from_iter(vec![("foo", "bar"), ("bah", "baz")]),
                true,
                "expression match",
            ),
            (
                Selector::from_iter(Some(expr("foo", Operator::In, &["bar"]))),
                Labels::default(),
                false,
                "in requires the key",
            ),
            (
                Selector::from_iter(Some(expr("foo", Operator::NotIn, &["bar"]))),
                Labels::from_iter(Some(("foo", "bar"))),
                false,
                "notin excludes value",
            ),
            (
                Selector::from_iter(Some(expr("foo", Operator::NotIn, &["bar"]))),
                Labels::from_iter(Some(("foo", "baz"))),
                true,
                "notin admits other values",
            ),
            (
                Selector::from_iter(Some(expr("foo", Operator::NotIn, &["bar"]))),
                Labels::default(),
                true,
                "notin admits missing key",
            ),
            (
                Selector::from_iter(Some(expr("foo", Operator::Exists, &[]))),
                Labels::from_iter(Some(("foo", "anything"))),
                true,
                "exists",
            ),
            (
                Selector::from_iter(Some(expr("foo", Operator::DoesNotExist, &[]))),
                Labels::from_iter(Some(("foo", "anything"))),
                false,
                "does not exist",
            ),
        ] {
            assert_eq!(selector.matches(labels), *matches, "{}", msg);
        }
    }

    #[test]
    fn match_labels_and_expressions_are_conjunctive() {
        let selector = Selector::try_from(&LabelSelector {
            match_labels: Some(Map::from_iter(Some(("role".into(), "web".into())))),
            match_expressions: Some(vec![requirement("tier", "In", Some(&["a", "b"]))]),
        })
        .unwrap();

        assert!(selector.matches(&Labels::from_iter(vec![("role", "web"), ("tier", "a")])));
        assert!(!selector.matches(&Labels::from_iter(vec![("role", "web"), ("tier", "c")])));
        assert!(!selector.matches(&Labels::from_iter(vec![("role", "db"), ("tier", "a")])));
    }

    #[test]
    fn invalid_requirements() {
        assert_eq!(
            Selector::try_from(&LabelSelector {
                match_expressions: Some(vec![requirement("foo", "Equals", Some(&["bar"]))]),
                ..Default::default()
            }),
            Err(SelectorError::UnknownOperator {
                key: "foo".into(),
                operator: "Equals".into(),
            })
        );

        assert_eq!(
            Selector::try_from(&LabelSelector {
                match_expressions: Some(vec![requirement("foo", "In", Some(&[]))]),
                ..Default::default()
            }),
            Err(SelectorError::MissingValues {
                key: "foo".into(),
                operator: Operator::In,
            })
        );

        assert_eq!(
            Selector::try_from(&LabelSelector {
                match_expressions: Some(vec![requirement("foo", "Exists", Some(&["bar"]))]),
                ..Default::default()
            }),
            Err(SelectorError::UnexpectedValues {
                key: "foo".into(),
                operator: Operator::Exists,
            })
        );
    }

    #[test]
    fn display() {
        assert_eq!(Selector::default().to_string(), "<all>");

        let selector = Selector::try_from(&LabelSelector {
            match_labels: Some(Map::from_iter(Some(("role".into(), "web".into())))),
            match_expressions: Some(vec![
                requirement("tier", "NotIn", Some(&["b", "a"])),
                requirement("legacy", "DoesNotExist", None),
                requirement("app", "Exists", None),
            ]),
        })
        .unwrap();
        assert_eq!(selector.to_string(), "role=web,tier notin (a,b),!legacy,app");
    }
}
