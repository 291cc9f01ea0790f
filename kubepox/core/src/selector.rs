use crate::{
    k8s::{LabelSelector, Selector},
    Labels, Result,
};

/// Evaluates a raw pod selector against a set of labels.
///
/// An empty selector matches every set of labels. A selector that cannot be compiled is an error,
/// never a non-match.
pub fn matches(labels: &Labels, selector: &LabelSelector) -> Result<bool> {
    let selector = Selector::try_from(selector)?;
    Ok(selector.matches(labels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{k8s::LabelSelectorRequirement, SelectorError};
    use maplit::btreemap;

    #[test]
    fn empty_selector_matches_everything() {
        let selector = LabelSelector::default();
        assert!(matches(&Labels::default(), &selector).unwrap());
        assert!(matches(&Labels::from_iter(Some(("role", "db"))), &selector).unwrap());
    }

    #[test]
    fn match_labels_ignore_extra_labels() {
        let selector = LabelSelector {
            match_labels: Some(btreemap! { "role".to_string() => "db".to_string() }),
            ..Default::default()
        };
        let labels = Labels::from_iter(vec![("role", "db"), ("job", "worker")]);
        assert!(matches(&labels, &selector).unwrap());
        assert!(!matches(&Labels::from_iter(Some(("job", "worker"))), &selector).unwrap());
    }

    #[test]
    fn invalid_selector_is_an_error() {
        let selector = LabelSelector {
            match_expressions: Some(vec![LabelSelectorRequirement {
                key: "role".to_string(),
                operator: "Exists".to_string(),
                values: Some(vec!["db".to_string()]),
            }]),
            ..Default::default()
        };
        assert!(matches!(
            matches(&Labels::default(), &selector),
            Err(SelectorError::UnexpectedValues { .. })
        ));
    }
}
