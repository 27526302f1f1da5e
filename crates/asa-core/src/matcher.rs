//! Selector matching.
use asa_model::{LabelSelector, Labels};

/// Returns `true` if `labels[selector.key]` equals (or, for set-valued labels, contains) `selector.value`.
///
/// An absent key is a non-match.
#[inline]
pub fn matches(labels: &Labels, selector: &LabelSelector) -> bool {
    labels
        .get(selector.key())
        .is_some_and(|v| v.contains(selector.value()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        let mut l = Labels::new();
        for (k, v) in pairs {
            l.insert(*k, *v);
        }
        l
    }

    #[test]
    fn scalar_label_matches_on_exact_value() {
        let l = labels(&[("KEY", "VALUE")]);
        assert!(matches(&l, &LabelSelector::new("KEY", "VALUE")));
        assert!(!matches(&l, &LabelSelector::new("KEY", "OTHER")));
        assert!(!matches(&l, &LabelSelector::new("key", "VALUE")));
    }

    #[test]
    fn absent_key_is_not_a_match() {
        let l = labels(&[("other", "VALUE")]);
        assert!(!matches(&l, &LabelSelector::new("KEY", "VALUE")));
        assert!(!matches(&Labels::new(), &LabelSelector::new("KEY", "VALUE")));
    }

    #[test]
    fn set_label_matches_on_membership() {
        let mut l = Labels::new();
        l.insert("regions", ["eu", "us"]);

        assert!(matches(&l, &LabelSelector::new("regions", "eu")));
        assert!(matches(&l, &LabelSelector::new("regions", "us")));
        assert!(!matches(&l, &LabelSelector::new("regions", "ap")));
    }
}
