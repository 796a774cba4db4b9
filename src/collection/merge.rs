//! Combining two collections.

use super::SpectrumCollection;
use crate::error::StateError;

/// Every spectrum of `first` followed by deep copies of `second`'s,
/// renumbered to continue after `first`'s last identifier.
///
/// The result takes `first`'s configuration. Neither input is changed. A
/// rebinned spectrum stays rebinned and keeps its original binning for a
/// later undo. Fails if either collection is empty.
pub fn merge(
    first: &SpectrumCollection,
    second: &SpectrumCollection,
) -> Result<SpectrumCollection, StateError> {
    if first.is_empty() || second.is_empty() {
        return Err(StateError::EmptyCollection);
    }

    let mut merged = first.clone();
    for (id, entry) in second.iter() {
        let new_id = merged.push(entry.clone());
        log::debug!("{id} of the second collection merged as {new_id}");
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::super::tests::{collection, one_to_ten};
    use super::*;
    use crate::config::CollectionConfig;
    use crate::data::SpectrumExtras;
    use ndarray::array;

    #[test]
    fn test_merge_renumbers_second() {
        let mut a = collection(vec![one_to_ten(), vec![1.0, 2.0]], CollectionConfig::default());
        let mut b = collection(
            vec![vec![5.0], vec![6.0, 6.0], vec![7.0, 7.0, 7.0]],
            CollectionConfig::default(),
        );
        b.get_mut("spectrum1").unwrap().extras_mut().source_file = Some("b1.pha".into());

        let mut merged = merge(&a, &b).unwrap();

        assert_eq!(
            merged.ids().collect::<Vec<_>>(),
            ["spectrum1", "spectrum2", "spectrum3", "spectrum4", "spectrum5"]
        );
        assert_eq!(merged.get("spectrum3").unwrap().counts(), &array![5.0]);
        assert_eq!(
            merged.get("spectrum3").unwrap().extras().source_file.as_deref(),
            Some("b1.pha")
        );
        assert_eq!(merged.get("spectrum5").unwrap().counts(), &array![7.0, 7.0, 7.0]);

        // the merged entries are copies
        a.rebin(5_i64).unwrap();
        b.rebin(1_i64).unwrap();
        assert_eq!(merged.rebin_settings(), None);
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 3);

        merged.get_mut("spectrum3").unwrap().extras_mut().source_file = Some("edited.pha".into());
        assert_eq!(
            b.get("spectrum1").unwrap().extras().source_file.as_deref(),
            Some("b1.pha")
        );
    }

    #[test]
    fn test_merge_keeps_rebinned_state() {
        let a = collection(vec![vec![1.0]], CollectionConfig::default());
        let mut b = collection(vec![one_to_ten()], CollectionConfig::default());
        b.rebin(5_i64).unwrap();

        let mut merged = a.merge(&b).unwrap();
        assert_eq!(merged.rebin_settings().unwrap().get("spectrum2"), Some(&5));

        let report = merged.undo_rebin(2_usize);
        assert_eq!(report.restored, ["spectrum2"]);
        assert_eq!(merged.get("spectrum2").unwrap().counts().len(), 10);
        assert!(b.get("spectrum1").unwrap().is_rebinned());
    }

    #[test]
    fn test_merge_with_empty_fails() {
        let empty = collection(vec![], CollectionConfig::default());
        let b = collection(vec![vec![1.0]], CollectionConfig::default());
        assert_eq!(merge(&empty, &b).unwrap_err(), StateError::EmptyCollection);
        assert_eq!(b.merge(&empty).unwrap_err(), StateError::EmptyCollection);
        assert_eq!(merge(&empty, &empty).unwrap_err(), StateError::EmptyCollection);

        assert_eq!(b.len(), 1);
        assert_eq!(b.get("spectrum1").unwrap().extras(), &SpectrumExtras::default());
    }
}
