//! Row selection tracking.
//!
//! Selection is keyed by row id rather than position, so it stays correct
//! when a page is re-sorted or re-fetched.

use std::collections::HashSet;

use crate::model::RowId;

type Observer = Box<dyn FnMut(usize) + Send>;

/// The set of checked rows of a table.
///
/// An optional observer is told the new selection size after every change
/// that leaves the selection non-empty; hosts use it for a "N selected" hint.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::RowId;
/// use datagrid_lib::selection::SelectionTracker;
///
/// let page: Vec<RowId> = vec![1.into(), 2.into(), 3.into()];
/// let mut selection = SelectionTracker::new();
///
/// selection.toggle(page[0].clone());
/// selection.toggle_all(&page);
/// assert_eq!(selection.len(), 3);
///
/// selection.toggle_all(&page);
/// assert!(selection.is_empty());
/// ```
#[derive(Default)]
pub struct SelectionTracker {
    selected: HashSet<RowId>,
    observer: Option<Observer>,
}

impl SelectionTracker {
    /// Create a new empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the change observer, replacing any previous one.
    pub fn on_change(&mut self, observer: impl FnMut(usize) + Send + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Builder form of [`on_change`](Self::on_change).
    pub fn with_observer(mut self, observer: impl FnMut(usize) + Send + 'static) -> Self {
        self.on_change(observer);
        self
    }

    /// Returns the selected ids.
    pub fn selection(&self) -> &HashSet<RowId> {
        &self.selected
    }

    /// Get all selected IDs (sorted for deterministic ordering).
    pub fn selected(&self) -> Vec<RowId> {
        let mut ids: Vec<_> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Check if an ID is selected.
    pub fn is_selected(&self, id: &RowId) -> bool {
        self.selected.contains(id)
    }

    /// Get the number of selected rows.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Returns `true` if every id in `ids` is selected and `ids` is not empty.
    pub fn all_selected(&self, ids: &[RowId]) -> bool {
        !ids.is_empty() && ids.iter().all(|id| self.selected.contains(id))
    }

    /// Flips membership of one id.
    /// Returns `true` if the id is now selected.
    pub fn toggle(&mut self, id: RowId) -> bool {
        let selected = if self.selected.remove(&id) {
            false
        } else {
            self.selected.insert(id);
            true
        };
        self.changed();
        selected
    }

    /// Header-checkbox behaviour for the visible page.
    ///
    /// If every id on the page is selected, deselects them all; otherwise
    /// selects them all. Ids from other pages are left alone.
    /// Returns `true` if the page is now fully selected.
    pub fn toggle_all(&mut self, page_ids: &[RowId]) -> bool {
        if page_ids.is_empty() {
            return false;
        }

        if self.all_selected(page_ids) {
            for id in page_ids {
                self.selected.remove(id);
            }
            self.changed();
            false
        } else {
            self.selected.extend(page_ids.iter().cloned());
            self.changed();
            true
        }
    }

    /// Clear all selection.
    /// Returns the IDs that were deselected.
    pub fn clear(&mut self) -> Vec<RowId> {
        self.selected.drain().collect()
    }

    /// Deselects the given ids, e.g. rows that were just deleted.
    /// Returns the IDs that were deselected.
    pub fn deselect(&mut self, ids: &[RowId]) -> Vec<RowId> {
        let removed: Vec<_> = ids
            .iter()
            .filter(|id| self.selected.remove(*id))
            .cloned()
            .collect();
        if !removed.is_empty() {
            self.changed();
        }
        removed
    }

    /// Drops every selected id that is not in `ids`.
    /// Returns the IDs that were deselected.
    pub fn retain(&mut self, ids: &[RowId]) -> Vec<RowId> {
        let keep: HashSet<&RowId> = ids.iter().collect();
        let removed: Vec<_> = self
            .selected
            .iter()
            .filter(|id| !keep.contains(id))
            .cloned()
            .collect();
        for id in &removed {
            self.selected.remove(id);
        }
        if !removed.is_empty() {
            self.changed();
        }
        removed
    }

    fn changed(&mut self) {
        let len = self.selected.len();
        if len == 0 {
            return;
        }
        if let Some(observer) = self.observer.as_mut() {
            observer(len);
        }
    }
}

impl std::fmt::Debug for SelectionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionTracker")
            .field("selected", &self.selected())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use super::*;

    fn ids(raw: &[i64]) -> Vec<RowId> {
        raw.iter().map(|&id| RowId::from(id)).collect()
    }

    #[test]
    fn test_toggle_flips_membership() {
        let mut selection = SelectionTracker::new();
        assert!(selection.toggle(RowId::from(7)));
        assert!(selection.is_selected(&RowId::from(7)));
        assert!(!selection.toggle(RowId::from(7)));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_toggle_all_pair() {
        let page = ids(&[1, 2, 3]);
        let mut selection = SelectionTracker::new();
        selection.toggle(page[1].clone());

        assert!(selection.toggle_all(&page));
        assert_eq!(selection.selected(), page);

        assert!(!selection.toggle_all(&page));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_toggle_all_keeps_other_pages() {
        let mut selection = SelectionTracker::new();
        selection.toggle(RowId::from(99));

        let page = ids(&[1, 2]);
        selection.toggle_all(&page);
        selection.toggle_all(&page);

        assert_eq!(selection.selected(), ids(&[99]));
    }

    #[test]
    fn test_toggle_all_on_empty_page_is_noop() {
        let mut selection = SelectionTracker::new();
        assert!(!selection.toggle_all(&[]));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_selection_survives_reordering() {
        let mut selection = SelectionTracker::new();
        selection.toggle(RowId::from("b"));

        let resorted: Vec<RowId> = vec!["c".into(), "b".into(), "a".into()];
        assert!(resorted.iter().any(|id| selection.is_selected(id)));
        assert!(selection.is_selected(&resorted[1]));
    }

    #[test]
    fn test_observer_fires_only_when_non_empty() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut selection =
            SelectionTracker::new().with_observer(move |len| sink.lock().unwrap().push(len));

        selection.toggle(RowId::from(1));
        selection.toggle(RowId::from(2));
        selection.toggle(RowId::from(1));
        selection.toggle(RowId::from(2));
        selection.toggle_all(&ids(&[5, 6, 7]));
        selection.clear();

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 1, 3]);
    }

    #[test]
    fn test_deselect_only_reports_selected() {
        let mut selection = SelectionTracker::new();
        selection.toggle_all(&ids(&[1, 2]));

        assert_eq!(selection.deselect(&ids(&[2, 8])), ids(&[2]));
        assert_eq!(selection.selected(), ids(&[1]));
    }

    #[test]
    fn test_retain_drops_missing_rows() {
        let mut selection = SelectionTracker::new();
        selection.toggle_all(&ids(&[1, 2, 3]));

        let removed = selection.retain(&ids(&[1, 3, 4]));

        assert_eq!(removed, ids(&[2]));
        assert_eq!(selection.selected(), ids(&[1, 3]));
    }
}
