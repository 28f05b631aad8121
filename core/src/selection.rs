use std::collections::BTreeMap;

use crate::error::SelectionError;
use crate::geo::{Category, SelectionNode};

/// Areas currently ticked in the menu, grouped by category.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    groups: BTreeMap<Category, Vec<SelectionNode>>,
    prev_removed: Option<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node; re-selecting the same area replaces its entry in place.
    pub fn select(&mut self, node: SelectionNode) {
        let group = self.groups.entry(node.category).or_default();
        match group
            .iter_mut()
            .find(|existing| existing.name == node.name)
        {
            Some(existing) => *existing = node,
            None => group.push(node),
        }
    }

    pub fn deselect(
        &mut self,
        category: Category,
        name: &str,
    ) -> Result<SelectionNode, SelectionError> {
        let not_selected = || SelectionError::NotSelected {
            category,
            name: name.to_string(),
        };
        let group = self.groups.get_mut(&category).ok_or_else(not_selected)?;
        let idx = group
            .iter()
            .position(|node| node.name == name)
            .ok_or_else(not_selected)?;
        let removed = group.remove(idx);
        if group.is_empty() {
            self.groups.remove(&category);
        }
        self.prev_removed = Some(removed.name.clone());
        Ok(removed)
    }

    pub fn clear_all(&mut self) {
        self.groups.clear();
    }

    pub fn is_selected(&self, category: Category, name: &str) -> bool {
        self.groups
            .get(&category)
            .is_some_and(|group| group.iter().any(|node| node.name == name))
    }

    pub fn count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn prev_removed(&self) -> Option<&str> {
        self.prev_removed.as_deref()
    }

    /// Regions first, then prefectures, cities and districts; insertion order within each.
    pub fn nodes(&self) -> impl Iterator<Item = &SelectionNode> {
        self.groups.values().flat_map(|group| group.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{AncestorRef, ParentChain};

    fn prefecture(name: &str) -> SelectionNode {
        SelectionNode::new(
            Category::Prefecture,
            name,
            ParentChain::from_ancestors([AncestorRef::new(Category::Region, "関東")]).unwrap(),
        )
    }

    #[test]
    fn select_and_deselect_track_count_and_last_removal() {
        let mut state = SelectionState::new();
        state.select(SelectionNode::region("関東"));
        state.select(prefecture("東京都"));
        state.select(prefecture("千葉県"));
        assert_eq!(state.count(), 3);

        let removed = state
            .deselect(Category::Prefecture, "東京都")
            .expect("selected");
        assert_eq!(removed.name, "東京都");
        assert_eq!(state.count(), 2);
        assert_eq!(state.prev_removed(), Some("東京都"));
        assert!(!state.is_selected(Category::Prefecture, "東京都"));
    }

    #[test]
    fn reselecting_replaces_instead_of_duplicating() {
        let mut state = SelectionState::new();
        state.select(prefecture("東京都"));
        state.select(prefecture("東京都"));
        assert_eq!(state.count(), 1);
    }

    #[test]
    fn deselecting_unknown_area_is_an_error() {
        let mut state = SelectionState::new();
        let err = state
            .deselect(Category::City, "新宿区")
            .expect_err("nothing selected");
        assert!(matches!(err, SelectionError::NotSelected { .. }));
    }

    #[test]
    fn nodes_are_ordered_by_depth_then_insertion() {
        let mut state = SelectionState::new();
        state.select(prefecture("千葉県"));
        state.select(SelectionNode::region("関西"));
        state.select(prefecture("東京都"));
        state.select(SelectionNode::region("関東"));
        let names: Vec<_> = state.nodes().map(|node| node.name.as_str()).collect();
        assert_eq!(names, vec!["関西", "関東", "千葉県", "東京都"]);

        state.clear_all();
        assert!(state.is_empty());
        assert_eq!(state.count(), 0);
    }
}
