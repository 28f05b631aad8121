use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
    /// Legend click on either chart.
    Toggle(String),
    ShowAll,
    /// Drops hidden flags for labels that are no longer charted.
    Retain(Vec<String>),
}

/// Legend visibility shared by the price and count charts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartViewState {
    hidden: BTreeSet<String>,
}

impl ChartViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, action: ViewAction) {
        match action {
            ViewAction::Toggle(label) => {
                if !self.hidden.remove(&label) {
                    self.hidden.insert(label);
                }
            }
            ViewAction::ShowAll => self.hidden.clear(),
            ViewAction::Retain(labels) => {
                let keep: BTreeSet<String> = labels.into_iter().collect();
                self.hidden.retain(|label| keep.contains(label));
            }
        }
    }

    pub fn is_hidden(&self, label: &str) -> bool {
        self.hidden.contains(label)
    }

    pub fn hidden(&self) -> impl Iterator<Item = &str> {
        self.hidden.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_visibility() {
        let mut state = ChartViewState::new();
        state.apply(ViewAction::Toggle("関東".into()));
        assert!(state.is_hidden("関東"));
        state.apply(ViewAction::Toggle("関東".into()));
        assert!(!state.is_hidden("関東"));
    }

    #[test]
    fn retain_prunes_labels_no_longer_charted() {
        let mut state = ChartViewState::new();
        state.apply(ViewAction::Toggle("関東".into()));
        state.apply(ViewAction::Toggle("関西".into()));
        state.apply(ViewAction::Retain(vec!["関西".into(), "九州".into()]));
        assert_eq!(state.hidden().collect::<Vec<_>>(), vec!["関西"]);
        state.apply(ViewAction::ShowAll);
        assert_eq!(state.hidden().count(), 0);
    }
}
