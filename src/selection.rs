//! Which entities are currently shown.
//!
//! Checkbox lists hold literal checked values, including the `All` box. The
//! resolved [`SelectionState`] is either every entity or an explicit subset:
//! nothing checked means every entity, and a checked `All` means every entity
//! regardless of the other boxes.

use crate::error::{Result, VizError};
use std::collections::BTreeSet;

/// Literal value of the "All" checkbox.
pub const ALL: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionState {
    AllEntities,
    Subset(BTreeSet<String>),
}

impl SelectionState {
    /// Resolve against the available entities, keeping their order.
    /// Names that are not available are ignored.
    pub fn resolve<'a>(&self, available: &[&'a str]) -> Vec<&'a str> {
        match self {
            SelectionState::AllEntities => available.to_vec(),
            SelectionState::Subset(set) => available
                .iter()
                .copied()
                .filter(|n| set.contains(*n))
                .collect(),
        }
    }

    pub fn includes(&self, name: &str) -> bool {
        match self {
            SelectionState::AllEntities => true,
            SelectionState::Subset(set) => set.contains(name),
        }
    }
}

/// Checkbox list with an `All` box.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckboxSelection {
    checked: BTreeSet<String>,
    /// Order in which values were checked, for the "selected" legend.
    order: Vec<String>,
}

impl CheckboxSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check or uncheck one box. Returns `true` when the state changed.
    pub fn set(&mut self, value: &str, checked: bool) -> bool {
        if checked {
            if self.checked.insert(value.to_string()) {
                self.order.push(value.to_string());
                return true;
            }
        } else if self.checked.remove(value) {
            self.order.retain(|v| v != value);
            return true;
        }
        false
    }

    pub fn toggle(&mut self, value: &str) {
        let now = !self.is_checked(value);
        self.set(value, now);
    }

    pub fn is_checked(&self, value: &str) -> bool {
        self.checked.contains(value)
    }

    /// Checked values in the order they were checked, `All` included.
    pub fn checked_values(&self) -> &[String] {
        &self.order
    }

    pub fn clear(&mut self) {
        self.checked.clear();
        self.order.clear();
    }

    pub fn state(&self) -> SelectionState {
        if self.checked.is_empty() || self.checked.contains(ALL) {
            SelectionState::AllEntities
        } else {
            SelectionState::Subset(self.checked.clone())
        }
    }
}

/// Single-choice dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownSelection {
    options: Vec<String>,
    selected: usize,
}

impl DropdownSelection {
    /// First option selected. Fails when there are no options.
    pub fn new(options: Vec<String>) -> Result<Self> {
        if options.is_empty() {
            return Err(VizError::EmptyDataset);
        }
        Ok(Self {
            options,
            selected: 0,
        })
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selected(&self) -> &str {
        &self.options[self.selected]
    }

    /// Choose an option by value. Returns `true` when the choice changed.
    pub fn choose(&mut self, value: &str) -> Result<bool> {
        let idx = self
            .options
            .iter()
            .position(|o| o == value)
            .ok_or_else(|| VizError::UnknownOption(value.to_string()))?;
        let changed = idx != self.selected;
        self.selected = idx;
        Ok(changed)
    }

    pub fn state(&self) -> SelectionState {
        SelectionState::Subset(BTreeSet::from([self.selected().to_string()]))
    }
}
