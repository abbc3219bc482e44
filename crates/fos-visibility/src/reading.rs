//! Visibility snapshots

use serde::Serialize;

/// Coarse visibility state of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityState {
    /// Not visible at all
    #[default]
    Hidden,
    /// Partially visible
    Visible,
    /// Entirely inside the viewport
    FullyVisible,
}

impl VisibilityState {
    #[inline]
    pub fn is_visible(&self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

/// One evaluation of an element. Produced fresh on every sample.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct VisibilityReading {
    /// Visible fraction of the element, in [0, 1]
    pub percentage: f64,
    pub is_visible: bool,
    pub is_fully_visible: bool,
}

impl VisibilityReading {
    pub fn state(&self) -> VisibilityState {
        if self.is_fully_visible {
            VisibilityState::FullyVisible
        } else if self.is_visible {
            VisibilityState::Visible
        } else {
            VisibilityState::Hidden
        }
    }

    pub fn is_hidden(&self) -> bool {
        !self.is_visible
    }
}
