use crate::backend::ElementHandle;

/// Result of a resolution attempt. Absence is a value, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Matched by the strategy at `strategy_index` in the query's chain.
    Found {
        element: ElementHandle,
        strategy_index: usize,
    },

    /// No strategy produced a usable match.
    NotFound {
        attempted: Vec<String>, // Strategies tried
    },
}

impl Resolution {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found { .. })
    }

    pub fn element(&self) -> Option<&ElementHandle> {
        match self {
            Resolution::Found { element, .. } => Some(element),
            Resolution::NotFound { .. } => None,
        }
    }

    pub fn into_element(self) -> Option<ElementHandle> {
        match self {
            Resolution::Found { element, .. } => Some(element),
            Resolution::NotFound { .. } => None,
        }
    }

    pub fn strategy_index(&self) -> Option<usize> {
        match self {
            Resolution::Found { strategy_index, .. } => Some(*strategy_index),
            Resolution::NotFound { .. } => None,
        }
    }

    /// Attempted strategies joined for report diagnostics.
    pub fn attempted_summary(&self) -> String {
        match self {
            Resolution::Found { .. } => String::new(),
            Resolution::NotFound { attempted } if attempted.is_empty() => {
                "no strategies declared".to_string()
            }
            Resolution::NotFound { attempted } => format!("tried {}", attempted.join(", ")),
        }
    }
}
