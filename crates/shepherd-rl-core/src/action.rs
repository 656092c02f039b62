//! Discrete action identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of an action in the environment's finite action set.
///
/// The same id addresses the model's output vector and the environment's
/// action-translation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionId(pub usize);

impl ActionId {
    /// Position of this action in a per-action value vector
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<usize> for ActionId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

/// Action with the largest value; ties resolve to the lowest index.
///
/// NaN entries never win. Returns `None` for an empty or all-NaN slice.
#[must_use]
pub fn argmax(values: &[f64]) -> Option<ActionId> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| ActionId(i))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_prefers_first_of_ties() {
        assert_eq!(argmax(&[0.1, 0.7, 0.7, -1.0]), Some(ActionId(1)));
    }

    #[test]
    fn argmax_skips_nan() {
        assert_eq!(argmax(&[f64::NAN, -3.0, -4.0]), Some(ActionId(1)));
        assert_eq!(argmax(&[f64::NAN]), None);
        assert_eq!(argmax(&[]), None);
    }
}
