//! Three-valued logic for static verdicts.

use std::fmt;

/// Outcome of a static question about a runtime condition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TriState {
    True,
    False,
    #[default]
    Unknown,
}

impl TriState {
    pub fn from_bool(value: bool) -> Self {
        if value {
            TriState::True
        } else {
            TriState::False
        }
    }

    /// True and False are known; Unknown is not.
    pub fn is_known(self) -> bool {
        self != TriState::Unknown
    }

    pub fn is_true(self) -> bool {
        self == TriState::True
    }

    pub fn is_false(self) -> bool {
        self == TriState::False
    }

    pub fn to_bool(self) -> Option<bool> {
        match self {
            TriState::True => Some(true),
            TriState::False => Some(false),
            TriState::Unknown => None,
        }
    }

    /// Logical negation; Unknown stays Unknown.
    pub fn negate(self) -> Self {
        match self {
            TriState::True => TriState::False,
            TriState::False => TriState::True,
            TriState::Unknown => TriState::Unknown,
        }
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        TriState::from_bool(value)
    }
}

impl fmt::Display for TriState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriState::True => f.write_str("true"),
            TriState::False => f.write_str("false"),
            TriState::Unknown => f.write_str("unknown"),
        }
    }
}
