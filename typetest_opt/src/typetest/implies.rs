use typetest_opt_lattice::TriState;

use super::TypeTestNode;

impl TypeTestNode {
    /// What the outcome of this test says about `other`.
    ///
    /// With `this_negated` the premise is that this test failed. Both tests
    /// must share their operand. Stamps are compared with strong equality,
    /// so speculative types never support an implication.
    pub fn implies(&self, this_negated: bool, other: &TypeTestNode) -> TriState {
        if self.operand != other.operand {
            return TriState::Unknown;
        }
        if this_negated {
            // !this => !other when this covers other
            if self.checked_stamp.meet(&other.checked_stamp) == self.checked_stamp {
                return TriState::False;
            }
        } else if other.checked_stamp.meet(&self.checked_stamp) == other.checked_stamp {
            // this => other when other covers this
            return TriState::True;
        }
        TriState::Unknown
    }
}
