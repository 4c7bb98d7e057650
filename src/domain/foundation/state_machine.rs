//! State machine trait for lifecycle enums.

use super::ValidationError;

/// Trait for status enums whose legal moves are a fixed edge set.
///
/// Implementors list the edges; validated movement comes for free.
///
/// ```ignore
/// let mut phase = SessionPhase::Idle;
/// phase.advance(SessionPhase::Connecting)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if moving from self to target is a legal edge.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all legal targets from the current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Validates the edge and returns the target state.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Moves in place, returning the state that was left.
    fn advance(&mut self, target: Self) -> Result<Self, ValidationError> {
        let next = self.transition_to(target)?;
        Ok(std::mem::replace(self, next))
    }

    /// Checks if current state has no outgoing edges.
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum CallLeg {
        Dialing,
        Open,
        HungUp,
    }

    impl StateMachine for CallLeg {
        fn can_transition_to(&self, target: &Self) -> bool {
            use CallLeg::*;
            matches!((self, target), (Dialing, Open) | (Dialing, HungUp) | (Open, HungUp))
        }

        fn valid_transitions(&self) -> Vec<Self> {
            use CallLeg::*;
            match self {
                Dialing => vec![Open, HungUp],
                Open => vec![HungUp],
                HungUp => vec![],
            }
        }
    }

    #[test]
    fn legal_edge_is_accepted() {
        assert_eq!(CallLeg::Dialing.transition_to(CallLeg::Open), Ok(CallLeg::Open));
    }

    #[test]
    fn illegal_edge_is_rejected_with_both_states_named() {
        let err = CallLeg::HungUp.transition_to(CallLeg::Open).unwrap_err();
        assert!(err.to_string().contains("HungUp"));
        assert!(err.to_string().contains("Open"));
    }

    #[test]
    fn advance_mutates_and_returns_previous() {
        let mut leg = CallLeg::Dialing;
        assert_eq!(leg.advance(CallLeg::Open), Ok(CallLeg::Dialing));
        assert_eq!(leg, CallLeg::Open);
    }

    #[test]
    fn failed_advance_leaves_state_untouched() {
        let mut leg = CallLeg::HungUp;
        assert!(leg.advance(CallLeg::Dialing).is_err());
        assert_eq!(leg, CallLeg::HungUp);
    }

    #[test]
    fn terminal_means_no_outgoing_edges() {
        assert!(CallLeg::HungUp.is_terminal());
        assert!(!CallLeg::Dialing.is_terminal());
    }

    #[test]
    fn can_transition_to_agrees_with_valid_transitions() {
        for leg in [CallLeg::Dialing, CallLeg::Open, CallLeg::HungUp] {
            for target in leg.valid_transitions() {
                assert!(leg.can_transition_to(&target), "{:?} -> {:?}", leg, target);
            }
        }
    }
}
