//! Warm-start seed handed from one solve to the next.

use hp_solver::SolveState;

use crate::error::InvalidStateError;

/// A converged [`SolveState`]. There is no way to build one from a state that
/// did not converge.
#[derive(Debug, Clone, PartialEq)]
pub struct Seed(SolveState);

impl Seed {
    pub fn from_converged(state: SolveState) -> Result<Self, InvalidStateError> {
        if !state.is_converged() {
            return Err(InvalidStateError::NotConverged {
                status: state.status(),
            });
        }
        Ok(Self(state))
    }

    pub fn state(&self) -> &SolveState {
        &self.0
    }

    pub fn into_state(self) -> SolveState {
        self.0
    }
}

impl TryFrom<SolveState> for Seed {
    type Error = InvalidStateError;

    fn try_from(state: SolveState) -> Result<Self, Self::Error> {
        Self::from_converged(state)
    }
}

impl AsRef<SolveState> for Seed {
    fn as_ref(&self) -> &SolveState {
        &self.0
    }
}
