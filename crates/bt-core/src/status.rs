#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of one node update.
///
/// `Running` only means "tick me again"; it is never a long-lived resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Status {
    Running,
    Success,
    Failure,
}

/// Terminal subset of [`Status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Outcome {
    Success,
    Failure,
}

impl From<Outcome> for Status {
    fn from(value: Outcome) -> Self {
        match value {
            Outcome::Success => Status::Success,
            Outcome::Failure => Status::Failure,
        }
    }
}

impl From<bool> for Status {
    fn from(value: bool) -> Self {
        if value {
            Status::Success
        } else {
            Status::Failure
        }
    }
}

impl Status {
    pub fn outcome(self) -> Option<Outcome> {
        match self {
            Status::Running => None,
            Status::Success => Some(Outcome::Success),
            Status::Failure => Some(Outcome::Failure),
        }
    }

    #[inline]
    pub fn is_running(self) -> bool {
        matches!(self, Status::Running)
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        !self.is_running()
    }

    /// Swaps `Success` and `Failure`; `Running` passes through.
    #[inline]
    pub fn invert(self) -> Self {
        match self {
            Status::Running => Status::Running,
            Status::Success => Status::Failure,
            Status::Failure => Status::Success,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invert_keeps_running() {
        assert_eq!(Status::Running.invert(), Status::Running);
        assert_eq!(Status::Success.invert(), Status::Failure);
        assert_eq!(Status::Failure.invert(), Status::Success);
    }

    #[test]
    fn outcome_is_none_while_running() {
        assert_eq!(Status::Running.outcome(), None);
        assert_eq!(Status::Failure.outcome(), Some(Outcome::Failure));
        assert_eq!(Status::from(Outcome::Success), Status::Success);
    }
}
