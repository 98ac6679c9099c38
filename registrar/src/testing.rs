//! Utility for testing a Decision implementation
//!
//! The test harness allows you to set up the enrollment state of a student, perform the given
//! decision, and make assertions about the resulting changes.
use std::fmt::Debug;

use crate::domain::{Enrollment, EnrollmentChange};
use crate::Decision;

/// Test harness for testing decisions.
pub struct TestHarness;

impl TestHarness {
    /// Sets up the enrollment state.
    ///
    /// # Arguments
    ///
    /// * `state` - The state the decision is made on. Catalog courses the
    ///   decision does not query are hidden from it, as a store would do.
    ///
    /// # Returns
    ///
    /// A `TestHarnessStep` representing the "given" step.
    pub fn given(state: Enrollment) -> TestHarnessStep<Given> {
        TestHarnessStep {
            _step: Given { state },
        }
    }
}

/// Represents the given step of the test harness.
pub struct Given {
    state: Enrollment,
}

/// Represents when step of the test harness.
pub struct When<ERR> {
    result: Result<Vec<EnrollmentChange>, ERR>,
}

pub struct TestHarnessStep<ST> {
    _step: ST,
}

impl TestHarnessStep<Given> {
    /// Executes a decision on the given state.
    ///
    /// # Arguments
    ///
    /// * `decision` - The decision to test.
    ///
    /// # Returns
    ///
    /// A `TestHarnessStep` representing the "when" step.
    pub fn when<D, ERR>(self, decision: D) -> TestHarnessStep<When<ERR>>
    where
        D: Decision<Error = ERR>,
    {
        let mut state = self._step.state;
        state.restrict_to(&decision.state_query());
        let result = decision.process(&state);
        TestHarnessStep {
            _step: When { result },
        }
    }
}

impl<ERR> TestHarnessStep<When<ERR>>
where
    ERR: Debug + PartialEq,
{
    /// Makes assertions about the changes.
    ///
    /// # Arguments
    ///
    /// * `expected` - The expected changes.
    ///
    /// # Panics
    ///
    /// Panics if the action result is not `Ok` or if the changes do not match the expected changes.
    #[track_caller]
    pub fn then(self, expected: impl Into<Vec<EnrollmentChange>>) {
        assert_eq!(Ok(expected.into()), self._step.result);
    }

    /// Makes assertions about the expected error result.
    ///
    /// # Arguments
    ///
    /// * `expected` - The expected error.
    ///
    /// # Panics
    ///
    /// Panics if the action result is not `Err` or if the error does not match the expected error.
    #[track_caller]
    pub fn then_err(self, expected: ERR) {
        let err = self._step.result.unwrap_err();
        assert_eq!(err, expected);
    }
}
