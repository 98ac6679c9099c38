//! A Decision serves as a building block for the business logic of the enrollment workflow.
use tracing::debug;

use crate::domain::{Enrollment, EnrollmentChange, EnrollmentQuery};
use crate::store::RegistrationStore;

/// Represents a business decision taken from the enrollment state of a student.
pub trait Decision: Send + Sync {
    type Error: Send + Sync;

    /// Returns the query used by the store to hydrate the state of the decision.
    fn state_query(&self) -> EnrollmentQuery;

    /// Process the decision from the hydrated state.
    ///
    /// Must not have side effects: the returned changes are persisted only
    /// if the state is still current when they are saved.
    fn process(&self, state: &Enrollment) -> Result<Vec<EnrollmentChange>, Self::Error>;
}

pub struct PersistedDecision {
    state: Enrollment,
    changes: Vec<EnrollmentChange>,
}

impl PersistedDecision {
    /// Returns the state used to derive the decision
    pub fn state(&self) -> &Enrollment {
        &self.state
    }

    /// Returns the changes persisted by the decision
    pub fn changes(&self) -> &[EnrollmentChange] {
        &self.changes
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error<SE, DE> {
    #[error("store error: {0}")]
    Store(#[source] SE),
    #[error("domain error: {0}")]
    Domain(#[source] DE),
}

/// Executes business decisions.
#[derive(Clone)]
pub struct DecisionMaker<S> {
    store: S,
}

impl<S: RegistrationStore> DecisionMaker<S> {
    /// Creates a new instance of `DecisionMaker`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the store the decisions are persisted to.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Makes the given business decision.
    ///
    /// It hydrates the state requested by the decision, processes it and
    /// saves the resulting changes. The save is rejected by the store if the
    /// student has been modified after the state was hydrated.
    ///
    /// Note: the returned state is the one the decision was made on, without
    /// the changes applied.
    pub async fn make<D>(
        &self,
        decision: D,
    ) -> Result<PersistedDecision, Error<S::Error, D::Error>>
    where
        D: Decision,
    {
        let state = self
            .store
            .hydrate(&decision.state_query())
            .await
            .map_err(Error::Store)?;
        let changes = decision.process(&state).map_err(Error::Domain)?;
        debug!(
            student_id = state.student_id(),
            revision = state.revision(),
            changes = changes.len(),
            "saving decision"
        );
        let changes = self
            .store
            .save(&state, changes)
            .await
            .map_err(Error::Store)?;

        Ok(PersistedDecision {
            state: state.into_inner(),
            changes,
        })
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;
    use tokio::runtime::Runtime;

    use super::*;
    use crate::domain::{Course, EnrollmentError, RegisterCourses, Student};
    use crate::memory::MemoryStoreError;
    use crate::store::Hydrated;
    use crate::utils::MockStore;

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        Runtime::new().unwrap().block_on(future)
    }

    fn enrollment() -> Enrollment {
        Enrollment::new(1)
            .with_student(Student::new(1, "ada@example.com", "Ada"))
            .with_course(Course::new("CS101", "Programming I"))
    }

    #[test]
    fn it_should_hydrate_state_and_persist_changes() {
        let mut store = MockStore::new();
        store
            .expect_hydrate()
            .with(eq(EnrollmentQuery::new(1)))
            .once()
            .return_once(|_| Ok(Hydrated::new(enrollment(), 3)));
        store
            .expect_save()
            .withf(|state, changes| {
                state.revision() == 3
                    && *changes == [EnrollmentChange::RegistrationTriggered { student_id: 1 }]
            })
            .once()
            .return_once(|_, changes| Ok(changes));

        let decision_maker = DecisionMaker::new(store);

        let persisted_decision = block_on(decision_maker.make(RegisterCourses::new(1))).unwrap();

        assert_eq!(persisted_decision.state(), &enrollment());
        assert_eq!(
            persisted_decision.changes(),
            [EnrollmentChange::RegistrationTriggered { student_id: 1 }]
        );
    }

    #[test]
    fn it_should_not_save_when_the_decision_fails() {
        let mut store = MockStore::new();
        store
            .expect_hydrate()
            .once()
            .return_once(|_| Ok(Hydrated::new(Enrollment::new(1), 0)));
        store.expect_save().never();

        let decision_maker = DecisionMaker::new(store);

        let result = block_on(decision_maker.make(RegisterCourses::new(1)));

        assert!(matches!(
            result,
            Err(Error::Domain(EnrollmentError::StudentNotFound(1)))
        ));
    }

    #[test]
    fn it_should_return_the_store_error_of_a_rejected_save() {
        let mut store = MockStore::new();
        store
            .expect_hydrate()
            .once()
            .return_once(|_| Ok(Hydrated::new(enrollment(), 0)));
        store
            .expect_save()
            .once()
            .return_once(|_, _| Err(MemoryStoreError::Concurrency(1)));

        let decision_maker = DecisionMaker::new(store);

        let result = block_on(decision_maker.make(RegisterCourses::new(1)));

        assert!(matches!(
            result,
            Err(Error::Store(MemoryStoreError::Concurrency(1)))
        ));
    }
}
