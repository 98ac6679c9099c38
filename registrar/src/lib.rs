#![doc = include_str!("../README.md")]

mod decision;
pub mod domain;
mod enrollment;
mod error;
mod memory;
mod report;
mod store;
mod testing;
#[cfg(test)]
mod utils;

#[doc(inline)]
pub use crate::decision::{Decision, DecisionMaker, Error as DecisionError, PersistedDecision};
#[doc(inline)]
pub use crate::enrollment::EnrollmentManager;
#[doc(inline)]
pub use crate::error::{BoxDynError, Error, ErrorKind};
#[doc(inline)]
pub use crate::memory::{InMemoryStore, MemoryStoreError};
#[doc(inline)]
pub use crate::report::ReportAggregator;
#[doc(inline)]
pub use crate::store::{Hydrated, RegistrationStore, Revision};
#[doc(inline)]
pub use crate::testing::TestHarness;
