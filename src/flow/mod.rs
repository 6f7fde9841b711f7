//! Registration flow: the step-sequencing state machine.
//!
//! The controller owns a single `RegistrationState`, accepts one step
//! submission at a time, merges the step's result into the accumulated data
//! and decides which form comes next. Branching lives in an explicit
//! transition table (`transition::advance`) so it can be tested without any
//! forms or network collaborators.

pub mod controller;
pub mod model;
pub mod state;
pub mod step;
pub mod transition;

pub use controller::{FlowServices, Receipt, RegistrationFlow, StepOutcome};
pub use model::{CompanyDetails, CompanyRecord, Contact, ContactRecord};
pub use state::{Accumulated, RegistrationState};
pub use step::Step;
pub use transition::{StepResult, Transition, advance, back};
