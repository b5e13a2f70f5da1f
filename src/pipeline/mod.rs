//! The translation pipeline: classify, resolve, translate, deliver.

mod orchestrator;
mod outcome;

pub use orchestrator::{Orchestrator, TranslateRequest};
pub use outcome::{Delivery, Destination, Failure, TranslationOutcome};
