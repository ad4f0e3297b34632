//! Background training pipeline: the model-search contract, the job
//! orchestrator that drives one job through its stages, and the bounded
//! worker pool that runs orchestrations off the request path.

pub mod error;
pub mod evaluate;
pub mod orchestrator;
pub mod search;
pub mod worker;

pub use error::PipelineError;
pub use orchestrator::Orchestrator;
pub use search::{BuiltinSearch, FittedEstimator, ModelSearch, SearchError, TrainedModel};
pub use worker::{JobQueue, QueueFull, WorkerPool};
