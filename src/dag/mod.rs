// src/dag/mod.rs

//! Task registry, readiness and wave scheduling.
//!
//! - [`graph`] holds the dependency graph in declaration order.
//! - [`task_info`] provides task metadata and launch directives.
//! - [`completion`] evaluates `done_when` checks against the filesystem.
//! - [`registry`] is the immutable, validated set of tasks.
//! - [`resolver`] decides which tasks are ready.
//! - [`scheduler`] runs one bounded-concurrency wave.
//! - [`scheduler_step`] defines the result type of a wave.

pub mod completion;
pub mod graph;
pub mod registry;
pub mod resolver;
pub mod scheduler;
pub mod scheduler_step;
pub mod task_info;

pub use completion::{CompletionCheck, CompletionProbe};
pub use graph::DagGraph;
pub use registry::TaskRegistry;
pub use resolver::{classify, classify_task, compute_ready, TaskClass};
pub use scheduler::WaveScheduler;
pub use scheduler_step::{WaveOutcome, WaveStatus};
pub use task_info::{LaunchDirective, LaunchSettings, Task};
