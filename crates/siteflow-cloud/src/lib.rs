//! siteflow cloud declarations
//!
//! This crate provides the declaration model siteflow builds stacks with:
//! resources are declared into a graph, diffed against the state the
//! provisioning engine last realized, and handed to that engine as a plan.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  siteflow CLI                    │
//! │          (preview / up / destroy / graph)        │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               siteflow-cloud                     │
//! │  ┌──────────────┐  ┌──────────────┐             │
//! │  │ Stack/Output │  │  Plan / diff │             │
//! │  └──────────────┘  └──────────────┘             │
//! │  ┌──────────────┐  ┌──────────────┐             │
//! │  │  State Mgmt  │  │ trait Cloud- │             │
//! │  │              │  │   Provider   │             │
//! │  └──────────────┘  └──────┬───────┘             │
//! └───────────────────────────┼─────────────────────┘
//!                             │
//!                   ┌─────────▼─────────┐
//!                   │ external engine   │
//!                   │ (state / apply)   │
//!                   └───────────────────┘
//! ```

pub mod action;
pub mod engine;
pub mod error;
pub mod output;
pub mod provider;
pub mod stack;
pub mod state;

// Re-exports
pub use action::{Action, ActionResult, ActionType, ApplyResult, Plan, PlanSummary, diff};
pub use engine::ExternalEngine;
pub use error::{CloudError, Result};
pub use output::{AttributeRef, AttributeSource, Output};
pub use provider::{AuthStatus, CloudProvider, ResourceConfig, ResourceSet};
pub use stack::{Stack, StackGraph};
pub use state::{GlobalState, ResourceState, ResourceStatus, StateLock, StateManager};
