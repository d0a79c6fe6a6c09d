//! Dashboard Module
//!
//! Native desktop shell (egui/eframe) over the client workflows.
//!
//! - **`state`** - `AppState`: session, auth form and the active workflows
//! - **`views`** - auth view plus the passenger and driver dashboards
//! - **`theme`** - colors and frame builders
//! - **`main`** - binary entry point
//!
//! Views never await. Every frame starts with [`AppState::update`], which
//! folds finished effects into the workflows, and views only call the
//! workflows' synchronous methods.

pub mod state;
pub mod theme;
pub mod views;

pub use state::{AppState, AppView, PassengerTab};
