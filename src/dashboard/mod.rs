//! Dashboard UI Module
//!
//! The eframe application: annotation viewer, batch counts and settings.

pub mod app;
pub mod components;
pub mod dispatch;
pub mod state;
pub mod theme;
pub mod views;

pub use app::{run_dashboard, AnnotatorApp};
pub use dispatch::{ApiEvent, Dispatcher};
pub use state::{DashboardState, DashboardView, UiAction};
