pub mod service;
pub mod views;

pub use service::{AppState, build_router, create_app};
pub use views::{DashboardView, RateRow, SessionView, SummaryView};
