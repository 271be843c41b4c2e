#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Dashboard
//!
//! - [`gate`] decides whether a signed-in identity may open a dashboard route
//! - [`auth_state`] is the reactive sign-in state and its navigation mapping
//! - [`DashboardService`] loads the role-specific view through the tenancy repository

pub mod auth_state;
pub mod error;
pub mod gate;
pub mod service;

pub use auth_state::{AuthState, AuthStore, Navigation, RouteWatcher, navigate};
pub use error::DashboardError;
pub use gate::{
    DashboardRoute, GateDecision, RedirectTarget, RoleGuard, RouteError, authorize,
    dashboard_path, home_route,
};
pub use service::{DashboardService, DashboardView};
