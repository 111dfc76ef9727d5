//! Server-driven analytics for the helpdesk admin dashboard: a typed
//! fetch layer over the ticketing API, pure aggregate calculators, and a
//! coordinator that turns filter changes into fetches or recomputations
//! and exposes the result as one render-ready snapshot.

pub mod analyzer;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod fetch;
pub mod filters;

pub use analyzer::{
    CanonicalStatus, MonthlyPoint, RecentTicket, RevenueTotals, StatusDistribution,
};
pub use config::ApiConfig;
pub use coordinator::{DashboardCoordinator, DashboardSnapshot, SnapshotMeta};
pub use error::AppError;
pub use fetch::{ApiClient, DashboardApi};
pub use filters::{BranchFilter, FilterState};

// ─── E2E Integration Tests ──────────────────────────────────────────────────
