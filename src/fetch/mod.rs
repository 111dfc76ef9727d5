pub mod client;
pub mod deserializers;
pub mod types;

pub use client::{ApiClient, DashboardApi};
pub use types::{Branch, BranchRevenueRow, TicketRecord};
