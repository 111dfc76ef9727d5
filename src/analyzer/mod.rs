pub mod classifier;
pub mod metrics;
pub mod revenue;
pub mod stats;

pub use classifier::{classify, priority_label, CanonicalStatus};
pub use metrics::{MonthlyPoint, RecentTicket, StatusDistribution};
pub use revenue::RevenueTotals;
