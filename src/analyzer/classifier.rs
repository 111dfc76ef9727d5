use serde::Serialize;

use crate::fetch::types::{RawStatus, TicketRecord};

/// The three canonical ticket states exposed by the dashboard.
/// Display order everywhere is Open, InProgress, Closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CanonicalStatus {
    Open,
    InProgress,
    Closed,
}

impl CanonicalStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CanonicalStatus::Open => "Open",
            CanonicalStatus::InProgress => "In Progress",
            CanonicalStatus::Closed => "Closed",
        }
    }
}

/// Classify a ticket into its canonical status.
/// The source carries either a numeric status code or a nested object
/// with a status name; both encodings are honored. Rules are checked in
/// fixed order, first match wins:
/// 1. code 1, or name equal to "open" (case-insensitive) → Open
/// 2. code 2, or name containing "progress" → InProgress
/// 3. code 3, or name equal to "closed" → Closed
/// Anything else → None. Unrecognized tickets still count toward the raw
/// total but never appear in the distribution or the derived rates.
pub fn classify(ticket: &TicketRecord) -> Option<CanonicalStatus> {
    let code = match ticket.status {
        Some(RawStatus::Code(c)) => Some(c),
        _ => None,
    };
    let lowered = match &ticket.status {
        Some(RawStatus::Named(named)) => named.name.as_deref().map(|n| n.trim().to_lowercase()),
        _ => None,
    };
    let name = lowered.as_deref();

    if code == Some(1) || name == Some("open") {
        return Some(CanonicalStatus::Open);
    }
    if code == Some(2) || name.is_some_and(|n| n.contains("progress")) {
        return Some(CanonicalStatus::InProgress);
    }
    if code == Some(3) || name == Some("closed") {
        return Some(CanonicalStatus::Closed);
    }
    None
}

/// Display label for the numeric priority code (1 low, 2 medium, 3 high).
pub fn priority_label(priority: Option<i64>) -> &'static str {
    match priority {
        Some(1) => "Low",
        Some(2) => "Medium",
        Some(3) => "High",
        _ => "Unknown",
    }
}
