//! Ticket metric calculators: pure functions over the loaded ticket set.
use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::classifier::{classify, priority_label, CanonicalStatus};
use super::stats::{mean, rate_pct, round1};
use crate::fetch::types::TicketRecord;

/// Closed tickets whose resolution span falls outside [0, 365) days are
/// data-quality outliers and excluded from the average.
const RESOLUTION_OUTLIER_DAYS: i64 = 365;

/// Number of entries in the recent-tickets list.
const RECENT_TICKET_LIMIT: usize = 5;

// ─── Data Structures ─────────────────────────────────────────────────────────

/// Counts per canonical status. Field order matches the legend order
/// (Open, InProgress, Closed); unrecognized tickets are not counted here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDistribution {
    pub open: usize,
    pub in_progress: usize,
    pub closed: usize,
}

impl StatusDistribution {
    /// Counts in fixed legend order.
    pub fn as_pairs(&self) -> [(CanonicalStatus, usize); 3] {
        [
            (CanonicalStatus::Open, self.open),
            (CanonicalStatus::InProgress, self.in_progress),
            (CanonicalStatus::Closed, self.closed),
        ]
    }

    /// Tickets that classified into one of the three buckets.
    pub fn classified_total(&self) -> usize {
        self.open + self.in_progress + self.closed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPoint {
    /// 0 = January … 11 = December.
    pub month_index: u32,
    pub ticket_count: usize,
}

/// Presentation-ready row for the recent-tickets table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTicket {
    pub id: i64,
    pub issue: String,
    pub customer_name: Option<String>,
    pub status: String,
    pub priority: String,
    pub created_at: NaiveDateTime,
}

// ─── Calculators ─────────────────────────────────────────────────────────────

/// Classify every ticket and accumulate the three-bucket counts.
pub fn status_distribution(tickets: &[TicketRecord]) -> StatusDistribution {
    let mut dist = StatusDistribution::default();
    for ticket in tickets {
        match classify(ticket) {
            Some(CanonicalStatus::Open) => dist.open += 1,
            Some(CanonicalStatus::InProgress) => dist.in_progress += 1,
            Some(CanonicalStatus::Closed) => dist.closed += 1,
            None => {}
        }
    }
    dist
}

/// A ticket is due when its creation day (midnight-truncated) lies
/// strictly before `today` and its canonical status is not Closed.
/// Approximate overdue signal; the source carries no due-date field.
pub fn due_ticket_count(tickets: &[TicketRecord], today: NaiveDate) -> usize {
    tickets
        .iter()
        .filter(|t| t.created_at.date() < today && classify(t) != Some(CanonicalStatus::Closed))
        .count()
}

pub fn open_ticket_count(tickets: &[TicketRecord]) -> usize {
    tickets
        .iter()
        .filter(|t| classify(t) == Some(CanonicalStatus::Open))
        .count()
}

/// Integer percentage of classified tickets that are closed.
/// 0 when nothing classifies.
pub fn resolution_rate(distribution: &StatusDistribution) -> u32 {
    rate_pct(distribution.closed, distribution.classified_total())
}

/// Resolution span in whole days, rounded up.
fn span_days(created: NaiveDateTime, updated: NaiveDateTime) -> i64 {
    let seconds = (updated - created).num_seconds();
    (seconds as f64 / 86_400.0).ceil() as i64
}

/// Mean resolution time of closed tickets in days, one decimal place.
/// A ticket contributes `ceil(updated_at − created_at)` when its
/// `updated_at` is present; spans < 0 or ≥ 365 days are discarded as
/// outliers. 0.0 when no ticket qualifies.
pub fn average_resolution_days(tickets: &[TicketRecord]) -> f64 {
    let mut spans: Vec<f64> = Vec::new();
    for ticket in tickets {
        if classify(ticket) != Some(CanonicalStatus::Closed) {
            continue;
        }
        let Some(updated) = ticket.updated_at else {
            continue;
        };
        let days = span_days(ticket.created_at, updated);
        if days < 0 || days >= RESOLUTION_OUTLIER_DAYS {
            continue;
        }
        spans.push(days as f64);
    }
    if spans.is_empty() {
        return 0.0;
    }
    round1(mean(&spans))
}

/// Integer percentage of agent-assigned tickets that are closed.
/// 0 when no ticket has an assigned agent.
pub fn completion_rate(tickets: &[TicketRecord]) -> u32 {
    let assigned_total = tickets.iter().filter(|t| !t.agents.is_empty()).count();
    let closed_assigned = tickets
        .iter()
        .filter(|t| !t.agents.is_empty() && classify(t) == Some(CanonicalStatus::Closed))
        .count();
    rate_pct(closed_assigned, assigned_total)
}

/// Tickets created in `year`, bucketed by creation month.
/// Always exactly 12 points, zero-filled, index 0 = January.
pub fn monthly_series(tickets: &[TicketRecord], year: i32) -> Vec<MonthlyPoint> {
    let mut counts = [0usize; 12];
    for ticket in tickets {
        if ticket.created_at.year() == year {
            counts[ticket.created_at.month0() as usize] += 1;
        }
    }
    counts
        .iter()
        .enumerate()
        .map(|(index, &count)| MonthlyPoint {
            month_index: index as u32,
            ticket_count: count,
        })
        .collect()
}

/// Distinct creation years present in the data plus the current calendar
/// year, sorted descending. The year selector is never empty.
pub fn available_years(tickets: &[TicketRecord], current_year: i32) -> Vec<i32> {
    let mut years: BTreeSet<i32> = tickets.iter().map(|t| t.created_at.year()).collect();
    years.insert(current_year);
    years.into_iter().rev().collect()
}

/// The five most recently created tickets, newest first. Equal creation
/// timestamps keep their original order (stable sort).
pub fn recent_tickets(tickets: &[TicketRecord]) -> Vec<RecentTicket> {
    let mut ordered: Vec<&TicketRecord> = tickets.iter().collect();
    ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    ordered.truncate(RECENT_TICKET_LIMIT);
    ordered
        .into_iter()
        .map(|t| RecentTicket {
            id: t.id,
            issue: t.issue.clone(),
            customer_name: t.customer.as_ref().and_then(|c| c.name.clone()),
            status: classify(t)
                .map(|s| s.label().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            priority: priority_label(t.priority).to_string(),
            created_at: t.created_at,
        })
        .collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::types::{AgentRef, CustomerRef, NamedStatus, RawStatus};

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn ticket(id: i64, created: &str, code: Option<i64>) -> TicketRecord {
        TicketRecord {
            id,
            created_at: dt(created),
            updated_at: None,
            status: code.map(RawStatus::Code),
            priority: None,
            customer: None,
            agents: vec![],
            issue: format!("issue {}", id),
        }
    }

    fn with_updated(mut t: TicketRecord, updated: &str) -> TicketRecord {
        t.updated_at = Some(dt(updated));
        t
    }

    fn with_agent(mut t: TicketRecord) -> TicketRecord {
        t.agents.push(AgentRef {
            id: Some(1),
            name: Some("Agent".to_string()),
        });
        t
    }

    /// The reference scenario: 10 tickets, 4 open / 3 in progress /
    /// 3 closed, exactly one closed ticket carrying a usable timestamp
    /// pair (Jan 1 → Jan 4).
    fn ten_ticket_set() -> Vec<TicketRecord> {
        let mut tickets = Vec::new();
        for i in 1..=4 {
            tickets.push(ticket(i, "2024-03-10 09:00:00", Some(1)));
        }
        for i in 5..=7 {
            tickets.push(ticket(i, "2024-03-11 09:00:00", Some(2)));
        }
        tickets.push(with_updated(
            ticket(8, "2024-01-01 00:00:00", Some(3)),
            "2024-01-04 00:00:00",
        ));
        tickets.push(ticket(9, "2024-02-01 09:00:00", Some(3)));
        tickets.push(ticket(10, "2024-02-02 09:00:00", Some(3)));
        tickets
    }

    #[test]
    fn test_scenario_ten_tickets() {
        let tickets = ten_ticket_set();
        let dist = status_distribution(&tickets);
        assert_eq!(dist.open, 4);
        assert_eq!(dist.in_progress, 3);
        assert_eq!(dist.closed, 3);
        assert_eq!(dist.classified_total(), 10);
        assert_eq!(resolution_rate(&dist), 30);
        // Only ticket 8 has an updated_at; 3 whole days.
        assert_eq!(average_resolution_days(&tickets), 3.0);
    }

    #[test]
    fn test_distribution_mixed_encodings_and_unclassified() {
        let mut tickets = ten_ticket_set();
        tickets.push(TicketRecord {
            status: Some(RawStatus::Named(NamedStatus {
                name: Some("In Progress".to_string()),
            })),
            ..ticket(11, "2024-03-12 09:00:00", None)
        });
        tickets.push(ticket(12, "2024-03-13 09:00:00", Some(7)));
        tickets.push(ticket(13, "2024-03-14 09:00:00", None));

        let dist = status_distribution(&tickets);
        assert_eq!(dist.in_progress, 4);
        // Two unclassified tickets: distribution sum < raw total.
        assert_eq!(dist.classified_total(), tickets.len() - 2);
    }

    #[test]
    fn test_due_ticket_count() {
        let today = day("2024-03-15");
        let tickets = vec![
            // Created before today, still open → due
            ticket(1, "2024-03-14 23:59:00", Some(1)),
            // Created before today but closed → not due
            ticket(2, "2024-03-10 08:00:00", Some(3)),
            // Created today → not due regardless of time
            ticket(3, "2024-03-15 00:00:00", Some(1)),
            // Unclassified but old → due (not closed)
            ticket(4, "2024-03-01 12:00:00", None),
        ];
        assert_eq!(due_ticket_count(&tickets, today), 2);
    }

    #[test]
    fn test_open_ticket_count() {
        let tickets = ten_ticket_set();
        assert_eq!(open_ticket_count(&tickets), 4);
    }

    #[test]
    fn test_resolution_rate_zero_when_nothing_classifies() {
        let dist = status_distribution(&[]);
        assert_eq!(resolution_rate(&dist), 0);

        let unclassified = vec![ticket(1, "2024-01-01 00:00:00", Some(9))];
        let dist = status_distribution(&unclassified);
        assert_eq!(resolution_rate(&dist), 0);
    }

    #[test]
    fn test_average_resolution_discards_outliers() {
        let tickets = vec![
            // 3 days, kept
            with_updated(ticket(1, "2024-01-01 00:00:00", Some(3)), "2024-01-04 00:00:00"),
            // negative span, discarded
            with_updated(ticket(2, "2024-01-10 00:00:00", Some(3)), "2024-01-05 00:00:00"),
            // 400 days, discarded
            with_updated(ticket(3, "2023-01-01 00:00:00", Some(3)), "2024-02-05 00:00:00"),
            // closed without updated_at, ignored
            ticket(4, "2024-01-01 00:00:00", Some(3)),
            // open ticket with timestamps, ignored
            with_updated(ticket(5, "2024-01-01 00:00:00", Some(1)), "2024-01-09 00:00:00"),
        ];
        assert_eq!(average_resolution_days(&tickets), 3.0);
    }

    #[test]
    fn test_average_resolution_rounds_up_partial_days() {
        // 2 days 6 hours → ceil = 3; 1 day exactly → 1; mean = 2.0
        let tickets = vec![
            with_updated(ticket(1, "2024-01-01 00:00:00", Some(3)), "2024-01-03 06:00:00"),
            with_updated(ticket(2, "2024-01-01 08:00:00", Some(3)), "2024-01-02 08:00:00"),
        ];
        assert_eq!(average_resolution_days(&tickets), 2.0);
    }

    #[test]
    fn test_average_resolution_empty() {
        assert_eq!(average_resolution_days(&[]), 0.0);
        // Closed tickets but no usable spans
        let tickets = vec![ticket(1, "2024-01-01 00:00:00", Some(3))];
        assert_eq!(average_resolution_days(&tickets), 0.0);
    }

    #[test]
    fn test_completion_rate() {
        let tickets = vec![
            with_agent(ticket(1, "2024-01-01 00:00:00", Some(3))),
            with_agent(ticket(2, "2024-01-02 00:00:00", Some(1))),
            with_agent(ticket(3, "2024-01-03 00:00:00", Some(2))),
            // unassigned closed ticket does not count either way
            ticket(4, "2024-01-04 00:00:00", Some(3)),
        ];
        // 1 closed of 3 assigned → 33
        assert_eq!(completion_rate(&tickets), 33);
    }

    #[test]
    fn test_completion_rate_no_assignments() {
        let tickets = vec![ticket(1, "2024-01-01 00:00:00", Some(3))];
        assert_eq!(completion_rate(&tickets), 0);
    }

    #[test]
    fn test_monthly_series_shape_and_sum() {
        let tickets = ten_ticket_set();
        let series = monthly_series(&tickets, 2024);
        assert_eq!(series.len(), 12);
        assert_eq!(series[0].month_index, 0);
        assert_eq!(series[11].month_index, 11);

        let total: usize = series.iter().map(|p| p.ticket_count).sum();
        assert_eq!(total, 10);
        // January: ticket 8; February: 9 and 10; March: the rest.
        assert_eq!(series[0].ticket_count, 1);
        assert_eq!(series[1].ticket_count, 2);
        assert_eq!(series[2].ticket_count, 7);
        assert_eq!(series[3].ticket_count, 0);
    }

    #[test]
    fn test_monthly_series_filters_by_year() {
        let mut tickets = ten_ticket_set();
        tickets.push(ticket(11, "2023-03-05 10:00:00", Some(1)));

        let series_2023 = monthly_series(&tickets, 2023);
        let total_2023: usize = series_2023.iter().map(|p| p.ticket_count).sum();
        assert_eq!(total_2023, 1);

        let series_2025 = monthly_series(&tickets, 2025);
        assert_eq!(series_2025.len(), 12);
        assert!(series_2025.iter().all(|p| p.ticket_count == 0));
    }

    #[test]
    fn test_available_years_sorted_desc_with_current() {
        let tickets = vec![
            ticket(1, "2022-05-01 00:00:00", Some(1)),
            ticket(2, "2024-05-01 00:00:00", Some(1)),
            ticket(3, "2022-07-01 00:00:00", Some(1)),
        ];
        assert_eq!(available_years(&tickets, 2025), vec![2025, 2024, 2022]);
        // Current year already present in the data: no duplicate.
        assert_eq!(available_years(&tickets, 2024), vec![2024, 2022]);
    }

    #[test]
    fn test_available_years_empty_set() {
        assert_eq!(available_years(&[], 2025), vec![2025]);
    }

    #[test]
    fn test_recent_tickets_order_cap_and_stable_ties() {
        let tickets = vec![
            ticket(1, "2024-01-01 10:00:00", Some(1)),
            ticket(2, "2024-01-06 10:00:00", Some(1)),
            // 3 and 4 share a timestamp; 3 was first in the source order
            ticket(3, "2024-01-05 10:00:00", Some(2)),
            ticket(4, "2024-01-05 10:00:00", Some(2)),
            ticket(5, "2024-01-02 10:00:00", Some(3)),
            ticket(6, "2024-01-03 10:00:00", Some(1)),
        ];

        let recent = recent_tickets(&tickets);
        assert_eq!(recent.len(), 5);
        let ids: Vec<i64> = recent.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3, 4, 6, 5]);
    }

    #[test]
    fn test_recent_ticket_labels() {
        let mut t = ticket(1, "2024-01-01 10:00:00", Some(2));
        t.priority = Some(3);
        t.customer = Some(CustomerRef {
            id: Some(2),
            name: Some("Globex".to_string()),
        });
        let recent = recent_tickets(&[t]);
        assert_eq!(recent[0].status, "In Progress");
        assert_eq!(recent[0].priority, "High");
        assert_eq!(recent[0].customer_name.as_deref(), Some("Globex"));

        let unknown = recent_tickets(&[ticket(2, "2024-01-01 10:00:00", Some(9))]);
        assert_eq!(unknown[0].status, "Unknown");
        assert_eq!(unknown[0].priority, "Unknown");
        assert!(unknown[0].customer_name.is_none());
    }
}
