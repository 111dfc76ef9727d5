//! Filter coordination for the overview dashboard.
//!
//! One coordinator owns the filter state, the transient working set
//! (tickets + revenue rows), and the derived snapshot. Filter mutations
//! go through its methods, which decide between a re-fetch and a pure
//! recomputation. Every outgoing fetch carries a generation token; a
//! response arriving for an abandoned generation is discarded instead of
//! overwriting newer data.

use std::time::Instant;

use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;
use serde_json::Value;

use crate::analyzer::metrics::{self, MonthlyPoint, RecentTicket, StatusDistribution};
use crate::analyzer::revenue::{self, RevenueTotals};
use crate::config::ApiConfig;
use crate::error::AppError;
use crate::fetch::client::DashboardApi;
use crate::fetch::types::{Branch, BranchRevenueRow, TicketRecord};
use crate::filters::{BranchFilter, FilterState};

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// Everything the overview dashboard renders. Handed to the rendering
/// layer as an immutable value; aggregate fields are always replaced
/// wholesale, never edited in place.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub meta: SnapshotMeta,
    pub status_distribution: StatusDistribution,
    pub due_tickets: usize,
    pub open_tickets: usize,
    pub resolution_rate: u32,
    pub average_resolution_days: f64,
    pub completion_rate: u32,
    pub monthly_series: Vec<MonthlyPoint>,
    pub available_years: Vec<i32>,
    pub recent_tickets: Vec<RecentTicket>,
    /// Grand totals over every branch row (per-branch revenue table).
    pub revenue_overall: RevenueTotals,
    /// Totals under the active branch filter (summary card).
    pub revenue_filtered: RevenueTotals,
    pub branches: Vec<Branch>,
    pub customer_count: usize,
    pub product_count: usize,
    pub agent_count: usize,
    pub recent_activity: Vec<Value>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMeta {
    /// Raw ticket total, unrecognized statuses included.
    pub total_tickets: usize,
    /// Tickets excluded from the distribution and the rates.
    pub unclassified: usize,
    pub computed_in_ms: u64,
}

fn initial_snapshot(trend_year: i32, current_year: i32) -> DashboardSnapshot {
    DashboardSnapshot {
        meta: SnapshotMeta::default(),
        status_distribution: StatusDistribution::default(),
        due_tickets: 0,
        open_tickets: 0,
        resolution_rate: 0,
        average_resolution_days: 0.0,
        completion_rate: 0,
        monthly_series: metrics::monthly_series(&[], trend_year),
        available_years: metrics::available_years(&[], current_year),
        recent_tickets: Vec::new(),
        revenue_overall: RevenueTotals::default(),
        revenue_filtered: RevenueTotals::default(),
        branches: Vec::new(),
        customer_count: 0,
        product_count: 0,
        agent_count: 0,
        recent_activity: Vec::new(),
    }
}

// ─── Fetch Requests ──────────────────────────────────────────────────────────

/// Token for an in-flight ticket fetch. Carries the request parameters
/// and the generation it was issued under.
#[derive(Debug, Clone)]
pub struct TicketRequest {
    pub branch: Option<i64>,
    pub page_size: u32,
    generation: u64,
}

/// Token for an in-flight revenue fetch.
#[derive(Debug, Clone)]
pub struct RevenueRequest {
    pub year: i32,
    pub month: u32,
    generation: u64,
}

/// Token for the mount/refresh extras: branch list, headline counts,
/// activity feed.
#[derive(Debug, Clone)]
pub struct ContextRequest {
    generation: u64,
}

/// Payload of a completed context fetch.
#[derive(Debug, Clone)]
pub struct ContextData {
    pub branches: Vec<Branch>,
    pub customer_count: usize,
    pub product_count: usize,
    pub agent_count: usize,
    pub activities: Vec<Value>,
}

// ─── Coordinator ─────────────────────────────────────────────────────────────

pub struct DashboardCoordinator<A: DashboardApi> {
    api: A,
    config: ApiConfig,
    filters: FilterState,
    tickets: Vec<TicketRecord>,
    revenue_rows: Vec<BranchRevenueRow>,
    snapshot: DashboardSnapshot,
    ticket_generation: u64,
    revenue_generation: u64,
    context_generation: u64,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

impl<A: DashboardApi> DashboardCoordinator<A> {
    pub fn new(api: A, config: ApiConfig) -> Self {
        let now = today();
        let filters = FilterState::initial(now);
        let snapshot = initial_snapshot(filters.trend_year, now.year());
        DashboardCoordinator {
            api,
            config,
            filters,
            tickets: Vec::new(),
            revenue_rows: Vec::new(),
            snapshot,
            ticket_generation: 0,
            revenue_generation: 0,
            context_generation: 0,
        }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn snapshot(&self) -> &DashboardSnapshot {
        &self.snapshot
    }

    // ── Issue/apply seam ─────────────────────────────────────────────────────
    //
    // Hosts running their own event loop (and the tests) drive fetches
    // through these pairs; the async methods below are thin wrappers.
    // `apply_*` returns whether the response was applied; a stale
    // generation or a failed fetch leaves the snapshot untouched.

    pub fn begin_ticket_fetch(&mut self) -> TicketRequest {
        self.ticket_generation += 1;
        TicketRequest {
            branch: self.filters.branch.as_query_param(),
            page_size: self.config.page_size,
            generation: self.ticket_generation,
        }
    }

    pub fn apply_tickets(
        &mut self,
        request: TicketRequest,
        result: Result<Vec<TicketRecord>, AppError>,
    ) -> bool {
        if request.generation != self.ticket_generation {
            tracing::debug!(
                issued = request.generation,
                current = self.ticket_generation,
                "discarding stale ticket response"
            );
            return false;
        }
        match result {
            Ok(tickets) => {
                self.tickets = tickets;
                self.recompute_ticket_metrics();
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "ticket fetch failed, keeping previous aggregates");
                false
            }
        }
    }

    pub fn begin_revenue_fetch(&mut self) -> RevenueRequest {
        self.revenue_generation += 1;
        RevenueRequest {
            year: self.filters.revenue_year,
            month: self.filters.revenue_month,
            generation: self.revenue_generation,
        }
    }

    pub fn apply_revenue(
        &mut self,
        request: RevenueRequest,
        result: Result<Vec<BranchRevenueRow>, AppError>,
    ) -> bool {
        if request.generation != self.revenue_generation {
            tracing::debug!(
                issued = request.generation,
                current = self.revenue_generation,
                "discarding stale revenue response"
            );
            return false;
        }
        match result {
            Ok(rows) => {
                self.revenue_rows = rows;
                self.recompute_revenue();
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "revenue fetch failed, keeping previous totals");
                false
            }
        }
    }

    pub fn begin_context_fetch(&mut self) -> ContextRequest {
        self.context_generation += 1;
        ContextRequest {
            generation: self.context_generation,
        }
    }

    pub fn apply_context(
        &mut self,
        request: ContextRequest,
        result: Result<ContextData, AppError>,
    ) -> bool {
        if request.generation != self.context_generation {
            tracing::debug!(
                issued = request.generation,
                current = self.context_generation,
                "discarding stale context response"
            );
            return false;
        }
        match result {
            Ok(mut data) => {
                data.activities.truncate(self.config.activity_limit);
                self.snapshot.branches = data.branches;
                self.snapshot.customer_count = data.customer_count;
                self.snapshot.product_count = data.product_count;
                self.snapshot.agent_count = data.agent_count;
                self.snapshot.recent_activity = data.activities;
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "context fetch failed, keeping previous values");
                false
            }
        }
    }

    // ── Filter transitions ───────────────────────────────────────────────────

    /// Initial mount: fetch everything, then derive all aggregates.
    pub async fn load(&mut self) {
        let context_request = self.begin_context_fetch();
        let context = self.fetch_context().await;
        self.apply_context(context_request, context);

        let ticket_request = self.begin_ticket_fetch();
        let tickets = self
            .api
            .fetch_tickets(ticket_request.branch, ticket_request.page_size)
            .await;
        self.apply_tickets(ticket_request, tickets);

        let revenue_request = self.begin_revenue_fetch();
        let rows = self
            .api
            .fetch_revenue(revenue_request.year, revenue_request.month)
            .await;
        self.apply_revenue(revenue_request, rows);
    }

    /// Manual refresh: re-run the mount sequence unconditionally.
    pub async fn refresh(&mut self) {
        self.load().await;
    }

    /// Branch change: tickets are re-fetched with the server-side scope;
    /// revenue rows are already branch-tagged, so the summary is
    /// re-aggregated from held data without a network call.
    pub async fn set_branch(&mut self, branch: BranchFilter) {
        self.filters.branch = branch;

        let request = self.begin_ticket_fetch();
        let result = self
            .api
            .fetch_tickets(request.branch, request.page_size)
            .await;
        self.apply_tickets(request, result);

        self.recompute_revenue();
    }

    /// Trend-year change touches no network: the full year range is
    /// already loaded, only the monthly series is rebuilt.
    pub fn set_trend_year(&mut self, year: i32) {
        self.filters.trend_year = year;
        self.snapshot.monthly_series = metrics::monthly_series(&self.tickets, year);
    }

    /// Revenue period change: validate, then re-fetch that month's rows.
    pub async fn set_revenue_period(&mut self, month: u32, year: i32) -> Result<(), AppError> {
        if !(1..=12).contains(&month) {
            return Err(AppError::InvalidFilter(format!(
                "revenue month out of range: {}",
                month
            )));
        }
        self.filters.revenue_month = month;
        self.filters.revenue_year = year;

        let request = self.begin_revenue_fetch();
        let result = self.api.fetch_revenue(request.year, request.month).await;
        self.apply_revenue(request, result);
        Ok(())
    }

    // ── Recomputation ────────────────────────────────────────────────────────

    fn recompute_ticket_metrics(&mut self) {
        let start = Instant::now();
        let now = today();
        let tickets = &self.tickets;

        let distribution = metrics::status_distribution(tickets);
        self.snapshot.due_tickets = metrics::due_ticket_count(tickets, now);
        self.snapshot.open_tickets = metrics::open_ticket_count(tickets);
        self.snapshot.resolution_rate = metrics::resolution_rate(&distribution);
        self.snapshot.average_resolution_days = metrics::average_resolution_days(tickets);
        self.snapshot.completion_rate = metrics::completion_rate(tickets);
        self.snapshot.monthly_series = metrics::monthly_series(tickets, self.filters.trend_year);
        self.snapshot.available_years = metrics::available_years(tickets, now.year());
        self.snapshot.recent_tickets = metrics::recent_tickets(tickets);
        self.snapshot.meta = SnapshotMeta {
            total_tickets: tickets.len(),
            unclassified: tickets.len() - distribution.classified_total(),
            computed_in_ms: start.elapsed().as_millis() as u64,
        };
        self.snapshot.status_distribution = distribution;
    }

    fn recompute_revenue(&mut self) {
        self.snapshot.revenue_overall = revenue::aggregate(&self.revenue_rows, &BranchFilter::All);
        self.snapshot.revenue_filtered =
            revenue::aggregate(&self.revenue_rows, &self.filters.branch);
    }

    async fn fetch_context(&self) -> Result<ContextData, AppError> {
        Ok(ContextData {
            branches: self.api.fetch_branches().await?,
            customer_count: self.api.customer_count().await?,
            product_count: self.api.product_count().await?,
            agent_count: self.api.agent_count().await?,
            activities: self.api.fetch_activities().await?,
        })
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
