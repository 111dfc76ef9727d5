use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::deserializers::de;
use crate::error::AppError;

/// A ticket as returned by the listing endpoint.
///
/// `created_at` is guaranteed present and parseable by the source;
/// `updated_at` only carries meaning once the ticket is closed and is
/// absent or junk otherwise.
#[derive(Debug, Clone, Deserialize)]
pub struct TicketRecord {
    pub id: i64,
    #[serde(deserialize_with = "de::datetime")]
    pub created_at: NaiveDateTime,
    #[serde(default, deserialize_with = "de::datetime_opt")]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub status: Option<RawStatus>,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub customer: Option<CustomerRef>,
    #[serde(default)]
    pub agents: Vec<AgentRef>,
    #[serde(default)]
    pub issue: String,
}

/// The two status encodings the source emits: a bare numeric code or a
/// denormalized object carrying the status name. Anything else lands in
/// `Other` and classifies as unrecognized rather than failing the row.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawStatus {
    Code(i64),
    Named(NamedStatus),
    Other(Value),
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedStatus {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerRef {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentRef {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub id: i64,
    pub branch_name: String,
}

/// One branch's revenue for the selected month/year. The revenue fields
/// arrive as decimal strings (sometimes bare numbers); parsing to f64
/// happens in the aggregator so table and summary can never diverge.
#[derive(Debug, Clone, Deserialize)]
pub struct BranchRevenueRow {
    #[serde(deserialize_with = "de::string_or_number")]
    pub branch_id: String,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub shop_revenue: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub outsource_revenue: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub total_revenue: Option<String>,
}

/// Extract the element list from a listing payload. The endpoints answer
/// with either a bare JSON array or a `{"data": [...]}` envelope.
pub fn list_items(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Decode a listing payload into typed records. Used for branch and
/// revenue lists, where a malformed element means a broken contract.
pub fn decode_list<T>(payload: Value) -> Result<Vec<T>, AppError>
where
    T: serde::de::DeserializeOwned,
{
    let items = list_items(payload);
    Ok(serde_json::from_value(Value::Array(items))?)
}

/// Decode the ticket-listing payload element by element, skipping
/// malformed rows instead of rejecting the page. Returns the decoded
/// tickets and the number of rows skipped.
pub fn decode_tickets(payload: Value) -> (Vec<TicketRecord>, usize) {
    let items = list_items(payload);
    let mut tickets = Vec::with_capacity(items.len());
    let mut skipped = 0usize;
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<TicketRecord>(item) {
            Ok(ticket) => tickets.push(ticket),
            Err(err) => {
                skipped += 1;
                tracing::warn!(index, error = %err, "skipping malformed ticket record");
            }
        }
    }
    (tickets, skipped)
}
