use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Branch scope for tickets and revenue: the whole network or one branch.
/// Serialized as the string "all" or the bare branch id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchFilter {
    All,
    Branch(i64),
}

impl BranchFilter {
    /// Match against a branch-tagged row. Rows carry string ids, so the
    /// comparison is textual; `All` never filters anything out.
    pub fn matches(&self, branch_id: &str) -> bool {
        match self {
            BranchFilter::All => true,
            BranchFilter::Branch(id) => id.to_string() == branch_id,
        }
    }

    /// Server-side scope parameter for the ticket listing; `All` sends none.
    pub fn as_query_param(&self) -> Option<i64> {
        match self {
            BranchFilter::All => None,
            BranchFilter::Branch(id) => Some(*id),
        }
    }
}

impl fmt::Display for BranchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchFilter::All => write!(f, "all"),
            BranchFilter::Branch(id) => write!(f, "{}", id),
        }
    }
}

impl Serialize for BranchFilter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            BranchFilter::All => serializer.serialize_str("all"),
            BranchFilter::Branch(id) => serializer.serialize_i64(*id),
        }
    }
}

impl<'de> Deserialize<'de> for BranchFilter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::String(s) if s == "all" => Ok(BranchFilter::All),
            serde_json::Value::String(s) => s
                .parse::<i64>()
                .map(BranchFilter::Branch)
                .map_err(|_| serde::de::Error::custom(format!("invalid branch filter: {:?}", s))),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(BranchFilter::Branch)
                .ok_or_else(|| serde::de::Error::custom("branch id is not an integer")),
            other => Err(serde::de::Error::custom(format!(
                "expected \"all\" or a branch id, got {}",
                other
            ))),
        }
    }
}

/// The four independent dashboard filter dimensions. Mutated only through
/// the coordinator; every mutation triggers its recomputation rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub branch: BranchFilter,
    pub trend_year: i32,
    pub revenue_month: u32,
    pub revenue_year: i32,
}

impl FilterState {
    /// Initial state: all branches, current calendar year for the trend,
    /// current month/year for revenue.
    pub fn initial(today: NaiveDate) -> Self {
        FilterState {
            branch: BranchFilter::All,
            trend_year: today.year(),
            revenue_month: today.month(),
            revenue_year: today.year(),
        }
    }
}
