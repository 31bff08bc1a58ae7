//! Club member record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Member roster entry as returned by the domain data service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub shares: f64,
    #[serde(default)]
    pub joined_on: Option<NaiveDate>,
}
