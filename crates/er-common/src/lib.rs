pub mod api;
pub mod artifact;
pub mod dataset;
pub mod encoded_set;
pub mod eval;
pub mod features;
pub mod inference;
pub mod logging;
pub mod metric_log;
pub mod ranker;
pub mod run_id;
pub mod split;
pub mod tables;

use serde::{Deserialize, Serialize};

// Commonly used data models for the ranking pipeline. Collection-valued
// attributes (sectors, sub_sectors, industry) are kept in their raw encoded
// form (a JSON array serialized into a string); both the equality
// indicators and the overlap features are defined over that encoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub assignment_id: Option<i64>,
    pub sectors: Option<String>,
    pub sub_sectors: Option<String>,
    pub industry: Option<String>,
    pub country: Option<String>,
    pub scale: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Executive {
    pub exec_id: Option<i64>,
    pub sectors: Option<String>,
    pub sub_sectors: Option<String>,
    pub industry: Option<String>,
    pub hq_country: Option<String>,
    pub scale: Option<String>,
}
