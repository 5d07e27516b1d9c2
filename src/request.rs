use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::filter::Expr;
use crate::time::format_request_time;

pub const DEFAULT_LIMIT: i64 = 200;
pub const DEFAULT_OFFSET: u64 = 0;
pub const DEFAULT_SHOWNULL: bool = false;
pub const DEFAULT_DISTINCT: bool = true;

/// Response representation, first path segment of every route
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Repr {
    #[default]
    #[serde(rename = "flat,node")]
    FlatNode,
    #[serde(rename = "tree,node")]
    TreeNode,
    #[serde(rename = "flat,edge")]
    FlatEdge,
    #[serde(rename = "tree,edge")]
    TreeEdge,
    #[serde(rename = "flat,event")]
    FlatEvent,
    #[serde(rename = "tree,event")]
    TreeEvent,
}

impl Repr {
    pub fn as_str(&self) -> &'static str {
        match self {
            Repr::FlatNode => "flat,node",
            Repr::TreeNode => "tree,node",
            Repr::FlatEdge => "flat,edge",
            Repr::TreeEdge => "tree,edge",
            Repr::FlatEvent => "flat,event",
            Repr::TreeEvent => "tree,event",
        }
    }
}

impl fmt::Display for Repr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of a single query.
///
/// Only values that differ from the API defaults end up in the query string.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub repr: Repr,
    pub origin: String,
    pub limit: i64,
    pub offset: u64,
    pub select: String,
    /// Rendered filter expression, see [`crate::filter`]
    pub where_clause: String,
    pub shownull: bool,
    pub distinct: bool,
    pub timezone: String,

    pub event_origins: Vec<String>,
    pub edge_types: Vec<String>,
    pub station_types: Vec<String>,
    pub data_types: Vec<String>,

    /// Start of the history time range
    pub from: DateTime<FixedOffset>,
    /// End of the history time range
    pub to: DateTime<FixedOffset>,
}

impl Default for Request {
    fn default() -> Self {
        let epoch: DateTime<FixedOffset> = DateTime::<Utc>::default().into();
        Request {
            repr: Repr::default(),
            origin: String::new(),
            limit: DEFAULT_LIMIT,
            offset: DEFAULT_OFFSET,
            select: String::new(),
            where_clause: String::new(),
            shownull: DEFAULT_SHOWNULL,
            distinct: DEFAULT_DISTINCT,
            timezone: String::new(),
            event_origins: Vec::new(),
            edge_types: Vec::new(),
            station_types: Vec::new(),
            data_types: Vec::new(),
            from: epoch,
            to: epoch,
        }
    }
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_station_type(&mut self, station_type: impl Into<String>) {
        self.station_types.push(station_type.into());
    }

    pub fn add_data_type(&mut self, data_type: impl Into<String>) {
        self.data_types.push(data_type.into());
    }

    pub fn add_edge_type(&mut self, edge_type: impl Into<String>) {
        self.edge_types.push(edge_type.into());
    }

    pub fn add_event_origin(&mut self, event_origin: impl Into<String>) {
        self.event_origins.push(event_origin.into());
    }

    /// Set the filter from an expression or a raw string
    pub fn set_where(&mut self, filter: impl Into<String>) {
        self.where_clause = filter.into();
    }

    /// Set the filter from an expression
    pub fn set_filter(&mut self, expr: &Expr) {
        self.where_clause = expr.render();
    }

    /// Query parameters that differ from their defaults, in a fixed order
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_if_set(&mut pairs, "origin", &self.origin, &String::new());
        push_if_set(&mut pairs, "limit", &self.limit, &DEFAULT_LIMIT);
        push_if_set(&mut pairs, "offset", &self.offset, &DEFAULT_OFFSET);
        push_if_set(&mut pairs, "select", &self.select, &String::new());
        push_if_set(&mut pairs, "where", &self.where_clause, &String::new());
        push_if_set(&mut pairs, "shownull", &self.shownull, &DEFAULT_SHOWNULL);
        push_if_set(&mut pairs, "distinct", &self.distinct, &DEFAULT_DISTINCT);
        push_if_set(&mut pairs, "timezone", &self.timezone, &String::new());
        pairs
    }

    /// `/v2/{repr}/{stationTypes}`
    pub fn station_type_path(&self) -> String {
        format!("/v2/{}/{}", self.repr, list_segment(&self.station_types))
    }

    /// `/v2/{repr}/{stationTypes}/{dataTypes}/latest`
    pub fn latest_path(&self) -> String {
        format!(
            "/v2/{}/{}/{}/latest",
            self.repr,
            list_segment(&self.station_types),
            list_segment(&self.data_types)
        )
    }

    /// `/v2/{repr}/{stationTypes}/{dataTypes}/{from}/{to}`
    pub fn history_path(&self) -> String {
        format!(
            "/v2/{}/{}/{}/{}/{}",
            self.repr,
            list_segment(&self.station_types),
            list_segment(&self.data_types),
            format_request_time(&self.from),
            format_request_time(&self.to)
        )
    }
}

fn push_if_set<T>(pairs: &mut Vec<(&'static str, String)>, name: &'static str, value: &T, default: &T)
where
    T: PartialEq + fmt::Display,
{
    if value != default {
        pairs.push((name, value.to_string()));
    }
}

/// Comma-joined list, or `*` for "all"
fn list_segment(values: &[String]) -> String {
    if values.is_empty() {
        "*".to_string()
    } else {
        values.join(",")
    }
}
