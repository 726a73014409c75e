//! DataTables server-side processing parameters
//!
//! The table UI speaks the legacy DataTables protocol: `sEcho`,
//! `iDisplayStart`, `iDisplayLength`, `sSearch`, `iSortCol_0`, `sSortDir_0`
//! and one `mDataProp_N` per column naming its data property. The sort
//! column arrives as an index into those properties and is resolved against
//! a fixed whitelist, so no client text ever reaches SQL unbound.

use std::collections::{HashMap, HashSet};

use pitchdex_common::{Error, Metric};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};

/// Largest page served at once; `iDisplayLength=-1` ("all") gets this many
pub const MAX_PAGE_SIZE: i64 = 100;

const DEFAULT_PAGE_SIZE: i64 = 10;

/// Which table a request addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Reviews,
    Authors,
}

/// A sortable column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    Title,
    Author,
    Score(Metric),
}

impl Column {
    pub fn name(self) -> &'static str {
        match self {
            Column::Id => "ID",
            Column::Title => "Title",
            Column::Author => "Author",
            Column::Score(metric) => metric.name(),
        }
    }
}

impl Table {
    /// Columns in display order
    pub fn columns(self) -> Vec<Column> {
        let fixed: &[Column] = match self {
            Table::Reviews => &[Column::Id, Column::Title, Column::Author],
            Table::Authors => &[Column::Author],
        };
        fixed
            .iter()
            .copied()
            .chain(Metric::ALL.into_iter().map(Column::Score))
            .collect()
    }

    /// Resolve a column by its data property name
    pub fn column(self, name: &str) -> Option<Column> {
        self.columns().into_iter().find(|c| c.name() == name)
    }

    /// Column used when the request names none
    pub fn default_sort(self) -> Column {
        match self {
            Table::Reviews => Column::Id,
            Table::Authors => Column::Author,
        }
    }
}

/// Check that every table's column names are unique and resolvable
pub fn validate_columns() -> pitchdex_common::Result<()> {
    for table in [Table::Reviews, Table::Authors] {
        let mut seen = HashSet::new();
        for column in table.columns() {
            if !seen.insert(column.name()) {
                return Err(Error::Config(format!(
                    "{:?} table: duplicate column '{}'",
                    table,
                    column.name()
                )));
            }
            if table.column(column.name()) != Some(column) {
                return Err(Error::Config(format!(
                    "{:?} table: column '{}' does not resolve",
                    table,
                    column.name()
                )));
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// A validated table request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableParams {
    pub echo: i64,
    pub offset: i64,
    pub count: i64,
    pub search: String,
    pub sort_column: Column,
    pub sort_direction: SortDirection,
}

fn parse_int(params: &HashMap<String, String>, key: &str) -> ApiResult<Option<i64>> {
    params
        .get(key)
        .filter(|v| !v.is_empty())
        .map(|v| {
            v.parse()
                .map_err(|_| ApiError::BadRequest(format!("{}: '{}' is not an integer", key, v)))
        })
        .transpose()
}

impl TableParams {
    /// Parse a raw query string map for `table`
    ///
    /// Missing values fall back to: offset 0, 10 rows, no search, the
    /// table's default column, descending.
    pub fn parse(table: Table, params: &HashMap<String, String>) -> ApiResult<Self> {
        let echo = parse_int(params, "sEcho")?.unwrap_or(0);
        let offset = parse_int(params, "iDisplayStart")?.unwrap_or(0).max(0);
        let count = match parse_int(params, "iDisplayLength")?.unwrap_or(DEFAULT_PAGE_SIZE) {
            n if n < 0 => MAX_PAGE_SIZE,
            n => n.min(MAX_PAGE_SIZE),
        };
        let search = params.get("sSearch").cloned().unwrap_or_default();

        let sort_direction = match params.get("sSortDir_0").map(String::as_str) {
            None | Some("") | Some("desc") => SortDirection::Desc,
            Some("asc") => SortDirection::Asc,
            Some(other) => {
                return Err(ApiError::BadRequest(format!(
                    "'{}': invalid sort direction",
                    other
                )))
            }
        };

        let sort_column = match parse_int(params, "iSortCol_0")? {
            None => table.default_sort(),
            Some(index) => {
                let key = format!("mDataProp_{}", index);
                let name = params.get(&key).ok_or_else(|| {
                    ApiError::BadRequest(format!("sort column {} has no {}", index, key))
                })?;
                table
                    .column(name)
                    .ok_or_else(|| ApiError::BadRequest(format!("'{}': unknown column", name)))?
            }
        };

        Ok(Self {
            echo,
            offset,
            count,
            search,
            sort_column,
            sort_direction,
        })
    }

    /// `LIKE` pattern for the search term, with wildcards escaped by `\`
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.search.len() + 2);
        pattern.push('%');
        for c in self.search.chars() {
            if matches!(c, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    }
}

/// Response body in the shape DataTables expects
#[derive(Debug, Serialize)]
pub struct TableResponse {
    #[serde(rename = "sEcho")]
    pub echo: i64,
    #[serde(rename = "iTotalRecords")]
    pub total_records: i64,
    #[serde(rename = "iTotalDisplayRecords")]
    pub total_display_records: i64,
    #[serde(rename = "aaData")]
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
}
