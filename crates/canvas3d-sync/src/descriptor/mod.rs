//! Source descriptors: where a layer's data lives.
//!
//! Database layers carry a provider connection string of the form
//!
//! ```text
//! dbname='gis' user='bob' table="public"."roads" (geom) sql=highway='primary'
//! ```
//!
//! which [`DatabaseSource`] parses into connection parameters, a table or
//! inline query, a geometry column and an optional filter. File layers are
//! described by a [`FileSource`], which also finds a pre-built mesh cache
//! beside the raster.

mod file;
mod parser;


use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub use self::file::FileSource;

/// Connection keys forwarded to the renderer.
const FORWARDED_KEYS: [&str; 3] = ["dbname", "user", "port"];

/// Errors raised while parsing a database source descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// The descriptor has no `table=` token.
    #[error("descriptor has no 'table=' token")]
    MissingTable,
    /// The descriptor has no `sql=` token after the table.
    #[error("descriptor has no 'sql=' token")]
    MissingSql,
    /// A quoted value or identifier is not closed.
    #[error("descriptor has an unbalanced quote")]
    UnbalancedQuotes,
    /// An inline query has unmatched parentheses.
    #[error("inline query has unbalanced parentheses")]
    UnbalancedParentheses,
    /// An inline query's closing parenthesis is not followed by `"`.
    #[error("inline query is not closed by a double quote")]
    UnterminatedInlineQuery,
    /// The table specification is empty.
    #[error("descriptor names an empty table")]
    EmptyTable,
}

/// Table part of a database descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSpec {
    /// A table name, schema-qualified when the descriptor qualified it.
    Named(String),
    /// A parenthesised query used in place of a table, without its parentheses.
    Inline(String),
}

/// Parsed database source descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSource {
    connection: BTreeMap<String, String>,
    table: TableSpec,
    geocolumn: Option<String>,
    filter: Option<String>,
}

impl DatabaseSource {
    /// Parses a provider connection string.
    ///
    /// # Errors
    ///
    /// Returns a [`DescriptorError`] when the string does not follow the
    /// descriptor grammar. No recovery is attempted.
    pub fn parse(input: &str) -> Result<Self, DescriptorError> {
        parser::parse(input)
    }

    /// Every `key=value` pair that preceded `table=`, unquoted.
    #[must_use]
    pub const fn connection(&self) -> &BTreeMap<String, String> {
        &self.connection
    }

    /// Table or inline query.
    #[must_use]
    pub const fn table(&self) -> &TableSpec {
        &self.table
    }

    /// Geometry column, when named.
    #[must_use]
    pub fn geocolumn(&self) -> Option<&str> {
        self.geocolumn.as_deref()
    }

    /// SQL predicate from `sql=`, when non-empty.
    #[must_use]
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Connection string handed to the renderer.
    ///
    /// Only `dbname`, `user` and `port` are forwarded, in that order.
    #[must_use]
    pub fn conn_info(&self) -> String {
        FORWARDED_KEYS
            .iter()
            .filter_map(|key| {
                self.connection
                    .get(*key)
                    .map(|value| format!("{key}={}", libpq_value(value)))
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Query the renderer runs for each tile.
    ///
    /// Inline queries are used verbatim. Named tables become
    /// `SELECT * FROM <table>`, followed by the filter and a tile placeholder
    /// comment that the renderer replaces with a bounding-box test on the
    /// geometry column.
    #[must_use]
    pub fn query(&self) -> String {
        let table = match &self.table {
            TableSpec::Inline(query) => return query.clone(),
            TableSpec::Named(table) => table,
        };
        let mut query = format!("SELECT * FROM {table}");
        match (&self.filter, &self.geocolumn) {
            (Some(filter), Some(column)) => {
                query.push_str(&format!(" WHERE {filter} /**AND TILE && {column}*/"));
            }
            (Some(filter), None) => query.push_str(&format!(" WHERE {filter}")),
            (None, Some(column)) => query.push_str(&format!(" /**WHERE TILE && {column}*/")),
            (None, None) => {}
        }
        query
    }
}

impl FromStr for DatabaseSource {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DatabaseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.connection {
            if value.contains('\'') {
                write!(f, "{key}=\"{value}\" ")?;
            } else {
                write!(f, "{key}='{value}' ")?;
            }
        }
        match &self.table {
            TableSpec::Named(table) => write!(f, "table=\"{table}\"")?,
            TableSpec::Inline(query) => write!(f, "table=\"({query})\"")?,
        }
        if let Some(column) = &self.geocolumn {
            write!(f, " ({column})")?;
        }
        write!(f, " sql={}", self.filter.as_deref().unwrap_or_default())
    }
}

fn libpq_value(value: &str) -> String {
    if value.is_empty() || value.contains([' ', '\'']) {
        format!("'{}'", value.replace('\'', "\\'"))
    } else {
        value.to_owned()
    }
}
