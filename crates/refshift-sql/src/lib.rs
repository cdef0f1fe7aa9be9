//! refshift SQL processing
//!
//! This crate handles:
//! - Detecting hardcoded table names in SQL scripts
//! - Resolving each name to a ref()/source() macro via the dbt manifest
//! - Rewriting scripts token-by-token, leaving comments untouched

pub mod detect;
pub mod resolve;
pub mod rewrite;

pub use detect::{DetectError, TableDetector};
pub use resolve::{resolve_table_names, Replacement, Resolution, ResolutionNote};
pub use rewrite::{RewriteError, ScriptRewriter};

use refshift_core::DialectConfig;
use sqlparser::dialect::{
    BigQueryDialect, Dialect, GenericDialect, PostgreSqlDialect, SnowflakeDialect,
};

/// Map a dialect config onto a sqlparser dialect
pub(crate) fn dialect_for(config: &DialectConfig) -> Box<dyn Dialect> {
    match config {
        DialectConfig::BigQuery => Box::new(BigQueryDialect {}),
        DialectConfig::Snowflake => Box::new(SnowflakeDialect {}),
        DialectConfig::Postgres => Box::new(PostgreSqlDialect {}),
        DialectConfig::Ansi => Box::new(GenericDialect {}),
    }
}
