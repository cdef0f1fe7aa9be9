//! Hardcoded table name detection
//!
//! Scans the token stream of a SQL script for physical table references:
//! identifier chains that follow a FROM or JOIN keyword. CTE names and
//! already-templated `{{ ... }}` references are excluded. Comments never
//! produce candidates since they tokenize as whitespace.

use refshift_core::DialectConfig;
use sqlparser::dialect::{Dialect, GenericDialect};
use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::{Token, Tokenizer};
use std::collections::BTreeSet;

/// Finds candidate table names in SQL scripts, configurable by dialect
pub struct TableDetector {
    dialect: Box<dyn Dialect>,
}

impl TableDetector {
    /// Create a detector with the default (generic) dialect
    pub fn new() -> Self {
        Self {
            dialect: Box::new(GenericDialect {}),
        }
    }

    /// Create a detector from a dialect config
    pub fn from_dialect(dialect: &DialectConfig) -> Self {
        Self {
            dialect: crate::dialect_for(dialect),
        }
    }

    /// Scan a script for raw table references.
    ///
    /// Returns the deduplicated set of candidate names. An empty set means
    /// the file needs no rewriting.
    pub fn detect(&self, sql: &str) -> Result<BTreeSet<String>, DetectError> {
        let tokens = Tokenizer::new(self.dialect.as_ref(), sql)
            .tokenize()
            .map_err(|e| DetectError::Tokenize(e.to_string()))?;

        let significant: Vec<&Token> = tokens
            .iter()
            .filter(|token| !matches!(token, Token::Whitespace(_)))
            .collect();

        let ctes = cte_names(&significant);

        let mut tables = BTreeSet::new();
        let mut index = 0;
        while index < significant.len() {
            if is_keyword(significant[index], Keyword::FROM)
                || is_keyword(significant[index], Keyword::JOIN)
            {
                if let Some((name, consumed)) = identifier_chain(&significant[index + 1..]) {
                    if !ctes.contains(&name.to_lowercase()) {
                        tables.insert(name);
                    }
                    index += consumed;
                }
            }
            index += 1;
        }

        Ok(tables)
    }
}

impl Default for TableDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Collect CTE names: any unquoted identifier followed by `AS (`
fn cte_names(tokens: &[&Token]) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for window in tokens.windows(3) {
        if let (Token::Word(name), Token::Word(keyword), Token::LParen) =
            (window[0], window[1], window[2])
        {
            if keyword.keyword == Keyword::AS && name.quote_style.is_none() {
                names.insert(name.value.to_lowercase());
            }
        }
    }
    names
}

/// Read an identifier chain `ident (. ident)*` from the front of the slice.
///
/// Returns the chain text and the number of tokens it spans. Subqueries,
/// `{{ ... }}` template blocks, and UNNEST yield no chain.
fn identifier_chain(tokens: &[&Token]) -> Option<(String, usize)> {
    match tokens.first() {
        Some(Token::Word(word)) if word.keyword != Keyword::UNNEST => {}
        _ => return None,
    }

    let mut name = tokens[0].to_string();
    let mut consumed = 1;
    while tokens.len() > consumed + 1 {
        let (Token::Period, Token::Word(_)) = (tokens[consumed], tokens[consumed + 1]) else {
            break;
        };
        name.push('.');
        name.push_str(&tokens[consumed + 1].to_string());
        consumed += 2;
    }

    Some((name, consumed))
}

fn is_keyword(token: &Token, keyword: Keyword) -> bool {
    matches!(token, Token::Word(word) if word.keyword == keyword)
}

/// Detection errors
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("failed to tokenize SQL script: {0}")]
    Tokenize(String),
}
