//! Token-aware script rewriting
//!
//! Applies replacement pairs to the code portions of a SQL script while
//! keeping every comment byte-for-byte intact. The script is tokenized with
//! sqlparser; non-comment token text accumulates into a pending buffer that
//! is flushed (with all substitutions applied) whenever a comment token is
//! reached and once more at end of input.

use crate::resolve::Replacement;
use refshift_core::DialectConfig;
use regex::Regex;
use sqlparser::dialect::{Dialect, GenericDialect};
use sqlparser::tokenizer::{Token, Tokenizer, Whitespace};

/// Rewrites table references in SQL scripts, configurable by dialect
pub struct ScriptRewriter {
    dialect: Box<dyn Dialect>,
}

impl ScriptRewriter {
    /// Create a rewriter with the default (generic) dialect
    pub fn new() -> Self {
        Self {
            dialect: Box::new(GenericDialect {}),
        }
    }

    /// Create a rewriter from a dialect config
    pub fn from_dialect(dialect: &DialectConfig) -> Self {
        Self {
            dialect: crate::dialect_for(dialect),
        }
    }

    /// Apply an ordered replacement list to a script.
    ///
    /// Substitution is case-insensitive and whole-word: a table name matches
    /// only when it is neither preceded nor followed by a word character, so
    /// `orders` never touches `customer_orders`. Comment tokens are copied
    /// through unchanged.
    pub fn rewrite(&self, sql: &str, replacements: &[Replacement]) -> Result<String, RewriteError> {
        let substitutions = replacements
            .iter()
            .map(Substitution::compile)
            .collect::<Result<Vec<_>, _>>()?;

        let tokens = Tokenizer::new(self.dialect.as_ref(), sql)
            .tokenize()
            .map_err(|e| RewriteError::Tokenize(e.to_string()))?;

        let mut rewritten = String::with_capacity(sql.len());
        let mut pending = String::new();
        for token in &tokens {
            if is_comment(token) {
                flush(&mut rewritten, &mut pending, &substitutions);
                rewritten.push_str(&token.to_string());
            } else {
                pending.push_str(&token.to_string());
            }
        }
        flush(&mut rewritten, &mut pending, &substitutions);

        Ok(rewritten)
    }
}

impl Default for ScriptRewriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply every substitution, in order, to the pending code text
fn flush(rewritten: &mut String, pending: &mut String, substitutions: &[Substitution]) {
    let mut text = std::mem::take(pending);
    for substitution in substitutions {
        text = substitution.apply(&text);
    }
    rewritten.push_str(&text);
}

fn is_comment(token: &Token) -> bool {
    matches!(
        token,
        Token::Whitespace(Whitespace::SingleLineComment { .. })
            | Token::Whitespace(Whitespace::MultiLineComment(_))
    )
}

/// A compiled, case-insensitive whole-word substitution
struct Substitution {
    pattern: Regex,
    replacement: String,
}

impl Substitution {
    fn compile(replacement: &Replacement) -> Result<Self, RewriteError> {
        let pattern = Regex::new(&format!("(?i){}", regex::escape(&replacement.table)))
            .map_err(|e| RewriteError::Pattern(replacement.table.clone(), e.to_string()))?;

        Ok(Self {
            pattern,
            replacement: replacement.macro_call.clone(),
        })
    }

    /// Replace every whole-word occurrence of the pattern.
    ///
    /// Word boundaries are checked manually: a match is taken only when the
    /// characters on either side are not alphanumeric or `_`. A rejected
    /// match restarts the search one character further in, so overlapping
    /// occurrences are still found.
    fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut copied = 0;
        let mut search = 0;

        while let Some(found) = self.pattern.find_at(text, search) {
            let head_clear = text[..found.start()]
                .chars()
                .next_back()
                .map_or(true, |c| !is_word_char(c));
            let tail_clear = text[found.end()..]
                .chars()
                .next()
                .map_or(true, |c| !is_word_char(c));

            if head_clear && tail_clear {
                out.push_str(&text[copied..found.start()]);
                out.push_str(&self.replacement);
                copied = found.end();
                search = found.end();
            } else {
                search = found.start()
                    + text[found.start()..]
                        .chars()
                        .next()
                        .map_or(1, char::len_utf8);
            }
        }

        out.push_str(&text[copied..]);
        out
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Rewriting errors
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error("failed to tokenize SQL script: {0}")]
    Tokenize(String),

    #[error("invalid replacement pattern for '{0}': {1}")]
    Pattern(String, String),
}
