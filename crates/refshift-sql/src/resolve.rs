//! Table name resolution against the dbt manifest
//!
//! Maps each candidate table name to a replacement macro in three tiers:
//! model aliases first, then declared sources, then a best-effort inferred
//! source for anything left over. Every candidate is consumed by at most one
//! tier; later tiers only see what earlier tiers left behind.

use refshift_dbt::Manifest;
use std::collections::{BTreeMap, BTreeSet};

/// A single (table name, macro call) replacement pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Original table name as it appears in the script
    pub table: String,

    /// Macro call text to substitute, e.g. `{{ ref('fct_orders') }}`
    pub macro_call: String,
}

/// Diagnostic emitted for candidates that nothing in the manifest matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionNote {
    /// A dotted name was not found; its second-to-last segment is assumed to
    /// be a source name
    InferredSource {
        table: String,
        source_name: String,
        table_name: String,
    },

    /// A single-segment name could not be resolved at all and is left in
    /// place
    Unresolvable { table: String },
}

impl std::fmt::Display for ResolutionNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InferredSource {
                table,
                source_name,
                table_name,
            } => write!(
                f,
                "Unable to find {table} in models or sources. Assuming an external \
                 source and trying to replace {table} with source('{source_name}', \
                 '{table_name}')."
            ),
            Self::Unresolvable { table } => {
                write!(f, "Unable to replace table {table} with a ref() or source() macro.")
            }
        }
    }
}

/// The full ordered replacement list plus any diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Replacement pairs in application order (model, then source, then
    /// inferred)
    pub replacements: Vec<Replacement>,

    /// Diagnostics for names that needed guessing or could not be replaced
    pub notes: Vec<ResolutionNote>,
}

/// Run all three resolution tiers over a set of candidate table names.
///
/// Tier order is fixed: model aliases, declared sources, inferred sources.
/// Each tier removes the candidates it resolves before the next tier runs.
pub fn resolve_table_names(manifest: &Manifest, candidates: BTreeSet<String>) -> Resolution {
    let mut remaining = candidates;

    let mut replacements = model_references(manifest, &mut remaining);
    replacements.extend(source_references(manifest, &mut remaining));

    let (inferred, notes) = inferred_sources(&remaining);
    replacements.extend(inferred);

    Resolution {
        replacements,
        notes,
    }
}

/// Tier 1: match candidates against model aliases.
///
/// A model with a non-empty alias claims the candidate whose trailing dot
/// segment equals the alias's trailing segment, case-insensitively. At most
/// one candidate per alias; claimed candidates are removed from `remaining`.
pub fn model_references(
    manifest: &Manifest,
    remaining: &mut BTreeSet<String>,
) -> Vec<Replacement> {
    let mut by_trailing: BTreeMap<String, String> = BTreeMap::new();
    for table in remaining.iter() {
        by_trailing.insert(trailing_segment(table).to_lowercase(), table.clone());
    }

    let mut replacements = Vec::new();
    for (_, node) in manifest.models() {
        let Some(alias) = node.alias.as_deref().filter(|alias| !alias.is_empty()) else {
            continue;
        };

        if let Some(table) = by_trailing.remove(&trailing_segment(alias).to_lowercase()) {
            remaining.remove(&table);
            replacements.push(Replacement {
                table,
                macro_call: format!("{{{{ ref('{alias}') }}}}"),
            });
        }
    }
    replacements
}

/// Tier 2: match remaining candidates against declared sources.
///
/// A candidate matches a source when every one of its dot segments appears
/// among the source's {database, schema, name}, in any order. A one-segment
/// candidate therefore matches any source that mentions it anywhere; the
/// first source in manifest order wins.
pub fn source_references(
    manifest: &Manifest,
    remaining: &mut BTreeSet<String>,
) -> Vec<Replacement> {
    if remaining.is_empty() {
        return Vec::new();
    }

    let split: Vec<(String, BTreeSet<String>)> = remaining
        .iter()
        .map(|table| {
            let parts = table.split('.').map(|part| part.to_lowercase()).collect();
            (table.clone(), parts)
        })
        .collect();

    let mut replacements = Vec::new();
    for source in manifest.sources.values() {
        let identifiers: BTreeSet<String> = [
            source.database.as_deref().unwrap_or(""),
            source.schema.as_deref().unwrap_or(""),
            source.name.as_str(),
        ]
        .iter()
        .map(|identifier| identifier.to_lowercase())
        .collect();

        for (table, parts) in &split {
            if remaining.contains(table) && identifiers.is_superset(parts) {
                remaining.remove(table);
                replacements.push(Replacement {
                    table: table.clone(),
                    macro_call: format!(
                        "{{{{ source('{}', '{}') }}}}",
                        source.source_name, source.name
                    ),
                });
            }
        }
    }
    replacements
}

/// Tier 3: best-effort guesses for whatever is left.
///
/// Dotted names become `source(second_to_last, last)` with a note naming the
/// assumption. Single-segment names get a note and stay in the script
/// unchanged.
pub fn inferred_sources(remaining: &BTreeSet<String>) -> (Vec<Replacement>, Vec<ResolutionNote>) {
    let mut replacements = Vec::new();
    let mut notes = Vec::new();

    for table in remaining {
        let parts: Vec<&str> = table.split('.').collect();
        if parts.len() > 1 {
            let source_name = parts[parts.len() - 2];
            let table_name = parts[parts.len() - 1];

            notes.push(ResolutionNote::InferredSource {
                table: table.clone(),
                source_name: source_name.to_string(),
                table_name: table_name.to_string(),
            });
            replacements.push(Replacement {
                table: table.clone(),
                macro_call: format!("{{{{ source('{source_name}', '{table_name}') }}}}"),
            });
        } else {
            notes.push(ResolutionNote::Unresolvable {
                table: table.clone(),
            });
        }
    }
    (replacements, notes)
}

fn trailing_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}
