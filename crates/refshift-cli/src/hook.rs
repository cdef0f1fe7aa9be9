//! File driver
//!
//! Processes files strictly in the order given: read, detect candidates,
//! resolve against the manifest, rewrite, write back in place. Files with no
//! candidates are left untouched. The run status is non-zero as soon as any
//! file had candidates, whether or not every one of them was resolved.

use anyhow::{Context, Result};
use colored::Colorize;
use refshift_core::Config;
use refshift_dbt::Manifest;
use refshift_sql::{resolve_table_names, ScriptRewriter, TableDetector};
use std::path::PathBuf;

pub fn process_files(
    filenames: &[PathBuf],
    manifest: &Manifest,
    config: &Config,
    verbose: bool,
) -> Result<i32> {
    let detector = TableDetector::from_dialect(&config.dialect);
    let rewriter = ScriptRewriter::from_dialect(&config.dialect);

    let mut status = 0;
    for filename in filenames {
        let sql = std::fs::read_to_string(filename)
            .with_context(|| format!("failed to read {}", filename.display()))?;

        let tables = detector
            .detect(&sql)
            .with_context(|| format!("failed to scan {}", filename.display()))?;
        if tables.is_empty() {
            if verbose {
                eprintln!("{} {}", "No table names in".green(), filename.display());
            }
            continue;
        }
        status = 1;

        let resolution = resolve_table_names(manifest, tables);
        for note in &resolution.notes {
            println!("{note}");
        }

        let rewritten = rewriter
            .rewrite(&sql, &resolution.replacements)
            .with_context(|| format!("failed to rewrite {}", filename.display()))?;
        std::fs::write(filename, rewritten)
            .with_context(|| format!("failed to write {}", filename.display()))?;

        if verbose {
            eprintln!(
                "{} {} ({} replacements)",
                "Rewrote".cyan(),
                filename.display(),
                resolution.replacements.len()
            );
        }
    }

    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    const MANIFEST_JSON: &str = r#"
    {
        "nodes": {
            "model.demo.fct_orders": {
                "name": "fct_orders",
                "resource_type": "model",
                "alias": "fct_orders"
            }
        },
        "sources": {
            "source.demo.raw.orders": {
                "source_name": "raw_src",
                "name": "orders",
                "database": "raw",
                "schema": "public"
            }
        }
    }
    "#;

    fn manifest() -> Manifest {
        Manifest::from_json(MANIFEST_JSON).unwrap()
    }

    fn write_script(dir: &Path, name: &str, sql: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, sql).unwrap();
        path
    }

    #[test]
    fn rewrites_files_in_place_and_returns_nonzero() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(
            dir.path(),
            "orders.sql",
            "SELECT * FROM raw.orders -- from raw.orders table\n",
        );

        let status =
            process_files(&[script.clone()], &manifest(), &Config::default(), false).unwrap();

        assert_eq!(status, 1);
        assert_eq!(
            std::fs::read_to_string(&script).unwrap(),
            "SELECT * FROM {{ source('raw_src', 'orders') }} -- from raw.orders table\n"
        );
    }

    #[test]
    fn files_without_candidates_are_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let sql = "SELECT * FROM {{ ref('fct_orders') }}\n";
        let script = write_script(dir.path(), "clean.sql", sql);

        let status =
            process_files(&[script.clone()], &manifest(), &Config::default(), false).unwrap();

        assert_eq!(status, 0);
        assert_eq!(std::fs::read_to_string(&script).unwrap(), sql);
    }

    #[test]
    fn second_run_leaves_the_file_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(
            dir.path(),
            "orders.sql",
            "SELECT * FROM db.sales.fct_orders\n",
        );

        let first = process_files(&[script.clone()], &manifest(), &Config::default(), false).unwrap();
        assert_eq!(first, 1);

        let after_first = std::fs::read_to_string(&script).unwrap();
        assert_eq!(after_first, "SELECT * FROM {{ ref('fct_orders') }}\n");

        let second =
            process_files(&[script.clone()], &manifest(), &Config::default(), false).unwrap();
        assert_eq!(second, 0);
        assert_eq!(std::fs::read_to_string(&script).unwrap(), after_first);
    }

    #[test]
    fn unresolved_candidates_still_flag_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let sql = "SELECT * FROM mystery_table\n";
        let script = write_script(dir.path(), "mystery.sql", sql);

        let status =
            process_files(&[script.clone()], &manifest(), &Config::default(), false).unwrap();

        // No replacement could be made, but candidates were found
        assert_eq!(status, 1);
        assert_eq!(std::fs::read_to_string(&script).unwrap(), sql);
    }

    #[test]
    fn later_files_are_processed_after_a_clean_one() {
        let dir = tempfile::tempdir().unwrap();
        let clean = write_script(dir.path(), "clean.sql", "SELECT 1\n");
        let dirty = write_script(dir.path(), "dirty.sql", "SELECT * FROM raw.orders\n");

        let status = process_files(
            &[clean, dirty.clone()],
            &manifest(),
            &Config::default(),
            false,
        )
        .unwrap();

        assert_eq!(status, 1);
        assert_eq!(
            std::fs::read_to_string(&dirty).unwrap(),
            "SELECT * FROM {{ source('raw_src', 'orders') }}\n"
        );
    }

    #[test]
    fn missing_file_aborts_the_run() {
        let result = process_files(
            &[PathBuf::from("does/not/exist.sql")],
            &manifest(),
            &Config::default(),
            false,
        );

        assert!(result.is_err());
    }
}
