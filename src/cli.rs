//! CLI front-end (§6.1, ADDED) — a thin `clap`-derived driver over the
//! public [`crate::analyzer::Analyzer`] surface. All parsing/rendering
//! decisions live in the core; this module only wires arguments to it and
//! prints the result.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::analyzer::Analyzer;
use crate::config::HarnessOptions;
use crate::error::{Result, SkeletonError};
use crate::harness;

#[derive(Parser)]
#[command(name = "skelter", version, about = "Tree-sitter-backed source skeleton extractor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Scan a project and print every top-level skeleton.
    Scan {
        /// Project root directory.
        path: String,
        /// Restrict the scan to a single language id (e.g. `typescript`).
        #[arg(long = "lang")]
        lang: Option<String>,
        /// Directories to exclude, in addition to the defaults.
        #[arg(long = "exclude")]
        exclude: Vec<PathBuf>,
    },
    /// Scan a project and print the skeleton for one fully-qualified name.
    Get {
        /// Project root directory.
        path: String,
        /// Fully-qualified name to look up.
        fq_name: String,
    },
    /// Scan a project and print the raw source for one fully-qualified name.
    Source {
        /// Project root directory.
        path: String,
        /// Fully-qualified name to look up.
        fq_name: String,
        /// Print the method source (all recorded ranges) instead of the
        /// class source (first recorded range only).
        #[arg(long)]
        method: bool,
    },
}

fn run_harness(path: &str, exclude: Vec<PathBuf>) -> Result<Analyzer> {
    let options = HarnessOptions::new(path).with_exclude(exclude);
    harness::analyze_project(options)
}

/// As [`run_harness`], but restricted to extensions mapping to `lang`.
fn run_harness_for_lang(path: &str, exclude: Vec<PathBuf>, lang: Option<&str>) -> Result<Analyzer> {
    let mut options = HarnessOptions::new(path).with_exclude(exclude);
    if let Some(lang) = lang {
        options.extensions.retain(|_, v| v == lang);
    }
    harness::analyze_project(options)
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Scan { path, lang, exclude } => cmd_scan(&path, lang, exclude),
        Command::Get { path, fq_name } => cmd_get(&path, &fq_name),
        Command::Source { path, fq_name, method } => cmd_source(&path, &fq_name, method),
    }
}

fn cmd_scan(path: &str, lang: Option<String>, exclude: Vec<PathBuf>) -> Result<()> {
    let analyzer = run_harness_for_lang(path, exclude, lang.as_deref())?;
    if analyzer.is_empty() {
        println!("(no declarations found)");
        return Ok(());
    }
    let mut files = analyzer.files();
    files.sort();
    for file in files {
        for (_, skeleton) in analyzer.get_skeletons(&file) {
            println!("{skeleton}\n");
        }
    }
    Ok(())
}

fn cmd_get(path: &str, fq_name: &str) -> Result<()> {
    let analyzer = run_harness(path, Vec::new())?;
    match analyzer.get_skeleton(fq_name) {
        Some(skeleton) => {
            println!("{skeleton}");
            Ok(())
        }
        None => Err(SkeletonError::SymbolNotFound { fq_name: fq_name.to_string() }),
    }
}

fn cmd_source(path: &str, fq_name: &str, method: bool) -> Result<()> {
    let analyzer = run_harness(path, Vec::new())?;
    if method {
        match analyzer.get_method_source(fq_name) {
            Some(src) => {
                println!("{src}");
                Ok(())
            }
            None => Err(SkeletonError::SymbolNotFound { fq_name: fq_name.to_string() }),
        }
    } else {
        println!("{}", analyzer.get_class_source(fq_name)?);
        Ok(())
    }
}
