//! heaplens CLI
//!
//! Terminal front end over the analysis session: open a JSON heap dump,
//! print the duplicate-string summary, referrer graphs for chosen
//! addresses, or the drill-down summary for one `(type, field)` edge.
//!
//! # Usage
//!
//! ```bash
//! heaplens summary heap.json --top 10
//! heaplens referrers heap.json --address 0x1a2b00 --address 0x1a2b40
//! heaplens field-strings heap.json --type MyApp.Session --offset 0x8
//! ```

use clap::{Parser, Subcommand};
use heaplens_analysis::{
    AnalysisSession, CancellationToken, GraphConfig, ReferrerResolution, StringSummary,
};
use heaplens_analysis::{DedupConfig, ReferenceGraph};
use rustc_hash::FxHashSet;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "heaplens")]
#[command(about = "Duplicate-string and referrer analysis for managed heap dumps", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize duplicate strings in a dump
    Summary {
        /// Heap dump path
        dump: PathBuf,

        /// Number of items to print
        #[arg(long, default_value = "20")]
        top: usize,

        /// Emit the full summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show what refers to the given target addresses
    Referrers {
        /// Heap dump path
        dump: PathBuf,

        /// Target address (repeatable, decimal or 0x hex)
        #[arg(long, required = true, value_parser = parse_address)]
        address: Vec<u64>,

        /// Maximum referrer-chain depth
        #[arg(long, default_value = "8")]
        depth: usize,

        /// Emit the graph as JSON
        #[arg(long)]
        json: bool,
    },

    /// Summarize strings referenced by one field of one type
    FieldStrings {
        /// Heap dump path
        dump: PathBuf,

        /// Referrer type name, e.g. MyApp.Session
        #[arg(long = "type")]
        type_name: String,

        /// Field offset within the referrer type (decimal or 0x hex)
        #[arg(long, value_parser = parse_address)]
        offset: u64,

        /// Emit the full summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_address(raw: &str) -> Result<u64, String> {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    parsed.map_err(|_| format!("'{raw}' is not a valid address"))
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("heaplens: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let token = CancellationToken::new();
    match cli.command {
        Commands::Summary { dump, top, json } => {
            let session = AnalysisSession::open(&dump).map_err(|e| e.to_string())?;
            let summary = session
                .request_string_summary(&token)
                .map_err(|e| e.to_string())?;
            if json {
                print_json(&summary)?;
            } else {
                print_summary(&summary, top);
            }
        }
        Commands::Referrers {
            dump,
            address,
            depth,
            json,
        } => {
            let snapshot = heaplens_snapshot::open(&dump).map_err(|e| e.to_string())?;
            let session = AnalysisSession::with_configs(
                Box::new(snapshot),
                DedupConfig::default(),
                GraphConfig { max_depth: depth },
            );
            let targets: FxHashSet<u64> = address.into_iter().collect();
            let graph = session
                .request_reference_graph(&targets, &token)
                .map_err(|e| e.to_string())?;
            if json {
                print_json(&graph)?;
            } else {
                print_graph(&graph);
            }
        }
        Commands::FieldStrings {
            dump,
            type_name,
            offset,
            json,
        } => {
            let session = AnalysisSession::open(&dump).map_err(|e| e.to_string())?;
            let type_id = session
                .find_type(&type_name)
                .ok_or_else(|| format!("type '{type_name}' not found in dump"))?;
            let summary = session
                .request_field_filtered_summary(type_id, offset, &token)
                .map_err(|e| e.to_string())?;
            if json {
                print_json(&summary)?;
            } else {
                println!("Strings referenced by {type_name}+{offset:#x}");
                println!();
                print_summary(&summary, 20);
            }
        }
    }
    Ok(())
}

fn print_json(value: &impl serde::Serialize) -> Result<(), String> {
    let rendered = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{rendered}");
    Ok(())
}

fn print_summary(summary: &StringSummary, top: usize) {
    println!(
        "{:>14}  {:>8}  {:>10}  {:>8}  content",
        "wasted", "count", "size", "length"
    );
    for item in summary.items.iter().take(top) {
        println!(
            "{:>14}  {:>8}  {:>10}  {:>8}  {}",
            item.wasted_bytes,
            item.occurrence_count,
            item.instance_size,
            item.content_length,
            preview(&item.content)
        );
    }
    println!();
    println!(
        "{} strings ({} unique), {} of {} object bytes in strings, {} bytes wasted",
        summary.total_string_count,
        summary.unique_string_count,
        summary.total_string_byte_count,
        summary.total_object_byte_count,
        summary.total_wasted_bytes
    );
    println!(
        "{} objects scanned, {} skipped unresolved, ~{} bytes overhead per string",
        summary.total_object_count, summary.skipped_unresolved, summary.string_overhead_bytes
    );
}

fn print_graph(graph: &ReferenceGraph) {
    let mut nodes: Vec<_> = graph.nodes().collect();
    nodes.sort_by_key(|n| n.target);
    for node in nodes {
        println!("{:#x}:", node.target);
        match node.resolution {
            ReferrerResolution::NoResolvableReferrer => {
                println!("  (no resolvable referrer; likely a stack or static root)");
            }
            ReferrerResolution::Resolved => {
                for edge in &node.edges {
                    println!(
                        "  {} [{} refs]",
                        edge.chain.describe(),
                        edge.reference_count
                    );
                }
            }
        }
    }
    println!();
    println!(
        "{} edges over {} levels, {} objects scanned",
        graph.stats.edges_total, graph.stats.levels, graph.stats.objects_scanned
    );
}

fn preview(content: &str) -> String {
    const MAX: usize = 48;
    let escaped: String = content.escape_debug().collect();
    if escaped.chars().count() <= MAX {
        format!("\"{escaped}\"")
    } else {
        let truncated: String = escaped.chars().take(MAX).collect();
        format!("\"{truncated}\"...")
    }
}
