use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scraper::Html;
use std::io::Read;
use tracing::info;

use aria_match::{
    body_or_root, matches_aria_tree, parse_template, render_aria_tree, RenderMode, RenderOptions,
    SnapshotEngine, SnapshotOptions,
};

#[derive(Parser)]
#[command(name = "aria-match")]
#[command(about = "Accessibility-tree snapshots and template matching for web pages")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the accessibility tree of an HTML file ('-' for stdin)
    Snapshot {
        /// HTML file path or '-' for stdin
        input: String,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Generalize dynamic content into regex patterns
        #[arg(long)]
        regex: bool,

        /// Assign stable element refs and annotate interactive nodes
        #[arg(long)]
        for_ai: bool,
    },

    /// Match a template file against an HTML file ('-' for stdin)
    Match {
        /// HTML file path or '-' for stdin
        input: String,

        /// Template file path
        #[arg(short, long)]
        template: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Snapshot {
            input,
            format,
            regex,
            for_ai,
        } => run_snapshot(&input, &format, regex, for_ai),
        Commands::Match { input, template } => run_match(&input, &template),
    }
}

fn read_html(input: &str) -> Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading HTML from stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(input).with_context(|| format!("reading {input}"))
}

fn run_snapshot(input: &str, format: &str, regex: bool, for_ai: bool) -> Result<()> {
    let html = read_html(input)?;
    let doc = Html::parse_document(&html);
    let mut engine = SnapshotEngine::new();
    let options = SnapshotOptions {
        for_ai,
        ..Default::default()
    };
    let snapshot = engine.snapshot(&doc, body_or_root(&doc), &options);
    info!(refs = snapshot.elements.len(), "snapshot complete");

    let output = match format {
        "json" => serde_json::to_string_pretty(&snapshot.root)?,
        _ => {
            let mode = if regex {
                RenderMode::Regex
            } else {
                RenderMode::Raw
            };
            render_aria_tree(&snapshot.root, &RenderOptions { mode, for_ai })
        }
    };
    println!("{output}");
    Ok(())
}

fn run_match(input: &str, template_path: &str) -> Result<()> {
    let html = read_html(input)?;
    let template_text = std::fs::read_to_string(template_path)
        .with_context(|| format!("reading {template_path}"))?;
    let template = parse_template(&template_text)?;

    let doc = Html::parse_document(&html);
    let mut engine = SnapshotEngine::new();
    let result = matches_aria_tree(&mut engine, &doc, body_or_root(&doc), &template);

    if result.matches.is_empty() {
        println!("no match");
        println!("--- received ---");
        println!(
            "{}",
            result
                .received
                .diff_target
                .as_deref()
                .unwrap_or(&result.received.raw)
        );
        std::process::exit(1);
    }
    println!("matched {} subtree(s)", result.matches.len());
    Ok(())
}
