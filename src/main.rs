// src/main.rs

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use notionmd::config::{resolve_page_id, ClientConfig, Command, CommandLineInput};
use notionmd::{
    export_page, import_markdown, parse_document, render_document, Block, ImportMode,
    NotionHttpClient,
};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Sets up logging configuration.
///
/// Console output goes to stderr so that stdout carries only command output.
fn setup_logging(verbose: bool) -> anyhow::Result<()> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_file_path = std::env::temp_dir().join("notionmd.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    let stderr_appender = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] {t} - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stderr")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Reads a file, or stdin when no path is given.
fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            Ok(buffer)
        }
    }
}

/// Writes to a file, or stdout when no path is given.
fn write_output(path: Option<&PathBuf>, content: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("✓ Wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

async fn run(cli: CommandLineInput) -> anyhow::Result<()> {
    match &cli.command {
        Command::Convert { input, output } => {
            let markdown = read_input(input.as_deref())?;
            let blocks = parse_document(&markdown);
            let json = serde_json::to_string_pretty(&blocks)?;
            write_output(output.as_ref(), &format!("{}\n", json))
        }
        Command::Render { input, output } => {
            let json = read_input(input.as_deref())?;
            let blocks: Vec<Block> =
                serde_json::from_str(&json).context("Input is not a block-tree JSON array")?;
            write_output(output.as_ref(), &render_document(&blocks))
        }
        Command::Export { page, output } => {
            let page_id = resolve_page_id(page)?;
            let client = NotionHttpClient::new(&ClientConfig::resolve(&cli)?)?;
            let markdown = export_page(&client, &page_id).await?;
            write_output(output.as_ref(), &markdown)
        }
        Command::Import {
            page,
            input,
            replace,
        } => {
            let page_id = resolve_page_id(page)?;
            let client = NotionHttpClient::new(&ClientConfig::resolve(&cli)?)?;
            let markdown = read_input(input.as_deref())?;
            let mode = if *replace {
                ImportMode::Replace
            } else {
                ImportMode::Append
            };
            let report = import_markdown(&client, &page_id, &markdown, mode).await?;
            if report.deleted > 0 {
                eprintln!("🗑  Removed {} existing blocks", report.deleted);
            }
            eprintln!(
                "✓ Imported {} blocks ({} top-level) into {}",
                report.written, report.parsed, page_id
            );
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose)?;

    run(cli).await
}
