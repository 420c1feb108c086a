//! asyncfs command-line front end
//!
//! Every subcommand maps onto one adapter operation. A soft failure (an
//! operation reporting `false` or nothing) exits with status 1; hard errors
//! exit through `anyhow`.

use anyhow::{Context, Result};
use asyncfs::cli::{Args, Command, VisibilityAction};
use asyncfs::{
    FilesystemOperations, LocalAdapter, NormalizedMetadata, ReaderSource, WriteOptions,
};
use clap::Parser;
use std::io::Write;
use tracing::info;

#[compio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    args.validate()?;

    // Initialize tracing for logging; stdout carries command output
    tracing_subscriber::fmt()
        .with_max_level(args.output.log_level())
        .with_writer(std::io::stderr)
        .init();

    let config = args.adapter.to_config()?;
    let adapter = LocalAdapter::local(config).await;
    adapter
        .ready()
        .await
        .with_context(|| format!("Cannot use root {}", args.adapter.root.display()))?;

    if !run(&adapter, args.command).await? {
        std::process::exit(1);
    }
    Ok(())
}

fn options(visibility: Option<String>) -> WriteOptions {
    WriteOptions { visibility }
}

fn print_record(out: &mut impl Write, record: &NormalizedMetadata) -> Result<()> {
    let size = record
        .size
        .map_or_else(|| "-".to_string(), |size| size.to_string());
    let timestamp = record
        .timestamp
        .map_or_else(|| "-".to_string(), |ts| ts.to_string());
    writeln!(out, "{}\t{}\t{}\t{}", record.kind, size, timestamp, record.path)?;
    Ok(())
}

/// Run one subcommand, returning whether it succeeded
async fn run(adapter: &LocalAdapter, command: Command) -> Result<bool> {
    let mut out = std::io::stdout().lock();

    let ok = match command {
        Command::Ls { path, recursive } => {
            let records = adapter.list_contents(&path, recursive).await?;
            for record in &records {
                print_record(&mut out, record)?;
            }
            true
        }
        Command::Cat { path } => match adapter.read(&path).await? {
            Some(file) => {
                out.write_all(&file.contents)?;
                true
            }
            None => false,
        },
        Command::Write {
            path,
            content,
            visibility,
        } => {
            let outcome = match content {
                Some(content) => {
                    adapter
                        .write(&path, content.as_bytes(), &options(visibility))
                        .await?
                }
                None => {
                    adapter
                        .write_stream(
                            &path,
                            ReaderSource::new(std::io::stdin()),
                            &options(visibility),
                        )
                        .await?
                }
            };
            info!("Wrote {} ({} bytes)", outcome.path, outcome.size.unwrap_or(0));
            true
        }
        Command::Mkdir { path, visibility } => adapter
            .create_dir(&path, &options(visibility))
            .await?
            .is_some(),
        Command::Rm { path } => adapter.delete(&path).await?,
        Command::Rmdir { path } => adapter.delete_dir(&path).await?,
        Command::Mv { from, to } => adapter.rename(&from, &to).await?,
        Command::Cp { from, to } => adapter.copy(&from, &to).await?,
        Command::Stat { path } => match adapter.get_metadata(&path).await? {
            Some(record) => {
                print_record(&mut out, &record)?;
                true
            }
            None => false,
        },
        Command::Visibility { action } => {
            let info = match action {
                VisibilityAction::Get { path } => adapter.get_visibility(&path).await?,
                VisibilityAction::Set { path, label } => {
                    adapter.set_visibility(&path, &label).await?
                }
            };
            match info {
                Some(info) => {
                    writeln!(out, "{}\t{}", info.visibility, info.path)?;
                    true
                }
                None => false,
            }
        }
        Command::Mime { path } => {
            writeln!(out, "{}", adapter.get_mimetype(&path).mimetype)?;
            true
        }
        Command::Exists { path } => adapter.has(&path).await?,
    };

    out.flush()?;
    Ok(ok)
}
