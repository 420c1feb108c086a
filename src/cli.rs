//! Command-line interface definitions
//!
//! This module organizes CLI arguments by **functional usage** - each group
//! contains the options needed by a specific component: the adapter
//! configuration, logging output, and the operation to run.

use crate::config::{AdapterConfig, LinkPolicy, WriteMode};
use crate::visibility::PermissionOverrides;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Asynchronous filesystem adapter on `io_uring`
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Adapter configuration (root, write mode, links, permissions)
    #[command(flatten)]
    pub adapter: AdapterArgs,

    /// Output and logging configuration
    #[command(flatten)]
    pub output: OutputConfig,

    /// Operation to run
    #[command(subcommand)]
    pub command: Command,
}

// ============================================================================
// FUNCTIONAL GROUPS: Organized by what component consumes them
// ============================================================================

/// Adapter configuration
///
/// Used by: `AdapterConfig`, `AsyncAdapter::new()`
#[derive(clap::Args, Debug, Clone)]
#[command(next_help_heading = "Adapter Options")]
pub struct AdapterArgs {
    /// Root directory every path is relative to (created if missing)
    #[arg(long, value_name = "DIR")]
    pub root: PathBuf,

    /// Append to existing files instead of truncating them
    #[arg(long)]
    pub append: bool,

    /// What to do when a listing meets a symbolic link
    #[arg(long, value_enum, default_value = "disallow")]
    pub links: LinkMode,

    /// Add or replace a file visibility label (e.g. `shared=0664`)
    ///
    /// May be given multiple times.
    #[arg(long = "file-permission", value_name = "LABEL=OCTAL")]
    pub file_permissions: Vec<String>,

    /// Add or replace a directory visibility label (e.g. `private=0770`)
    ///
    /// May be given multiple times.
    #[arg(long = "dir-permission", value_name = "LABEL=OCTAL")]
    pub dir_permissions: Vec<String>,
}

/// Link handling on the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LinkMode {
    /// Leave links out of listings
    Skip,
    /// Fail listings that contain links
    #[default]
    Disallow,
}

impl From<LinkMode> for LinkPolicy {
    fn from(mode: LinkMode) -> Self {
        match mode {
            LinkMode::Skip => Self::Skip,
            LinkMode::Disallow => Self::Disallow,
        }
    }
}

/// Output and logging configuration
///
/// Used by: `main()`, logging initialization
#[derive(clap::Args, Debug, Clone)]
#[command(next_help_heading = "Output Options")]
pub struct OutputConfig {
    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress all output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl OutputConfig {
    /// Get the maximum log level for these flags
    #[must_use]
    pub const fn log_level(&self) -> tracing::Level {
        if self.quiet {
            return tracing::Level::ERROR;
        }
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

/// Adapter operations
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List a directory
    Ls {
        /// Directory to list (defaults to the root)
        #[arg(default_value = "")]
        path: String,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,
    },
    /// Print a file to stdout
    Cat {
        /// File to read
        path: String,
    },
    /// Write a file from an argument or from stdin
    Write {
        /// File to write
        path: String,

        /// Contents; read from stdin when omitted
        content: Option<String>,

        /// Visibility label to apply after writing
        #[arg(long)]
        visibility: Option<String>,
    },
    /// Create a directory and its parents
    Mkdir {
        /// Directory to create
        path: String,

        /// Visibility label for the new directory
        #[arg(long)]
        visibility: Option<String>,
    },
    /// Delete a file or link
    Rm {
        /// Node to delete
        path: String,
    },
    /// Delete a directory tree
    Rmdir {
        /// Directory to delete
        path: String,
    },
    /// Rename a node
    Mv {
        /// Current path
        from: String,
        /// New path
        to: String,
    },
    /// Copy a file
    Cp {
        /// Source file
        from: String,
        /// Destination file
        to: String,
    },
    /// Show normalized metadata
    Stat {
        /// Node to describe
        path: String,
    },
    /// Read or change visibility
    Visibility {
        #[command(subcommand)]
        action: VisibilityAction,
    },
    /// Guess a MIME type from the extension
    Mime {
        /// File name or path
        path: String,
    },
    /// Check whether a node exists
    Exists {
        /// Node to check
        path: String,
    },
}

/// Visibility subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum VisibilityAction {
    /// Print the visibility label of a node
    Get {
        /// Node to inspect
        path: String,
    },
    /// Apply a visibility label to a node
    Set {
        /// Node to change
        path: String,
        /// Label to apply (e.g. `public`, `private`)
        label: String,
    },
}

/// Parse a `label=octal` permission override
///
/// # Errors
///
/// Returns an error if the separator is missing, the label is empty, or the
/// bits are not octal in the range `0..=7777`.
pub fn parse_permission(entry: &str) -> Result<(String, u32)> {
    let Some((label, bits)) = entry.split_once('=') else {
        anyhow::bail!("Permission override must look like LABEL=OCTAL, got: {entry}");
    };

    let label = label.trim();
    if label.is_empty() {
        anyhow::bail!("Permission override has an empty label: {entry}");
    }

    let digits = bits.trim().trim_start_matches("0o");
    let bits = u32::from_str_radix(digits, 8)
        .with_context(|| format!("Invalid octal permission bits in override: {entry}"))?;
    if bits > 0o7777 {
        anyhow::bail!("Permission bits must be at most 7777, got: {digits}");
    }

    Ok((label.to_string(), bits))
}

// ============================================================================
// IMPLEMENTATION: Convenience methods and validation
// ============================================================================

impl AdapterArgs {
    /// Collect the permission overrides given on the command line
    ///
    /// # Errors
    ///
    /// Returns an error if any override is malformed.
    pub fn permission_overrides(&self) -> Result<PermissionOverrides> {
        let mut overrides = PermissionOverrides::default();
        for entry in &self.file_permissions {
            let (label, bits) = parse_permission(entry)?;
            overrides = overrides.file(label, bits);
        }
        for entry in &self.dir_permissions {
            let (label, bits) = parse_permission(entry)?;
            overrides = overrides.dir(label, bits);
        }
        Ok(overrides)
    }

    /// Build the adapter configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any permission override is malformed.
    pub fn to_config(&self) -> Result<AdapterConfig> {
        let write_mode = if self.append {
            WriteMode::Append
        } else {
            WriteMode::Truncate
        };

        Ok(AdapterConfig::new(&self.root)
            .write_mode(write_mode)
            .link_policy(self.links.into())
            .permissions(self.permission_overrides()?))
    }
}

impl Args {
    /// Validate command-line arguments
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The root path is empty
    /// - A permission override is malformed
    /// - Both --quiet and --verbose options are used
    pub fn validate(&self) -> Result<()> {
        if self.adapter.root.as_os_str().is_empty() {
            anyhow::bail!("Root path must not be empty");
        }

        self.adapter.permission_overrides()?;

        // Validate conflicting options
        if self.output.quiet && self.output.verbose > 0 {
            anyhow::bail!("Cannot use both --quiet and --verbose options");
        }

        Ok(())
    }
}
