//! CLI argument parsing for bucketlock.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Bucketlock: time-bounded locks stored as objects in a bucket.
///
/// Each lock is one object named `prefix + resource + suffix`. Commands exit
/// with 0 when the answer is "yes" (locked, acquired, released, owned) and
/// with 2 when it is "no".
#[derive(Parser, Debug)]
#[command(name = "bucketlock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a config file (default: ./bucketlock.yaml if present).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). Overrides RUST_LOG.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for bucketlock.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the lock record for a resource.
    ///
    /// Exits 0 if the resource is currently locked, 2 otherwise.
    Status(ResourceArgs),

    /// Acquire a lock on a resource.
    ///
    /// Fails with exit code 2 if the resource is already locked.
    Lock(LockArgs),

    /// Release a lock held by the owner.
    ///
    /// Fails with exit code 2 if the lock belongs to someone else.
    Unlock(OwnerArgs),

    /// Check whether the owner holds the lock.
    ///
    /// With --for-ms, also require the lock to stay valid that much longer.
    Owned(OwnedArgs),

    /// Remove a lock regardless of its owner.
    ///
    /// Requires --force flag to prevent accidental clearing.
    Clear(ClearArgs),
}

/// A resource name.
#[derive(Parser, Debug)]
pub struct ResourceArgs {
    /// Name of the locked resource.
    pub resource: String,
}

/// A resource name and the acting owner.
#[derive(Parser, Debug)]
pub struct OwnerArgs {
    /// Name of the locked resource.
    pub resource: String,

    /// Lock owner (default: config `owner`, or `user@HOST`).
    #[arg(long)]
    pub owner: Option<String>,
}

/// Arguments for the `lock` command.
#[derive(Parser, Debug)]
pub struct LockArgs {
    /// Name of the resource to lock.
    pub resource: String,

    /// Lock owner (default: config `owner`, or `user@HOST`).
    #[arg(long)]
    pub owner: Option<String>,

    /// Lock duration in milliseconds (default: config `default_duration_ms`).
    #[arg(long, short = 'd')]
    pub duration_ms: Option<u64>,
}

/// Arguments for the `owned` command.
#[derive(Parser, Debug)]
pub struct OwnedArgs {
    /// Name of the locked resource.
    pub resource: String,

    /// Lock owner (default: config `owner`, or `user@HOST`).
    #[arg(long)]
    pub owner: Option<String>,

    /// Require the lock to remain valid for at least this many milliseconds.
    #[arg(long)]
    pub for_ms: Option<u64>,
}

/// Arguments for the `clear` command.
#[derive(Parser, Debug)]
pub struct ClearArgs {
    /// Name of the resource whose lock should be removed.
    pub resource: String,

    /// Force clearing the lock (required for safety).
    #[arg(long)]
    pub force: bool,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
