//! Command implementations for bucketlock.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Every command answers a yes/no question; the handlers
//! return that answer and `main` turns it into the exit code.


use crate::cli::{ClearArgs, Cli, Command, LockArgs, OwnedArgs, OwnerArgs, ResourceArgs};
use bucketlock::config::Config;
use bucketlock::error::{LockError, Result};
use bucketlock::lock::LockStore;
use bucketlock::store::ObjectStore;

/// Load the configuration and run the command against the configured store.
pub fn dispatch(cli: Cli) -> Result<bool> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::discover()?,
    };
    let locks = config.open_lock_store()?;
    run(&locks, &config, cli.command)
}

/// Run a single command.
pub fn run<S: ObjectStore>(locks: &LockStore<S>, config: &Config, command: Command) -> Result<bool> {
    match command {
        Command::Status(args) => cmd_status(locks, args),
        Command::Lock(args) => cmd_lock(locks, config, args),
        Command::Unlock(args) => cmd_unlock(locks, config, args),
        Command::Owned(args) => cmd_owned(locks, config, args),
        Command::Clear(args) => cmd_clear(locks, args),
    }
}

fn resolve_owner(config: &Config, owner: Option<String>) -> Result<String> {
    match owner {
        Some(owner) if owner.is_empty() => Err(LockError::InvalidArgument(
            "--owner must not be empty".to_string(),
        )),
        Some(owner) => Ok(owner),
        None => Ok(config.owner_or_default()),
    }
}

fn cmd_status<S: ObjectStore>(locks: &LockStore<S>, args: ResourceArgs) -> Result<bool> {
    match locks.read_record(&args.resource)? {
        Some(record) => {
            println!("{}", record);
            Ok(record.is_locked())
        }
        None => {
            println!("{} is not locked", args.resource);
            Ok(false)
        }
    }
}

fn cmd_lock<S: ObjectStore>(locks: &LockStore<S>, config: &Config, args: LockArgs) -> Result<bool> {
    let owner = resolve_owner(config, args.owner)?;
    let duration_ms = args.duration_ms.unwrap_or(config.default_duration_ms);

    if locks.lock(&owner, &args.resource, duration_ms)? {
        println!(
            "Locked {} for {}ms as {} (key: {})",
            args.resource,
            duration_ms,
            owner,
            locks.key_for(&args.resource)
        );
        return Ok(true);
    }

    // Re-read only to explain who holds it
    match locks.read_record(&args.resource)? {
        Some(record) => println!("Already locked: {}", record),
        None => println!("Already locked: {}", args.resource),
    }
    Ok(false)
}

fn cmd_unlock<S: ObjectStore>(locks: &LockStore<S>, config: &Config, args: OwnerArgs) -> Result<bool> {
    let owner = resolve_owner(config, args.owner)?;

    if locks.unlock(&owner, &args.resource)? {
        println!("Unlocked {}", args.resource);
        Ok(true)
    } else {
        println!("{} is not locked by {}", args.resource, owner);
        Ok(false)
    }
}

fn cmd_owned<S: ObjectStore>(locks: &LockStore<S>, config: &Config, args: OwnedArgs) -> Result<bool> {
    let owner = resolve_owner(config, args.owner)?;

    let owned = match args.for_ms {
        Some(time_ms) => locks.is_owned_and_will_be_locked_for(&owner, &args.resource, time_ms)?,
        None => locks.is_owned(&owner, &args.resource)?,
    };

    match (owned, args.for_ms) {
        (true, Some(time_ms)) => println!(
            "{} holds {} for at least {}ms more",
            owner, args.resource, time_ms
        ),
        (true, None) => println!("{} owns {}", owner, args.resource),
        (false, _) => println!("{} does not hold {}", owner, args.resource),
    }
    Ok(owned)
}

fn cmd_clear<S: ObjectStore>(locks: &LockStore<S>, args: ClearArgs) -> Result<bool> {
    if !args.force {
        return Err(LockError::InvalidArgument(format!(
            "clearing the lock on '{}' ignores its owner; re-run with --force",
            args.resource
        )));
    }

    match locks.force_unlock(&args.resource)? {
        Some(record) => println!("Cleared lock: {}", record),
        None => println!("Cleared {} (no readable lock record)", args.resource),
    }
    Ok(true)
}
