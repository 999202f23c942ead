//! relbin-hook - package manager hook host
//!
//! Reads newline-delimited JSON hook messages on stdin and provisions the
//! configured release binary. Provisioning failures are logged, never
//! turned into a non-zero exit: the package operation that fired the hook
//! must carry on regardless.

use std::io::BufRead;

use anyhow::{Context, Result};
use relbin_core::{Dispatcher, HookMessage, Provisioner, ProvisionerConfig, TracingReporter};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ProvisionerConfig::load().context("Failed to load relbin configuration")?;
    let target = config.package_name.clone();
    let provisioner =
        Provisioner::new(config, TracingReporter).context("Failed to initialise HTTP client")?;
    let dispatcher = Dispatcher::new(target, provisioner);

    for line in std::io::stdin().lock().lines() {
        let line = line.context("Failed to read hook message")?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<HookMessage>(&line) {
            Ok(msg) => handle(&dispatcher, msg),
            Err(e) => tracing::warn!("Ignoring malformed hook message: {e}"),
        }
    }

    Ok(())
}

fn handle(dispatcher: &Dispatcher<Provisioner<TracingReporter>>, msg: HookMessage) {
    match msg {
        HookMessage::PluginUninstall => dispatcher.handler().uninstall(),
        other => {
            if let Some(event) = other.into_event() {
                dispatcher.dispatch(&event);
            }
        }
    }
}
