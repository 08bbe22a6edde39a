//! CLI commands.

use std::path::Path;

use anyhow::{Context, Result};
use layergate::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::OutputFormat;

pub mod check;
pub mod inspect;

const DEFAULT_CONFIG: &str = "layergate.toml";

/// Load the deployment file and build the security manager.
pub fn load_manager(config: Option<&Path>) -> Result<(DeploymentConfig, SecurityManager)> {
    let path = config.unwrap_or(Path::new(DEFAULT_CONFIG));

    let deployment = DeploymentConfig::from_file(path)
        .with_context(|| format!("Failed to load deployment file {}", path.display()))?;
    let manager = deployment
        .build_manager()
        .context("Failed to build security manager")?;

    info!(
        path = %path.display(),
        layers = deployment.layers.len(),
        services = manager.service_ids().len(),
        "Deployment loaded"
    );
    Ok((deployment, manager))
}

/// Create a context for a token, failing when no service knows the token.
pub fn authenticate(manager: &SecurityManager, token: &str) -> Result<SecurityContext> {
    let mut context = manager.new_context();
    let authenticated = manager
        .create_security_context(&mut context, token)
        .context("Failed to create security context")?;

    if !authenticated {
        warn!("Token rejected by all security services");
        anyhow::bail!("Token is not known to any security service");
    }
    info!(context = %context.id(), "Token authenticated");
    Ok(context)
}

/// Print a report in one of the JSON formats. Returns `false` for the human
/// format, which each command prints itself.
pub fn print_json<T: Serialize>(report: &T, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Human => Ok(false),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
            Ok(true)
        }
        OutputFormat::JsonCompact => {
            println!("{}", serde_json::to_string(report)?);
            Ok(true)
        }
    }
}

/// Render a yes/no decision.
pub fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
