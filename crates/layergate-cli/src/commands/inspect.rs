//! Inspect command - Inspect the deployment or the context of a token.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use layergate::prelude::*;

use super::{authenticate, load_manager, print_json};
use crate::OutputFormat;

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Token whose security context to inspect
    #[arg(short, long)]
    pub token: Option<String>,

    /// Include the saved authorization of the context
    #[arg(long, requires = "token")]
    pub snapshot: bool,
}

/// Deployment overview.
#[derive(Debug, Serialize)]
struct DeploymentReport {
    loop_all_services: bool,
    layers: Vec<LayerDisplay>,
    services: Vec<String>,
    authorization_kinds: Vec<String>,
}

#[derive(Debug, Serialize)]
struct LayerDisplay {
    id: String,
    crs: String,
    max_extent: String,
    update_capable: bool,
    create_capable: bool,
    delete_capable: bool,
}

/// Security context overview.
#[derive(Debug, Serialize)]
struct ContextReport {
    id: String,
    user: UserInfo,
    authentications: Vec<AuthenticationDisplay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct AuthenticationDisplay {
    service: String,
    authorizations: Vec<AuthorizationDisplay>,
}

#[derive(Debug, Serialize)]
struct AuthorizationDisplay {
    id: String,
    kind: String,
    capabilities: Vec<&'static str>,
}

impl From<&LayerInfo> for LayerDisplay {
    fn from(layer: &LayerInfo) -> Self {
        Self {
            id: layer.id.clone(),
            crs: layer.crs.clone(),
            max_extent: layer.max_extent.to_string(),
            update_capable: layer.update_capable,
            create_capable: layer.create_capable,
            delete_capable: layer.delete_capable,
        }
    }
}

impl From<&dyn Authorization> for AuthorizationDisplay {
    fn from(authorization: &dyn Authorization) -> Self {
        let capabilities = [
            ("area", authorization.as_area().is_some()),
            ("feature", authorization.as_feature().is_some()),
            ("attribute", authorization.as_attribute().is_some()),
            ("filter", authorization.as_select_filter().is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect();

        Self {
            id: authorization.id(),
            kind: authorization.kind().to_string(),
            capabilities,
        }
    }
}

/// Execute the inspect command.
pub fn execute(args: InspectArgs, config: Option<&Path>, format: OutputFormat) -> Result<()> {
    let (deployment, manager) = load_manager(config)?;

    match &args.token {
        None => inspect_deployment(&deployment, &manager, format),
        Some(token) => inspect_context(&manager, token, args.snapshot, format),
    }
}

fn inspect_deployment(
    deployment: &DeploymentConfig,
    manager: &SecurityManager,
    format: OutputFormat,
) -> Result<()> {
    let report = DeploymentReport {
        loop_all_services: manager.config().loop_all_services,
        layers: deployment.layers.iter().map(LayerDisplay::from).collect(),
        services: manager.service_ids(),
        authorization_kinds: manager.codec().kinds(),
    };

    if print_json(&report, format)? {
        return Ok(());
    }

    println!(
        "Services ({}, {}):",
        report.services.len(),
        if report.loop_all_services { "all consulted" } else { "first match" }
    );
    for service in &report.services {
        println!("  {}", service);
    }
    println!();

    println!("Layers ({}):", report.layers.len());
    for layer in &report.layers {
        let mut edits = Vec::new();
        if layer.update_capable {
            edits.push("update");
        }
        if layer.create_capable {
            edits.push("create");
        }
        if layer.delete_capable {
            edits.push("delete");
        }
        let edits = if edits.is_empty() { "read-only".to_string() } else { edits.join("/") };
        println!("  {} [{}] {} ({})", layer.id, layer.crs, layer.max_extent, edits);
    }
    println!();

    println!("Authorization kinds: {}", report.authorization_kinds.join(", "));
    Ok(())
}

fn inspect_context(
    manager: &SecurityManager,
    token: &str,
    snapshot: bool,
    format: OutputFormat,
) -> Result<()> {
    let context = authenticate(manager, token)?;

    let snapshot = if snapshot {
        Some(serde_json::to_value(context.saved_authorization()?).context("Failed to encode snapshot")?)
    } else {
        None
    };

    let report = ContextReport {
        id: context.id().to_string(),
        user: context.user_info().clone(),
        authentications: context
            .authentications()
            .iter()
            .map(|a| AuthenticationDisplay {
                service: a.security_service_id().to_string(),
                authorizations: a
                    .authorizations()
                    .iter()
                    .map(|authorization| AuthorizationDisplay::from(authorization.as_ref()))
                    .collect(),
            })
            .collect(),
        snapshot,
    };

    if print_json(&report, format)? {
        return Ok(());
    }

    println!("Context: {}", report.id);
    let user = &report.user;
    for (label, value) in [
        ("User id", &user.id),
        ("User name", &user.name),
        ("Locale", &user.locale),
        ("Organization", &user.organization),
        ("Division", &user.division),
    ] {
        if let Some(value) = value {
            println!("{}: {}", label, value);
        }
    }
    println!();

    for authentication in &report.authentications {
        println!(
            "Service {} ({} authorizations):",
            authentication.service,
            authentication.authorizations.len()
        );
        for authorization in &authentication.authorizations {
            if authorization.capabilities.is_empty() {
                println!("  {} [{}]", authorization.id, authorization.kind);
            } else {
                println!(
                    "  {} [{}]: {}",
                    authorization.id,
                    authorization.kind,
                    authorization.capabilities.join(", ")
                );
            }
        }
    }

    if let Some(snapshot) = &report.snapshot {
        println!();
        println!("Snapshot:");
        println!("{}", serde_json::to_string_pretty(snapshot)?);
    }

    Ok(())
}
