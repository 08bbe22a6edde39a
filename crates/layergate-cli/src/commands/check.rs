//! Check command - Evaluate access decisions for a token.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Result, anyhow};
use clap::Args;
use serde::Serialize;

use layergate::prelude::*;

use super::{authenticate, load_manager, print_json, yes_no};
use crate::OutputFormat;

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    /// Token to authenticate
    #[arg(short, long, required = true)]
    pub token: String,

    /// Tool to check (repeatable)
    #[arg(long)]
    pub tool: Vec<String>,

    /// Command to check (repeatable)
    #[arg(long)]
    pub command: Vec<String>,

    /// Layer to check
    #[arg(short, long)]
    pub layer: Option<String>,

    /// Feature id to check within the layer
    #[arg(long, requires = "layer")]
    pub feature: Option<String>,

    /// Feature attribute value, as name=value (repeatable)
    #[arg(long = "value", value_parser = parse_key_value, requires = "feature")]
    pub values: Vec<(String, String)>,

    /// Attribute to check on the feature (repeatable)
    #[arg(long, requires = "feature")]
    pub attribute: Vec<String>,
}

fn parse_key_value(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected name=value, got '{s}'"))?;
    Ok((key.to_string(), value.to_string()))
}

/// Decision report.
#[derive(Debug, Serialize)]
struct CheckReport {
    context: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    tools: BTreeMap<String, bool>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    commands: BTreeMap<String, bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    layer: Option<LayerReport>,
}

#[derive(Debug, Serialize)]
struct LayerReport {
    id: String,
    visible: bool,
    update: bool,
    create: bool,
    delete: bool,
    visible_area: Option<Geometry>,
    partly_visible_sufficient: bool,
    filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    feature: Option<FeatureReport>,
}

#[derive(Debug, Serialize)]
struct FeatureReport {
    id: String,
    visible: bool,
    update: bool,
    create: bool,
    delete: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, AttributeReport>,
}

#[derive(Debug, Serialize)]
struct AttributeReport {
    readable: bool,
    writable: bool,
}

fn layer_report(context: &SecurityContext, layer_id: &str, feature: Option<Feature>, attributes: &[String]) -> LayerReport {
    let feature = feature.map(|feature| FeatureReport {
        id: feature.id.clone(),
        visible: context.is_feature_visible(layer_id, &feature),
        update: context.is_feature_update_authorized(layer_id, &feature),
        create: context.is_feature_create_authorized(layer_id, &feature),
        delete: context.is_feature_delete_authorized(layer_id, &feature),
        attributes: attributes
            .iter()
            .map(|name| {
                let report = AttributeReport {
                    readable: context.is_attribute_readable(layer_id, &feature, name),
                    writable: context.is_attribute_writable(layer_id, &feature, name),
                };
                (name.clone(), report)
            })
            .collect(),
    });

    LayerReport {
        id: layer_id.to_string(),
        visible: context.is_layer_visible(layer_id),
        update: context.is_layer_update_authorized(layer_id),
        create: context.is_layer_create_authorized(layer_id),
        delete: context.is_layer_delete_authorized(layer_id),
        visible_area: context.visible_area(layer_id),
        partly_visible_sufficient: context.is_partly_visible_sufficient(layer_id),
        filter: context.feature_filter(layer_id).map(|f| f.to_string()),
        feature,
    }
}

fn describe_area(area: Option<&Geometry>) -> String {
    match area {
        None => "none".to_string(),
        Some(area) => match area.bounds() {
            None => "nothing".to_string(),
            Some(bounds) => format!("{} part(s) within {} (SRID {})", area.parts().len(), bounds, area.srid()),
        },
    }
}

/// Execute the check command.
pub fn execute(args: CheckArgs, config: Option<&Path>, format: OutputFormat) -> Result<()> {
    let (_, manager) = load_manager(config)?;
    let context = authenticate(&manager, &args.token)?;

    let feature = args.feature.as_ref().map(|id| {
        args.values
            .iter()
            .fold(Feature::new(id.as_str()), |feature, (name, value)| {
                feature.with_attribute(name.as_str(), value.as_str())
            })
    });

    let report = CheckReport {
        context: context.id().to_string(),
        tools: args
            .tool
            .iter()
            .map(|t| (t.clone(), context.is_tool_authorized(t)))
            .collect(),
        commands: args
            .command
            .iter()
            .map(|c| (c.clone(), context.is_command_authorized(c)))
            .collect(),
        layer: args
            .layer
            .as_deref()
            .map(|layer_id| layer_report(&context, layer_id, feature, &args.attribute)),
    };

    if print_json(&report, format)? {
        return Ok(());
    }

    println!("Context: {}", report.context);
    for (tool, authorized) in &report.tools {
        println!("Tool {}: {}", tool, yes_no(*authorized));
    }
    for (command, authorized) in &report.commands {
        println!("Command {}: {}", command, yes_no(*authorized));
    }

    if let Some(layer) = &report.layer {
        println!();
        println!("Layer: {}", layer.id);
        println!("  visible: {}", yes_no(layer.visible));
        println!("  update:  {}", yes_no(layer.update));
        println!("  create:  {}", yes_no(layer.create));
        println!("  delete:  {}", yes_no(layer.delete));
        println!("  visible area: {}", describe_area(layer.visible_area.as_ref()));
        println!("  partly visible sufficient: {}", yes_no(layer.partly_visible_sufficient));
        println!("  filter: {}", layer.filter.as_deref().unwrap_or("none"));

        if let Some(feature) = &layer.feature {
            println!();
            println!("  Feature: {}", feature.id);
            println!("    visible: {}", yes_no(feature.visible));
            println!("    update:  {}", yes_no(feature.update));
            println!("    create:  {}", yes_no(feature.create));
            println!("    delete:  {}", yes_no(feature.delete));
            for (name, attribute) in &feature.attributes {
                println!(
                    "    attribute {}: read {}, write {}",
                    name,
                    yes_no(attribute.readable),
                    yes_no(attribute.writable)
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("owner=bob").unwrap(),
            ("owner".to_string(), "bob".to_string())
        );
        assert_eq!(
            parse_key_value("expr=a=b").unwrap(),
            ("expr".to_string(), "a=b".to_string())
        );
        assert!(parse_key_value("owner").is_err());
    }

    #[test]
    fn test_describe_area() {
        assert_eq!(describe_area(None), "none");
        assert_eq!(describe_area(Some(&Geometry::empty(4326))), "nothing");

        let area = Geometry::from_envelope(Envelope::new(0.0, 0.0, 1.0, 2.0), 4326);
        assert_eq!(describe_area(Some(&area)), "1 part(s) within [0 0, 1 2] (SRID 4326)");
    }
}
