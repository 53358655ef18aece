//! Report generation for addressing plans.
//!
//! Renders the address plan (every block and every issued address) and the
//! topology plan as human-readable text, or serializes both as YAML/JSON.

use std::fmt;
use std::fs;
use std::path::Path;

use clap::ValueEnum;
use color_eyre::eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::ip::{AddressBlock, AddressSpaceRegistry};
use crate::topology::TopologyPlan;

/// Output format of the generated plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Yaml,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Text => "text",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Json => "json",
        };
        f.write_str(name)
    }
}

/// Serialized form of a complete plan
#[derive(Debug, Serialize)]
struct PlanDocument<'a> {
    address_spaces: Vec<LabeledBlock<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    topology: Option<&'a TopologyPlan>,
}

#[derive(Debug, Serialize)]
struct LabeledBlock<'a> {
    label: &'a str,
    #[serde(flatten)]
    block: &'a AddressBlock,
}

/// Render the address plan: each address space, its subnets recursively,
/// and the addresses issued at every level.
///
/// Issued addresses are listed in issue order, one line per address. A name
/// issued more than once therefore appears on several lines, once with each
/// of its addresses.
pub fn render_address_plan(registry: &AddressSpaceRegistry) -> String {
    let mut lines: Vec<String> = Vec::new();

    for entry in registry.enumerate() {
        let indent = "  ".repeat(entry.depth);
        if entry.depth == 0 {
            if !lines.is_empty() {
                lines.push(String::new());
            }
            lines.push(format!("{}: {}", entry.label, entry.block.cidr()));
        } else {
            lines.push(format!("{}Subnet: {}", indent, entry.block.cidr()));
        }

        for issued in entry.block.issued() {
            lines.push(format!("{}  {}: {}", indent, issued.name, issued.address));
        }
    }

    lines.push(String::new());
    lines.join("\n")
}

/// Render the topology plan as text
pub fn render_plan_text(plan: &TopologyPlan) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("Nodes:".to_string());
    for node in &plan.nodes {
        lines.push(format!("  {} ({})", node.name, node.kind));
        for intf in &node.interfaces {
            if let Some(address) = intf.address {
                lines.push(format!("    {}: {}", intf.name, address));
            }
        }
    }
    lines.push(String::new());

    lines.push("Links:".to_string());
    for link in &plan.links {
        lines.push(format!("  {}", link));
    }
    lines.push(String::new());

    lines.push("Routes:".to_string());
    for route in &plan.routes {
        lines.push(format!("  {}: {}", route.node, route.command()));
    }
    lines.push(String::new());

    lines.push("NAT rules:".to_string());
    for rule in &plan.nat_rules {
        lines.push(format!("  {}", rule));
    }
    lines.push(String::new());

    lines.join("\n")
}

/// Render the address plan, and the topology plan if given, in `format`
pub fn render(
    registry: &AddressSpaceRegistry,
    plan: Option<&TopologyPlan>,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let mut text = String::from("*** Address plan\n");
            text.push_str(&render_address_plan(registry));
            if let Some(plan) = plan {
                text.push_str("\n*** Topology\n");
                text.push_str(&render_plan_text(plan));
            }
            Ok(text)
        }
        OutputFormat::Yaml => serde_yaml::to_string(&document(registry, plan))
            .context("Failed to serialize plan to YAML"),
        OutputFormat::Json => serde_json::to_string_pretty(&document(registry, plan))
            .context("Failed to serialize plan to JSON"),
    }
}

/// Render and write the plan to `output_path`
pub fn write_plan(
    registry: &AddressSpaceRegistry,
    plan: Option<&TopologyPlan>,
    format: OutputFormat,
    output_path: &Path,
) -> Result<()> {
    let content = render(registry, plan, format)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
        }
    }

    fs::write(output_path, content)
        .with_context(|| format!("Failed to write plan to {}", output_path.display()))?;

    log::info!("{} plan written to {}", format, output_path.display());
    Ok(())
}

fn document<'a>(registry: &'a AddressSpaceRegistry, plan: Option<&'a TopologyPlan>) -> PlanDocument<'a> {
    let address_spaces = registry
        .enumerate()
        .filter(|entry| entry.depth == 0)
        .map(|entry| LabeledBlock {
            label: entry.label,
            block: entry.block,
        })
        .collect();

    PlanDocument {
        address_spaces,
        topology: plan,
    }
}
