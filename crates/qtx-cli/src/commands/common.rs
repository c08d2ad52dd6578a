//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use qtx_compile::CouplingMap;
use qtx_ir::Circuit;

/// Load a circuit from a JSON file (the serialized form of [`Circuit`]).
pub fn load_circuit(path: &str) -> Result<Circuit> {
    let path_obj = Path::new(path);
    if !path_obj.exists() {
        anyhow::bail!("File not found: {path}");
    }
    let source = fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;
    serde_json::from_str(&source).with_context(|| format!("Failed to parse circuit: {path}"))
}

/// Load a topology from a JSON file holding a flat `[physical_a, physical_b]`
/// edge list.
pub fn load_topology(path: &str) -> Result<CouplingMap> {
    let path_obj = Path::new(path);
    if !path_obj.exists() {
        anyhow::bail!("File not found: {path}");
    }
    let source = fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;
    let edges: Vec<(usize, usize)> =
        serde_json::from_str(&source).with_context(|| format!("Failed to parse topology: {path}"))?;
    CouplingMap::from_edges(&edges).map_err(|e| anyhow::anyhow!("Invalid topology: {e}"))
}

/// Parse a comma-separated `logical->physical` mapping, e.g. `"2,0,1"` means
/// logical qubit 0 sits on physical qubit 2.
pub fn parse_custom_layout(raw: &str) -> Result<Vec<usize>> {
    raw.split(',')
        .map(|s| s.trim().parse::<usize>().with_context(|| format!("Invalid physical qubit: '{s}'")))
        .collect()
}
