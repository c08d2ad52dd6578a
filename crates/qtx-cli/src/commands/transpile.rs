//! `transpile` command implementation.

use std::fs;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use console::style;

use qtx_compile::{PassManagerBuilder, TranspilationContext};

use super::common::{load_circuit, load_topology, parse_custom_layout};

#[derive(ClapArgs)]
pub struct Args {
    /// Circuit file (JSON, the serialized form of a circuit)
    #[arg(short, long)]
    circuit: String,

    /// Topology file (JSON edge list of physical qubit pairs)
    #[arg(short, long)]
    topology: String,

    /// Write the transpiled circuit to this file instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Fixed `logical->physical` mapping, e.g. "2,0,1", instead of SABRE layout
    #[arg(long)]
    custom_layout: Option<String>,

    /// RNG seed for SABRE layout and routing
    #[arg(long)]
    seed: Option<u64>,

    /// Number of SABRE layout trials
    #[arg(long, default_value = "8")]
    num_trials: usize,
}

/// Run the standard pipeline over a circuit/topology pair and print the
/// transpiled circuit and the layouts recorded in the context.
pub fn execute(args: &Args) -> Result<()> {
    println!(
        "{} Transpiling {} onto {}",
        style("→").cyan().bold(),
        style(&args.circuit).green(),
        style(&args.topology).yellow()
    );

    let circuit = load_circuit(&args.circuit)?;
    let coupling = load_topology(&args.topology)?;

    println!("  Loaded: {} qubits, {} gates", circuit.nqubits(), circuit.gates().len());

    let mut builder = PassManagerBuilder::new(coupling).with_num_trials(args.num_trials);
    if let Some(mapping) = &args.custom_layout {
        builder = builder.with_custom_layout(parse_custom_layout(mapping)?);
    }
    if let Some(seed) = args.seed {
        builder = builder.with_seed(seed);
    }

    let pm = builder.build();
    println!("  Running {} passes", pm.len());

    let mut context = TranspilationContext::new();
    let compiled = pm.run(&circuit, &mut context).with_context(|| "transpilation failed")?;

    println!("{} Transpilation complete", style("✓").green().bold());
    println!("  Result: {} gates on {} physical qubits", compiled.gates().len(), compiled.nqubits());

    if let Some(initial) = &context.initial_layout {
        println!("  Initial layout: {:?}", initial.as_slice());
    }
    if let Some(finale) = &context.final_layout {
        println!("  Final layout:   {:?}", finale.as_slice());
    }

    let serialized = serde_json::to_string_pretty(&compiled).with_context(|| "failed to serialize compiled circuit")?;
    match &args.output {
        Some(path) => {
            fs::write(path, serialized).with_context(|| format!("failed to write file: {path}"))?;
            println!("  Output: {}", style(path).green());
        }
        None => println!("{serialized}"),
    }

    Ok(())
}
