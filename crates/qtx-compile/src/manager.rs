//! Pass manager: runs a fixed sequence of passes over a circuit, threading
//! the transpilation context through each step.

use crate::context::TranspilationContext;
use crate::error::CompileResult;
use crate::pass::Pass;
use crate::passes::{
    AddPhasesFromRzAndCz, CustomLayout, FuseSingleQubit, IdentityCancel, SabreLayout, SabreSwap,
    ToCanonicalBasis, ToNativeSet,
};
use crate::property::CouplingMap;
use qtx_ir::Circuit;
use tracing::{debug, info, instrument};

/// An ordered list of passes, run in sequence over a circuit.
pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// An empty pass manager.
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    /// Append a pass to the end of the pipeline.
    #[must_use]
    pub fn add_pass(mut self, pass: Box<dyn Pass>) -> Self {
        self.passes.push(pass);
        self
    }

    /// Number of passes in the pipeline.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Whether the pipeline has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Run every pass in sequence, recording each pass's output into
    /// `context`'s history.
    #[instrument(skip(self, circuit, context))]
    pub fn run(&self, circuit: &Circuit, context: &mut TranspilationContext) -> CompileResult<Circuit> {
        let mut current = circuit.clone();
        for pass in &self.passes {
            if !pass.should_run(&current, context) {
                debug!(pass = pass.name(), "skipping pass");
                continue;
            }
            info!(pass = pass.name(), gates = current.gates().len(), "running pass");
            current = pass.run(&current, context)?;
            context.record(pass.name(), current.clone());
            debug!(pass = pass.name(), gates = current.gates().len(), "pass complete");
        }
        Ok(current)
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the standard transpilation pipeline described in the system
/// overview: `IdentityCancel -> ToCanonicalBasis -> FuseSingleQubit ->
/// (SabreLayout + SabreSwap | CustomLayout) -> ToCanonicalBasis ->
/// FuseSingleQubit -> ToNativeSet -> AddPhasesFromRZ&CZ`.
pub struct PassManagerBuilder {
    coupling_map: CouplingMap,
    custom_layout: Option<Vec<usize>>,
    num_trials: usize,
    seed: Option<u64>,
    lookahead_size: usize,
    beta: f64,
    decay_delta: f64,
    decay_lambda: f64,
}

impl PassManagerBuilder {
    /// Start building a pipeline targeting `coupling_map`.
    pub fn new(coupling_map: CouplingMap) -> Self {
        Self {
            coupling_map,
            custom_layout: None,
            num_trials: 8,
            seed: None,
            lookahead_size: 10,
            beta: 0.5,
            decay_delta: 1e-3,
            decay_lambda: 0.99,
        }
    }

    /// Use a fixed user-supplied `logical -> physical` mapping instead of
    /// running SABRE layout.
    #[must_use]
    pub fn with_custom_layout(mut self, mapping: Vec<usize>) -> Self {
        self.custom_layout = Some(mapping);
        self
    }

    /// Override the number of SABRE layout trials (default 8).
    #[must_use]
    pub fn with_num_trials(mut self, num_trials: usize) -> Self {
        self.num_trials = num_trials;
        self
    }

    /// Fix the RNG seed used by SABRE's trials and swap insertion.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Override the extended-set lookahead cap (default 10).
    #[must_use]
    pub fn with_lookahead_size(mut self, lookahead_size: usize) -> Self {
        self.lookahead_size = lookahead_size;
        self
    }

    /// Override the extended-set cost weight (default 0.5).
    #[must_use]
    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    /// Override the per-swap decay increment (default 1e-3).
    #[must_use]
    pub fn with_decay_delta(mut self, decay_delta: f64) -> Self {
        self.decay_delta = decay_delta;
        self
    }

    /// Override the per-iteration decay factor (default 0.99).
    #[must_use]
    pub fn with_decay_lambda(mut self, decay_lambda: f64) -> Self {
        self.decay_lambda = decay_lambda;
        self
    }

    /// Build the pass manager.
    pub fn build(self) -> PassManager {
        let mut manager = PassManager::new()
            .add_pass(Box::new(IdentityCancel::new()))
            .add_pass(Box::new(ToCanonicalBasis::new()))
            .add_pass(Box::new(FuseSingleQubit::new()));

        manager = match self.custom_layout {
            Some(mapping) => manager.add_pass(Box::new(CustomLayout::new(mapping, self.coupling_map.clone()))),
            None => manager.add_pass(Box::new(
                SabreLayout::new(self.coupling_map.clone())
                    .with_num_trials(self.num_trials)
                    .with_seed(self.seed)
                    .with_lookahead_size(self.lookahead_size)
                    .with_beta(self.beta)
                    .with_decay_delta(self.decay_delta)
                    .with_decay_lambda(self.decay_lambda),
            )),
        };

        manager
            .add_pass(Box::new(
                SabreSwap::new(self.coupling_map)
                    .with_seed(self.seed)
                    .with_lookahead_size(self.lookahead_size)
                    .with_beta(self.beta)
                    .with_decay_delta(self.decay_delta)
                    .with_decay_lambda(self.decay_lambda),
            ))
            .add_pass(Box::new(ToCanonicalBasis::new()))
            .add_pass(Box::new(FuseSingleQubit::new()))
            .add_pass(Box::new(ToNativeSet::new()))
            .add_pass(Box::new(AddPhasesFromRzAndCz::new()))
    }
}
