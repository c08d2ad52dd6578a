//! Multi-trial SABRE simulation for choosing an initial logical→physical
//! layout.
//!
//! This only simulates: no SWAPs are inserted into the returned circuit.
//! [`crate::passes::sabre_swap::SabreSwap`] does the actual routing, reusing
//! the same front/extended-set heuristic starting from the layout this pass
//! chooses.

use crate::context::TranspilationContext;
use crate::error::{CompileError, CompileResult};
use crate::pass::Pass;
use crate::property::{CouplingMap, Layout};
use qtx_ir::{Circuit, Gate, QubitId};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

#[derive(Debug, Clone, Copy)]
pub(crate) struct TwoQubitOp {
    pub(crate) u: usize,
    pub(crate) v: usize,
}

pub(crate) fn two_qubit_ops(gates: &[Gate]) -> Vec<TwoQubitOp> {
    gates
        .iter()
        .filter(|g| g.qubits().len() == 2)
        .map(|g| {
            let qs = g.qubits();
            TwoQubitOp {
                u: qs[0].index(),
                v: qs[1].index(),
            }
        })
        .collect()
}

pub(crate) fn per_qubit_op_lists(ops: &[TwoQubitOp], nqubits: usize) -> Vec<Vec<usize>> {
    let mut lists = vec![Vec::new(); nqubits];
    for (k, op) in ops.iter().enumerate() {
        lists[op.u].push(k);
        lists[op.v].push(k);
    }
    lists
}

pub(crate) fn front_set(per_qubit: &[Vec<usize>], pos: &[usize]) -> Vec<usize> {
    let mut front = Vec::new();
    for (q, ops) in per_qubit.iter().enumerate() {
        if let Some(&k) = ops.get(pos[q]) {
            if !front.contains(&k) {
                front.push(k);
            }
        }
    }
    front
}

pub(crate) fn extended_set(per_qubit: &[Vec<usize>], pos: &[usize], front: &[usize], cap: usize) -> Vec<usize> {
    let mut extended = Vec::new();
    let mut seen: Vec<usize> = front.to_vec();
    let mut cursors: Vec<usize> = pos.iter().map(|&p| p + 1).collect();

    loop {
        if extended.len() >= cap {
            break;
        }
        let mut progressed = false;
        for (q, ops) in per_qubit.iter().enumerate() {
            if extended.len() >= cap {
                break;
            }
            if cursors[q] >= ops.len() {
                continue;
            }
            let k = ops[cursors[q]];
            cursors[q] += 1;
            progressed = true;
            if !seen.contains(&k) {
                seen.push(k);
                extended.push(k);
            }
        }
        if !progressed {
            break;
        }
    }
    extended
}

pub(crate) fn candidate_edges(
    front: &[usize],
    ops: &[TwoQubitOp],
    layout: &Layout,
    coupling: &CouplingMap,
) -> Vec<(usize, usize)> {
    let mut candidates: Vec<(usize, usize)> = Vec::new();
    for &k in front {
        let op = &ops[k];
        for &physical in &[layout.physical(op.u), layout.physical(op.v)] {
            for &neighbor in coupling.neighbors(physical) {
                let edge = if physical < neighbor {
                    (physical, neighbor)
                } else {
                    (neighbor, physical)
                };
                if !candidates.contains(&edge) {
                    candidates.push(edge);
                }
            }
        }
    }
    candidates.sort_unstable();
    candidates
}

pub(crate) fn distance_cost(coupling: &CouplingMap, pu: usize, pv: usize) -> f64 {
    let d = coupling.distance(pu, pv);
    if d == usize::MAX {
        1e6
    } else {
        d as f64
    }
}

/// Hyperparameters shared by SABRE layout simulation and SABRE routing.
#[derive(Debug, Clone, Copy)]
pub struct SabreHyperparams {
    pub lookahead_size: usize,
    pub beta: f64,
    pub decay_delta: f64,
    pub decay_lambda: f64,
}

impl Default for SabreHyperparams {
    fn default() -> Self {
        Self {
            lookahead_size: 10,
            beta: 0.5,
            decay_delta: 1e-3,
            decay_lambda: 0.99,
        }
    }
}

/// Run one simulated trial starting from `layout`, returning the layout
/// reached at the end of the simulation plus its diagnostic score. Mutates
/// only its own clone of `layout`; the caller's copy is untouched.
fn simulate_trial(
    ops: &[TwoQubitOp],
    nqubits: usize,
    coupling: &CouplingMap,
    mut layout: Layout,
    hyperparams: &SabreHyperparams,
    rng: &mut StdRng,
) -> (Layout, f64) {
    let per_qubit = per_qubit_op_lists(ops, nqubits);
    let mut pos = vec![0usize; nqubits];
    let mut scheduled = vec![false; ops.len()];
    let mut decay = vec![0.0f64; coupling.num_nodes()];
    let mut score_accum = 0.0f64;

    let is_front_for_both = |k: usize, pos: &[usize]| {
        let op = &ops[k];
        per_qubit[op.u].get(pos[op.u]) == Some(&k) && per_qubit[op.v].get(pos[op.v]) == Some(&k)
    };

    loop {
        loop {
            let mut progressed = false;
            for k in 0..ops.len() {
                if scheduled[k] || !is_front_for_both(k, &pos) {
                    continue;
                }
                let op = &ops[k];
                let (pu, pv) = (layout.physical(op.u), layout.physical(op.v));
                if coupling.distance(pu, pv) == 1 {
                    scheduled[k] = true;
                    pos[op.u] += 1;
                    pos[op.v] += 1;
                    score_accum += 1.0;
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
        }

        if scheduled.iter().all(|&s| s) {
            break;
        }

        let front = front_set(&per_qubit, &pos);
        let extended = extended_set(&per_qubit, &pos, &front, hyperparams.lookahead_size);

        for d in decay.iter_mut() {
            *d *= hyperparams.decay_lambda;
        }

        let candidates = candidate_edges(&front, ops, &layout, coupling);
        let mut best: Option<(usize, usize)> = None;
        let mut best_cost = f64::INFINITY;
        for &(a, b) in &candidates {
            let mut tentative = layout.clone();
            tentative.swap_physical(a, b);

            let cost_f: f64 = front
                .iter()
                .map(|&k| {
                    let op = &ops[k];
                    let (pu, pv) = (tentative.physical(op.u), tentative.physical(op.v));
                    let d = coupling.distance(pu, pv);
                    if d == usize::MAX {
                        1e6
                    } else {
                        (d as f64) * (1.0 + decay[pu] + decay[pv])
                    }
                })
                .sum();
            let cost_e: f64 = extended
                .iter()
                .map(|&k| {
                    let op = &ops[k];
                    distance_cost(coupling, tentative.physical(op.u), tentative.physical(op.v))
                })
                .sum();
            let total = cost_f + hyperparams.beta * cost_e;

            if total < best_cost - 1e-9 {
                best_cost = total;
                best = Some((a, b));
            } else if (total - best_cost).abs() < 1e-9 && rng.gen::<f64>() < 0.5 {
                best = Some((a, b));
            }
        }

        let (a, b) = best.expect("a connected coupling graph always has a candidate swap edge");
        layout.swap_physical(a, b);
        decay[a] += hyperparams.decay_delta;
        decay[b] += hyperparams.decay_delta;
    }

    let sum_all_dist: f64 = ops
        .iter()
        .map(|op| distance_cost(coupling, layout.physical(op.u), layout.physical(op.v)))
        .sum();
    let score = 0.5 * sum_all_dist + 0.5 * score_accum;
    (layout, score)
}

pub(crate) fn remap_gate(gate: &Gate, layout: &Layout) -> Gate {
    let map_q = |q: QubitId| QubitId::from(layout.physical(q.index()));
    match gate {
        Gate::I(q) => Gate::I(map_q(*q)),
        Gate::X(q) => Gate::X(map_q(*q)),
        Gate::Y(q) => Gate::Y(map_q(*q)),
        Gate::Z(q) => Gate::Z(map_q(*q)),
        Gate::H(q) => Gate::H(map_q(*q)),
        Gate::S(q) => Gate::S(map_q(*q)),
        Gate::T(q) => Gate::T(map_q(*q)),
        Gate::Rx(q, t) => Gate::Rx(map_q(*q), *t),
        Gate::Ry(q, t) => Gate::Ry(map_q(*q), *t),
        Gate::Rz(q, t) => Gate::Rz(map_q(*q), *t),
        Gate::U1(q, p) => Gate::U1(map_q(*q), *p),
        Gate::U2(q, p, g) => Gate::U2(map_q(*q), *p, *g),
        Gate::U3(q, t, p, g) => Gate::U3(map_q(*q), *t, *p, *g),
        Gate::Cnot(a, b) => Gate::Cnot(map_q(*a), map_q(*b)),
        Gate::Cz(a, b) => Gate::Cz(map_q(*a), map_q(*b)),
        Gate::Swap(a, b) => Gate::Swap(map_q(*a), map_q(*b)),
        Gate::Controlled { controls, base } => Gate::Controlled {
            controls: controls.iter().map(|q| map_q(*q)).collect(),
            base: Box::new(remap_gate(base, layout)),
        },
        Gate::Adjoint(inner) => Gate::Adjoint(Box::new(remap_gate(inner, layout))),
        Gate::Exponential(inner) => Gate::Exponential(Box::new(remap_gate(inner, layout))),
        Gate::Measure(qs) => Gate::Measure(qs.iter().map(|q| map_q(*q)).collect()),
        Gate::Drag(q, t, p) => Gate::Drag(map_q(*q), *t, *p),
        Gate::Wait(q, t) => Gate::Wait(map_q(*q), *t),
    }
}

/// Computes an initial logical→physical layout by running several
/// independent SABRE simulation trials and keeping the lowest-scoring one.
#[derive(Debug, Clone)]
pub struct SabreLayout {
    coupling: CouplingMap,
    num_trials: usize,
    seed: Option<u64>,
    hyperparams: SabreHyperparams,
}

impl SabreLayout {
    pub fn new(coupling: CouplingMap) -> Self {
        Self {
            coupling,
            num_trials: 8,
            seed: None,
            hyperparams: SabreHyperparams::default(),
        }
    }

    #[must_use]
    pub fn with_num_trials(mut self, num_trials: usize) -> Self {
        self.num_trials = num_trials;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_lookahead_size(mut self, lookahead_size: usize) -> Self {
        self.hyperparams.lookahead_size = lookahead_size;
        self
    }

    #[must_use]
    pub fn with_beta(mut self, beta: f64) -> Self {
        self.hyperparams.beta = beta;
        self
    }

    #[must_use]
    pub fn with_decay_delta(mut self, decay_delta: f64) -> Self {
        self.hyperparams.decay_delta = decay_delta;
        self
    }

    #[must_use]
    pub fn with_decay_lambda(mut self, decay_lambda: f64) -> Self {
        self.hyperparams.decay_lambda = decay_lambda;
        self
    }
}

impl Pass for SabreLayout {
    fn name(&self) -> &str {
        "SabreLayout"
    }

    fn run(&self, circuit: &Circuit, context: &mut TranspilationContext) -> CompileResult<Circuit> {
        if !self.coupling.is_connected() {
            return Err(CompileError::DisconnectedTopology);
        }
        let nqubits = circuit.nqubits();
        if self.coupling.num_nodes() < nqubits {
            return Err(CompileError::DisconnectedTopology);
        }

        let ops = two_qubit_ops(circuit.gates());
        let mut master_rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut best: Option<(f64, usize, Layout)> = None;
        for trial in 0..self.num_trials.max(1) {
            let mut trial_rng = StdRng::seed_from_u64(master_rng.gen::<u64>());
            let mut physical: Vec<usize> = (0..self.coupling.num_nodes()).collect();
            physical.shuffle(&mut trial_rng);
            let initial = Layout::from_mapping(physical[..nqubits].to_vec())?;

            let (final_layout, score) =
                simulate_trial(&ops, nqubits, &self.coupling, initial, &self.hyperparams, &mut trial_rng);

            let better = match &best {
                None => true,
                Some((best_score, best_trial, _)) => {
                    score < *best_score || (score == *best_score && trial < *best_trial)
                }
            };
            if better {
                best = Some((score, trial, final_layout));
            }
        }

        let (_, _, chosen) = best.expect("at least one trial always runs");
        let remapped: Vec<Gate> = circuit.gates().iter().map(|g| remap_gate(g, &chosen)).collect();
        let output = Circuit::from_gates(self.coupling.num_nodes(), remapped)?;
        context.initial_layout = Some(chosen);
        Ok(output)
    }
}
