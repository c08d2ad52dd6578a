//! SABRE routing: inserts SWAPs so every two-qubit gate lands on an adjacent
//! pair of physical qubits, preserving each qubit's original gate order.
//!
//! Always simulates starting from an identity layout over its own input —
//! it never re-reads [`TranspilationContext::initial_layout`]. When this
//! pass runs after [`super::sabre_layout::SabreLayout`] or
//! [`super::custom_layout::CustomLayout`], the circuit it receives has
//! already been relabeled to physical qubits, so "identity" here means
//! "don't relabel again". [`TranspilationContext::final_layout`] is the
//! composition of that prior layout with the swaps this pass inserts.

use crate::context::TranspilationContext;
use crate::error::{CompileError, CompileResult};
use crate::pass::Pass;
use crate::passes::sabre_layout::{extended_set, front_set, remap_gate, SabreHyperparams};
use crate::passes::to_canonical_basis::expand_swap;
use crate::property::{CouplingMap, Layout};
use qtx_ir::{Circuit, Gate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;

fn per_qubit_op_lists(gates: &[Gate], nqubits: usize) -> Vec<Vec<usize>> {
    let mut lists = vec![Vec::new(); nqubits];
    for (k, gate) in gates.iter().enumerate() {
        for q in gate.qubits() {
            lists[q.index()].push(k);
        }
    }
    lists
}

fn is_front_for_all(k: usize, gate: &Gate, per_qubit: &[Vec<usize>], pos: &[usize]) -> bool {
    gate.qubits()
        .iter()
        .all(|q| per_qubit[q.index()].get(pos[q.index()]) == Some(&k))
}

struct RouteResult {
    gates: Vec<Gate>,
    layout: Layout,
}

fn route(
    gates: &[Gate],
    nqubits: usize,
    coupling: &CouplingMap,
    mut layout: Layout,
    hyperparams: &SabreHyperparams,
    rng: &mut StdRng,
) -> CompileResult<RouteResult> {
    let per_qubit = per_qubit_op_lists(gates, nqubits);
    let mut pos = vec![0usize; nqubits];
    let mut scheduled = vec![false; gates.len()];
    let mut out = Vec::with_capacity(gates.len());
    let mut decay = vec![0.0f64; coupling.num_nodes()];
    // gate index -> (distance when it first entered the front set, swaps applied since)
    let mut budget: FxHashMap<usize, (usize, usize)> = FxHashMap::default();

    loop {
        loop {
            let mut progressed = false;
            for k in 0..gates.len() {
                if scheduled[k] || !is_front_for_all(k, &gates[k], &per_qubit, &pos) {
                    continue;
                }
                let qs = gates[k].qubits();
                let ready = match qs.len() {
                    2 => coupling.is_adjacent(layout.physical(qs[0].index()), layout.physical(qs[1].index())),
                    0 | 1 => true,
                    _ if matches!(gates[k], Gate::Measure(_)) => true,
                    _ => {
                        return Err(CompileError::UnsupportedGate {
                            gate_name: gates[k].name().to_string(),
                            pass_name: "SabreSwap",
                        })
                    }
                };
                if ready {
                    scheduled[k] = true;
                    out.push(remap_gate(&gates[k], &layout));
                    for q in &qs {
                        pos[q.index()] += 1;
                    }
                    budget.remove(&k);
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
        for &k in &front {
            budget.entry(k).or_insert_with(|| {
                let qs = gates[k].qubits();
                let d = coupling.distance(layout.physical(qs[0].index()), layout.physical(qs[1].index()));
                (d.max(1), 0)
            });
        }

        let extended = extended_set(&per_qubit, &pos, &front, hyperparams.lookahead_size);

        for d in decay.iter_mut() {
            *d *= hyperparams.decay_lambda;
        }

        let mut candidates: Vec<(usize, usize)> = Vec::new();
        for &k in &front {
            let qs = gates[k].qubits();
            for &physical in &[layout.physical(qs[0].index()), layout.physical(qs[1].index())] {
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

        let mut best: Option<(usize, usize)> = None;
        let mut best_cost = f64::INFINITY;
        for &(a, b) in &candidates {
            let mut tentative = layout.clone();
            tentative.swap_physical(a, b);

            let cost_f: f64 = front
                .iter()
                .map(|&k| {
                    let qs = gates[k].qubits();
                    let (pu, pv) = (tentative.physical(qs[0].index()), tentative.physical(qs[1].index()));
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
                .filter_map(|&k| {
                    let qs = gates[k].qubits();
                    if qs.len() != 2 {
                        return None;
                    }
                    let (pu, pv) = (tentative.physical(qs[0].index()), tentative.physical(qs[1].index()));
                    let d = coupling.distance(pu, pv);
                    Some(if d == usize::MAX { 1e6 } else { d as f64 })
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
        out.extend(expand_swap(
            qtx_ir::QubitId::from(a),
            qtx_ir::QubitId::from(b),
        ));

        for (&k, (initial_distance, swaps_since)) in budget.iter_mut() {
            *swaps_since += 1;
            let allowed = 8 * (*initial_distance);
            if *swaps_since > allowed {
                let qs = gates[k].qubits();
                return Err(CompileError::SwapBudgetExceeded {
                    logical_a: qs[0],
                    logical_b: qs[1],
                    budget: allowed,
                });
            }
        }
    }

    Ok(RouteResult { gates: out, layout })
}

/// Inserts SWAPs (expressed as canonical-basis `CZ`/`U3` sequences) to route
/// every two-qubit gate onto an adjacent physical pair.
#[derive(Debug, Clone)]
pub struct SabreSwap {
    coupling: CouplingMap,
    seed: Option<u64>,
    hyperparams: SabreHyperparams,
}

impl SabreSwap {
    pub fn new(coupling: CouplingMap) -> Self {
        Self {
            coupling,
            seed: None,
            hyperparams: SabreHyperparams::default(),
        }
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

impl Pass for SabreSwap {
    fn name(&self) -> &str {
        "SabreSwap"
    }

    fn run(&self, circuit: &Circuit, context: &mut TranspilationContext) -> CompileResult<Circuit> {
        if !self.coupling.is_connected() {
            return Err(CompileError::DisconnectedTopology);
        }
        let nqubits = circuit.nqubits();
        if nqubits > self.coupling.num_nodes() {
            return Err(CompileError::DisconnectedTopology);
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let identity = Layout::trivial(nqubits);
        let result = route(circuit.gates(), nqubits, &self.coupling, identity, &self.hyperparams, &mut rng)?;
        let output = Circuit::from_gates(nqubits, result.gates)?;

        context.final_layout = Some(match &context.initial_layout {
            Some(initial) => {
                let composed: Vec<usize> = (0..initial.len())
                    .map(|l| result.layout.physical(initial.physical(l)))
                    .collect();
                Layout::from_mapping(composed)?
            }
            None => result.layout,
        });

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qtx_ir::QubitId;

    fn q(i: u32) -> QubitId {
        QubitId(i)
    }

    fn in_basis(gate: &Gate) -> bool {
        matches!(gate, Gate::U3(..) | Gate::Rx(..) | Gate::Ry(..) | Gate::Rz(..) | Gate::Cz(..) | Gate::Measure(_))
    }

    #[test]
    fn already_adjacent_gate_needs_no_swap() {
        let coupling = CouplingMap::linear(3).unwrap();
        let circuit = Circuit::from_gates(3, vec![Gate::Cz(q(0), q(1))]).unwrap();
        let mut ctx = TranspilationContext::new();
        let out = SabreSwap::new(coupling).with_seed(Some(1)).run(&circuit, &mut ctx).unwrap();
        assert_eq!(out.gates(), &[Gate::Cz(q(0), q(1))]);
        assert!(ctx.final_layout.is_some());
    }

    #[test]
    fn distant_gate_gets_routed_via_swap_on_a_line() {
        let coupling = CouplingMap::linear(3).unwrap();
        let circuit = Circuit::from_gates(3, vec![Gate::Cz(q(0), q(2))]).unwrap();
        let mut ctx = TranspilationContext::new();
        let out = SabreSwap::new(coupling).with_seed(Some(3)).run(&circuit, &mut ctx).unwrap();
        assert!(out.gates().iter().all(in_basis));
        assert!(out.gates().len() > 1);
    }

    #[test]
    fn preserves_per_qubit_gate_order() {
        let coupling = CouplingMap::linear(3).unwrap();
        let circuit = Circuit::from_gates(
            3,
            vec![Gate::Rx(q(0), 0.1), Gate::Cz(q(0), q(2)), Gate::Ry(q(2), 0.2)],
        )
        .unwrap();
        let mut ctx = TranspilationContext::new();
        let out = SabreSwap::new(coupling).with_seed(Some(5)).run(&circuit, &mut ctx).unwrap();
        let rx_pos = out.gates().iter().position(|g| matches!(g, Gate::Rx(..)));
        let cz_pos = out.gates().iter().position(|g| matches!(g, Gate::Cz(..)));
        assert!(rx_pos.unwrap() < cz_pos.unwrap());
    }

    #[test]
    fn rejects_circuit_larger_than_device() {
        let coupling = CouplingMap::linear(2).unwrap();
        let circuit = Circuit::new(5);
        let mut ctx = TranspilationContext::new();
        let err = SabreSwap::new(coupling).run(&circuit, &mut ctx).unwrap_err();
        assert!(matches!(err, CompileError::DisconnectedTopology));
    }

    #[test]
    fn rejects_higher_arity_non_measure_gate() {
        let coupling = CouplingMap::linear(3).unwrap();
        let circuit = Circuit::from_gates(
            3,
            vec![Gate::Controlled {
                controls: vec![q(0), q(1)],
                base: Box::new(Gate::X(q(2))),
            }],
        )
        .unwrap();
        let mut ctx = TranspilationContext::new();
        let err = SabreSwap::new(coupling).with_seed(Some(1)).run(&circuit, &mut ctx).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedGate { pass_name: "SabreSwap", .. }));
    }

    #[test]
    fn composes_final_layout_with_prior_initial_layout() {
        let coupling = CouplingMap::linear(3).unwrap();
        let circuit = Circuit::from_gates(3, vec![Gate::Cz(q(0), q(2))]).unwrap();
        let mut ctx = TranspilationContext::new();
        ctx.initial_layout = Some(Layout::from_mapping(vec![2, 1, 0]).unwrap());
        let _ = SabreSwap::new(coupling).with_seed(Some(9)).run(&circuit, &mut ctx).unwrap();
        assert_eq!(ctx.final_layout.unwrap().len(), 3);
    }
}
