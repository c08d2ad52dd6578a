//! Fixed-point cancellation of adjacent inverse gate pairs.

use crate::context::TranspilationContext;
use crate::error::CompileResult;
use crate::numeric::{dephased_signature, wrap_angle};
use crate::pass::Pass;
use qtx_ir::{Circuit, Gate};

const ANGLE_SCALE: f64 = 1e9;

#[derive(Debug, Clone, PartialEq)]
enum GateKey {
    /// An involution: forward and inverse coincide.
    Inv(&'static str),
    /// A single rounded-angle parameter.
    Param(&'static str, i64),
    /// `U3(theta, phi, gamma)`, each rounded.
    U3(i64, i64, i64),
    /// `Controlled^k` wrapping another key.
    Controlled(Box<GateKey>, usize),
    /// Matrix-signature fallback for gates with no named rule.
    Signature([(i64, i64); 4]),
}

fn round_angle(theta: f64) -> i64 {
    (wrap_angle(theta) * ANGLE_SCALE).round() as i64
}

/// `(forward_key, inverse_key, qubit_key)` for a gate, or `None` if the gate
/// has no cancellation rule and must act as an unconditional barrier.
fn gate_keys(gate: &Gate) -> Option<(GateKey, GateKey, Vec<usize>)> {
    match gate {
        Gate::H(q) => Some((GateKey::Inv("H"), GateKey::Inv("H"), vec![q.index()])),
        Gate::X(q) => Some((GateKey::Inv("X"), GateKey::Inv("X"), vec![q.index()])),
        Gate::Y(q) => Some((GateKey::Inv("Y"), GateKey::Inv("Y"), vec![q.index()])),
        Gate::Z(q) => Some((GateKey::Inv("Z"), GateKey::Inv("Z"), vec![q.index()])),
        Gate::Cnot(c, t) => Some((
            GateKey::Inv("CNOT"),
            GateKey::Inv("CNOT"),
            vec![c.index(), t.index()],
        )),
        Gate::Cz(a, b) => {
            let mut qs = [a.index(), b.index()];
            qs.sort_unstable();
            Some((GateKey::Inv("CZ"), GateKey::Inv("CZ"), qs.to_vec()))
        }
        Gate::Swap(a, b) => {
            let mut qs = [a.index(), b.index()];
            qs.sort_unstable();
            Some((GateKey::Inv("SWAP"), GateKey::Inv("SWAP"), qs.to_vec()))
        }
        Gate::Rx(q, theta) => Some((
            GateKey::Param("RX", round_angle(*theta)),
            GateKey::Param("RX", round_angle(-theta)),
            vec![q.index()],
        )),
        Gate::Ry(q, theta) => Some((
            GateKey::Param("RY", round_angle(*theta)),
            GateKey::Param("RY", round_angle(-theta)),
            vec![q.index()],
        )),
        Gate::Rz(q, phi) => Some((
            GateKey::Param("RZ", round_angle(*phi)),
            GateKey::Param("RZ", round_angle(-phi)),
            vec![q.index()],
        )),
        Gate::U1(q, phi) => Some((
            GateKey::Param("U1", round_angle(*phi)),
            GateKey::Param("U1", round_angle(-phi)),
            vec![q.index()],
        )),
        Gate::U2(q, phi, gamma) => {
            // U2(phi, gamma) is keyed as U3(pi/2, phi, gamma).
            let theta = std::f64::consts::FRAC_PI_2;
            Some((
                GateKey::U3(round_angle(theta), round_angle(*phi), round_angle(*gamma)),
                GateKey::U3(round_angle(-theta), round_angle(-gamma), round_angle(-phi)),
                vec![q.index()],
            ))
        }
        Gate::U3(q, theta, phi, gamma) => Some((
            GateKey::U3(round_angle(*theta), round_angle(*phi), round_angle(*gamma)),
            GateKey::U3(round_angle(-theta), round_angle(-gamma), round_angle(-phi)),
            vec![q.index()],
        )),
        Gate::Adjoint(inner) => {
            let (forward, inverse, qubits) = gate_keys(inner)?;
            Some((inverse, forward, qubits))
        }
        Gate::Controlled { controls, base } => {
            let (forward, inverse, base_qubits) = gate_keys(base)?;
            let k = controls.len();
            let mut qubits: Vec<usize> = controls.iter().map(|q| q.index()).collect();
            qubits.extend(base_qubits);
            Some((
                GateKey::Controlled(Box::new(forward), k),
                GateKey::Controlled(Box::new(inverse), k),
                qubits,
            ))
        }
        // Fallback: any remaining gate with a well-defined matrix (S, T,
        // Drag, ...) is keyed by its dephased signature and that of its
        // dagger.
        _ => {
            let matrix = gate.matrix()?;
            let forward = GateKey::Signature(dephased_signature(&matrix));
            let inverse = GateKey::Signature(dephased_signature(&matrix.dagger()));
            let qubits = gate.qubits().iter().map(|q| q.index()).collect();
            Some((forward, inverse, qubits))
        }
    }
}

fn overlaps(a: &[usize], b: &[usize]) -> bool {
    a.iter().any(|x| b.contains(x))
}

struct StackEntry {
    forward: GateKey,
    qubits: Vec<usize>,
    index: usize,
}

/// One linear sweep of the cancellation rule. Returns the surviving gates
/// and whether anything changed.
fn cancel_once(gates: &[Gate]) -> (Vec<Gate>, bool) {
    let mut stack: Vec<StackEntry> = Vec::new();
    let mut deleted = vec![false; gates.len()];

    for (i, gate) in gates.iter().enumerate() {
        if matches!(gate, Gate::I(_)) {
            deleted[i] = true;
            continue;
        }
        if let Gate::Measure(qs) = gate {
            let qidx: Vec<usize> = qs.iter().map(|q| q.index()).collect();
            stack.retain(|e| !overlaps(&e.qubits, &qidx));
            continue;
        }
        match gate_keys(gate) {
            None => {
                let qidx: Vec<usize> = gate.qubits().iter().map(|q| q.index()).collect();
                stack.retain(|e| !overlaps(&e.qubits, &qidx));
            }
            Some((forward, inverse, qubits)) => {
                if let Some(pos) = stack
                    .iter()
                    .position(|e| e.qubits == qubits && e.forward == inverse)
                {
                    let matched = stack.remove(pos);
                    deleted[matched.index] = true;
                    deleted[i] = true;
                } else {
                    stack.retain(|e| !overlaps(&e.qubits, &qubits));
                    stack.push(StackEntry {
                        forward,
                        qubits,
                        index: i,
                    });
                }
            }
        }
    }

    let changed = deleted.iter().any(|&d| d);
    let survivors = gates
        .iter()
        .zip(deleted.iter())
        .filter(|(_, &d)| !d)
        .map(|(g, _)| g.clone())
        .collect();
    (survivors, changed)
}

/// Fixed-point removal of adjacent gate pairs whose composition is the
/// identity, up to global phase.
#[derive(Debug, Default)]
pub struct IdentityCancel;

impl IdentityCancel {
    pub fn new() -> Self {
        Self
    }
}

impl Pass for IdentityCancel {
    fn name(&self) -> &str {
        "IdentityCancel"
    }

    fn run(&self, circuit: &Circuit, _context: &mut TranspilationContext) -> CompileResult<Circuit> {
        let mut gates = circuit.gates().to_vec();
        loop {
            let (next, changed) = cancel_once(&gates);
            gates = next;
            if !changed {
                break;
            }
        }
        Ok(circuit.with_gates(gates)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qtx_ir::QubitId;

    fn q(i: u32) -> QubitId {
        QubitId(i)
    }

    fn run(gates: Vec<Gate>, nqubits: usize) -> Vec<Gate> {
        let circuit = Circuit::from_gates(nqubits, gates).unwrap();
        let mut ctx = TranspilationContext::new();
        IdentityCancel::new()
            .run(&circuit, &mut ctx)
            .unwrap()
            .gates()
            .to_vec()
    }

    #[test]
    fn hermitian_cancel() {
        let out = run(vec![Gate::H(q(0)), Gate::H(q(0))], 2);
        assert!(out.is_empty());
    }

    #[test]
    fn parameter_inverse_cancels_without_blocker() {
        let out = run(vec![Gate::Rx(q(0), 0.7), Gate::Rx(q(0), -0.7)], 1);
        assert!(out.is_empty());
    }

    #[test]
    fn parameter_inverse_blocked_by_intervening_same_qubit_gate() {
        let out = run(
            vec![Gate::Rx(q(0), 0.7), Gate::Rz(q(0), 0.1), Gate::Rx(q(0), -0.7)],
            1,
        );
        assert_eq!(
            out,
            vec![Gate::Rx(q(0), 0.7), Gate::Rz(q(0), 0.1), Gate::Rx(q(0), -0.7)]
        );
    }

    #[test]
    fn cz_cancels_regardless_of_argument_order() {
        let out = run(vec![Gate::Cz(q(0), q(1)), Gate::Cz(q(1), q(0))], 2);
        assert!(out.is_empty());
    }

    #[test]
    fn cnot_involution_cancels() {
        let out = run(vec![Gate::Cnot(q(0), q(1)), Gate::Cnot(q(0), q(1))], 2);
        assert!(out.is_empty());
    }

    #[test]
    fn u3_inverse_pair_cancels() {
        let out = run(
            vec![
                Gate::U3(q(0), 0.3, 0.4, 0.5),
                Gate::U3(q(0), -0.3, -0.5, -0.4),
            ],
            1,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn measurement_blocks_cancellation_across_itself() {
        let out = run(
            vec![Gate::H(q(0)), Gate::Measure(vec![q(0)]), Gate::H(q(0))],
            1,
        );
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn disjoint_qubits_commute_through_a_blocker() {
        let out = run(
            vec![Gate::H(q(0)), Gate::X(q(1)), Gate::H(q(0))],
            2,
        );
        assert_eq!(out, vec![Gate::X(q(1))]);
    }

    #[test]
    fn adjoint_of_s_cancels_bare_s_via_matrix_signature() {
        let out = run(
            vec![Gate::S(q(0)), Gate::Adjoint(Box::new(Gate::S(q(0))))],
            1,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn is_idempotent() {
        let gates = vec![
            Gate::H(q(0)),
            Gate::Rx(q(0), 0.7),
            Gate::Rz(q(1), 0.2),
            Gate::Rx(q(0), -0.7),
            Gate::H(q(0)),
        ];
        let once = run(gates.clone(), 2);
        let twice = run(once.clone(), 2);
        assert_eq!(once, twice);
    }
}
