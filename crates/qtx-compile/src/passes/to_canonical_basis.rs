//! Lowering to the canonical basis `{U3, RX, RY, RZ, CZ, M}`.

use crate::context::TranspilationContext;
use crate::error::{CompileError, CompileResult};
use crate::numeric::{principal_sqrt, zyz_decompose};
use crate::pass::Pass;
use qtx_ir::{Circuit, Gate, QubitId};
use std::f64::consts::{FRAC_PI_2, PI};

fn expand_h(q: QubitId) -> Gate {
    Gate::U3(q, FRAC_PI_2, 0.0, PI)
}

pub(crate) fn expand_cnot(c: QubitId, t: QubitId) -> Vec<Gate> {
    vec![expand_h(t), Gate::Cz(c, t), expand_h(t)]
}

pub(crate) fn expand_swap(a: QubitId, b: QubitId) -> Vec<Gate> {
    let mut gates = expand_cnot(a, b);
    gates.extend(expand_cnot(b, a));
    gates.extend(expand_cnot(a, b));
    gates
}

fn adjoint_basis_gate(g: &Gate) -> CompileResult<Gate> {
    match g {
        Gate::U3(q, theta, phi, gamma) => Ok(Gate::U3(*q, -theta, -gamma, -phi)),
        Gate::Rx(q, theta) => Ok(Gate::Rx(*q, -theta)),
        Gate::Ry(q, theta) => Ok(Gate::Ry(*q, -theta)),
        Gate::Rz(q, phi) => Ok(Gate::Rz(*q, -phi)),
        Gate::Cz(a, b) => Ok(Gate::Cz(*a, *b)),
        other => Err(CompileError::UnsupportedGate {
            gate_name: other.name().to_string(),
            pass_name: "ToCanonicalBasis",
        }),
    }
}

/// `CRZ(lambda) = (I⊗RZ(lambda/2)) . CX . (I⊗RZ(-lambda/2)) . CX`, CX already
/// expanded into canonical-basis gates.
fn crz_gates(c: QubitId, t: QubitId, lambda: f64) -> Vec<Gate> {
    let mut seq = vec![Gate::Rz(t, lambda / 2.0)];
    seq.extend(expand_cnot(c, t));
    seq.push(Gate::Rz(t, -lambda / 2.0));
    seq.extend(expand_cnot(c, t));
    seq
}

/// Standard two-CX synthesis of `CU3(theta, phi, lambda)`.
fn cu3_gates(c: QubitId, t: QubitId, theta: f64, phi: f64, lambda: f64) -> Vec<Gate> {
    let mut seq = vec![
        Gate::Rz(c, (lambda + phi) / 2.0),
        Gate::Rz(t, (lambda - phi) / 2.0),
    ];
    seq.extend(expand_cnot(c, t));
    seq.push(Gate::U3(t, -theta / 2.0, 0.0, -(phi + lambda) / 2.0));
    seq.extend(expand_cnot(c, t));
    seq.push(Gate::U3(t, theta / 2.0, phi, 0.0));
    seq
}

/// Ancilla-free synthesis of a `Controlled^k(base)` gate, `base` single-qubit.
fn canonicalize_controlled(controls: &[QubitId], base: &Gate) -> CompileResult<Vec<Gate>> {
    if !base.is_single_qubit() {
        return Err(CompileError::MultiQubitControlBase);
    }
    let target = base.qubits()[0];
    let k = controls.len();

    if k == 0 {
        return canonicalize(base);
    }

    if k == 1 {
        let c = controls[0];
        return match base {
            Gate::Rz(_, lambda) => Ok(crz_gates(c, target, *lambda)),
            Gate::Rx(_, theta) => {
                let mut seq = vec![Gate::Ry(target, -FRAC_PI_2)];
                seq.extend(crz_gates(c, target, *theta));
                seq.push(Gate::Ry(target, FRAC_PI_2));
                Ok(seq)
            }
            Gate::Ry(_, theta) => {
                let mut seq = vec![Gate::Rx(target, FRAC_PI_2)];
                seq.extend(crz_gates(c, target, *theta));
                seq.push(Gate::Rx(target, -FRAC_PI_2));
                Ok(seq)
            }
            _ => {
                let m = base.matrix().ok_or_else(|| CompileError::UnsupportedGate {
                    gate_name: base.name().to_string(),
                    pass_name: "ToCanonicalBasis",
                })?;
                let (theta, phi, lambda) = zyz_decompose(&m)?;
                Ok(cu3_gates(c, target, theta, phi, lambda))
            }
        };
    }

    // k > 1: C^{k-1}(V) . CNOT(c_last, t) . C^{k-1}(V†) . CNOT(c_last, t) . C^{k-1}(V),
    // with V^2 == base's unitary.
    let m = base.matrix().ok_or_else(|| CompileError::UnsupportedGate {
        gate_name: base.name().to_string(),
        pass_name: "ToCanonicalBasis",
    })?;
    let v = principal_sqrt(&m);
    let (vt, vp, vg) = zyz_decompose(&v)?;
    let v_gate = Gate::U3(target, vt, vp, vg);
    let (dt, dp, dg) = zyz_decompose(&v.dagger())?;
    let v_dagger_gate = Gate::U3(target, dt, dp, dg);

    let remaining = &controls[..k - 1];
    let c_last = controls[k - 1];

    let mut seq = canonicalize_controlled(remaining, &v_gate)?;
    seq.extend(expand_cnot(c_last, target));
    seq.extend(canonicalize_controlled(remaining, &v_dagger_gate)?);
    seq.extend(expand_cnot(c_last, target));
    seq.extend(canonicalize_controlled(remaining, &v_gate)?);
    Ok(seq)
}

fn canonicalize(gate: &Gate) -> CompileResult<Vec<Gate>> {
    match gate {
        Gate::I(_) => Ok(vec![]),
        Gate::H(q) => Ok(vec![expand_h(*q)]),
        Gate::X(q) => Ok(vec![Gate::Rx(*q, PI)]),
        Gate::Y(q) => Ok(vec![Gate::Ry(*q, PI)]),
        Gate::Z(q) => Ok(vec![Gate::Rz(*q, PI)]),
        Gate::S(_) | Gate::T(_) | Gate::Drag(..) => {
            let q = gate.qubits()[0];
            let m = gate
                .matrix()
                .expect("S, T, and Drag always expose a matrix");
            let (theta, phi, gamma) = zyz_decompose(&m)?;
            Ok(vec![Gate::U3(q, theta, phi, gamma)])
        }
        Gate::Rx(..) | Gate::Ry(..) | Gate::Rz(..) | Gate::U3(..) => Ok(vec![gate.clone()]),
        Gate::U1(q, phi) => Ok(vec![Gate::Rz(*q, *phi)]),
        Gate::U2(q, phi, gamma) => Ok(vec![Gate::U3(*q, FRAC_PI_2, *phi, *gamma)]),
        Gate::Cnot(c, t) => Ok(expand_cnot(*c, *t)),
        Gate::Cz(..) => Ok(vec![gate.clone()]),
        Gate::Swap(a, b) => Ok(expand_swap(*a, *b)),
        Gate::Adjoint(inner) => {
            let inner_canonical = canonicalize(inner)?;
            inner_canonical
                .into_iter()
                .rev()
                .map(|g| adjoint_basis_gate(&g))
                .collect()
        }
        Gate::Exponential(inner) => {
            if !inner.is_single_qubit() {
                return Err(CompileError::UnsupportedGate {
                    gate_name: inner.name().to_string(),
                    pass_name: "ToCanonicalBasis",
                });
            }
            let m = inner.matrix().ok_or_else(|| CompileError::UnsupportedGate {
                gate_name: inner.name().to_string(),
                pass_name: "ToCanonicalBasis",
            })?;
            let q = inner.qubits()[0];
            let (theta, phi, gamma) = zyz_decompose(&m)?;
            Ok(vec![Gate::U3(q, theta, phi, gamma)])
        }
        Gate::Controlled { controls, base } => canonicalize_controlled(controls, base),
        Gate::Measure(qs) => Ok(vec![Gate::Measure(qs.clone())]),
        Gate::Wait(..) => Err(CompileError::UnsupportedGate {
            gate_name: gate.name().to_string(),
            pass_name: "ToCanonicalBasis",
        }),
    }
}

/// Rewrites arbitrary gates into `{U3, RX, RY, RZ, CZ, M}`.
#[derive(Debug, Default)]
pub struct ToCanonicalBasis;

impl ToCanonicalBasis {
    pub fn new() -> Self {
        Self
    }
}

impl Pass for ToCanonicalBasis {
    fn name(&self) -> &str {
        "ToCanonicalBasis"
    }

    fn run(&self, circuit: &Circuit, _context: &mut TranspilationContext) -> CompileResult<Circuit> {
        let mut gates = Vec::with_capacity(circuit.gates().len());
        for gate in circuit.gates() {
            gates.extend(canonicalize(gate)?);
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

    fn in_basis(gate: &Gate) -> bool {
        matches!(
            gate,
            Gate::U3(..) | Gate::Rx(..) | Gate::Ry(..) | Gate::Rz(..) | Gate::Cz(..) | Gate::Measure(_)
        )
    }

    fn run(gates: Vec<Gate>, nqubits: usize) -> Circuit {
        let circuit = Circuit::from_gates(nqubits, gates).unwrap();
        let mut ctx = TranspilationContext::new();
        ToCanonicalBasis::new().run(&circuit, &mut ctx).unwrap()
    }

    #[test]
    fn every_output_gate_is_in_canonical_basis() {
        let out = run(
            vec![
                Gate::H(q(0)),
                Gate::Cnot(q(0), q(1)),
                Gate::Swap(q(0), q(1)),
                Gate::S(q(0)),
            ],
            2,
        );
        assert!(out.gates().iter().all(in_basis));
    }

    #[test]
    fn rejects_multi_qubit_control_base() {
        let circuit = Circuit::from_gates(
            3,
            vec![Gate::Controlled {
                controls: vec![q(0)],
                base: Box::new(Gate::Cnot(q(1), q(2))),
            }],
        )
        .unwrap();
        let mut ctx = TranspilationContext::new();
        let err = ToCanonicalBasis::new().run(&circuit, &mut ctx).unwrap_err();
        assert!(matches!(err, CompileError::MultiQubitControlBase));
    }

    #[test]
    fn doubly_controlled_rx_synthesizes_without_ancilla_in_canonical_basis() {
        let out = run(
            vec![Gate::Controlled {
                controls: vec![q(0), q(1)],
                base: Box::new(Gate::Rx(q(2), PI / 3.0)),
            }],
            3,
        );
        assert!(out.gates().iter().all(in_basis));
        assert!(out.gates().iter().all(|g| g.qubits().iter().all(|q| q.index() < 3)));
        assert!(!out.gates().is_empty());
    }

    #[test]
    fn wait_gate_is_unsupported() {
        let circuit = Circuit::from_gates(1, vec![Gate::Wait(q(0), 5.0)]).unwrap();
        let mut ctx = TranspilationContext::new();
        let err = ToCanonicalBasis::new().run(&circuit, &mut ctx).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedGate { .. }));
    }

    #[test]
    fn adjoint_of_u3_negates_and_reorders_angles() {
        let out = run(vec![Gate::Adjoint(Box::new(Gate::U3(q(0), 0.3, 0.4, 0.5)))], 1);
        assert_eq!(out.gates(), &[Gate::U3(q(0), -0.3, -0.5, -0.4)]);
    }
}
