//! Folding maximal single-qubit gate runs into one gate per run.

use crate::context::TranspilationContext;
use crate::error::CompileResult;
use crate::numeric::{wrap_angle, zyz_decompose};
use crate::pass::Pass;
use qtx_ir::{Circuit, Gate, QubitId, Unitary2x2};
use rustc_hash::FxHashMap;
use std::f64::consts::{FRAC_PI_2, PI};

const FUSE_TOL: f64 = 1e-9;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < FUSE_TOL
}

/// Emit the simplest basis gate equal to `matrix`, per the recognized
/// special forms, falling back to a general `U3`.
fn emit_from_matrix(q: QubitId, matrix: &Unitary2x2) -> CompileResult<Gate> {
    let (theta, phi, gamma) = zyz_decompose(matrix)?;
    let phi = wrap_angle(phi);
    let gamma = wrap_angle(gamma);

    if theta.abs() < FUSE_TOL {
        return Ok(Gate::Rz(q, wrap_angle(phi + gamma)));
    }
    if approx(phi, 0.0) && approx(gamma, 0.0) {
        return Ok(Gate::Ry(q, theta));
    }
    if approx(phi, PI) && approx(gamma, PI) {
        return Ok(Gate::Ry(q, -theta));
    }
    if approx(phi, -FRAC_PI_2) && approx(gamma, FRAC_PI_2) {
        return Ok(Gate::Rx(q, theta));
    }
    if approx(phi, FRAC_PI_2) && approx(gamma, -FRAC_PI_2) {
        return Ok(Gate::Rx(q, -theta));
    }
    Ok(Gate::U3(q, theta, phi, gamma))
}

fn fuse(gates: &[Gate]) -> CompileResult<Vec<Gate>> {
    let mut out = Vec::with_capacity(gates.len());
    let mut pending: FxHashMap<usize, Unitary2x2> = FxHashMap::default();

    for gate in gates {
        if gate.is_single_qubit() {
            if let Some(m) = gate.matrix() {
                let q = gate.qubits()[0].index();
                let acc = pending.entry(q).or_insert_with(Unitary2x2::identity);
                *acc = m.mul(acc);
                continue;
            }
        }
        for q in gate.qubits() {
            if let Some(m) = pending.remove(&q.index()) {
                out.push(emit_from_matrix(q, &m)?);
            }
        }
        out.push(gate.clone());
    }

    let mut remaining: Vec<usize> = pending.keys().copied().collect();
    remaining.sort_unstable();
    for q in remaining {
        let m = pending.remove(&q).expect("key came from this map");
        out.push(emit_from_matrix(QubitId::from(q), &m)?);
    }

    Ok(out)
}

/// Folds maximal uninterrupted single-qubit gate runs on each wire into one
/// gate, recognizing `RZ`/`RY`/`RX` special forms before falling back to
/// `U3`.
#[derive(Debug, Default)]
pub struct FuseSingleQubit;

impl FuseSingleQubit {
    pub fn new() -> Self {
        Self
    }
}

impl Pass for FuseSingleQubit {
    fn name(&self) -> &str {
        "FuseSingleQubit"
    }

    fn run(&self, circuit: &Circuit, _context: &mut TranspilationContext) -> CompileResult<Circuit> {
        let gates = fuse(circuit.gates())?;
        Ok(circuit.with_gates(gates)?)
    }
}
