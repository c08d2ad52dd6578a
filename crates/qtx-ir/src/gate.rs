//! Gate model.
//!
//! A [`Gate`] is a tagged value, not a trait object: the pipeline needs to
//! pattern-match on gate identity constantly (cancellation, basis translation,
//! native-set lowering) and a closed enum keeps that exhaustive. Parameters
//! are plain `f64` radians rather than a symbolic expression tree — the
//! pipeline only ever transpiles fully bound circuits.

use crate::qubit::QubitId;
use crate::unitary::Unitary2x2;
use serde::{Deserialize, Serialize};

/// A single operation in a circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Gate {
    /// Identity.
    I(QubitId),
    /// Pauli-X.
    X(QubitId),
    /// Pauli-Y.
    Y(QubitId),
    /// Pauli-Z.
    Z(QubitId),
    /// Hadamard.
    H(QubitId),
    /// Phase gate, S = sqrt(Z).
    S(QubitId),
    /// T = fourth root of Z.
    T(QubitId),
    /// Rotation about X by `theta` radians.
    Rx(QubitId, f64),
    /// Rotation about Y by `theta` radians.
    Ry(QubitId, f64),
    /// Rotation about Z by `theta` radians.
    Rz(QubitId, f64),
    /// Single-parameter phase gate, diag(1, e^{i lambda}).
    U1(QubitId, f64),
    /// Two-parameter gate, U3(pi/2, phi, lambda).
    U2(QubitId, f64, f64),
    /// General single-qubit unitary, U3(theta, phi, lambda).
    U3(QubitId, f64, f64, f64),
    /// Controlled-NOT, `(control, target)`.
    Cnot(QubitId, QubitId),
    /// Controlled-Z, symmetric in its two qubits.
    Cz(QubitId, QubitId),
    /// SWAP.
    Swap(QubitId, QubitId),
    /// An arbitrary single- or two-qubit `base` gate controlled on zero or
    /// more additional qubits. A single control with a single-qubit base is
    /// the common case; more controls require ancilla-free synthesis before
    /// the gate can be scheduled on hardware.
    Controlled {
        controls: Vec<QubitId>,
        base: Box<Gate>,
    },
    /// The adjoint (conjugate transpose) of the wrapped gate.
    Adjoint(Box<Gate>),
    /// `exp(i * base)`, i.e. the wrapped gate raised to a continuous power.
    /// Used transiently during synthesis; never appears in a native-set
    /// circuit.
    Exponential(Box<Gate>),
    /// Measurement of one or more qubits. There is no classical-bit target:
    /// the pipeline only tracks which qubits are measured, not where results
    /// are stored.
    Measure(Vec<QubitId>),
    /// Hardware microwave drive, `R_MW(theta, phi) = Rz(phi) . Rx(theta) . Rz(-phi)`.
    Drag(QubitId, f64, f64),
    /// Idle for `duration` (arbitrary time units, device-defined).
    Wait(QubitId, f64),
}

impl Gate {
    /// A short, stable name for diagnostics and native-set matching.
    pub fn name(&self) -> &'static str {
        match self {
            Gate::I(_) => "I",
            Gate::X(_) => "X",
            Gate::Y(_) => "Y",
            Gate::Z(_) => "Z",
            Gate::H(_) => "H",
            Gate::S(_) => "S",
            Gate::T(_) => "T",
            Gate::Rx(..) => "RX",
            Gate::Ry(..) => "RY",
            Gate::Rz(..) => "RZ",
            Gate::U1(..) => "U1",
            Gate::U2(..) => "U2",
            Gate::U3(..) => "U3",
            Gate::Cnot(..) => "CNOT",
            Gate::Cz(..) => "CZ",
            Gate::Swap(..) => "SWAP",
            Gate::Controlled { .. } => "CONTROLLED",
            Gate::Adjoint(_) => "ADJOINT",
            Gate::Exponential(_) => "EXP",
            Gate::Measure(_) => "M",
            Gate::Drag(..) => "DRAG",
            Gate::Wait(..) => "WAIT",
        }
    }

    /// The qubits this gate acts on, in a stable order (controls before
    /// base qubits for [`Gate::Controlled`], wrapped gate's qubits for
    /// [`Gate::Adjoint`]/[`Gate::Exponential`]).
    pub fn qubits(&self) -> Vec<QubitId> {
        match self {
            Gate::I(q)
            | Gate::X(q)
            | Gate::Y(q)
            | Gate::Z(q)
            | Gate::H(q)
            | Gate::S(q)
            | Gate::T(q)
            | Gate::Rx(q, _)
            | Gate::Ry(q, _)
            | Gate::Rz(q, _)
            | Gate::U1(q, _)
            | Gate::U2(q, ..)
            | Gate::U3(q, ..)
            | Gate::Drag(q, ..)
            | Gate::Wait(q, _) => vec![*q],
            Gate::Cnot(a, b) | Gate::Cz(a, b) | Gate::Swap(a, b) => vec![*a, *b],
            Gate::Controlled { controls, base } => {
                let mut qs = controls.clone();
                qs.extend(base.qubits());
                qs
            }
            Gate::Adjoint(inner) | Gate::Exponential(inner) => inner.qubits(),
            Gate::Measure(qs) => qs.clone(),
        }
    }

    /// Whether this gate acts on exactly one qubit.
    pub fn is_single_qubit(&self) -> bool {
        self.qubits().len() == 1
    }

    /// The gate's 2x2 unitary matrix, if it is a plain single-qubit gate
    /// (directly, or through [`Gate::Adjoint`]/[`Gate::Exponential`] wrapping
    /// one). Returns `None` for multi-qubit gates, measurement, and wait.
    pub fn matrix(&self) -> Option<Unitary2x2> {
        match self {
            Gate::I(_) => Some(Unitary2x2::identity()),
            Gate::X(_) => Some(Unitary2x2::x()),
            Gate::Y(_) => Some(Unitary2x2::y()),
            Gate::Z(_) => Some(Unitary2x2::z()),
            Gate::H(_) => Some(Unitary2x2::h()),
            Gate::S(_) => Some(Unitary2x2::s()),
            Gate::T(_) => Some(Unitary2x2::t()),
            Gate::Rx(_, theta) => Some(Unitary2x2::rx(*theta)),
            Gate::Ry(_, theta) => Some(Unitary2x2::ry(*theta)),
            Gate::Rz(_, theta) => Some(Unitary2x2::rz(*theta)),
            Gate::U1(_, lambda) => Some(Unitary2x2::u1(*lambda)),
            Gate::U2(_, phi, lambda) => Some(Unitary2x2::u2(*phi, *lambda)),
            Gate::U3(_, theta, phi, lambda) => Some(Unitary2x2::u3(*theta, *phi, *lambda)),
            Gate::Drag(_, theta, phi) => Some(
                Unitary2x2::rz(*phi)
                    .mul(&Unitary2x2::rx(*theta))
                    .mul(&Unitary2x2::rz(-phi)),
            ),
            Gate::Adjoint(inner) => inner.matrix().map(|m| m.dagger()),
            Gate::Exponential(_) => None,
            Gate::Cnot(..)
            | Gate::Cz(..)
            | Gate::Swap(..)
            | Gate::Controlled { .. }
            | Gate::Measure(_)
            | Gate::Wait(..) => None,
        }
    }

    /// The single qubit index this gate acts on, if it is single-qubit.
    pub fn single_qubit(&self) -> Option<QubitId> {
        if self.is_single_qubit() {
            self.qubits().first().copied()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controlled_qubits_put_controls_first() {
        let g = Gate::Controlled {
            controls: vec![QubitId(0), QubitId(1)],
            base: Box::new(Gate::X(QubitId(2))),
        };
        assert_eq!(g.qubits(), vec![QubitId(0), QubitId(1), QubitId(2)]);
        assert!(!g.is_single_qubit());
    }

    #[test]
    fn adjoint_of_single_qubit_gate_has_dagger_matrix() {
        let g = Gate::Adjoint(Box::new(Gate::S(QubitId(0))));
        let m = g.matrix().unwrap();
        let s_dagger = Unitary2x2::s().dagger();
        for (a, b) in m.data.iter().zip(s_dagger.data.iter()) {
            assert!((a - b).norm() < 1e-12);
        }
    }

    #[test]
    fn measure_and_wait_have_no_matrix() {
        assert!(Gate::Measure(vec![QubitId(0)]).matrix().is_none());
        assert!(Gate::Wait(QubitId(0), 10.0).matrix().is_none());
    }

    #[test]
    fn drag_matches_virtual_z_sandwich() {
        let g = Gate::Drag(QubitId(0), 0.3, 0.7);
        let m = g.matrix().unwrap();
        let expect = Unitary2x2::rz(0.7)
            .mul(&Unitary2x2::rx(0.3))
            .mul(&Unitary2x2::rz(-0.7));
        for (a, b) in m.data.iter().zip(expect.data.iter()) {
            assert!((a - b).norm() < 1e-12);
        }
    }

    #[test]
    fn drag_at_quarter_pi_phase_matches_ry_up_to_global_phase() {
        // Rz(pi/2) . Rx(theta) . Rz(-pi/2) == Ry(theta), the identity
        // `to_native_set` relies on when lowering RY into a Drag pulse.
        let theta = 0.42;
        let drag = Gate::Drag(QubitId(0), theta, std::f64::consts::FRAC_PI_2).matrix().unwrap();
        let ry = Unitary2x2::ry(theta);
        for (a, b) in drag.data.iter().zip(ry.data.iter()) {
            assert!((a - b).norm() < 1e-12, "{a:?} != {b:?}");
        }
    }
}
