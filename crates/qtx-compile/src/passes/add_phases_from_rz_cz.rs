//! Folding any leftover virtual-Z markers and `CZ` phase-error corrections
//! into the phase of each qubit's `Drag` pulses.
//!
//! This is the last pass in the standard pipeline: the Z-frame shift it
//! tracks per qubit is pure bookkeeping applied at each `Drag`, never
//! flushed as its own gate, since nothing downstream will read it back.

use crate::context::TranspilationContext;
use crate::error::{CompileError, CompileResult};
use crate::numeric::wrap_angle;
use crate::pass::Pass;
use qtx_ir::{Circuit, Gate, QubitId};
use rustc_hash::FxHashMap;

/// Per-qubit `CZ` phase-error corrections supplied by device calibration,
/// looked up as `q{i}_phase_correction`.
#[derive(Debug, Clone, Default)]
pub struct GateCalibration {
    corrections: FxHashMap<usize, f64>,
}

impl GateCalibration {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_correction(mut self, qubit: QubitId, phase: f64) -> Self {
        self.corrections.insert(qubit.index(), phase);
        self
    }

    /// `q{i}_phase_correction`, `0.0` if uncalibrated.
    pub fn phase_correction(&self, qubit: QubitId) -> f64 {
        self.corrections.get(&qubit.index()).copied().unwrap_or(0.0)
    }
}

/// Absorbs `RZ` markers and calibrated `CZ` phase errors into `Drag` phases.
#[derive(Debug, Clone, Default)]
pub struct AddPhasesFromRzAndCz {
    calibration: GateCalibration,
}

impl AddPhasesFromRzAndCz {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_calibration(mut self, calibration: GateCalibration) -> Self {
        self.calibration = calibration;
        self
    }

    fn apply(&self, gates: &[Gate]) -> CompileResult<Vec<Gate>> {
        let mut out = Vec::with_capacity(gates.len());
        let mut shift: FxHashMap<usize, f64> = FxHashMap::default();

        for gate in gates {
            match gate {
                Gate::Rz(q, phi) => {
                    *shift.entry(q.index()).or_insert(0.0) += phi;
                }
                Gate::Drag(q, theta, phi) => {
                    let s = shift.get(&q.index()).copied().unwrap_or(0.0);
                    out.push(Gate::Drag(*q, *theta, wrap_angle(phi + s)));
                }
                Gate::Cz(a, b) => {
                    *shift.entry(a.index()).or_insert(0.0) += self.calibration.phase_correction(*a);
                    *shift.entry(b.index()).or_insert(0.0) += self.calibration.phase_correction(*b);
                    out.push(Gate::Cz(*a, *b));
                }
                Gate::Measure(qs) => out.push(Gate::Measure(qs.clone())),
                other => {
                    return Err(CompileError::UnsupportedGate {
                        gate_name: other.name().to_string(),
                        pass_name: "AddPhasesFromRzAndCz",
                    })
                }
            }
        }

        Ok(out)
    }
}

impl Pass for AddPhasesFromRzAndCz {
    fn name(&self) -> &str {
        "AddPhasesFromRzAndCz"
    }

    fn run(&self, circuit: &Circuit, _context: &mut TranspilationContext) -> CompileResult<Circuit> {
        let gates = self.apply(circuit.gates())?;
        Ok(circuit.with_gates(gates)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(i: u32) -> QubitId {
        QubitId(i)
    }

    fn run(gates: Vec<Gate>, nqubits: usize, pass: &AddPhasesFromRzAndCz) -> Vec<Gate> {
        let circuit = Circuit::from_gates(nqubits, gates).unwrap();
        let mut ctx = TranspilationContext::new();
        pass.run(&circuit, &mut ctx).unwrap().gates().to_vec()
    }

    #[test]
    fn rz_marker_shifts_following_drag() {
        let out = run(
            vec![Gate::Rz(q(0), 0.5), Gate::Drag(q(0), 0.3, 0.1)],
            1,
            &AddPhasesFromRzAndCz::new(),
        );
        assert_eq!(out, vec![Gate::Drag(q(0), 0.3, 0.6)]);
    }

    #[test]
    fn shift_persists_across_multiple_drags() {
        let out = run(
            vec![
                Gate::Rz(q(0), 0.2),
                Gate::Drag(q(0), 0.1, 0.0),
                Gate::Drag(q(0), 0.1, 0.0),
            ],
            1,
            &AddPhasesFromRzAndCz::new(),
        );
        assert_eq!(out, vec![Gate::Drag(q(0), 0.1, 0.2), Gate::Drag(q(0), 0.1, 0.2)]);
    }

    #[test]
    fn cz_phase_correction_shifts_subsequent_drags() {
        let calibration = GateCalibration::new().with_correction(q(0), 0.3).with_correction(q(1), -0.1);
        let pass = AddPhasesFromRzAndCz::new().with_calibration(calibration);
        let out = run(
            vec![Gate::Cz(q(0), q(1)), Gate::Drag(q(0), 0.1, 0.0), Gate::Drag(q(1), 0.1, 0.0)],
            2,
            &pass,
        );
        assert_eq!(
            out,
            vec![Gate::Cz(q(0), q(1)), Gate::Drag(q(0), 0.1, 0.3), Gate::Drag(q(1), 0.1, -0.1)]
        );
    }

    #[test]
    fn measurement_passes_through_unchanged() {
        let out = run(vec![Gate::Measure(vec![q(0)])], 1, &AddPhasesFromRzAndCz::new());
        assert_eq!(out, vec![Gate::Measure(vec![q(0)])]);
    }

    #[test]
    fn unsupported_gate_is_fatal() {
        let circuit = Circuit::from_gates(1, vec![Gate::H(q(0))]).unwrap();
        let mut ctx = TranspilationContext::new();
        let err = AddPhasesFromRzAndCz::new().run(&circuit, &mut ctx).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedGate { .. }));
    }
}
