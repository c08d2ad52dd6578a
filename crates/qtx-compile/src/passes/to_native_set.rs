//! Lowering `{U3, RX, RY, RZ, CZ, M}` to the hardware-native `{Drag, CZ, M,
//! RZ}`, accumulating Z-frame shifts instead of emitting them as pulses.

use crate::context::TranspilationContext;
use crate::error::{CompileError, CompileResult};
use crate::numeric::wrap_angle;
use crate::pass::Pass;
use qtx_ir::{Circuit, Gate, QubitId};
use rustc_hash::FxHashMap;
use std::f64::consts::FRAC_PI_2;

/// Lowers the canonical basis to `{Drag, CZ, M}`, with optional explicit
/// `RZ` virtual-Z markers.
#[derive(Debug, Clone)]
pub struct ToNativeSet {
    /// Emit accumulated Z shifts as explicit `RZ` markers (default `true`).
    pub keep_virtual_rz: bool,
    /// Accumulate consecutive `RZ`s into one shift instead of emitting each
    /// individually (default `true`).
    pub merge_consecutive_rz: bool,
    /// Drop the pending Z shift on a qubit when it reaches a measurement,
    /// rather than flushing it as an `RZ` (default `true`).
    pub drop_rz_before_measure: bool,
    /// Angles with absolute value below this are treated as zero (default
    /// `1e-12`).
    pub angle_tol: f64,
}

impl Default for ToNativeSet {
    fn default() -> Self {
        Self {
            keep_virtual_rz: true,
            merge_consecutive_rz: true,
            drop_rz_before_measure: true,
            angle_tol: 1e-12,
        }
    }
}

impl ToNativeSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_keep_virtual_rz(mut self, keep: bool) -> Self {
        self.keep_virtual_rz = keep;
        self
    }

    #[must_use]
    pub fn with_merge_consecutive_rz(mut self, merge: bool) -> Self {
        self.merge_consecutive_rz = merge;
        self
    }

    #[must_use]
    pub fn with_drop_rz_before_measure(mut self, drop: bool) -> Self {
        self.drop_rz_before_measure = drop;
        self
    }

    #[must_use]
    pub fn with_angle_tol(mut self, tol: f64) -> Self {
        self.angle_tol = tol;
        self
    }

    fn flush(&self, q: QubitId, pending: &mut FxHashMap<usize, f64>, out: &mut Vec<Gate>) {
        if let Some(shift) = pending.remove(&q.index()) {
            if self.keep_virtual_rz && shift.abs() > self.angle_tol {
                out.push(Gate::Rz(q, wrap_angle(shift)));
            }
        }
    }

    fn lower(&self, gates: &[Gate]) -> CompileResult<Vec<Gate>> {
        let mut out = Vec::with_capacity(gates.len());
        let mut pending: FxHashMap<usize, f64> = FxHashMap::default();

        for gate in gates {
            match gate {
                Gate::Rx(q, theta) => {
                    self.flush(*q, &mut pending, &mut out);
                    out.push(Gate::Drag(*q, *theta, 0.0));
                }
                Gate::Ry(q, theta) => {
                    self.flush(*q, &mut pending, &mut out);
                    out.push(Gate::Drag(*q, *theta, FRAC_PI_2));
                }
                Gate::Rz(q, phi) => {
                    if self.merge_consecutive_rz {
                        *pending.entry(q.index()).or_insert(0.0) += phi;
                    } else {
                        self.flush(*q, &mut pending, &mut out);
                        if phi.abs() > self.angle_tol {
                            out.push(Gate::Rz(*q, wrap_angle(*phi)));
                        }
                    }
                }
                Gate::U3(q, theta, phi, gamma) => {
                    // U3(theta, phi, gamma) = Rz(phi) . Ry(theta) . Rz(gamma), and
                    // Ry(theta) = Rz(pi/2) . Rx(theta) . Rz(-pi/2), so the Drag's
                    // own phase must absorb `gamma` (the inner RZ), not `phi`.
                    self.flush(*q, &mut pending, &mut out);
                    out.push(Gate::Drag(*q, *theta, wrap_angle(FRAC_PI_2 - gamma)));
                    *pending.entry(q.index()).or_insert(0.0) += wrap_angle(phi + gamma);
                }
                Gate::Cz(a, b) => out.push(Gate::Cz(*a, *b)),
                Gate::Measure(qs) => {
                    for q in qs {
                        if self.drop_rz_before_measure {
                            pending.remove(&q.index());
                        } else {
                            self.flush(*q, &mut pending, &mut out);
                        }
                    }
                    out.push(Gate::Measure(qs.clone()));
                }
                other => {
                    return Err(CompileError::UnsupportedGate {
                        gate_name: other.name().to_string(),
                        pass_name: "ToNativeSet",
                    })
                }
            }
        }

        let mut remaining: Vec<usize> = pending.keys().copied().collect();
        remaining.sort_unstable();
        for q in remaining {
            self.flush(QubitId::from(q), &mut pending, &mut out);
        }

        Ok(out)
    }
}

impl Pass for ToNativeSet {
    fn name(&self) -> &str {
        "ToNativeSet"
    }

    fn run(&self, circuit: &Circuit, _context: &mut TranspilationContext) -> CompileResult<Circuit> {
        let gates = self.lower(circuit.gates())?;
        Ok(circuit.with_gates(gates)?)
    }
}
