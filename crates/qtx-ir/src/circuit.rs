//! Flat circuit representation.

use crate::error::{IrError, IrResult};
use crate::gate::Gate;
use crate::qubit::QubitId;
use serde::{Deserialize, Serialize};

/// An ordered sequence of gates over `nqubits` wires.
///
/// Unlike a DAG-based IR, a [`Circuit`] has no parallel structure: its gate
/// order is the only order, and passes must not reorder gates relative to
/// each other on a shared qubit. Passes consume a `Circuit` and produce a new
/// one; none of them mutate an existing circuit in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    gates: Vec<Gate>,
    nqubits: usize,
    /// Final logical-to-wire permutation, set once a layout has been chosen.
    /// `wire_names[logical] = physical`.
    wire_names: Option<Vec<usize>>,
}

impl Circuit {
    /// An empty circuit over `nqubits` wires.
    pub fn new(nqubits: usize) -> Self {
        Self {
            gates: Vec::new(),
            nqubits,
            wire_names: None,
        }
    }

    /// Build a circuit from an explicit gate sequence, validating that every
    /// qubit index is in range.
    pub fn from_gates(nqubits: usize, gates: Vec<Gate>) -> IrResult<Self> {
        let circuit = Self {
            gates,
            nqubits,
            wire_names: None,
        };
        circuit.validate()?;
        Ok(circuit)
    }

    /// Number of wires.
    pub fn nqubits(&self) -> usize {
        self.nqubits
    }

    /// The gate sequence.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// The final logical-to-physical wire permutation, if one has been set.
    pub fn wire_names(&self) -> Option<&[usize]> {
        self.wire_names.as_deref()
    }

    /// Append a gate, checking its qubit indices are in range.
    pub fn push(&mut self, gate: Gate) -> IrResult<()> {
        self.check_gate(&gate)?;
        self.gates.push(gate);
        Ok(())
    }

    /// Build a new circuit with `wire_names` set to `permutation`.
    ///
    /// `permutation` must be a length-`nqubits` injective mapping.
    pub fn with_wire_names(mut self, permutation: Vec<usize>) -> IrResult<Self> {
        if permutation.len() != self.nqubits {
            return Err(IrError::QubitCountMismatch {
                expected: self.nqubits,
                got: permutation.len(),
            });
        }
        let mut seen = vec![false; permutation.len()];
        for &p in &permutation {
            if p >= permutation.len() || seen[p] {
                return Err(IrError::InvalidPermutation);
            }
            seen[p] = true;
        }
        self.wire_names = Some(permutation);
        Ok(self)
    }

    /// A new circuit over the same `nqubits`, with `gates` replacing the
    /// existing sequence. Used by passes to produce their output without
    /// mutating the input circuit.
    pub fn with_gates(&self, gates: Vec<Gate>) -> IrResult<Self> {
        let circuit = Self {
            gates,
            nqubits: self.nqubits,
            wire_names: self.wire_names.clone(),
        };
        circuit.validate()?;
        Ok(circuit)
    }

    fn check_gate(&self, gate: &Gate) -> IrResult<()> {
        for q in gate.qubits() {
            if q.index() >= self.nqubits {
                return Err(IrError::QubitOutOfRange {
                    qubit: q.0,
                    nqubits: self.nqubits,
                    gate_name: gate.name(),
                });
            }
        }
        Ok(())
    }

    fn validate(&self) -> IrResult<()> {
        for gate in &self.gates {
            self.check_gate(gate)?;
        }
        Ok(())
    }

}
