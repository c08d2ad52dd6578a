//! Errors produced while building or validating a [`crate::circuit::Circuit`].

use thiserror::Error;

/// Errors raised by the circuit IR itself, as opposed to the transpilation
/// passes that consume it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// A gate referenced a qubit index outside `[0, nqubits)`.
    #[error("qubit {qubit} out of range for {gate_name} (circuit has {nqubits} qubits)")]
    QubitOutOfRange {
        qubit: u32,
        nqubits: usize,
        gate_name: &'static str,
    },

    /// A `wire_names` permutation did not have the expected length.
    #[error("expected a permutation of length {expected}, got {got}")]
    QubitCountMismatch { expected: usize, got: usize },

    /// A `wire_names` permutation was not injective, or referenced an
    /// out-of-range index.
    #[error("wire_names permutation is not a valid bijection on [0, nqubits)")]
    InvalidPermutation,
}

/// Convenience alias for results from the IR crate.
pub type IrResult<T> = Result<T, IrError>;
