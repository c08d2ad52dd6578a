//! Errors produced by the transpilation pipeline.

use qtx_ir::QubitId;
use thiserror::Error;

/// Errors raised by a pass or by the pass manager.
///
/// All variants are fatal: the pipeline is deterministic, so retrying with
/// identical inputs reproduces the same error. There is no local recovery.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// §4.3/§4.8: a gate had no decomposition rule and no matrix, or a
    /// non-native gate reached a pass that requires a fixed gate set.
    #[error("unsupported gate '{gate_name}' in pass '{pass_name}'")]
    UnsupportedGate {
        gate_name: String,
        pass_name: &'static str,
    },

    /// §4.3: a `Controlled` gate whose base is not single-qubit.
    #[error("controlled gate's base is not single-qubit")]
    MultiQubitControlBase,

    /// §4.1: ZYZ decomposition attempted on a near-singular matrix.
    #[error("matrix is singular (|det U| < {tolerance:e}), cannot ZYZ-decompose")]
    SingularMatrix { tolerance: f64 },

    /// §4.6/§4.7: the coupling graph is not connected.
    #[error("coupling graph is not connected")]
    DisconnectedTopology,

    /// §4.7: a 2-qubit gate could not be routed within its swap budget.
    #[error(
        "exceeded swap budget ({budget} swaps) routing gate on logical qubits {logical_a} and {logical_b}"
    )]
    SwapBudgetExceeded {
        logical_a: QubitId,
        logical_b: QubitId,
        budget: usize,
    },

    /// §6: a user-supplied `qubit_mapping` is partial, non-injective, or
    /// references a nonexistent physical qubit.
    #[error("invalid custom layout: {reason}")]
    InvalidCustomLayout { reason: String },

    /// §6: the coupling graph has no edges.
    #[error("coupling graph topology is empty")]
    InvalidTopology,

    /// A gate's qubit indices did not validate against the circuit's
    /// `nqubits`, surfaced from the IR layer.
    #[error(transparent)]
    Ir(#[from] qtx_ir::IrError),
}

/// Convenience alias for results from the compile crate.
pub type CompileResult<T> = Result<T, CompileError>;
