//! Circuit intermediate representation for the qtx transpilation pipeline.
//!
//! A [`Circuit`] is a flat, ordered sequence of [`Gate`]s over a fixed number
//! of qubits — not a DAG. The pipeline's passes are pure functions from
//! `Circuit` to `Circuit`; this crate only defines the data they operate on.
//!
//! ```
//! use qtx_ir::{Circuit, Gate, QubitId};
//!
//! let mut circuit = Circuit::new(2);
//! circuit.push(Gate::H(QubitId(0))).unwrap();
//! circuit.push(Gate::Cnot(QubitId(0), QubitId(1))).unwrap();
//! assert_eq!(circuit.gates().len(), 2);
//! ```

mod circuit;
mod error;
mod gate;
mod qubit;
mod unitary;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::Gate;
pub use qubit::QubitId;
pub use unitary::Unitary2x2;
