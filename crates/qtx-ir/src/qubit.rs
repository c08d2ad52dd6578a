//! Qubit addressing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a qubit within a circuit's addressing scheme.
///
/// For a logical circuit this indexes into `[0, nqubits)`; after layout and
/// routing the same type is reused to index physical qubits (device nodes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

impl From<usize> for QubitId {
    fn from(id: usize) -> Self {
        QubitId(u32::try_from(id).expect("QubitId overflow: exceeds u32::MAX"))
    }
}

impl QubitId {
    /// The index as `usize`, for use in dense vector indexing.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qubit_display() {
        let q = QubitId(3);
        assert_eq!(format!("{q}"), "q3");
    }

    #[test]
    fn test_qubit_index_roundtrip() {
        let q = QubitId::from(5usize);
        assert_eq!(q.index(), 5);
    }
}
