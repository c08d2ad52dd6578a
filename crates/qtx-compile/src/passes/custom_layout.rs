//! A user-supplied initial layout, as an alternative to [`super::sabre_layout::SabreLayout`].

use crate::context::TranspilationContext;
use crate::error::CompileResult;
use crate::pass::Pass;
use crate::passes::sabre_layout::remap_gate;
use crate::property::{validate_custom_layout, CouplingMap, Layout};
use qtx_ir::{Circuit, Gate};

/// Retargets a circuit to physical qubits using a fixed `logical ->
/// physical` mapping instead of running SABRE's trial simulation.
#[derive(Debug, Clone)]
pub struct CustomLayout {
    mapping: Vec<usize>,
    coupling: CouplingMap,
}

impl CustomLayout {
    pub fn new(mapping: Vec<usize>, coupling: CouplingMap) -> Self {
        Self { mapping, coupling }
    }
}

impl Pass for CustomLayout {
    fn name(&self) -> &str {
        "CustomLayout"
    }

    fn run(&self, circuit: &Circuit, context: &mut TranspilationContext) -> CompileResult<Circuit> {
        validate_custom_layout(&self.mapping, circuit.nqubits(), &self.coupling)?;
        let layout = Layout::from_mapping(self.mapping.clone())?;

        let remapped: Vec<Gate> = circuit.gates().iter().map(|g| remap_gate(g, &layout)).collect();
        let output = Circuit::from_gates(self.coupling.num_nodes(), remapped)?;
        context.initial_layout = Some(layout);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;
    use qtx_ir::QubitId;

    fn q(i: u32) -> QubitId {
        QubitId(i)
    }

    #[test]
    fn remaps_gates_to_physical_qubits() {
        let coupling = CouplingMap::linear(4).unwrap();
        let circuit = Circuit::from_gates(2, vec![Gate::Cz(q(0), q(1))]).unwrap();
        let mut ctx = TranspilationContext::new();
        let out = CustomLayout::new(vec![3, 1], coupling).run(&circuit, &mut ctx).unwrap();
        assert_eq!(out.gates(), &[Gate::Cz(q(3), q(1))]);
        assert_eq!(out.nqubits(), 4);
        assert_eq!(ctx.initial_layout.unwrap().physical(0), 3);
    }

    #[test]
    fn rejects_duplicate_physical_targets() {
        let coupling = CouplingMap::linear(4).unwrap();
        let circuit = Circuit::new(2);
        let mut ctx = TranspilationContext::new();
        let err = CustomLayout::new(vec![1, 1], coupling).run(&circuit, &mut ctx).unwrap_err();
        assert!(matches!(err, CompileError::InvalidCustomLayout { .. }));
    }

    #[test]
    fn rejects_mapping_length_mismatch() {
        let coupling = CouplingMap::linear(4).unwrap();
        let circuit = Circuit::new(3);
        let mut ctx = TranspilationContext::new();
        let err = CustomLayout::new(vec![0, 1], coupling).run(&circuit, &mut ctx).unwrap_err();
        assert!(matches!(err, CompileError::InvalidCustomLayout { .. }));
    }
}
