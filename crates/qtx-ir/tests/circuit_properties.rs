//! Property-based tests over [`Circuit`]'s structural invariants: every gate
//! stays within range after construction, and JSON round-tripping through
//! `serde` never changes the circuit's observable content.

use proptest::prelude::*;
use qtx_ir::{Circuit, Gate, QubitId};

#[derive(Debug, Clone)]
enum GateOp {
    H(u32),
    X(u32),
    Rx(u32, f64),
    Cnot(u32, u32),
    Measure(u32),
}

impl GateOp {
    fn into_gate(self) -> Gate {
        match self {
            GateOp::H(q) => Gate::H(QubitId(q)),
            GateOp::X(q) => Gate::X(QubitId(q)),
            GateOp::Rx(q, theta) => Gate::Rx(QubitId(q), theta),
            GateOp::Cnot(c, t) => Gate::Cnot(QubitId(c), QubitId(t)),
            GateOp::Measure(q) => Gate::Measure(vec![QubitId(q)]),
        }
    }
}

fn arb_gate_op(nqubits: u32) -> BoxedStrategy<GateOp> {
    prop_oneof![
        (0..nqubits).prop_map(GateOp::H),
        (0..nqubits).prop_map(GateOp::X),
        (0..nqubits, -10.0..10.0).prop_map(|(q, t)| GateOp::Rx(q, t)),
        (0..nqubits).prop_map(GateOp::Measure),
        (0..nqubits, 0..nqubits)
            .prop_filter("control and target must differ", |(c, t)| c != t)
            .prop_map(|(c, t)| GateOp::Cnot(c, t)),
    ]
    .boxed()
}

fn arb_circuit() -> impl Strategy<Value = Circuit> {
    (1_u32..=5).prop_flat_map(|nqubits| {
        prop::collection::vec(arb_gate_op(nqubits), 0..16)
            .prop_map(move |ops| Circuit::from_gates(nqubits as usize, ops.into_iter().map(GateOp::into_gate).collect()).unwrap())
    })
}

proptest! {
    #[test]
    fn every_gate_qubit_stays_in_range(circuit in arb_circuit()) {
        for gate in circuit.gates() {
            for q in gate.qubits() {
                prop_assert!(q.index() < circuit.nqubits());
            }
        }
    }

    #[test]
    fn json_round_trip_preserves_the_circuit(circuit in arb_circuit()) {
        let encoded = serde_json::to_string(&circuit).unwrap();
        let decoded: Circuit = serde_json::from_str(&encoded).unwrap();
        prop_assert_eq!(circuit, decoded);
    }

    #[test]
    fn out_of_range_qubit_is_always_rejected(nqubits in 1_u32..5, offset in 0_u32..8) {
        let bad = Circuit::from_gates((nqubits) as usize, vec![Gate::X(QubitId(nqubits + offset))]);
        prop_assert!(bad.is_err());
    }
}
