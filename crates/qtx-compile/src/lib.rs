//! Pass-based transpilation of [`qtx_ir::Circuit`] values: canonicalization,
//! algebraic simplification, SABRE layout/routing, and native-gate lowering.
//!
//! Every pass is a pure `Circuit -> Circuit` function (see [`Pass`]); none of
//! them mutate their input. [`PassManagerBuilder`] assembles the standard
//! pipeline; individual passes can also be composed by hand via
//! [`PassManager`].

mod context;
mod error;
mod manager;
mod numeric;
mod pass;
mod passes;
mod property;

pub use context::TranspilationContext;
pub use error::{CompileError, CompileResult};
pub use manager::{PassManager, PassManagerBuilder};
pub use numeric::{dephased_signature, principal_sqrt, wrap_angle, zyz_decompose};
pub use pass::Pass;
pub use passes::{
    AddPhasesFromRzAndCz, CustomLayout, FuseSingleQubit, GateCalibration, IdentityCancel, SabreLayout, SabreSwap,
    ToCanonicalBasis, ToNativeSet,
};
pub use property::{validate_custom_layout, CouplingMap, Layout};
