//! The transpilation context: a mutable record of intermediate artifacts
//! produced alongside the circuit each pass returns.

use crate::property::Layout;
use qtx_ir::Circuit;
use rustc_hash::FxHashMap;

/// Record of intermediate circuits and layouts produced while running a
/// pass pipeline.
///
/// Passes are pure `Circuit -> Circuit` functions; this is the one piece of
/// state they're allowed to write to, and each pass only ever appends to it
/// (nothing is ever mutated in place once recorded).
#[derive(Debug, Default)]
pub struct TranspilationContext {
    /// Logical-to-physical mapping chosen by the layout pass.
    pub initial_layout: Option<Layout>,
    /// Logical-to-physical mapping after routing has applied its SWAPs.
    pub final_layout: Option<Layout>,
    /// The circuit each pass emitted, keyed by pass name. Repeated pass
    /// names (the pipeline runs `ToCanonicalBasis` and `FuseSingleQubit`
    /// twice) are disambiguated with a numeric suffix starting at `#2`.
    history: FxHashMap<String, Circuit>,
    /// Free-form numeric diagnostics a pass may want to surface (e.g. a
    /// SABRE trial's diagnostic score), keyed by name.
    pub metrics: FxHashMap<String, f64>,
    run_counts: FxHashMap<String, usize>,
}

impl TranspilationContext {
    /// A fresh, empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `circuit` as the output of `pass_name`, disambiguating by
    /// suffix if this pass name has already been recorded.
    pub fn record(&mut self, pass_name: &str, circuit: Circuit) {
        let count = self.run_counts.entry(pass_name.to_string()).or_insert(0);
        *count += 1;
        let key = if *count == 1 {
            pass_name.to_string()
        } else {
            format!("{pass_name}#{count}")
        };
        self.history.insert(key, circuit);
    }

    /// The circuit recorded under `key` (a bare pass name, or `name#n` for
    /// the nth run of a repeated pass).
    pub fn history(&self, key: &str) -> Option<&Circuit> {
        self.history.get(key)
    }

    /// All recorded keys, in no particular order.
    pub fn history_keys(&self) -> impl Iterator<Item = &str> {
        self.history.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qtx_ir::Circuit;

    #[test]
    fn repeated_pass_names_get_suffixed() {
        let mut ctx = TranspilationContext::new();
        ctx.record("ToCanonicalBasis", Circuit::new(1));
        ctx.record("ToCanonicalBasis", Circuit::new(1));
        assert!(ctx.history("ToCanonicalBasis").is_some());
        assert!(ctx.history("ToCanonicalBasis#2").is_some());
    }
}
