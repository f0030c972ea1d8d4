//! Evaluation scope: parameters plus the bindings made by conditions.
//!
//! Bindings form a stack. A rule records the stack height before its
//! conditions run and truncates back to it when it finishes, so a value
//! bound by a guard is computed once, visible to every rule nested under
//! it, and gone for the guard's siblings.

use crate::{Params, PartitionTable, Value};

/// Name → value bindings for one evaluation.
#[derive(Debug)]
pub struct Scope<'a> {
    bindings: Vec<(&'a str, Value)>,
    partitions: &'a PartitionTable,
}

impl<'a> Scope<'a> {
    /// Scope holding the set parameters of `params`.
    #[must_use]
    pub fn new(params: &Params, partitions: &'a PartitionTable) -> Self {
        let mut bindings = Vec::with_capacity(Params::NAMES.len() + 8);
        for (name, value) in params.values() {
            bindings.push((name, value));
        }
        Self {
            bindings,
            partitions,
        }
    }

    /// Innermost binding for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| *bound == name)
            .map(|(_, value)| value)
    }

    /// Push a binding. Shadows any outer binding of the same name.
    pub fn bind(&mut self, name: &'a str, value: Value) {
        self.bindings.push((name, value));
    }

    /// Partition table consulted by `aws.partition`.
    #[must_use]
    pub fn partitions(&self) -> &'a PartitionTable {
        self.partitions
    }

    pub(crate) fn mark(&self) -> usize {
        self.bindings.len()
    }

    pub(crate) fn truncate(&mut self, mark: usize) {
        self.bindings.truncate(mark);
    }
}
