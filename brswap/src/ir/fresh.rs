//! Fresh result names
//!
//! `FreshNames` reserves every name already bound in a program and then hands
//! out `<prefix><n>` for increasing `n`, skipping reserved ones. The counter
//! only moves forward, so a name is never handed out twice.

use std::collections::HashSet;

use super::types::Program;
use crate::config::DEFAULT_PREFIX;

#[derive(Debug, Clone)]
pub struct FreshNames {
    prefix: String,
    reserved: HashSet<String>,
    counter: u64,
}

impl FreshNames {
    /// Reserve the names of `program` and generate with the default prefix
    pub fn new(program: &Program) -> Self {
        Self::with_prefix(program, DEFAULT_PREFIX)
    }

    pub fn with_prefix(program: &Program, prefix: impl Into<String>) -> Self {
        let mut reserved = HashSet::new();
        for func in &program.functions {
            // A parameter shadowed by a generated dest would change the program
            reserved.extend(func.params().into_iter().map(str::to_string));
            reserved.extend(func.dests().map(str::to_string));
        }
        FreshNames {
            prefix: prefix.into(),
            reserved,
            counter: 0,
        }
    }

    /// Next name not bound anywhere in the program
    pub fn next_name(&mut self) -> String {
        loop {
            let candidate = format!("{}{}", self.prefix, self.counter);
            self.counter += 1;
            if !self.reserved.contains(&candidate) {
                return candidate;
            }
        }
    }
}

impl Iterator for FreshNames {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        Some(self.next_name())
    }
}
