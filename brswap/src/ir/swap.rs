//! Branch swapping pass
//!
//! Every `br` gets its two targets exchanged and is preceded by a constant
//! load of the payload plus a `print` of it:
//!
//! ```text
//! br c .then .else;        v0: int = const <payload>;
//!                    ==>   print v0;
//!                          br c .else .then;
//! ```
//!
//! One `FreshNames` is shared by all functions so generated names stay
//! unique program-wide.

use serde::Serialize;
use tracing::{debug, info, trace};

use super::fresh::FreshNames;
use super::types::*;
use crate::config::{Payload, SwapConfig, PAYLOAD_TYPE};
use crate::{BrswapError, Result};

/// Statistics about one rewrite
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SwapStats {
    pub functions: usize,
    pub branches_swapped: usize,
    pub instructions_before: usize,
    pub instructions_after: usize,
}

impl std::fmt::Display for SwapStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "swapped {} branch(es) in {} function(s), {} -> {} instructions",
            self.branches_swapped, self.functions, self.instructions_before, self.instructions_after
        )
    }
}

/// Swap every branch in the program
pub fn swap_all_branches(mut program: Program, config: &SwapConfig) -> Result<(Program, SwapStats)> {
    let payload = config.payload()?;
    debug!(message = payload.message(), value = %payload.value(), "payload");
    let mut names = FreshNames::with_prefix(&program, config.prefix.as_str());

    let mut stats = SwapStats {
        instructions_before: program.instruction_count(),
        ..SwapStats::default()
    };

    let functions = std::mem::take(&mut program.functions);
    for func in functions {
        let branches = func.branch_count();
        let func = swap_branches(func, &mut names, &payload)?;
        debug!(function = func.name(), branches, "swapped branches");

        stats.functions += 1;
        stats.branches_swapped += branches;
        program.functions.push(func);
    }

    stats.instructions_after = program.instruction_count();
    info!(
        functions = stats.functions,
        branches = stats.branches_swapped,
        "rewrite complete"
    );
    Ok((program, stats))
}

/// Swap the branches of a single function, drawing names from `names`
pub fn swap_branches(mut func: Function, names: &mut FreshNames, payload: &Payload) -> Result<Function> {
    let mut body = Vec::with_capacity(func.instrs.len() + 2 * func.branch_count());
    let instrs = std::mem::take(&mut func.instrs);

    for (index, inst) in instrs.into_iter().enumerate() {
        let mut branch = match inst {
            Instruction::Branch(branch) => branch,
            other => {
                body.push(other);
                continue;
            }
        };

        let arity = branch.labels().len();
        if arity != 2 {
            return Err(BrswapError::MalformedRecord {
                function: func.name().to_string(),
                index,
                message: format!("`br` must have exactly 2 labels, found {}", arity),
            });
        }
        branch.reverse_labels();

        let name = names.next_name();
        trace!(function = func.name(), index, dest = name.as_str(), "instrumenting branch");
        body.push(Operation::constant(name.clone(), PAYLOAD_TYPE, payload.literal().clone()).into());
        body.push(Operation::print(vec![name]).into());
        body.push(branch.into());
    }

    func.instrs = body;
    Ok(func)
}
