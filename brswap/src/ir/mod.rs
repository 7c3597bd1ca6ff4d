//! Intermediate Representation (IR) for brswap
//!
//! An in-memory view of Bril's JSON form: programs of functions, each a flat
//! list of labels and instructions. Only the fields the rewrite inspects are
//! typed; everything else rides along untouched.
//!
//! ## Pipeline
//!
//! ```text
//! JSON text → decode → Program → swap_all_branches → Program → encode → JSON text
//! ```

pub mod codec;
pub mod fresh;
pub mod swap;
pub mod types;

pub use codec::{decode, encode};
pub use fresh::FreshNames;
pub use swap::{swap_all_branches, swap_branches, SwapStats};
pub use types::*;
