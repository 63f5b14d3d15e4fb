//! Block decisions and the navigation handler built on them.

mod decision;
mod guard;

pub use decision::{decide, BlockEngine, BlockReason, Decision};
pub use guard::NavigationGuard;
