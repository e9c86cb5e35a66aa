//! Project policy flags shared by `quote` and `buy`.

use clap::Args;
use lzero_inventory::Policy;

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct PolicyArgs {
    /// The project is noncommercial: skip noncommercially licensed work.
    #[arg(long)]
    pub noncommercial: bool,

    /// The project is open source: skip reciprocally licensed work.
    #[arg(long)]
    pub open: bool,
}

impl PolicyArgs {
    pub fn policy(&self) -> Policy {
        Policy {
            ignore_noncommercial: self.noncommercial,
            ignore_reciprocal: self.open,
        }
    }
}
