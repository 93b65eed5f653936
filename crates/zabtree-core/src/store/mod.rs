// ── Service tree storage ──

mod refresh;
mod tree;

pub use tree::ServiceTreeCache;
