//! Fleet-wide deploy coordination: concurrent fan-out and failure fan-in.

pub mod engine;

pub use engine::Deployer;
