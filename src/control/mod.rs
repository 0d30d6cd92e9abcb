//! Corrective write path: the strategy chain and the enhanced pull.

pub mod applier;
pub mod enhanced_pull;
