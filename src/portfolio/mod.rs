// Position sizing and risk constraints.

pub mod constraints;
pub mod sizing;

pub use constraints::RiskConstraints;
pub use sizing::compute_position_size;
