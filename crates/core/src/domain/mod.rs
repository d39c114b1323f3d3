pub mod feature;
pub mod prediction;
pub mod report;
pub mod target;
