pub mod dedication;
pub mod formulation;
pub mod report;
pub mod simplex;
