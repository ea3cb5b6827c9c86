pub mod output;
pub mod treasury;
