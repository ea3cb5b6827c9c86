pub mod date;
pub mod instrument;
pub mod ledger;
pub mod obligation;
