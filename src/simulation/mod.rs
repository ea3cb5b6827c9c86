pub mod universe;
