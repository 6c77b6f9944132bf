pub mod command;
pub mod csv;
