pub mod gateway;
pub mod in_memory;
