pub mod build;
pub mod descriptor;
pub mod inputs;
