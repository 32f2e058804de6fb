pub mod ease;
pub mod interp;
pub mod profile;
pub mod spring;
pub mod typewriter;
