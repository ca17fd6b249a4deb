pub mod hps;
pub mod internals;
