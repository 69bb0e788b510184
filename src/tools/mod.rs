// Modular tools
pub mod clean;
pub mod plot;
pub mod repair;
