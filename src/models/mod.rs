pub mod device;
pub mod instructions;
pub mod progress;
pub mod settings;
pub mod speech;
