pub mod data;
pub mod io;
pub mod printing;

pub use data::{Config, GenerationConfig};
pub use io::ConfigError;
