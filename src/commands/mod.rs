pub mod builder;
pub mod types;

pub use builder::CommandBuilder;
pub use types::Command;
