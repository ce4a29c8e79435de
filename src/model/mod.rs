pub mod task;
pub mod session;
pub mod project;
pub mod habit;
pub mod note;
pub mod profile;
pub mod config;

pub use task::*;
pub use session::*;
pub use project::*;
pub use habit::*;
pub use note::*;
pub use profile::*;
pub use config::*;
