pub mod actions;
pub mod config;
pub mod event;
pub mod framer;
pub mod reducer;
pub mod state;

pub use actions::*;
pub use event::*;
pub use framer::*;
pub use reducer::*;
pub use state::*;

pub use config::Config;
