pub mod builder;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod layout;
pub mod layout_dump;
pub mod model;
pub mod overrides;
pub mod session;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
