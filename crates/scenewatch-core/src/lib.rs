pub mod alert;
pub mod composite;
pub mod config;
pub mod detect;
pub mod error;
pub mod export;
pub mod io;
pub mod lock;
pub mod notify;
pub mod paths;
pub mod provider;
pub mod raster;
pub mod run;
pub mod state;
pub mod types;

#[cfg(test)]
mod testing;

pub use error::{Result, WatchError};
