pub mod cli;
pub mod config;
pub mod dependency;
pub mod error;
pub mod init;
pub mod interact;
pub mod models;
pub mod outcome;
pub mod plugins;
pub mod repository;
pub mod resolve;
pub mod session;
pub mod wizard;

pub use error::StarError;
pub use outcome::OpResult;
