#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod command;
pub mod error;
pub mod instance;
pub mod inventory;
pub mod orchestrate;
pub mod probe;
pub mod resolve;
pub mod select;
pub mod table;
pub mod util;

#[cfg(test)]
mod testing;

pub use error::Error;
pub use error::Result;
