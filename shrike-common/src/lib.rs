extern crate failure;
extern crate fxhash;

#[macro_use]
mod macros;

pub mod collections;
pub mod lock;
