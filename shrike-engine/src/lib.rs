#[macro_use]
extern crate log;
#[macro_use]
extern crate failure;
extern crate rayon;
extern crate uuid;
#[macro_use]
extern crate shrike_common;

pub(crate) mod params;

#[macro_use]
#[cfg(test)]
mod helpers;

pub mod error;
pub mod ty;
pub mod schema;
pub mod diff;
mod buffer;
pub mod block;
pub mod container;
pub mod compact;

pub use error::{Error, Result, ResultExt};
pub use ty::{AttrElement, AttrType};
pub use ty::array::{AnyArrayMut, AnyArrayRef};
pub use schema::{Attribute, Schema, SchemaBuilder};
pub use diff::SchemaDiff;
pub use block::{Block, BlockId};
pub use container::{BlockContainer, ContainerId, SharedBlock};
pub use compact::compress;
pub use params::DEFAULT_BLOCK_SIZE;
