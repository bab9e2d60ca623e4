//! Newtype wrapper over std::collections::HashMap using FxHash in place of
//! the standard hasher (currently SipHash 1-3).
//! FxHash trades hash DoS resistance for speed; all keys hashed here are
//! produced internally (attribute names, block ids), so that's acceptable.

pub mod hash_map;
pub mod hash;

pub use self::hash::Hasher;

pub use self::hash_map::HashMap;
