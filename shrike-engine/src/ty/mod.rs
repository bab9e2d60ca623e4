//! Runtime type descriptors for attribute elements.
//!
//! The column set of a store is determined at runtime, so every buffer
//! operation is driven through an `AttrType` descriptor instead of
//! compile-time generics. The descriptor carries the layout parameters and a
//! small vtable of lifecycle operations over contiguous element runs.

use std::any::{type_name, TypeId};
use std::fmt;
use std::mem::{align_of, size_of};
use std::ptr;
use std::slice;

pub mod array;


/// Marker for types usable as attribute elements.
///
/// `Default` backs default-construction of fresh rows, `Clone` backs
/// `flatten_attribute`, and `Send + Sync` lets blocks move between threads.
pub trait AttrElement: Default + Clone + Send + Sync + 'static {}

impl<T> AttrElement for T
where
    T: Default + Clone + Send + Sync + 'static,
{
}

/// Type descriptor backing all type-erased buffer operations.
///
/// Equality is `TypeId` equality; two descriptors manufactured from the same
/// Rust type are interchangeable.
#[derive(Clone)]
pub struct AttrType {
    name: &'static str,
    id: TypeId,
    size: usize,
    alignment: usize,
    construct_default_n: unsafe fn(*mut u8, usize),
    destruct_n: unsafe fn(*mut u8, usize),
    relocate_n: unsafe fn(*const u8, *mut u8, usize),
    copy_construct: unsafe fn(*const u8, *mut u8),
}

impl AttrType {
    pub fn of<T: AttrElement>() -> AttrType {
        AttrType {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
            size: size_of::<T>(),
            alignment: align_of::<T>(),
            construct_default_n: construct_default_n::<T>,
            destruct_n: destruct_n::<T>,
            relocate_n: relocate_n::<T>,
            copy_construct: copy_construct::<T>,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn alignment(&self) -> usize {
        self.alignment
    }

    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Default-constructs `len` elements into uninitialized memory at `ptr`.
    ///
    /// `ptr` must be aligned and the target run must not hold live elements.
    pub(crate) unsafe fn construct_default_n(&self, ptr: *mut u8, len: usize) {
        (self.construct_default_n)(ptr, len)
    }

    /// Drops `len` live elements starting at `ptr`.
    pub(crate) unsafe fn destruct_n(&self, ptr: *mut u8, len: usize) {
        (self.destruct_n)(ptr, len)
    }

    /// Uninitialized move of `len` elements from `src` to `dst`.
    ///
    /// The source run is consumed: no destructor may run on it afterwards.
    /// The runs must not overlap.
    pub(crate) unsafe fn relocate_n(&self, src: *const u8, dst: *mut u8, len: usize) {
        (self.relocate_n)(src, dst, len)
    }

    /// Clones the live element at `src` into the uninitialized slot at `dst`.
    pub(crate) unsafe fn copy_construct(&self, src: *const u8, dst: *mut u8) {
        (self.copy_construct)(src, dst)
    }
}

impl PartialEq for AttrType {
    fn eq(&self, other: &AttrType) -> bool {
        self.id == other.id
    }
}

impl Eq for AttrType {}

impl fmt::Debug for AttrType {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("AttrType")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("alignment", &self.alignment)
            .finish()
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self.name)
    }
}

unsafe fn construct_default_n<T: Default>(ptr: *mut u8, len: usize) {
    let ptr = ptr as *mut T;

    for idx in 0..len {
        ptr::write(ptr.add(idx), T::default());
    }
}

unsafe fn destruct_n<T>(ptr: *mut u8, len: usize) {
    ptr::drop_in_place(slice::from_raw_parts_mut(ptr as *mut T, len));
}

unsafe fn relocate_n<T>(src: *const u8, dst: *mut u8, len: usize) {
    ptr::copy_nonoverlapping(src as *const T, dst as *mut T, len);
}

unsafe fn copy_construct<T: Clone>(src: *const u8, dst: *mut u8) {
    ptr::write(dst as *mut T, (*(src as *const T)).clone());
}
