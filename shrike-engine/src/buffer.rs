//! Aligned raw column storage.

use std::alloc::{alloc, dealloc, handle_alloc_error, Layout};
use std::fmt;
use std::ptr::NonNull;

use ty::AttrType;


/// Owns `capacity × element size` bytes of storage for a single column.
///
/// The buffer frees its memory on drop but never runs element destructors;
/// element lifetimes are driven entirely by the owning block.
pub(crate) struct RawBuffer {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl RawBuffer {
    /// Allocation failure aborts the process: once a multi-buffer operation
    /// is partially done there is no recovery path.
    pub(crate) fn for_attr(ty: &AttrType, capacity: usize) -> RawBuffer {
        let bytes = ty.size()
            .checked_mul(capacity)
            .expect("attribute buffer size overflow");

        let layout = Layout::from_size_align(bytes, ty.alignment())
            .expect("invalid attribute buffer layout");

        let ptr = if bytes == 0 {
            // zero-sized elements get a well-aligned dangling pointer
            ty.alignment() as *mut u8
        } else {
            unsafe { alloc(layout) }
        };

        let ptr = match NonNull::new(ptr) {
            Some(ptr) => ptr,
            None => handle_alloc_error(layout),
        };

        RawBuffer { ptr, layout }
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Pointer to the start of `row`, for elements of type `ty`.
    #[inline]
    pub(crate) fn row_ptr(&self, ty: &AttrType, row: usize) -> *mut u8 {
        debug_assert!(row * ty.size() <= self.layout.size());

        unsafe { self.ptr.as_ptr().add(row * ty.size()) }
    }
}

impl Drop for RawBuffer {
    fn drop(&mut self) {
        if self.layout.size() != 0 {
            unsafe {
                dealloc(self.ptr.as_ptr(), self.layout);
            }
        }
    }
}

impl fmt::Debug for RawBuffer {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("RawBuffer")
            .field("bytes", &self.layout.size())
            .field("alignment", &self.layout.align())
            .finish()
    }
}

// buffers only ever hold elements of `AttrElement` types, which are
// `Send + Sync` by bound
unsafe impl Send for RawBuffer {}
unsafe impl Sync for RawBuffer {}
