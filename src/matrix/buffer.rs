//! Cache-line aligned backing storage for a square matrix.

use std::alloc::{self, Layout};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};

use crate::error::{GemtError, Result};

/// Alignment for every matrix buffer (one 64-byte cache line).
pub const ALIGNMENT: usize = 64;

/// Owned, zero-initialised run of `f32` values whose first element sits on
/// a cache-line boundary.
///
/// A plain `Vec<f32>` only guarantees 4-byte alignment, so row 0 may straddle
/// two cache lines. Allocating through [`std::alloc`] with an explicit
/// [`Layout`] lets us pin the base address.
pub struct AlignedBuffer {
    ptr: NonNull<f32>,
    len: usize,
    layout: Layout,
}

// SAFETY: the buffer is uniquely owned heap memory holding plain `f32`s.
unsafe impl Send for AlignedBuffer {}
// SAFETY: shared access only hands out `&[f32]`.
unsafe impl Sync for AlignedBuffer {}

impl AlignedBuffer {
    /// Allocate `side * side` zeroed floats.
    ///
    /// Returns [`GemtError::SizeOverflow`] when the byte count cannot be
    /// represented, and [`GemtError::Allocation`] when the allocator refuses.
    pub fn square(side: usize) -> Result<Self> {
        Self::square_with(side, alloc::alloc_zeroed)
    }

    /// `square` over an explicit zeroing allocator. Whatever it returns is
    /// later freed with [`alloc::dealloc`].
    fn square_with(side: usize, alloc_zeroed: unsafe fn(Layout) -> *mut u8) -> Result<Self> {
        let len = side
            .checked_mul(side)
            .ok_or(GemtError::SizeOverflow { side })?;
        let layout = Layout::array::<f32>(len)
            .and_then(|layout| layout.align_to(ALIGNMENT))
            .map_err(|_| GemtError::SizeOverflow { side })?;

        if layout.size() == 0 {
            return Ok(Self {
                ptr: NonNull::dangling(),
                len: 0,
                layout,
            });
        }

        // SAFETY: layout has a non-zero size.
        let raw = unsafe { alloc_zeroed(layout) };
        let ptr = NonNull::new(raw.cast::<f32>()).ok_or(GemtError::Allocation {
            side,
            bytes: layout.size(),
        })?;

        Ok(Self { ptr, len, layout })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size of the allocation in bytes.
    pub fn bytes(&self) -> usize {
        self.layout.size()
    }
}

impl Deref for AlignedBuffer {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        // SAFETY: ptr is valid for len initialised floats (or dangling with len 0).
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl DerefMut for AlignedBuffer {
    fn deref_mut(&mut self) -> &mut [f32] {
        // SAFETY: as above, and &mut self gives exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl Clone for AlignedBuffer {
    fn clone(&self) -> Self {
        if self.layout.size() == 0 {
            return Self {
                ptr: NonNull::dangling(),
                len: 0,
                layout: self.layout,
            };
        }

        // SAFETY: same non-zero layout the original was allocated with.
        let raw = unsafe { alloc::alloc(self.layout) };
        let Some(ptr) = NonNull::new(raw.cast::<f32>()) else {
            alloc::handle_alloc_error(self.layout);
        };
        // SAFETY: both regions hold len floats and belong to distinct allocations.
        unsafe { ptr::copy_nonoverlapping(self.ptr.as_ptr(), ptr.as_ptr(), self.len) };

        Self {
            ptr,
            len: self.len,
            layout: self.layout,
        }
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        if self.layout.size() > 0 {
            // SAFETY: allocated in `square` or `clone` with this exact layout.
            unsafe { alloc::dealloc(self.ptr.as_ptr().cast::<u8>(), self.layout) };
        }
    }
}

impl PartialEq for AlignedBuffer {
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}

impl fmt::Debug for AlignedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
