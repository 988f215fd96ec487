//! Software prefetch hints.
//!
//! The transpose kernels read one row sequentially while jumping a full row
//! on every write. A one-element look-ahead hint on the sequential side is
//! all the benchmark asks of the hardware. The hint is advisory: results never
//! depend on it, and on targets without a prefetch instruction it compiles
//! to nothing.

use std::fmt;

/// Whether the kernels issue the look-ahead hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Prefetch {
    #[default]
    Enabled,
    Disabled,
}

impl Prefetch {
    pub fn is_enabled(self) -> bool {
        self == Prefetch::Enabled
    }
}

impl From<bool> for Prefetch {
    fn from(enabled: bool) -> Self {
        if enabled {
            Prefetch::Enabled
        } else {
            Prefetch::Disabled
        }
    }
}

impl fmt::Display for Prefetch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Prefetch::Enabled => "on",
            Prefetch::Disabled => "off",
        })
    }
}

/// True when [`prefetch_read`] emits a real instruction on this target.
pub const fn is_supported() -> bool {
    cfg!(any(target_arch = "x86_64", target_arch = "aarch64"))
}

/// Hint that the cache line holding `ptr` will be read soon (L1, temporal).
///
/// Prefetch instructions never fault, so any address is acceptable. The
/// kernels only ever pass pointers at most one past the end of their slice.
#[inline(always)]
pub fn prefetch_read(ptr: *const f32) {
    #[cfg(target_arch = "x86_64")]
    // SAFETY: PREFETCHT0 is part of SSE, which every x86_64 CPU has, and it
    // does not access memory architecturally.
    unsafe {
        use std::arch::x86_64::{_MM_HINT_T0, _mm_prefetch};
        _mm_prefetch::<_MM_HINT_T0>(ptr.cast::<i8>());
    }

    // PRFM PLDL1KEEP: prefetch for load, L1, keep.
    #[cfg(target_arch = "aarch64")]
    // SAFETY: PRFM is a hint and never faults.
    unsafe {
        std::arch::asm!(
            "prfm pldl1keep, [{ptr}]",
            ptr = in(reg) ptr,
            options(readonly, nostack, preserves_flags),
        );
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    let _ = ptr;
}

/// Prefetch `data[idx]`. `idx` may equal `data.len()`.
#[inline(always)]
pub(crate) fn ahead(data: &[f32], idx: usize) {
    prefetch_read(data.as_ptr().wrapping_add(idx));
}
