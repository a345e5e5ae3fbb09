//! Process-lifetime storage for records handed to the runtime.
//!
//! The runtime keeps raw pointers to the module record, its method table, and
//! every string inside them, and never says when it is done with them. Each
//! registration therefore gets its own bump arena that is leaked on creation:
//! nothing allocated here is ever freed, whether registration succeeds or not.

use crate::error::BuildError;
use bumpalo::Bump;
use std::alloc::Layout;
use std::ffi::c_char;
use std::fmt;
use std::ptr::{self, NonNull};

/// Leaked bump arena backing one registration.
pub struct ForeignArena {
    bump: &'static Bump,
}

impl ForeignArena {
    /// Create a fresh arena. Its memory lives until the process exits.
    pub fn new() -> Self {
        Self {
            bump: Box::leak(Box::new(Bump::new())),
        }
    }

    /// Create a fresh arena that refuses to grow past `bytes` of backing memory.
    ///
    /// Once the limit is reached every further allocation fails with
    /// [`BuildError::Allocation`] instead of aborting the process.
    pub fn with_allocation_limit(bytes: usize) -> Self {
        let arena = Self::new();
        arena.bump.set_allocation_limit(Some(bytes));
        arena
    }

    /// Total bytes reserved by the arena so far.
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }

    /// Copy `value` into the arena as a NUL-terminated string.
    ///
    /// `field` and `owner` only label the error when `value` contains a NUL byte.
    pub fn alloc_c_str(
        &self,
        field: &'static str,
        owner: &str,
        value: &str,
    ) -> Result<NonNull<c_char>, BuildError> {
        if let Some(position) = value.bytes().position(|b| b == 0) {
            return Err(BuildError::InteriorNul {
                field,
                owner: owner.to_string(),
                position,
            });
        }

        let bytes = value.len() + 1;
        let layout = Layout::array::<u8>(bytes).map_err(|_| BuildError::allocation(field, bytes))?;
        let dst = self
            .bump
            .try_alloc_layout(layout)
            .map_err(|_| BuildError::allocation(field, bytes))?;

        // SAFETY: `dst` is a fresh allocation of `value.len() + 1` bytes.
        unsafe {
            ptr::copy_nonoverlapping(value.as_ptr(), dst.as_ptr(), value.len());
            dst.as_ptr().add(value.len()).write(0);
        }
        Ok(dst.cast())
    }

    /// Reserve one contiguous, uninitialized array of `count` records.
    ///
    /// The caller must write every slot before any pointer to it is published.
    pub fn alloc_records<T: Copy>(
        &self,
        what: &'static str,
        count: usize,
    ) -> Result<NonNull<T>, BuildError> {
        let bytes = count.saturating_mul(size_of::<T>());
        let layout = Layout::array::<T>(count).map_err(|_| BuildError::allocation(what, bytes))?;
        self.bump
            .try_alloc_layout(layout)
            .map(NonNull::cast)
            .map_err(|_| BuildError::allocation(what, bytes))
    }

    /// Move a single record into the arena.
    pub fn alloc_record<T: Copy>(
        &self,
        what: &'static str,
        value: T,
    ) -> Result<NonNull<T>, BuildError> {
        let slot = self.alloc_records::<T>(what, 1)?;
        // SAFETY: `slot` is a fresh, properly aligned allocation for one `T`.
        unsafe { slot.as_ptr().write(value) };
        Ok(slot)
    }
}

impl Default for ForeignArena {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ForeignArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignArena")
            .field("allocated_bytes", &self.allocated_bytes())
            .finish()
    }
}
