//! Calling-convention and binding flags for method entries.

use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use pyembed_sys as ffi;
use std::ffi::c_int;

bitflags! {
    /// Flags stored in a method record's `ml_flags` field.
    ///
    /// Exactly one arity flag (`VARARGS`, `NOARGS`, `O`) is expected per entry;
    /// the rest are modifiers. Combinations are checked by the runtime, not here.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MethodFlags: c_int {
        /// Positional arguments packed in a tuple.
        const VARARGS = ffi::METH_VARARGS;
        /// Keyword arguments accepted; combined with `VARARGS`.
        const KEYWORDS = ffi::METH_KEYWORDS;
        /// No arguments.
        const NOARGS = ffi::METH_NOARGS;
        /// Exactly one positional argument.
        const O = ffi::METH_O;
        /// Bound to the class rather than an instance.
        const CLASS = ffi::METH_CLASS;
        /// Bound to neither class nor instance.
        const STATIC = ffi::METH_STATIC;
        /// May coexist with a slot wrapper of the same name.
        const COEXIST = ffi::METH_COEXIST;
    }
}

/// The flags that select how arguments are passed.
pub const ARITY_MASK: MethodFlags = MethodFlags::VARARGS
    .union(MethodFlags::NOARGS)
    .union(MethodFlags::O);

/// Exclusive argument-passing conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(i32)]
pub enum Arity {
    VarArgs = 0x0001,
    NoArgs = 0x0004,
    SingleArg = 0x0008,
}

impl Arity {
    pub fn flags(self) -> MethodFlags {
        MethodFlags::from_bits_retain(i32::from(self))
    }
}

impl MethodFlags {
    /// The arity selected by these flags, or `None` unless exactly one arity flag is set.
    pub fn arity(self) -> Option<Arity> {
        Arity::try_from((self & ARITY_MASK).bits()).ok()
    }

    /// True when the entry takes keyword arguments.
    pub fn accepts_keywords(self) -> bool {
        self.contains(MethodFlags::KEYWORDS)
    }
}

impl From<Arity> for MethodFlags {
    fn from(value: Arity) -> Self {
        value.flags()
    }
}

impl From<MethodFlags> for c_int {
    fn from(value: MethodFlags) -> Self {
        value.bits()
    }
}
