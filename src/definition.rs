//! Host-side module and method definitions.
//!
//! These are plain Rust values describing what should be registered. They are
//! only read by the builders; nothing here points into foreign memory, so a
//! definition can be dropped as soon as its descriptor has been built.
//!
//! # Example
//!
//! ```ignore
//! use pyembed::{MethodDef, ModuleDef};
//!
//! let module = ModuleDef::new("demo")
//!     .with_doc("Demo module")
//!     .with_method(MethodDef::noargs("version", version).with_doc("Return the version."))
//!     .with_method(MethodDef::single_arg("echo", echo));
//! ```

use crate::flags::MethodFlags;
use pyembed_sys as ffi;
use std::mem;

/// One callable entry point of a module.
#[derive(Debug, Clone)]
pub struct MethodDef {
    /// Attribute name in the module namespace.
    pub name: String,

    /// Thunk matching the calling convention selected by `flags`.
    pub meth: ffi::PyCFunction,

    /// Arity flag plus any modifiers.
    pub flags: MethodFlags,

    /// Docstring; may be empty.
    pub doc: String,
}

impl MethodDef {
    /// Create an entry with an explicit set of flags.
    pub fn new(name: impl Into<String>, meth: ffi::PyCFunction, flags: MethodFlags) -> Self {
        Self {
            name: name.into(),
            meth,
            flags,
            doc: String::new(),
        }
    }

    /// Entry called with no arguments.
    pub fn noargs(name: impl Into<String>, meth: ffi::PyCFunction) -> Self {
        Self::new(name, meth, MethodFlags::NOARGS)
    }

    /// Entry called with exactly one positional argument.
    pub fn single_arg(name: impl Into<String>, meth: ffi::PyCFunction) -> Self {
        Self::new(name, meth, MethodFlags::O)
    }

    /// Entry called with a tuple of positional arguments.
    pub fn varargs(name: impl Into<String>, meth: ffi::PyCFunction) -> Self {
        Self::new(name, meth, MethodFlags::VARARGS)
    }

    /// Entry called with positional and keyword arguments.
    ///
    /// The runtime stores every entry as the two-argument pointer type and
    /// dispatches on `KEYWORDS`, so the thunk is stored reinterpreted.
    pub fn with_keywords(name: impl Into<String>, meth: ffi::PyCFunctionWithKeywords) -> Self {
        // SAFETY: both are `extern "C"` function pointers of the same size. The
        // runtime only calls the pointer with three arguments when KEYWORDS is set.
        let meth = unsafe {
            mem::transmute::<ffi::PyCFunctionWithKeywords, ffi::PyCFunction>(meth)
        };
        Self::new(name, meth, MethodFlags::VARARGS | MethodFlags::KEYWORDS)
    }

    /// Set the docstring.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Add modifier flags such as `CLASS`, `STATIC` or `COEXIST`.
    pub fn with_flags(mut self, flags: MethodFlags) -> Self {
        self.flags |= flags;
        self
    }
}

/// Description of one module to register.
#[derive(Debug, Clone, Default)]
pub struct ModuleDef {
    /// Module name as seen by the runtime.
    pub name: String,

    /// Module docstring; may be empty.
    pub doc: String,

    /// Bytes of per-module private state the runtime should reserve. Zero means none.
    pub state_size: usize,

    /// Entry points, in the order they should appear in the method table.
    pub methods: Vec<MethodDef>,
}

impl ModuleDef {
    /// Create an empty module definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the module docstring.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Set the size of the module's private state block.
    pub fn with_state_size(mut self, state_size: usize) -> Self {
        self.state_size = state_size;
        self
    }

    /// Append one entry point.
    pub fn with_method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    /// Append several entry points, keeping their order.
    pub fn with_methods(mut self, methods: impl IntoIterator<Item = MethodDef>) -> Self {
        self.methods.extend(methods);
        self
    }

    /// Number of entry points.
    pub fn method_count(&self) -> usize {
        self.methods.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    unsafe extern "C" fn two_args(
        _slf: *mut ffi::PyObject,
        _args: *mut ffi::PyObject,
    ) -> *mut ffi::PyObject {
        ptr::null_mut()
    }

    unsafe extern "C" fn three_args(
        _slf: *mut ffi::PyObject,
        _args: *mut ffi::PyObject,
        _kwargs: *mut ffi::PyObject,
    ) -> *mut ffi::PyObject {
        ptr::null_mut()
    }

    #[test]
    fn arity_constructors_select_flags() {
        assert_eq!(MethodDef::noargs("a", two_args).flags, MethodFlags::NOARGS);
        assert_eq!(MethodDef::single_arg("b", two_args).flags, MethodFlags::O);
        assert_eq!(MethodDef::varargs("c", two_args).flags, MethodFlags::VARARGS);
    }

    #[test]
    fn keyword_entry_keeps_thunk_identity() {
        let method = MethodDef::with_keywords("kw", three_args);
        assert_eq!(method.flags, MethodFlags::VARARGS | MethodFlags::KEYWORDS);
        assert_eq!(
            method.meth as usize,
            three_args as ffi::PyCFunctionWithKeywords as usize
        );
    }

    #[test]
    fn modifiers_are_added() {
        let method = MethodDef::noargs("m", two_args).with_flags(MethodFlags::CLASS);
        assert_eq!(method.flags, MethodFlags::NOARGS | MethodFlags::CLASS);
        assert!(method.doc.is_empty());
    }

    #[test]
    fn module_builder_preserves_method_order() {
        let module = ModuleDef::new("demo")
            .with_doc("d")
            .with_state_size(16)
            .with_method(MethodDef::noargs("first", two_args))
            .with_methods([
                MethodDef::single_arg("second", two_args),
                MethodDef::varargs("third", two_args),
            ]);

        assert_eq!(module.name, "demo");
        assert_eq!(module.doc, "d");
        assert_eq!(module.state_size, 16);
        assert_eq!(module.method_count(), 3);
        let names: Vec<_> = module.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["first", "second", "third"]);
    }
}
