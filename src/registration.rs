//! Hand-off of an assembled descriptor to the runtime.
//!
//! ```text
//! ModuleDef -> build_entry_table() -> assemble() -> ModuleRuntime::create_module() -> ModuleHandle
//! ```
//!
//! The runtime keeps pointers into the descriptor for the lifetime of the
//! module, so `register` consumes it and never touches that memory again.

use crate::arena::ForeignArena;
use crate::config::RegistrarConfig;
use crate::definition::ModuleDef;
use crate::descriptor::ModuleDescriptor;
use crate::error::RegistrationError;
use log::{debug, error};
use pyembed_sys as ffi;
use std::ffi::c_int;
use std::ptr::NonNull;

/// The runtime's module-creation entry point.
///
/// Implemented by [`CPython`] when linking against the runtime, and by stubs in tests.
pub trait ModuleRuntime {
    /// Create a module object from `def`.
    ///
    /// Returns null when the runtime rejects the definition.
    ///
    /// # Safety
    ///
    /// `def` must point to a fully initialized record that, together with its
    /// method table and strings, stays allocated and unmoved for the rest of
    /// the process. Any runtime-specific preconditions (such as holding the
    /// interpreter lock) must also hold.
    unsafe fn create_module(
        &self,
        def: NonNull<ffi::PyModuleDef>,
        api_version: c_int,
    ) -> *mut ffi::PyObject;
}

impl<R: ModuleRuntime + ?Sized> ModuleRuntime for &R {
    unsafe fn create_module(
        &self,
        def: NonNull<ffi::PyModuleDef>,
        api_version: c_int,
    ) -> *mut ffi::PyObject {
        // SAFETY: forwarded under the caller's guarantees.
        unsafe { (**self).create_module(def, api_version) }
    }
}

/// The linked CPython runtime.
///
/// The caller must hold the interpreter lock when registering through it.
#[cfg(feature = "link-python")]
#[derive(Debug, Clone, Copy, Default)]
pub struct CPython;

#[cfg(feature = "link-python")]
impl ModuleRuntime for CPython {
    unsafe fn create_module(
        &self,
        def: NonNull<ffi::PyModuleDef>,
        api_version: c_int,
    ) -> *mut ffi::PyObject {
        // SAFETY: upheld by the caller.
        unsafe { ffi::PyModule_Create2(def.as_ptr(), api_version) }
    }
}

/// Handle to a live module object inside the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleHandle(NonNull<ffi::PyObject>);

impl ModuleHandle {
    /// Wrap a raw object pointer, returning `None` for null.
    pub fn from_raw(ptr: *mut ffi::PyObject) -> Option<Self> {
        NonNull::new(ptr).map(ModuleHandle)
    }

    pub fn as_ptr(&self) -> *mut ffi::PyObject {
        self.0.as_ptr()
    }
}

/// Registers modules with a runtime.
///
/// Holds no state between calls: each registration builds its own arena,
/// table, and record.
#[derive(Debug, Clone)]
pub struct Registrar<R> {
    runtime: R,
    config: RegistrarConfig,
}

impl<R: ModuleRuntime> Registrar<R> {
    pub fn new(runtime: R) -> Self {
        Self::with_config(runtime, RegistrarConfig::default())
    }

    pub fn with_config(runtime: R, config: RegistrarConfig) -> Self {
        Self { runtime, config }
    }

    pub fn config(&self) -> &RegistrarConfig {
        &self.config
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Hand `descriptor` to the runtime.
    ///
    /// A null result becomes [`RegistrationError::ForeignRejection`]; the
    /// descriptor's memory is not reclaimed in either case.
    pub fn register(
        &self,
        descriptor: ModuleDescriptor,
    ) -> Result<ModuleHandle, RegistrationError> {
        #[cfg(feature = "profiling")]
        profiling::scope!("register_module");

        let module = descriptor.name().to_string_lossy().into_owned();
        let raw = descriptor.into_raw();

        // SAFETY: `raw` comes from a fully assembled descriptor whose arena is leaked.
        let handle = unsafe { self.runtime.create_module(raw, self.config.api_version) };

        match ModuleHandle::from_raw(handle) {
            Some(handle) => {
                debug!("registered module `{}`", module);
                Ok(handle)
            }
            None => {
                error!("runtime rejected module `{}`", module);
                Err(RegistrationError::ForeignRejection { module })
            }
        }
    }

    /// Build, assemble, and register `def` in one step.
    pub fn create(&self, def: &ModuleDef) -> Result<ModuleHandle, RegistrationError> {
        self.create_in(&ForeignArena::new(), def)
    }

    /// Like [`create`](Self::create), but building into a caller-supplied arena.
    ///
    /// Nothing reaches the runtime unless the whole descriptor was built.
    pub fn create_in(
        &self,
        arena: &ForeignArena,
        def: &ModuleDef,
    ) -> Result<ModuleHandle, RegistrationError> {
        let descriptor = ModuleDescriptor::build_in(arena, def)?;
        self.register(descriptor)
    }
}
