//! Pass-through accessors for module objects.
//!
//! Each function forwards one pointer to the runtime and hands back its result.
//! All of them require the interpreter lock to be held by the caller.

use crate::error::{BuildError, RegistrationError};
use crate::registration::ModuleHandle;
use pyembed_sys as ffi;
use std::ffi::{CStr, CString, c_void};
use std::ptr;

/// The runtime's module type object.
pub fn module_type() -> *mut ffi::PyTypeObject {
    ptr::addr_of_mut!(ffi::PyModule_Type)
}

/// True when `object` is a module or an instance of a module subtype.
///
/// # Safety
///
/// `object` must point to a live runtime object.
pub unsafe fn is_module(object: *mut ffi::PyObject) -> bool {
    // SAFETY: upheld by the caller.
    unsafe {
        let ty = (*object).ob_type;
        ty == module_type() || ffi::PyType_IsSubtype(ty, module_type()) != 0
    }
}

/// True when `object` is exactly a module, not a subtype instance.
///
/// # Safety
///
/// `object` must point to a live runtime object.
pub unsafe fn is_exact_module(object: *mut ffi::PyObject) -> bool {
    // SAFETY: upheld by the caller.
    unsafe { (*object).ob_type == module_type() }
}

/// Create an empty module with the given name.
///
/// # Safety
///
/// The interpreter lock must be held.
pub unsafe fn new_module(name: &str) -> Result<ModuleHandle, RegistrationError> {
    let c_name = CString::new(name).map_err(|err| BuildError::InteriorNul {
        field: "module name",
        owner: name.to_string(),
        position: err.nul_position(),
    })?;

    // SAFETY: the runtime copies the name before returning.
    let raw = unsafe { ffi::PyModule_New(c_name.as_ptr()) };
    ModuleHandle::from_raw(raw).ok_or_else(|| RegistrationError::ForeignRejection {
        module: name.to_string(),
    })
}

/// Create an empty module whose name is the string object `name`.
///
/// # Safety
///
/// The interpreter lock must be held and `name` must be a live string object.
pub unsafe fn new_module_object(name: *mut ffi::PyObject) -> Option<ModuleHandle> {
    // SAFETY: upheld by the caller.
    ModuleHandle::from_raw(unsafe { ffi::PyModule_NewObject(name) })
}

impl ModuleHandle {
    /// The module's namespace dictionary (borrowed reference).
    ///
    /// # Safety
    ///
    /// The interpreter lock must be held and the module must still be alive.
    pub unsafe fn dict(&self) -> *mut ffi::PyObject {
        unsafe { ffi::PyModule_GetDict(self.as_ptr()) }
    }

    /// The module's `__name__` as a new reference.
    ///
    /// # Safety
    ///
    /// The interpreter lock must be held and the module must still be alive.
    pub unsafe fn name_object(&self) -> *mut ffi::PyObject {
        unsafe { ffi::PyModule_GetNameObject(self.as_ptr()) }
    }

    /// The module's name, or `None` if the runtime reported an error.
    ///
    /// # Safety
    ///
    /// The interpreter lock must be held and the module must still be alive.
    pub unsafe fn name(&self) -> Option<String> {
        let name = unsafe { ffi::PyModule_GetName(self.as_ptr()) };
        if name.is_null() {
            return None;
        }
        let name = unsafe { CStr::from_ptr(name) };
        Some(name.to_string_lossy().into_owned())
    }

    /// The module's private state block, or null when `state_size` was zero.
    ///
    /// # Safety
    ///
    /// The interpreter lock must be held and the module must still be alive.
    pub unsafe fn state(&self) -> *mut c_void {
        unsafe { ffi::PyModule_GetState(self.as_ptr()) }
    }

    /// The module's `__file__` as a new reference.
    ///
    /// # Safety
    ///
    /// The interpreter lock must be held and the module must still be alive.
    pub unsafe fn filename_object(&self) -> *mut ffi::PyObject {
        unsafe { ffi::PyModule_GetFilenameObject(self.as_ptr()) }
    }
}
