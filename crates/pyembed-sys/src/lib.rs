//! Raw CPython records used to describe an extension module.
//!
//! Every type here mirrors the C layout of the runtime headers field for field.
//! Nothing in this crate allocates or validates; the `pyembed` crate builds
//! these records and owns the lifetime policy.
//!
//! The entry points themselves are only declared with the `link-python`
//! feature, so layout-only users never need a runtime library at link time.

#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(non_upper_case_globals)]

use std::ffi::{c_char, c_int, c_void};
use std::ptr;

pub type Py_ssize_t = isize;

/// Version stamp passed to `PyModule_Create2`.
pub const PYTHON_API_VERSION: c_int = 1013;

// Calling-convention and binding flags for `PyMethodDef::ml_flags`.
pub const METH_VARARGS: c_int = 0x0001;
pub const METH_KEYWORDS: c_int = 0x0002;
pub const METH_NOARGS: c_int = 0x0004;
pub const METH_O: c_int = 0x0008;
pub const METH_CLASS: c_int = 0x0010;
pub const METH_STATIC: c_int = 0x0020;
pub const METH_COEXIST: c_int = 0x0040;

/// Opaque type object. Only ever handled by pointer.
#[repr(C)]
pub struct PyTypeObject {
    _private: [u8; 0],
}

/// Object header shared by every runtime object.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct PyObject {
    pub ob_refcnt: Py_ssize_t,
    pub ob_type: *mut PyTypeObject,
}

pub type PyCFunction =
    unsafe extern "C" fn(slf: *mut PyObject, args: *mut PyObject) -> *mut PyObject;

pub type PyCFunctionWithKeywords = unsafe extern "C" fn(
    slf: *mut PyObject,
    args: *mut PyObject,
    kwargs: *mut PyObject,
) -> *mut PyObject;

pub type visitproc = unsafe extern "C" fn(object: *mut PyObject, arg: *mut c_void) -> c_int;
pub type traverseproc =
    unsafe extern "C" fn(slf: *mut PyObject, visit: visitproc, arg: *mut c_void) -> c_int;
pub type inquiry = unsafe extern "C" fn(slf: *mut PyObject) -> c_int;
pub type freefunc = unsafe extern "C" fn(module: *mut c_void);

/// One row of a module's method table.
///
/// `ml_meth` is nullable so that the all-zero sentinel row is representable.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct PyMethodDef {
    pub ml_name: *const c_char,
    pub ml_meth: Option<PyCFunction>,
    pub ml_flags: c_int,
    pub ml_doc: *const c_char,
}

impl PyMethodDef {
    /// The end-of-table marker: every field null or zero.
    pub const fn zeroed() -> Self {
        PyMethodDef {
            ml_name: ptr::null(),
            ml_meth: None,
            ml_flags: 0,
            ml_doc: ptr::null(),
        }
    }

    /// True when this row is the end-of-table marker.
    pub fn is_sentinel(&self) -> bool {
        self.ml_name.is_null()
            && self.ml_meth.is_none()
            && self.ml_flags == 0
            && self.ml_doc.is_null()
    }
}

/// Multi-phase initialization slot. Never populated by `pyembed`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct PyModuleDef_Slot {
    pub slot: c_int,
    pub value: *mut c_void,
}

/// Header of a module definition, including the legacy single-phase fields.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct PyModuleDef_Base {
    pub ob_base: PyObject,
    pub m_init: Option<unsafe extern "C" fn() -> *mut PyObject>,
    pub m_index: Py_ssize_t,
    pub m_copy: *mut PyObject,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct PyModuleDef {
    pub m_base: PyModuleDef_Base,
    pub m_name: *const c_char,
    pub m_doc: *const c_char,
    pub m_size: Py_ssize_t,
    pub m_methods: *mut PyMethodDef,
    pub m_slots: *mut PyModuleDef_Slot,
    pub m_traverse: Option<traverseproc>,
    pub m_clear: Option<inquiry>,
    pub m_free: Option<freefunc>,
}

/// Statically allocated header: one reference, type filled in by the runtime.
pub const PyObject_HEAD_INIT: PyObject = PyObject {
    ob_refcnt: 1,
    ob_type: ptr::null_mut(),
};

pub const PyModuleDef_HEAD_INIT: PyModuleDef_Base = PyModuleDef_Base {
    ob_base: PyObject_HEAD_INIT,
    m_init: None,
    m_index: 0,
    m_copy: ptr::null_mut(),
};

#[cfg(feature = "link-python")]
unsafe extern "C" {
    pub static mut PyModule_Type: PyTypeObject;

    pub fn PyModule_Create2(def: *mut PyModuleDef, apiver: c_int) -> *mut PyObject;
    pub fn PyModule_New(name: *const c_char) -> *mut PyObject;
    pub fn PyModule_NewObject(name: *mut PyObject) -> *mut PyObject;
    pub fn PyModule_GetDict(module: *mut PyObject) -> *mut PyObject;
    pub fn PyModule_GetNameObject(module: *mut PyObject) -> *mut PyObject;
    pub fn PyModule_GetName(module: *mut PyObject) -> *const c_char;
    pub fn PyModule_GetState(module: *mut PyObject) -> *mut c_void;
    pub fn PyModule_GetFilenameObject(module: *mut PyObject) -> *mut PyObject;
    pub fn PyType_IsSubtype(a: *mut PyTypeObject, b: *mut PyTypeObject) -> c_int;
}
