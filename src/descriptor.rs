//! Assembly of the top-level module record.
//!
//! The record is built bottom-up: object header, then the definition base,
//! then the strings, then the record itself. The runtime may read any field as
//! soon as it receives the pointer, so nothing is published half-written.

use crate::arena::ForeignArena;
use crate::definition::ModuleDef;
use crate::error::BuildError;
use crate::table::{EntryTable, build_entry_table};
use log::debug;
use pyembed_sys as ffi;
use std::ffi::{CStr, c_char};
use std::fmt;
use std::ptr::{self, NonNull};

/// A fully initialized `PyModuleDef` in leaked arena memory, plus its table.
///
/// Consumed by [`Registrar::register`](crate::Registrar::register); after the
/// hand-off the runtime owns the record and may write to it.
pub struct ModuleDescriptor {
    raw: NonNull<ffi::PyModuleDef>,
    table: EntryTable,
}

// SAFETY: the record and everything it references are never freed, and no
// other handle to them exists until the descriptor is registered.
unsafe impl Send for ModuleDescriptor {}

impl ModuleDescriptor {
    /// Build the table and record for `def` in a fresh arena.
    pub fn build(def: &ModuleDef) -> Result<Self, BuildError> {
        Self::build_in(&ForeignArena::new(), def)
    }

    /// Build the table and record for `def` in `arena`.
    pub fn build_in(arena: &ForeignArena, def: &ModuleDef) -> Result<Self, BuildError> {
        let table = build_entry_table(arena, &def.methods)?;
        assemble(arena, &def.name, &def.doc, def.state_size, table)
    }

    /// The record as the runtime will see it.
    pub fn raw(&self) -> &ffi::PyModuleDef {
        // SAFETY: `raw` is initialized and nothing else writes to it before hand-off.
        unsafe { self.raw.as_ref() }
    }

    /// The object header embedded in the definition base.
    pub fn header(&self) -> &ffi::PyObject {
        &self.raw().m_base.ob_base
    }

    pub fn base(&self) -> &ffi::PyModuleDef_Base {
        &self.raw().m_base
    }

    pub fn name(&self) -> &CStr {
        // SAFETY: assembled from a NUL-terminated arena string.
        unsafe { CStr::from_ptr(self.raw().m_name) }
    }

    pub fn doc(&self) -> &CStr {
        // SAFETY: assembled from a NUL-terminated arena string.
        unsafe { CStr::from_ptr(self.raw().m_doc) }
    }

    /// Bytes of private state the runtime will reserve.
    pub fn state_size(&self) -> ffi::Py_ssize_t {
        self.raw().m_size
    }

    pub fn table(&self) -> &EntryTable {
        &self.table
    }

    pub fn as_ptr(&self) -> NonNull<ffi::PyModuleDef> {
        self.raw
    }

    /// Give up the descriptor, returning the address to hand to the runtime.
    pub(crate) fn into_raw(self) -> NonNull<ffi::PyModuleDef> {
        self.raw
    }
}

impl fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDescriptor")
            .field("name", &self.name())
            .field("state_size", &self.state_size())
            .field("table", &self.table)
            .finish()
    }
}

/// Assemble the module record around an already built `table`.
pub fn assemble(
    arena: &ForeignArena,
    name: &str,
    doc: &str,
    state_size: usize,
    table: EntryTable,
) -> Result<ModuleDescriptor, BuildError> {
    #[cfg(feature = "profiling")]
    profiling::scope!("assemble_module_descriptor");

    let m_size = ffi::Py_ssize_t::try_from(state_size)
        .map_err(|_| BuildError::StateSizeOverflow { size: state_size })?;

    let header = ffi::PyObject_HEAD_INIT;
    let base = ffi::PyModuleDef_Base {
        ob_base: header,
        m_init: None,
        m_index: 0,
        m_copy: ptr::null_mut(),
    };

    let m_name: *const c_char = arena.alloc_c_str("module name", name, name)?.as_ptr();
    let m_doc: *const c_char = arena.alloc_c_str("module doc", name, doc)?.as_ptr();

    let record = ffi::PyModuleDef {
        m_base: base,
        m_name,
        m_doc,
        m_size,
        m_methods: table.as_ptr(),
        m_slots: ptr::null_mut(),
        m_traverse: None,
        m_clear: None,
        m_free: None,
    };
    let raw = arena.alloc_record("module definition", record)?;

    debug!(
        "assembled module `{}` with {} methods and {} bytes of state",
        name,
        table.len(),
        state_size
    );
    Ok(ModuleDescriptor { raw, table })
}
