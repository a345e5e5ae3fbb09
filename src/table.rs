//! Sentinel-terminated method tables.
//!
//! A table for N methods is one contiguous array of N + 1 `PyMethodDef`
//! records. Rows `0..N` mirror the input in order; row N is all zero and is
//! how the runtime finds the end of the table.

use crate::arena::ForeignArena;
use crate::definition::MethodDef;
use crate::error::BuildError;
use crate::flags::MethodFlags;
use log::{debug, warn};
use pyembed_sys as ffi;
use rustc_hash::FxHashSet;
use std::ffi::{CStr, c_char};
use std::fmt;
use std::ptr::NonNull;
use std::slice;

/// A method table living in leaked arena memory.
///
/// The table is never written after the sentinel row; every accessor here is a
/// read of memory that stays allocated for the rest of the process.
pub struct EntryTable {
    rows: NonNull<ffi::PyMethodDef>,
    /// Number of rows including the sentinel.
    row_count: usize,
}

// SAFETY: the rows are immutable after construction and never freed.
unsafe impl Send for EntryTable {}

impl EntryTable {
    /// Number of real entries, not counting the sentinel.
    pub fn len(&self) -> usize {
        self.row_count - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every row, sentinel included.
    pub fn records(&self) -> &[ffi::PyMethodDef] {
        // SAFETY: `rows` points at `row_count` initialized records.
        unsafe { slice::from_raw_parts(self.rows.as_ptr(), self.row_count) }
    }

    /// The real entries, sentinel excluded.
    pub fn entries(&self) -> &[ffi::PyMethodDef] {
        &self.records()[..self.len()]
    }

    /// The terminating row.
    pub fn sentinel(&self) -> &ffi::PyMethodDef {
        &self.records()[self.len()]
    }

    /// Name of the entry at `index`, or `None` past the last real entry.
    pub fn name(&self, index: usize) -> Option<&CStr> {
        self.entries()
            .get(index)
            .and_then(|row| read_c_str(row.ml_name))
    }

    /// Docstring of the entry at `index`, or `None` past the last real entry.
    pub fn doc(&self, index: usize) -> Option<&CStr> {
        self.entries()
            .get(index)
            .and_then(|row| read_c_str(row.ml_doc))
    }

    /// Flags of the entry at `index`.
    pub fn flags(&self, index: usize) -> Option<MethodFlags> {
        self.entries()
            .get(index)
            .map(|row| MethodFlags::from_bits_retain(row.ml_flags))
    }

    /// Address of the first row, as stored in `PyModuleDef::m_methods`.
    pub fn as_ptr(&self) -> *mut ffi::PyMethodDef {
        self.rows.as_ptr()
    }
}

impl fmt::Debug for EntryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = (0..self.len()).filter_map(|i| self.name(i)).collect();
        f.debug_struct("EntryTable")
            .field("rows", &self.rows)
            .field("names", &names)
            .finish()
    }
}

fn read_c_str<'a>(ptr: *const c_char) -> Option<&'a CStr> {
    // SAFETY: non-null names and docs in a table are NUL-terminated arena strings.
    (!ptr.is_null()).then(|| unsafe { CStr::from_ptr(ptr) })
}

/// Translate one host entry into its foreign record.
fn method_record(arena: &ForeignArena, method: &MethodDef) -> Result<ffi::PyMethodDef, BuildError> {
    let name = arena.alloc_c_str("method name", &method.name, &method.name)?;
    let doc = arena.alloc_c_str("method doc", &method.name, &method.doc)?;

    Ok(ffi::PyMethodDef {
        ml_name: name.as_ptr(),
        ml_meth: Some(method.meth),
        ml_flags: method.flags.bits(),
        ml_doc: doc.as_ptr(),
    })
}

/// Build the method table for `methods`, in order, followed by the sentinel.
///
/// An empty slice yields a one-row table holding only the sentinel. Flag
/// combinations and name uniqueness are left for the runtime to judge.
pub fn build_entry_table(
    arena: &ForeignArena,
    methods: &[MethodDef],
) -> Result<EntryTable, BuildError> {
    #[cfg(feature = "profiling")]
    profiling::scope!("build_entry_table");

    let row_count = methods.len() + 1;
    let rows = arena.alloc_records::<ffi::PyMethodDef>("method table", row_count)?;

    let mut seen = FxHashSet::default();
    for (index, method) in methods.iter().enumerate() {
        if method.flags.arity().is_none() {
            warn!(
                "method `{}` has flags {:#x} without exactly one arity flag",
                method.name,
                method.flags.bits()
            );
        }
        if !seen.insert(method.name.as_str()) {
            debug!(
                "method `{}` appears more than once in the table",
                method.name
            );
        }

        let record = method_record(arena, method)?;
        // SAFETY: `index < row_count` and the slot is inside the table allocation.
        unsafe { rows.as_ptr().add(index).write(record) };
    }

    let sentinel = ffi::PyMethodDef::zeroed();
    // SAFETY: `methods.len()` is the last slot of the allocation.
    unsafe { rows.as_ptr().add(methods.len()).write(sentinel) };

    debug!("built method table with {} entries", methods.len());
    Ok(EntryTable { rows, row_count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    unsafe extern "C" fn first(
        _slf: *mut ffi::PyObject,
        _args: *mut ffi::PyObject,
    ) -> *mut ffi::PyObject {
        ptr::null_mut()
    }

    unsafe extern "C" fn second(
        _slf: *mut ffi::PyObject,
        _args: *mut ffi::PyObject,
    ) -> *mut ffi::PyObject {
        ptr::null_mut()
    }

    fn sample_methods(count: usize) -> Vec<MethodDef> {
        (0..count)
            .map(|i| MethodDef::varargs(format!("m{}", i), first).with_doc(format!("doc {}", i)))
            .collect()
    }

    #[test]
    fn empty_input_yields_sentinel_only_table() {
        let arena = ForeignArena::new();
        let table = build_entry_table(&arena, &[]).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.records().len(), 1);
        assert!(!table.as_ptr().is_null());
        assert!(table.sentinel().is_sentinel());
    }

    #[test]
    fn table_has_one_extra_row_for_every_size() {
        for count in [1, 2, 7, 64] {
            let arena = ForeignArena::new();
            let table = build_entry_table(&arena, &sample_methods(count)).unwrap();
            assert_eq!(table.records().len(), count + 1);
            assert_eq!(table.len(), count);
            assert!(table.records()[count].is_sentinel());
            assert!(table.entries().iter().all(|row| !row.is_sentinel()));
        }
    }

    #[test]
    fn rows_follow_input_order() {
        let arena = ForeignArena::new();
        let methods = sample_methods(5);
        let table = build_entry_table(&arena, &methods).unwrap();
        for (index, method) in methods.iter().enumerate() {
            assert_eq!(table.name(index).unwrap().to_str().unwrap(), method.name);
            assert_eq!(table.doc(index).unwrap().to_str().unwrap(), method.doc);
        }
        assert!(table.name(5).is_none());
    }

    #[test]
    fn record_fields_are_copied() {
        let arena = ForeignArena::new();
        let methods = vec![
            MethodDef::noargs("a", first),
            MethodDef::single_arg("b", second).with_flags(MethodFlags::STATIC),
        ];
        let table = build_entry_table(&arena, &methods).unwrap();

        let rows = table.entries();
        assert!(ptr::fn_addr_eq(rows[0].ml_meth.unwrap(), first as ffi::PyCFunction));
        assert!(ptr::fn_addr_eq(rows[1].ml_meth.unwrap(), second as ffi::PyCFunction));
        assert_eq!(table.flags(0), Some(MethodFlags::NOARGS));
        assert_eq!(table.flags(1), Some(MethodFlags::O | MethodFlags::STATIC));
        assert_eq!(table.doc(0).unwrap().to_bytes(), b"");
    }

    #[test]
    fn name_and_doc_are_separate_allocations() {
        let arena = ForeignArena::new();
        let methods = vec![MethodDef::noargs("same", first).with_doc("same")];
        let table = build_entry_table(&arena, &methods).unwrap();
        let row = &table.entries()[0];
        assert_ne!(row.ml_name, row.ml_doc);
    }

    #[test]
    fn duplicate_names_are_kept_verbatim() {
        let arena = ForeignArena::new();
        let methods = vec![
            MethodDef::noargs("dup", first).with_doc("one"),
            MethodDef::noargs("dup", second).with_doc("two"),
        ];
        let table = build_entry_table(&arena, &methods).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.name(0), table.name(1));
        assert_eq!(table.doc(0).unwrap().to_str().unwrap(), "one");
        assert_eq!(table.doc(1).unwrap().to_str().unwrap(), "two");
    }

    #[test]
    fn unusual_flag_combinations_are_not_rejected() {
        let arena = ForeignArena::new();
        let flags = MethodFlags::VARARGS | MethodFlags::O | MethodFlags::CLASS;
        let methods = vec![MethodDef::new("odd", first, flags)];
        let table = build_entry_table(&arena, &methods).unwrap();
        assert_eq!(table.flags(0), Some(flags));
    }

    #[test]
    fn nul_in_doc_fails_the_build() {
        let arena = ForeignArena::new();
        let methods = vec![MethodDef::noargs("f", first).with_doc("bad\0doc")];
        let err = build_entry_table(&arena, &methods).unwrap_err();
        assert_eq!(
            err,
            BuildError::InteriorNul {
                field: "method doc",
                owner: "f".to_string(),
                position: 3,
            }
        );
    }

    #[test]
    fn exhausted_arena_fails_the_build() {
        let arena = ForeignArena::with_allocation_limit(0);
        let err = build_entry_table(&arena, &sample_methods(3)).unwrap_err();
        assert_eq!(
            err,
            BuildError::Allocation {
                what: "method table",
                bytes: 4 * size_of::<ffi::PyMethodDef>(),
            }
        );
        assert!(err.is_allocation_failure());
    }

    #[test]
    fn exhausted_arena_fails_even_the_sentinel_only_table() {
        let arena = ForeignArena::with_allocation_limit(0);
        let err = build_entry_table(&arena, &[]).unwrap_err();
        assert!(err.is_allocation_failure());
    }
}
