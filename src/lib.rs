//! Build CPython extension-module descriptors from Rust values and register them.
//!
//! A [`ModuleDef`] describes the module on the Rust side. Registration turns it
//! into the runtime's own records and hands them over:
//!
//! 1. [`build_entry_table`] copies the methods into a sentinel-terminated
//!    `PyMethodDef` array.
//! 2. [`assemble`] wraps that table in a `PyModuleDef` with an initialized header.
//! 3. [`Registrar::register`] passes the record to the runtime's creation call.
//!
//! All records live in a leaked [`ForeignArena`]: the runtime keeps pointers
//! into them for as long as the module exists and never reports when that ends.
//!
//! # Example
//!
//! ```ignore
//! use pyembed::{CPython, MethodDef, ModuleDef, Registrar};
//!
//! let def = ModuleDef::new("demo")
//!     .with_doc("Demo module")
//!     .with_method(MethodDef::noargs("ping", ping));
//!
//! let module = Registrar::new(CPython).create(&def)?;
//! ```

pub use pyembed_sys as ffi;

mod arena;
mod config;
mod definition;
mod descriptor;
mod error;
mod flags;
mod registration;
mod table;

#[cfg(feature = "link-python")]
pub mod accessors;

pub use arena::ForeignArena;
pub use config::RegistrarConfig;
pub use definition::{MethodDef, ModuleDef};
pub use descriptor::{ModuleDescriptor, assemble};
pub use error::{BuildError, RegistrationError};
pub use flags::{ARITY_MASK, Arity, MethodFlags};
pub use registration::{ModuleHandle, ModuleRuntime, Registrar};
pub use table::{EntryTable, build_entry_table};

#[cfg(feature = "link-python")]
pub use registration::CPython;
