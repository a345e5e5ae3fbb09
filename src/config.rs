//! Registration settings.

use pyembed_sys as ffi;
use std::ffi::c_int;

/// Settings applied to every registration made through a [`Registrar`](crate::Registrar).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrarConfig {
    /// API version stamp passed to the runtime's creation call.
    pub api_version: c_int,
}

impl RegistrarConfig {
    pub fn new() -> Self {
        Self {
            api_version: ffi::PYTHON_API_VERSION,
        }
    }

    /// Override the API version stamp, e.g. for a runtime built against older headers.
    pub fn with_api_version(mut self, api_version: c_int) -> Self {
        self.api_version = api_version;
        self
    }
}

impl Default for RegistrarConfig {
    fn default() -> Self {
        Self::new()
    }
}
