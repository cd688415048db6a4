use duckdb::vtab::BindInfo;
use libduckdb_sys::{
    duckdb_bind_get_named_parameter, duckdb_bind_info, duckdb_destroy_value, duckdb_free,
    duckdb_get_varchar, duckdb_is_null_value,
};
use std::ffi::{CStr, CString};
use std::os::raw::c_void;

#[derive(Debug, Eq, PartialEq)]
pub(crate) enum NamedParameter {
    Missing,
    Null,
    /// The value as DuckDB renders it to VARCHAR (`true`, `19`, `zstd`, ...).
    Value(String),
}

impl NamedParameter {
    /// `None` when the parameter was omitted or NULL.
    pub(crate) fn into_value(self) -> Option<String> {
        match self {
            Self::Missing | Self::Null => None,
            Self::Value(text) => Some(text),
        }
    }
}

/// Reads a named parameter of any type through its VARCHAR rendering.
pub(crate) fn get_named_parameter(
    bind: &BindInfo,
    name: &str,
) -> Result<NamedParameter, Box<dyn std::error::Error>> {
    let name_cstr = CString::new(name)?;

    // SAFETY: The returned value is owned by us and valid only for this bind callback.
    let mut value =
        unsafe { duckdb_bind_get_named_parameter(bind_info_ptr(bind), name_cstr.as_ptr()) };
    if value.is_null() {
        return Ok(NamedParameter::Missing);
    }

    // SAFETY: `value` is a valid `duckdb_value` handle and is destroyed exactly once below.
    let result = unsafe {
        if duckdb_is_null_value(value) {
            Ok(NamedParameter::Null)
        } else {
            let varchar = duckdb_get_varchar(value);
            if varchar.is_null() {
                Err(format!("Failed to read named parameter '{}'", name).into())
            } else {
                let text = CStr::from_ptr(varchar).to_string_lossy().into_owned();
                duckdb_free(varchar as *mut c_void);
                Ok(NamedParameter::Value(text))
            }
        }
    };

    // SAFETY: `value` has not been destroyed yet and must be released once.
    unsafe {
        duckdb_destroy_value(&mut value);
    }

    result
}

fn bind_info_ptr(bind: &BindInfo) -> duckdb_bind_info {
    // SAFETY: duckdb-rs stores `duckdb_bind_info` as the only field of `BindInfo` and
    // exposes no raw accessor or null-aware named-parameter getter. Re-check the layout in
    // duckdb-rs `src/vtab/function.rs` on every upgrade.
    unsafe { *(bind as *const BindInfo as *const duckdb_bind_info) }
}
