//! Row loop for the `VARCHAR -> VARCHAR` SGF scalars.
//!
//! # Safety
//! Only call from inside a DuckDB scalar `invoke()`, while its vectors are live.

use std::error::Error;
use std::ffi::CString;

use duckdb::{
    Result,
    core::{DataChunkHandle, FlatVector, Inserter, LogicalTypeId},
    vtab::arrow::WritableVector,
};
use libduckdb_sys::duckdb_string_t;

use super::string::decode_duckdb_string;

#[derive(Debug, Clone)]
pub enum VarcharOutput {
    Null,
    Value(String),
}

fn ensure_type(
    vec: &FlatVector,
    expected: LogicalTypeId,
    label: &str,
) -> Result<(), Box<dyn Error>> {
    let actual = vec.logical_type().id();
    if actual != expected {
        return Err(format!(
            "scalar helper type mismatch: {label} expected {expected:?}, got {actual:?}"
        )
        .into());
    }
    Ok(())
}

/// Replaces interior NULs, which `CString` cannot carry.
fn to_cstring(value: String) -> Result<CString, Box<dyn Error>> {
    if value.contains('\0') {
        Ok(CString::new(value.replace('\0', " "))?)
    } else {
        Ok(CString::new(value)?)
    }
}

/// Invoke a unary `VARCHAR -> VARCHAR` scalar. NULL inputs map to NULL outputs.
pub fn invoke_unary_varchar_to_varchar<F>(
    input: &DataChunkHandle,
    output: &mut dyn WritableVector,
    mut f: F,
) -> Result<(), Box<dyn Error>>
where
    F: FnMut(&str) -> Result<VarcharOutput, Box<dyn Error>>,
{
    let len = input.len();
    let input_vec = input.flat_vector(0);
    ensure_type(&input_vec, LogicalTypeId::Varchar, "input[0]")?;
    let input_slice = input_vec.as_slice::<duckdb_string_t>();
    let mut output_vec = output.flat_vector();
    ensure_type(&output_vec, LogicalTypeId::Varchar, "output")?;

    for (i, s) in input_slice.iter().take(len).enumerate() {
        if input_vec.row_is_null(i as u64) {
            output_vec.set_null(i);
            continue;
        }

        // SAFETY: Row nullability is checked above.
        let val = unsafe { decode_duckdb_string(s) };
        match f(val.as_ref())? {
            VarcharOutput::Null => output_vec.set_null(i),
            VarcharOutput::Value(v) => output_vec.insert(i, to_cstring(v)?),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::to_cstring;

    #[test]
    fn test_to_cstring_replaces_interior_nul() {
        let cstring = to_cstring("a\0b".to_string()).unwrap();
        assert_eq!(cstring.to_str().unwrap(), "a b");
    }

    #[test]
    fn test_to_cstring_keeps_clean_values() {
        let cstring = to_cstring("(;B[aa])".to_string()).unwrap();
        assert_eq!(cstring.as_bytes(), b"(;B[aa])");
    }
}
