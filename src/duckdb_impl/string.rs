use libduckdb_sys::duckdb_string_t;

/// Strings up to this length live inside the `duckdb_string_t` itself.
const INLINE_LIMIT: usize = 12;

/// Copies a DuckDB VARCHAR row into an owned `String`, replacing invalid UTF-8.
///
/// # Safety
///
/// `s` must be a non-NULL row of a VARCHAR vector that is still alive.
pub unsafe fn decode_duckdb_string(s: &duckdb_string_t) -> String {
    // SAFETY: both union layouts start with the same `length` field.
    let len = unsafe { s.value.inlined.length } as usize;
    let data = if len <= INLINE_LIMIT {
        // SAFETY: short strings use the inlined layout.
        unsafe { s.value.inlined.inlined.as_ptr() }
    } else {
        // SAFETY: long strings use the pointer layout.
        unsafe { s.value.pointer.ptr }
    };
    // SAFETY: `data` points at `len` initialized bytes owned by the vector.
    let bytes = unsafe { std::slice::from_raw_parts(data as *const u8, len) };

    // SGF files in the wild are often Latin-1 or GB2312; keep what decodes.
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use libduckdb_sys::{
        duckdb_string_t__bindgen_ty_1, duckdb_string_t__bindgen_ty_1__bindgen_ty_1,
        duckdb_string_t__bindgen_ty_1__bindgen_ty_2,
    };
    use std::os::raw::c_char;

    fn short_string(bytes: &[u8]) -> duckdb_string_t {
        let mut inlined = [0 as c_char; 12];
        for (dst, src) in inlined.iter_mut().zip(bytes.iter().copied()) {
            *dst = src as c_char;
        }

        duckdb_string_t {
            value: duckdb_string_t__bindgen_ty_1 {
                inlined: duckdb_string_t__bindgen_ty_1__bindgen_ty_2 {
                    length: bytes.len() as u32,
                    inlined,
                },
            },
        }
    }

    fn long_string(bytes: &mut [u8]) -> duckdb_string_t {
        let mut prefix = [0 as c_char; 4];
        for (dst, src) in prefix.iter_mut().zip(bytes.iter().copied()) {
            *dst = src as c_char;
        }

        duckdb_string_t {
            value: duckdb_string_t__bindgen_ty_1 {
                pointer: duckdb_string_t__bindgen_ty_1__bindgen_ty_1 {
                    length: bytes.len() as u32,
                    prefix,
                    ptr: bytes.as_mut_ptr() as *mut c_char,
                },
            },
        }
    }

    #[test]
    fn test_decode_duckdb_string_inlined() {
        let input = short_string(b"(;B[aa])");
        // SAFETY: test fixture builds a valid inlined duckdb_string_t.
        let decoded = unsafe { decode_duckdb_string(&input) };
        assert_eq!(decoded, "(;B[aa])");
    }

    #[test]
    fn test_decode_duckdb_string_pointer() {
        let mut backing = b"(;SZ[19];B[pd])".to_vec(); // 15 bytes -> pointer path
        let input = long_string(backing.as_mut_slice());
        // SAFETY: test fixture keeps backing storage alive for decode duration.
        let decoded = unsafe { decode_duckdb_string(&input) };
        assert_eq!(decoded, "(;SZ[19];B[pd])");
    }

    #[test]
    fn test_decode_duckdb_string_pointer_invalid_utf8_lossy() {
        let mut backing = b"(;PB[\xb9\xc5\xc1\xa6])".to_vec();
        let expected = String::from_utf8_lossy(&backing).into_owned();
        let input = long_string(backing.as_mut_slice());
        // SAFETY: test fixture keeps backing storage alive for decode duration.
        let decoded = unsafe { decode_duckdb_string(&input) };
        assert_eq!(decoded, expected);
    }
}
