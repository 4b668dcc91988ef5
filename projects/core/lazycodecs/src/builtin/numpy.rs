//! NPY container support.
//!
//! Reads format versions 1.0 to 3.0 (C or Fortran order, either byte order) and writes
//! version 1.0, or 2.0 when the header does not fit a 16-bit length. NPZ archives are
//! recognised by [`numpy_check`] but not decoded.

use lazycodecs_api_common::{
    ArrayBuffer, CodecBundle, CodecError, CodecOptions, CodecResult, ElementType,
};

const MAGIC: &[u8; 6] = b"\x93NUMPY";
const ZIP_MAGIC: &[u8; 2] = b"PK";
const CHECK_WINDOW: usize = 64;
const HEADER_ALIGNMENT: usize = 64;
const NOT_NUMPY: &str = "not a numpy array";

pub(crate) fn bundle() -> CodecBundle {
    CodecBundle::new("numpy")
        .encode(numpy_encode)
        .decode(numpy_decode)
        .check(numpy_check)
        .version(|| "numpy npy-1.0".to_owned())
}

/// Whether `data` starts like an NPY file or an NPZ archive.
pub fn numpy_check(data: &[u8]) -> bool {
    let window = &data[..data.len().min(CHECK_WINDOW)];
    window.starts_with(MAGIC)
        || (window.starts_with(ZIP_MAGIC) && window.windows(MAGIC.len()).any(|w| w == MAGIC))
}

pub fn numpy_decode(data: &[u8], _options: &CodecOptions) -> CodecResult<ArrayBuffer> {
    if !data.starts_with(MAGIC) {
        if numpy_check(data) {
            return Err(CodecError::unsupported("NPZ archives are not supported"));
        }
        return Err(CodecError::not_this_format(NOT_NUMPY));
    }

    let header = Header::parse(data)?;
    let len = ArrayBuffer::byte_len_of(&header.shape, header.element_type)?;
    let body = header
        .data_offset
        .checked_add(len)
        .and_then(|end| data.get(header.data_offset..end))
        .ok_or_else(|| {
            CodecError::corrupt(format!(
                "array data is truncated: expected {len} bytes after the header"
            ))
        })?;

    let mut body = body.to_vec();
    if header.big_endian {
        swap_byte_order(&mut body, header.element_type.size_in_bytes());
    }
    if header.fortran_order && header.shape.len() > 1 {
        body = fortran_to_c_order(&body, &header.shape, header.element_type.size_in_bytes());
    }

    Ok(ArrayBuffer::new(body, header.shape, header.element_type)?)
}

pub fn numpy_encode(array: &ArrayBuffer, options: &CodecOptions) -> CodecResult<Vec<u8>> {
    if options.get_int("level").is_some_and(|level| level != 0) {
        return Err(CodecError::unsupported("writing NPZ archives is not supported"));
    }

    let descr = descr_of(array.element_type()).ok_or_else(|| {
        CodecError::invalid_input(format!(
            "cannot encode elements of type {}",
            array.element_type()
        ))
    })?;

    let dict = format!(
        "{{'descr': '{descr}', 'fortran_order': False, 'shape': {}, }}",
        shape_literal(array.shape())
    );

    // magic + version + length field, then the dict, padding and a newline
    let mut prefix_len = MAGIC.len() + 2 + 2;
    let mut header_len = padded_len(prefix_len, dict.len());
    let major = if header_len <= usize::from(u16::MAX) {
        1
    } else {
        prefix_len = MAGIC.len() + 2 + 4;
        header_len = padded_len(prefix_len, dict.len());
        2
    };

    let mut out = Vec::with_capacity(prefix_len + header_len + array.as_bytes().len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&[major, 0]);
    if major == 1 {
        out.extend_from_slice(&(header_len as u16).to_le_bytes());
    } else {
        let len = u32::try_from(header_len)
            .map_err(|_| CodecError::invalid_input("array header is too large"))?;
        out.extend_from_slice(&len.to_le_bytes());
    }
    out.extend_from_slice(dict.as_bytes());
    out.resize(prefix_len + header_len - 1, b' ');
    out.push(b'\n');
    out.extend_from_slice(array.as_bytes());
    Ok(out)
}

/// Header length (dict, padding, newline) that aligns the data to [`HEADER_ALIGNMENT`].
fn padded_len(prefix_len: usize, dict_len: usize) -> usize {
    let unpadded = prefix_len + dict_len + 1;
    unpadded.next_multiple_of(HEADER_ALIGNMENT) - prefix_len
}

fn shape_literal(shape: &[usize]) -> String {
    match shape {
        [] => "()".to_owned(),
        [single] => format!("({single},)"),
        dims => {
            let dims: Vec<String> = dims.iter().map(ToString::to_string).collect();
            format!("({})", dims.join(", "))
        }
    }
}

/// Type code and item size of an element type, as used in NPY `descr` strings.
fn type_code(element_type: ElementType) -> Option<(char, usize)> {
    let code = match element_type {
        ElementType::Bool => 'b',
        ElementType::U8 | ElementType::U16 | ElementType::U32 | ElementType::U64 => 'u',
        ElementType::I8 | ElementType::I16 | ElementType::I32 | ElementType::I64 => 'i',
        ElementType::F16 | ElementType::F32 | ElementType::F64 => 'f',
        ElementType::Undetermined => return None,
    };
    Some((code, element_type.size_in_bytes()))
}

fn descr_of(element_type: ElementType) -> Option<String> {
    let (code, size) = type_code(element_type)?;
    let order = if size == 1 { '|' } else { '<' };
    Some(format!("{order}{code}{size}"))
}

/// Parses a `descr` string into an element type and whether it is big-endian.
fn parse_descr(descr: &str) -> CodecResult<(ElementType, bool)> {
    let unsupported = || CodecError::unsupported(format!("unsupported dtype '{descr}'"));
    let mut chars = descr.chars();
    let (big_endian, rest) = match chars.next() {
        Some('<' | '=' | '|') => (false, chars.as_str()),
        Some('>') => (true, chars.as_str()),
        _ => (false, descr),
    };

    let mut chars = rest.chars();
    let code = chars.next().ok_or_else(unsupported)?;
    if code == 'O' {
        return Err(CodecError::unsupported(
            "object arrays cannot be loaded without unpickling",
        ));
    }
    let size: usize = chars.as_str().parse().map_err(|_| unsupported())?;

    ElementType::all_values()
        .iter()
        .copied()
        .find(|kind| type_code(*kind) == Some((code, size)))
        .map(|kind| (kind, big_endian && size > 1))
        .ok_or_else(unsupported)
}

#[derive(Debug, PartialEq, Eq)]
struct Header {
    element_type: ElementType,
    big_endian: bool,
    fortran_order: bool,
    shape: Vec<usize>,
    data_offset: usize,
}

impl Header {
    fn parse(data: &[u8]) -> CodecResult<Self> {
        let truncated = || CodecError::corrupt("NPY header is truncated");
        let version = data.get(MAGIC.len()..MAGIC.len() + 2).ok_or_else(truncated)?;
        let (len_size, dict_len) = match version[0] {
            1 => {
                let bytes = data.get(8..10).ok_or_else(truncated)?;
                (2, usize::from(u16::from_le_bytes([bytes[0], bytes[1]])))
            }
            2 | 3 => {
                let bytes = data.get(8..12).ok_or_else(truncated)?;
                let len = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                (4, len as usize)
            }
            major => {
                return Err(CodecError::unsupported(format!(
                    "NPY format version {major}.{} is not supported",
                    version[1]
                )))
            }
        };

        let dict_start = MAGIC.len() + 2 + len_size;
        let data_offset = dict_start + dict_len;
        let dict = data.get(dict_start..data_offset).ok_or_else(truncated)?;
        let dict = std::str::from_utf8(dict)
            .map_err(|_| CodecError::corrupt("NPY header is not valid text"))?;

        let descr = dict_value(dict, "descr")
            .and_then(quoted)
            .ok_or_else(|| CodecError::corrupt("NPY header has no 'descr'"))?;
        let (element_type, big_endian) = parse_descr(descr)?;

        let fortran_order = match dict_value(dict, "fortran_order") {
            Some(value) if value.starts_with("True") => true,
            Some(value) if value.starts_with("False") => false,
            _ => return Err(CodecError::corrupt("NPY header has no 'fortran_order'")),
        };

        let shape = dict_value(dict, "shape")
            .and_then(parse_shape)
            .ok_or_else(|| CodecError::corrupt("NPY header has no valid 'shape'"))?;

        Ok(Self {
            element_type,
            big_endian,
            fortran_order,
            shape,
            data_offset,
        })
    }
}

/// Text following `'key':` in a header dict, with leading whitespace removed.
fn dict_value<'a>(dict: &'a str, key: &str) -> Option<&'a str> {
    ["'", "\""].iter().find_map(|quote| {
        let needle = format!("{quote}{key}{quote}");
        let rest = &dict[dict.find(&needle)? + needle.len()..];
        Some(rest.trim_start().strip_prefix(':')?.trim_start())
    })
}

/// Contents of a leading single- or double-quoted string.
fn quoted(value: &str) -> Option<&str> {
    let quote = value.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    let rest = &value[1..];
    rest.find(quote).map(|end| &rest[..end])
}

/// Parses a leading tuple literal such as `(3, 4)`, `(5,)` or `()`.
fn parse_shape(value: &str) -> Option<Vec<usize>> {
    let inner = value.strip_prefix('(')?;
    let inner = &inner[..inner.find(')')?];
    inner
        .split(',')
        .map(str::trim)
        .filter(|dim| !dim.is_empty())
        .map(|dim| dim.trim_end_matches('L').parse().ok())
        .collect()
}

fn swap_byte_order(data: &mut [u8], item_size: usize) {
    if item_size > 1 {
        data.chunks_exact_mut(item_size).for_each(<[u8]>::reverse);
    }
}

/// Reorders column-major element data into row-major order.
fn fortran_to_c_order(data: &[u8], shape: &[usize], item_size: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut index = vec![0usize; shape.len()];
    let count: usize = shape.iter().product();

    for _ in 0..count {
        let mut offset = 0;
        let mut stride = 1;
        for (dim, &i) in shape.iter().zip(&index) {
            offset += i * stride;
            stride *= dim;
        }
        let start = offset * item_size;
        out.extend_from_slice(&data[start..start + item_size]);

        // advance the row-major multi-index
        for axis in (0..shape.len()).rev() {
            index[axis] += 1;
            if index[axis] < shape[axis] {
                break;
            }
            index[axis] = 0;
        }
    }
    out
}
