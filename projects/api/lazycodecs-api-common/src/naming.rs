//! Every codec contributes the same six attribute names to the namespace:
//! `<c>_encode`, `<c>_decode`, `<c>_check`, `<c>_version`, `<C>Error` and `<C>`.

use alloc::format;
use alloc::string::String;

/// Suffix of encode callables.
pub const ENCODE_SUFFIX: &str = "_encode";
/// Suffix of decode callables.
pub const DECODE_SUFFIX: &str = "_decode";
/// Suffix of format check callables.
pub const CHECK_SUFFIX: &str = "_check";
/// Suffix of version callables.
pub const VERSION_SUFFIX: &str = "_version";
/// Suffix of error kinds.
pub const ERROR_SUFFIX: &str = "Error";

/// Upper-cases the first character and lower-cases the rest, e.g. `jpeg8` becomes `Jpeg8`.
pub fn capitalize(codec: &str) -> String {
    let mut chars = codec.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Returns the standard attribute names of `codec`, in declaration order.
pub fn standard_attribute_names(codec: &str) -> [String; 6] {
    [
        format!("{codec}{ENCODE_SUFFIX}"),
        format!("{codec}{DECODE_SUFFIX}"),
        format!("{codec}{CHECK_SUFFIX}"),
        format!("{codec}{VERSION_SUFFIX}"),
        format!("{}{ERROR_SUFFIX}", capitalize(codec)),
        codec.to_uppercase(),
    ]
}
