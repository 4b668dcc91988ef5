//! File extensions understood by [`Namespace::read`](crate::Namespace::read) and
//! [`Namespace::write`](crate::Namespace::write).

use std::path::Path;

/// Codec name and the extensions it is used for.
const EXTENSIONS: &[(&str, &[&str])] = &[
    ("apng", &["apng"]),
    ("avif", &["avif", "avifs"]),
    ("brunsli", &["brn"]),
    ("gif", &["gif"]),
    ("heif", &["heif", "heic", "heifs", "heics", "hif"]),
    ("jpeg", &["jpg", "jpeg", "jpe", "jfif", "jif", "ljpeg"]),
    ("jpeg2k", &["j2k", "jp2", "j2c", "jpc", "jpx", "jpf"]),
    ("jpegls", &["jls"]),
    ("jpegxl", &["jxl"]),
    ("jpegxr", &["jxr", "hdp", "wdp"]),
    ("lerc", &["lerc1", "lerc2"]),
    ("numpy", &["npy", "npz"]),
    ("png", &["png"]),
    ("qoi", &["qoi"]),
    ("rgbe", &["hdr", "rgbe", "pic"]),
    ("tiff", &["tif", "tiff", "ptif", "ptiff", "tf8", "tf2", "btf"]),
    ("webp", &["webp"]),
    ("zfp", &["zfp"]),
];

/// Codec used for files with extension `ext` (lower-case, without the dot).
pub fn codec_for_extension(ext: &str) -> Option<&'static str> {
    EXTENSIONS
        .iter()
        .find(|(_, exts)| exts.contains(&ext))
        .map(|(codec, _)| *codec)
}

/// Every extension with a known codec, grouped by codec.
pub fn list_extensions() -> Vec<&'static str> {
    EXTENSIONS
        .iter()
        .flat_map(|(_, exts)| exts.iter().copied())
        .collect()
}

/// Maps a codec name or extension to a codec name, leaving unknown values unchanged.
pub(crate) fn normalize_codec(name: &str) -> String {
    let lower = name.to_lowercase();
    match codec_for_extension(&lower) {
        Some(codec) => codec.to_owned(),
        None => lower,
    }
}

/// Extracts the lowercase extension from a path.
pub(crate) fn extract_lowercase_extension(path: &Path) -> Option<String> {
    path.extension()?.to_str().map(|s| s.to_lowercase())
}
