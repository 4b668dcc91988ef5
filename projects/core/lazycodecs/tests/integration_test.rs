//! Integration tests for generic read/write through a namespace

use lazycodecs::{
    ArrayBuffer, BackendCatalog, BindState, CodecError, CodecOptions, Destination, DispatchError,
    ElementType, Namespace, NamespaceBuilder, ReadOptions, Source, WriteCodec,
};
use lazycodecs_api_common::{BackendModule, BindError, BoundModule, CodecBundle, ModuleExports};
use rstest::rstest;
use std::io::{Cursor, Seek, SeekFrom};
use std::path::Path;

/// Backend for `png` that stores arrays as `PNG!` followed by the raw bytes.
struct FakePng;

impl BackendModule for FakePng {
    fn name(&self) -> &str {
        "png"
    }

    fn bind(&self) -> Result<Box<dyn BoundModule>, BindError> {
        let bundle = CodecBundle::new("png")
            .encode(|array, _| Ok([b"PNG!".as_slice(), array.as_bytes()].concat()))
            .decode(|data, _| match data.strip_prefix(b"PNG!") {
                Some(pixels) => Ok(ArrayBuffer::from_bytes(pixels)),
                None => Err(CodecError::not_this_format("not a png stream")),
            })
            .check(|data| data.starts_with(b"PNG!"))
            .version(|| "png 0.1".into());
        Ok(Box::new(ModuleExports::from(bundle)))
    }
}

fn namespace() -> Namespace {
    NamespaceBuilder::new()
        .catalog(BackendCatalog::empty().with(FakePng))
        .build()
}

fn sample() -> ArrayBuffer {
    ArrayBuffer::new(vec![1, 0, 0, 0, 2, 0, 0, 0], vec![2, 1], ElementType::U32).unwrap()
}

#[rstest]
#[case::memory_mapped(true)]
#[case::read_into_memory(false)]
fn numpy_file_round_trips_by_extension(#[case] memory_map: bool) {
    let namespace = namespace();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("array.npy");

    namespace
        .write(path.as_path(), &sample(), None, &CodecOptions::new())
        .unwrap();

    let options = ReadOptions::new().memory_map(memory_map);
    let (array, decoder) = namespace.read_with_codec(&path, &options).unwrap();
    assert_eq!(array, sample());
    assert_eq!(decoder.label, "numpy_decode");
}

#[test]
fn extension_codec_is_tried_first() {
    let namespace = namespace();
    let file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();

    namespace
        .write(file.path(), &ArrayBuffer::from_bytes(b"rgb"), None, &CodecOptions::new())
        .unwrap();
    assert_eq!(std::fs::read(file.path()).unwrap(), b"PNG!rgb");

    let (array, decoder) = namespace
        .read_with_codec(file.path(), &ReadOptions::new())
        .unwrap();
    assert_eq!(array.as_bytes(), b"rgb");
    assert_eq!(decoder.label, "png_decode");
    assert_eq!(namespace.bind_state("png"), Some(BindState::Bound { exported: 6 }));
}

#[rstest]
#[case::memory_mapped(true)]
#[case::read_into_memory(false)]
fn empty_files_are_read_without_mapping(#[case] memory_map: bool) {
    let namespace = namespace();
    let file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();

    let error = namespace
        .read(file.path(), &ReadOptions::new().memory_map(memory_map))
        .unwrap_err();
    assert!(error.to_string().starts_with("PNG_DECODE: not a png stream"));
}

#[test]
fn empty_payload_creates_empty_file() {
    let namespace = namespace();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.bin");

    let nothing = WriteCodec::encoder(|_, _| Ok(Vec::new()));
    namespace
        .write(path.as_path(), &sample(), Some(nothing), &CodecOptions::new())
        .unwrap();
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
}

#[test]
fn missing_file_is_an_io_error() {
    let namespace = namespace();
    let error = namespace
        .read(Path::new("/definitely/not/here.png"), &ReadOptions::new())
        .unwrap_err();
    assert!(matches!(error, DispatchError::Io(_)));
}

#[test]
fn exhaustion_names_every_failed_candidate() {
    let namespace = namespace();
    let error = namespace
        .read(b"\x00\x01\x02 not an image", &ReadOptions::new())
        .unwrap_err();

    let message = error.to_string();
    let lines: Vec<&str> = message.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("PNG_DECODE: "));
    assert!(lines[1].starts_with("NUMPY_DECODE: "));
}

#[test]
fn seekable_stream_keeps_its_position() {
    let namespace = namespace();
    let mut cursor = Cursor::new(b"prefixPNG!xy".to_vec());
    cursor.seek(SeekFrom::Start(6)).unwrap();

    let array = namespace
        .read(Source::Seekable(&mut cursor), &ReadOptions::new())
        .unwrap();
    assert_eq!(array.as_bytes(), b"xy");
    assert_eq!(cursor.position(), 6);
}

#[test]
fn plain_stream_is_consumed() {
    let namespace = namespace();
    let mut reader: &[u8] = b"PNG!z";

    let array = namespace
        .read(Source::Stream(&mut reader), &ReadOptions::new().codec("png"))
        .unwrap();
    assert_eq!(array.as_bytes(), b"z");
    assert!(reader.is_empty());
}

#[test]
fn writing_to_a_stream_needs_a_codec() {
    let namespace = namespace();
    let mut out = Vec::new();

    let error = namespace
        .write(Destination::Stream(&mut out), &sample(), None, &CodecOptions::new())
        .unwrap_err();
    assert!(matches!(error, DispatchError::NoCodecSpecified));

    let error = namespace
        .write(
            Destination::Stream(&mut out),
            &sample(),
            Some("bogus".into()),
            &CodecOptions::new(),
        )
        .unwrap_err();
    assert_eq!(error.to_string(), "invalid codec 'bogus'");
}

#[test]
fn unknown_extension_names_the_extension() {
    let namespace = namespace();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.xyz");

    let error = namespace
        .write(path.as_path(), &sample(), None, &CodecOptions::new())
        .unwrap_err();
    assert_eq!(error.to_string(), "invalid codec 'xyz'");
    assert!(!path.exists());
}

#[test]
fn extensionless_path_names_the_empty_codec() {
    let namespace = namespace();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("noext");

    let error = namespace
        .write(path.as_path(), &sample(), None, &CodecOptions::new())
        .unwrap_err();
    assert!(matches!(error, DispatchError::InvalidCodec(ref codec) if codec.is_empty()));
    assert_eq!(error.to_string(), "invalid codec ''");
    assert!(!path.exists());
}

#[test]
fn numpy_level_is_rejected() {
    let namespace = namespace();
    let mut out = Vec::new();
    let error = namespace
        .write(
            Destination::Stream(&mut out),
            &sample(),
            Some("numpy".into()),
            &CodecOptions::new().with("level", 6),
        )
        .unwrap_err();
    assert!(matches!(error, DispatchError::Codec(_)));
}

#[cfg(feature = "zstd")]
#[test]
fn zstd_backend_round_trips() {
    let namespace = Namespace::global();
    let payload = ArrayBuffer::from_vec(b"lazycodecs ".repeat(64));

    let compressed = namespace
        .encode("zstd", &payload, &CodecOptions::new().with("level", 3))
        .unwrap();
    assert!(namespace.check("zstd", &compressed).unwrap());
    assert!(compressed.len() < payload.len());

    let array = namespace
        .read(&compressed, &ReadOptions::new().codec("zstd"))
        .unwrap();
    assert_eq!(array.as_bytes(), payload.as_bytes());
    assert!(namespace.is_available("zstd"));
    assert!(namespace.codec_version("zstd").unwrap().starts_with("zstd 1."));
}

#[cfg(not(feature = "zstd"))]
#[test]
fn zstd_backend_is_a_stub_when_not_compiled() {
    let namespace = Namespace::global();
    assert!(!namespace.is_available("zstd"));
    assert_eq!(namespace.codec_version("zstd").unwrap(), "zstd n/a");
}
