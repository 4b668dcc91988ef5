//! Input sources and output destinations for dispatch.

use super::extensions::extract_lowercase_extension;
use crate::error::DispatchResult;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A readable, seekable stream.
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek + ?Sized> ReadSeek for T {}

/// Where [`Namespace::read`](crate::Namespace::read) takes its input from.
pub enum Source<'a> {
    /// A file. Memory-mapped when requested and non-empty, read fully otherwise.
    Path(&'a Path),
    /// Bytes already in memory, including memory-mapped regions.
    Bytes(&'a [u8]),
    /// A stream that is read to its end.
    Stream(&'a mut dyn Read),
    /// A stream read from its current position, which is restored afterwards.
    Seekable(&'a mut dyn ReadSeek),
}

impl Source<'_> {
    /// Lower-case file extension, for path sources.
    pub fn extension(&self) -> Option<String> {
        match self {
            Self::Path(path) => extract_lowercase_extension(path),
            _ => None,
        }
    }
}

impl<'a> From<&'a Path> for Source<'a> {
    fn from(path: &'a Path) -> Self {
        Self::Path(path)
    }
}

impl<'a> From<&'a PathBuf> for Source<'a> {
    fn from(path: &'a PathBuf) -> Self {
        Self::Path(path)
    }
}

impl<'a> From<&'a [u8]> for Source<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::Bytes(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for Source<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Source<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        Self::Bytes(bytes)
    }
}

/// Where [`Namespace::write`](crate::Namespace::write) puts its output.
pub enum Destination<'a> {
    /// A file, created or truncated.
    Path(&'a Path),
    Stream(&'a mut dyn Write),
}

impl Destination<'_> {
    pub fn extension(&self) -> Option<String> {
        match self {
            Self::Path(path) => extract_lowercase_extension(path),
            Self::Stream(_) => None,
        }
    }
}

impl<'a> From<&'a Path> for Destination<'a> {
    fn from(path: &'a Path) -> Self {
        Self::Path(path)
    }
}

impl<'a> From<&'a PathBuf> for Destination<'a> {
    fn from(path: &'a PathBuf) -> Self {
        Self::Path(path)
    }
}

/// Runs `f` over the source's bytes.
pub(crate) fn with_input<R>(
    source: Source<'_>,
    memory_map: bool,
    f: impl FnOnce(&[u8]) -> R,
) -> DispatchResult<R> {
    match source {
        Source::Bytes(bytes) => Ok(f(bytes)),
        Source::Stream(stream) => {
            let mut buffer = Vec::new();
            stream.read_to_end(&mut buffer)?;
            Ok(f(&buffer))
        }
        Source::Seekable(stream) => {
            let offset = stream.stream_position()?;
            let mut buffer = Vec::new();
            let read = stream.read_to_end(&mut buffer);
            stream.seek(SeekFrom::Start(offset))?;
            read?;
            Ok(f(&buffer))
        }
        Source::Path(path) => read_path(path, memory_map, f),
    }
}

#[cfg(feature = "file-io")]
fn read_path<R>(path: &Path, memory_map: bool, f: impl FnOnce(&[u8]) -> R) -> DispatchResult<R> {
    use lightweight_mmap::handles::*;
    use lightweight_mmap::mmap::*;

    if memory_map {
        let handle = ReadOnlyFileHandle::open(path)?;
        let size = handle.size()? as usize;
        // zero-length mappings are rejected by the OS
        if size > 0 {
            let mapping = ReadOnlyMmap::new(&handle, 0, size)?;
            return Ok(f(mapping.as_slice()));
        }
    }

    let data = std::fs::read(path)?;
    Ok(f(&data))
}

#[cfg(not(feature = "file-io"))]
fn read_path<R>(path: &Path, _memory_map: bool, f: impl FnOnce(&[u8]) -> R) -> DispatchResult<R> {
    let data = std::fs::read(path)?;
    Ok(f(&data))
}

/// Writes `bytes` to the destination.
pub(crate) fn write_output(destination: Destination<'_>, bytes: &[u8]) -> DispatchResult<()> {
    match destination {
        Destination::Stream(stream) => {
            stream.write_all(bytes)?;
            stream.flush()?;
            Ok(())
        }
        Destination::Path(path) => write_path(path, bytes),
    }
}

#[cfg(feature = "file-io")]
fn write_path(path: &Path, bytes: &[u8]) -> DispatchResult<()> {
    use lightweight_mmap::handles::*;
    use lightweight_mmap::mmap::*;

    if bytes.is_empty() {
        std::fs::File::create(path)?;
        return Ok(());
    }

    let handle = ReadWriteFileHandle::create_preallocated(path, bytes.len() as i64)?;
    let mut mapping = ReadWriteMmap::new(&handle, 0, bytes.len())?;
    mapping.as_mut_slice().copy_from_slice(bytes);
    Ok(())
}

#[cfg(not(feature = "file-io"))]
fn write_path(path: &Path, bytes: &[u8]) -> DispatchResult<()> {
    std::fs::write(path, bytes)?;
    Ok(())
}
