//! Capabilities: what a namespace attribute resolves to.
//!
//! An attribute whose module bound and exported it resolves to [`CapabilityState::Bound`]. Any
//! other attribute resolves to a [`Stub`] whose behaviour is chosen from the attribute's name.
//! This way `zstd_check` still answers `false` and `zstd_version` still reports `zstd n/a`
//! when the backend is missing, while actually encoding or decoding fails with
//! [`NamespaceError::Unavailable`].

use crate::error::{NamespaceError, NamespaceResult};
use derive_enum_all_values::AllValues;
use lazycodecs_api_common::naming::{
    CHECK_SUFFIX, DECODE_SUFFIX, ENCODE_SUFFIX, ERROR_SUFFIX, VERSION_SUFFIX,
};
use lazycodecs_api_common::{
    ArrayBuffer, Attribute, CodecOptions, DecodeFn, EncodeFn, ErrorKind, OptionValue,
};
use std::fmt;

/// Kind of an attribute, as implied by its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AllValues)]
pub enum CapabilityKind {
    Version,
    Check,
    Decode,
    Encode,
    /// Any other all-lowercase name, e.g. `deflate_crc32`.
    Function,
    ErrorKind,
    /// An all-uppercase name, e.g. `ZSTD`.
    Flag,
    Other,
}

/// Naming rules in precedence order. The first match decides the kind.
const NAMING_RULES: &[(fn(&str) -> bool, CapabilityKind)] = &[
    (is_version_name, CapabilityKind::Version),
    (is_check_name, CapabilityKind::Check),
    (is_decode_name, CapabilityKind::Decode),
    (is_encode_name, CapabilityKind::Encode),
    (is_all_lowercase, CapabilityKind::Function),
    (is_error_name, CapabilityKind::ErrorKind),
    (is_all_uppercase, CapabilityKind::Flag),
];

fn is_version_name(name: &str) -> bool {
    name.ends_with(VERSION_SUFFIX)
}

fn is_check_name(name: &str) -> bool {
    name.ends_with(CHECK_SUFFIX)
}

fn is_decode_name(name: &str) -> bool {
    name.ends_with(DECODE_SUFFIX)
}

fn is_encode_name(name: &str) -> bool {
    name.ends_with(ENCODE_SUFFIX)
}

fn is_error_name(name: &str) -> bool {
    name.ends_with(ERROR_SUFFIX)
}

/// At least one cased character, and no uppercase ones.
fn is_all_lowercase(name: &str) -> bool {
    name.chars().any(char::is_lowercase) && !name.chars().any(char::is_uppercase)
}

/// At least one cased character, and no lowercase ones.
fn is_all_uppercase(name: &str) -> bool {
    name.chars().any(char::is_uppercase) && !name.chars().any(char::is_lowercase)
}

impl CapabilityKind {
    pub fn from_name(name: &str) -> Self {
        NAMING_RULES
            .iter()
            .find(|(matches, _)| matches(name))
            .map_or(Self::Other, |(_, kind)| *kind)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Version => "version",
            Self::Check => "check",
            Self::Decode => "decode",
            Self::Encode => "encode",
            Self::Function => "function",
            Self::ErrorKind => "error kind",
            Self::Flag => "flag",
            Self::Other => "type",
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Placeholder for an attribute whose backend is unavailable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stub {
    name: String,
    kind: CapabilityKind,
    backend_bound: bool,
    reason: String,
}

impl Stub {
    /// Creates a stub for `name`.
    ///
    /// `backend_bound` records whether the owning module bound but simply did not export the
    /// name. `reason` is shown when the stub is used in a way that needs the real attribute.
    pub fn new(name: impl Into<String>, backend_bound: bool, reason: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: CapabilityKind::from_name(&name),
            name,
            backend_bound,
            reason: reason.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CapabilityKind {
        self.kind
    }

    pub fn backend_bound(&self) -> bool {
        self.backend_bound
    }

    /// `<codec> n/a` when the module never bound, `<codec> unknown` when it bound without
    /// exporting a version accessor.
    pub fn version(&self) -> NamespaceResult<String> {
        self.expect(CapabilityKind::Version)?;
        let codec = self
            .name
            .strip_suffix(VERSION_SUFFIX)
            .unwrap_or(&self.name);
        let version = if self.backend_bound { "unknown" } else { "n/a" };
        Ok(format!("{codec} {version}"))
    }

    /// Always `false`.
    pub fn check(&self) -> NamespaceResult<bool> {
        self.expect(CapabilityKind::Check)?;
        Ok(false)
    }

    /// Flags and other constants are falsy only when their module never bound.
    /// Callables and error kinds are always truthy.
    pub fn is_truthy(&self) -> bool {
        match self.kind {
            CapabilityKind::Flag | CapabilityKind::Other => self.backend_bound,
            _ => true,
        }
    }

    /// The error every use that needs the real attribute fails with.
    pub fn unavailable(&self) -> NamespaceError {
        NamespaceError::Unavailable {
            name: self.name.clone(),
            reason: self.reason.clone(),
        }
    }

    /// Fails with [`NamespaceError::Unavailable`] when the stub is of the `expected` kind,
    /// and with [`NamespaceError::KindMismatch`] otherwise.
    pub(crate) fn unavailable_as(&self, expected: CapabilityKind) -> NamespaceError {
        match self.expect(expected) {
            Ok(()) => self.unavailable(),
            Err(mismatch) => mismatch,
        }
    }

    fn expect(&self, expected: CapabilityKind) -> NamespaceResult<()> {
        if self.kind == expected {
            return Ok(());
        }
        Err(NamespaceError::KindMismatch {
            name: self.name.clone(),
            expected: expected.name(),
            found: self.kind.name(),
        })
    }
}

/// Resolution state of a capability.
#[derive(Debug, Clone)]
pub enum CapabilityState {
    Bound(Attribute),
    Unavailable(Stub),
}

/// A resolved namespace attribute.
///
/// Capabilities are shared: an alias and its target resolve to the same `Arc<Capability>`.
#[derive(Debug, Clone)]
pub struct Capability {
    name: String,
    state: CapabilityState,
}

impl Capability {
    pub fn bound(name: impl Into<String>, attribute: Attribute) -> Self {
        Self {
            name: name.into(),
            state: CapabilityState::Bound(attribute),
        }
    }

    pub fn unavailable(stub: Stub) -> Self {
        Self {
            name: stub.name.clone(),
            state: CapabilityState::Unavailable(stub),
        }
    }

    /// Primary (non-alias) name of the attribute.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &CapabilityState {
        &self.state
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.state, CapabilityState::Bound(_))
    }

    pub fn as_stub(&self) -> Option<&Stub> {
        match &self.state {
            CapabilityState::Unavailable(stub) => Some(stub),
            CapabilityState::Bound(_) => None,
        }
    }

    /// The bound attribute, or [`NamespaceError::Unavailable`] for stubs.
    pub fn require(&self) -> NamespaceResult<&Attribute> {
        match &self.state {
            CapabilityState::Bound(attribute) => Ok(attribute),
            CapabilityState::Unavailable(stub) => Err(stub.unavailable()),
        }
    }

    pub fn encoder(&self) -> NamespaceResult<EncodeFn> {
        match &self.state {
            CapabilityState::Bound(Attribute::Encode(f)) => Ok(f.clone()),
            CapabilityState::Bound(other) => Err(self.mismatch(CapabilityKind::Encode, other)),
            CapabilityState::Unavailable(stub) => Err(stub.unavailable_as(CapabilityKind::Encode)),
        }
    }

    pub fn decoder(&self) -> NamespaceResult<DecodeFn> {
        match &self.state {
            CapabilityState::Bound(Attribute::Decode(f)) => Ok(f.clone()),
            CapabilityState::Bound(other) => Err(self.mismatch(CapabilityKind::Decode, other)),
            CapabilityState::Unavailable(stub) => Err(stub.unavailable_as(CapabilityKind::Decode)),
        }
    }

    pub fn encode(&self, data: &ArrayBuffer, options: &CodecOptions) -> NamespaceResult<Vec<u8>> {
        Ok(self.encoder()?(data, options)?)
    }

    pub fn decode(&self, data: &[u8], options: &CodecOptions) -> NamespaceResult<ArrayBuffer> {
        Ok(self.decoder()?(data, options)?)
    }

    pub fn check(&self, data: &[u8]) -> NamespaceResult<bool> {
        match &self.state {
            CapabilityState::Bound(Attribute::Check(f)) => Ok(f(data)),
            CapabilityState::Bound(other) => Err(self.mismatch(CapabilityKind::Check, other)),
            CapabilityState::Unavailable(stub) => stub.check(),
        }
    }

    pub fn version(&self) -> NamespaceResult<String> {
        match &self.state {
            CapabilityState::Bound(Attribute::Version(f)) => Ok(f()),
            CapabilityState::Bound(other) => Err(self.mismatch(CapabilityKind::Version, other)),
            CapabilityState::Unavailable(stub) => stub.version(),
        }
    }

    /// Calls a module-level function such as `zlib_crc32`.
    pub fn call(&self, data: &[u8], options: &CodecOptions) -> NamespaceResult<OptionValue> {
        match &self.state {
            CapabilityState::Bound(Attribute::Utility(f)) => Ok(f(data, options)?),
            CapabilityState::Bound(other) => Err(self.mismatch(CapabilityKind::Function, other)),
            CapabilityState::Unavailable(stub) => {
                Err(stub.unavailable_as(CapabilityKind::Function))
            }
        }
    }

    /// The error kind; constructing one from a stub fails.
    pub fn error_kind(&self) -> NamespaceResult<ErrorKind> {
        match &self.state {
            CapabilityState::Bound(Attribute::ErrorKind(kind)) => Ok(kind.clone()),
            CapabilityState::Bound(other) => Err(self.mismatch(CapabilityKind::ErrorKind, other)),
            CapabilityState::Unavailable(stub) => {
                Err(stub.unavailable_as(CapabilityKind::ErrorKind))
            }
        }
    }

    /// Truth value, as used for `if ZSTD` style availability tests.
    pub fn is_truthy(&self) -> bool {
        match &self.state {
            CapabilityState::Bound(Attribute::Flag(value)) => *value,
            CapabilityState::Bound(_) => true,
            CapabilityState::Unavailable(stub) => stub.is_truthy(),
        }
    }

    fn mismatch(&self, expected: CapabilityKind, found: &Attribute) -> NamespaceError {
        NamespaceError::KindMismatch {
            name: self.name.clone(),
            expected: expected.name(),
            found: found.kind_name(),
        }
    }
}
