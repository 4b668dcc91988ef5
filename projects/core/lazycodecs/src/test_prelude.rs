//! Shared helpers for unit tests.

pub use crate::catalog::BackendCatalog;
pub use crate::namespace::{BindState, Namespace, NamespaceBuilder};
pub use lazycodecs_api_common::{
    ArrayBuffer, BackendModule, BindError, BoundModule, CodecBundle, CodecError, CodecOptions,
    CodecResult, DecodeFailure, ElementType, ModuleExports,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Backend that hands out fixed exports (or a fixed error) and counts how often it binds.
#[derive(Clone)]
pub struct MockBackend {
    name: String,
    outcome: Result<ModuleExports, BindError>,
    binds: Arc<AtomicUsize>,
}

impl MockBackend {
    pub fn exporting(name: &str, exports: impl Into<ModuleExports>) -> Self {
        Self {
            name: name.to_owned(),
            outcome: Ok(exports.into()),
            binds: Arc::default(),
        }
    }

    pub fn failing(name: &str, error: BindError) -> Self {
        Self {
            name: name.to_owned(),
            outcome: Err(error),
            binds: Arc::default(),
        }
    }

    /// Shared counter of [`BackendModule::bind`] calls.
    pub fn bind_counter(&self) -> Arc<AtomicUsize> {
        self.binds.clone()
    }
}

impl BackendModule for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn bind(&self) -> Result<Box<dyn BoundModule>, BindError> {
        self.binds.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Ok(exports) => Ok(Box::new(exports.clone())),
            Err(error) => Err(error.clone()),
        }
    }
}

/// Ordered record of which mock callables ran.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<&'static str>>>);

impl CallLog {
    pub fn record(&self, call: &'static str) {
        self.0.lock().push(call);
    }

    /// Returns and clears the recorded calls.
    pub fn take(&self) -> Vec<&'static str> {
        std::mem::take(&mut *self.0.lock())
    }
}

/// Standard table and aliases, with only the given backends compiled in.
pub fn namespace_with(backends: impl IntoIterator<Item = MockBackend>) -> Namespace {
    init_tracing();
    let catalog = backends
        .into_iter()
        .fold(BackendCatalog::empty(), BackendCatalog::with);
    NamespaceBuilder::new().catalog(catalog).build()
}

/// Decoder bundle for `codec` that accepts input starting with `magic`.
pub fn magic_codec(codec: &'static str, magic: &'static [u8]) -> MockBackend {
    MockBackend::exporting(
        codec,
        CodecBundle::new(codec)
            .decode(move |data, _| {
                if data.starts_with(magic) {
                    Ok(ArrayBuffer::from_bytes(&data[magic.len()..]))
                } else {
                    Err(CodecError::not_this_format(format!("not a {codec} stream")))
                }
            })
            .encode(move |array, _| Ok([magic, array.as_bytes()].concat()))
            .check(move |data| data.starts_with(magic))
            .version(move || format!("{codec} 1.0")),
    )
}

/// Routes `tracing` output to the test harness. Filtered through `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
