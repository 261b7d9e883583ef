//! Batch processing pipeline.
//!
//! - [`ResultCollector`]: session-scoped, append-only result storage
//! - [`TrackTask`]: per-track fetch, infer and append with observable state
//! - [`BatchPipeline`]: concurrent resolution of a whole playlist
//! - [`archive_collected`]: zip of everything accumulated

pub mod archive;
pub mod batch;
pub mod collector;
pub mod fetch;
pub mod task;

pub use archive::{archive_collected, build_archive};
pub use batch::BatchPipeline;
pub use collector::ResultCollector;
pub use fetch::{AudioFetcher, HttpFetcher};
pub use task::{ProcessingContext, TaskState, TaskStatus, TrackTask};

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory fetcher and invoker fakes shared by the pipeline tests.

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::{AudioFetcher, ProcessingContext, ResultCollector};
    use crate::error::{AppError, Result};
    use crate::models::{HardwareSignals, InferenceInvoker, ModelSelector};

    /// Returns the URL itself as the audio bytes, or fails every fetch.
    pub(crate) struct FakeFetcher {
        fail: bool,
    }

    impl FakeFetcher {
        pub(crate) fn ok() -> Self {
            Self { fail: false }
        }

        pub(crate) fn failing() -> Self {
            Self { fail: true }
        }
    }

    #[async_trait]
    impl AudioFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            if self.fail {
                return Err(AppError::source_download_failed(format!("HTTP 404 for {}", url)));
            }
            Ok(url.as_bytes().to_vec())
        }
    }

    /// Prefixes the input with `sep:`; optionally fails the first N calls or
    /// returns nothing.
    #[derive(Clone, Default)]
    pub(crate) struct FakeInvoker {
        fail_first: usize,
        silent: bool,
        calls: Arc<AtomicUsize>,
        model_urls: Arc<Mutex<Vec<String>>>,
    }

    impl FakeInvoker {
        pub(crate) fn ok() -> Self {
            Self::default()
        }

        pub(crate) fn failing_first(n: usize) -> Self {
            Self {
                fail_first: n,
                ..Self::default()
            }
        }

        /// Succeeds with no output bytes.
        pub(crate) fn silent() -> Self {
            Self {
                silent: true,
                ..Self::default()
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub(crate) fn model_urls(&self) -> Vec<String> {
            self.model_urls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl InferenceInvoker for FakeInvoker {
        async fn infer(&self, audio_bytes: &[u8], model_url: &str) -> Result<Vec<u8>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            self.model_urls.lock().unwrap().push(model_url.to_string());
            if call < self.fail_first {
                return Err(AppError::model_inference_failed("session run failed"));
            }
            if self.silent {
                return Ok(Vec::new());
            }
            let mut out = b"sep:".to_vec();
            out.extend_from_slice(audio_bytes);
            Ok(out)
        }
    }

    /// Builds a context with a CPU-only selector over `tiny.onnx`/`medium.onnx`.
    pub(crate) fn context(
        fetcher: FakeFetcher,
        invoker: FakeInvoker,
    ) -> (Arc<ProcessingContext>, FakeInvoker) {
        let ctx = ProcessingContext {
            fetcher: Arc::new(fetcher),
            invoker: Arc::new(invoker.clone()),
            selector: ModelSelector::new(
                "tiny.onnx",
                "medium.onnx",
                HardwareSignals::new("CPU", 2),
            ),
            collector: ResultCollector::new(),
        };
        (Arc::new(ctx), invoker)
    }
}
