//! Bridge from the synchronous search path into async embedding providers.

use std::sync::{Arc, mpsc};

use tokio::runtime::Builder as TokioRuntimeBuilder;

use crate::embedding::Embedder;
use crate::error::{BiblioError, Result};

/// Drives a provider's async `embed` calls from synchronous code.
///
/// The bridge owns a single-worker runtime of its own; the call is spawned
/// there and awaited through a channel instead of `block_on`, so a caller
/// that is itself running inside a tokio runtime does not panic.
pub struct EmbeddingBridge {
    embedder: Arc<dyn Embedder>,
    runtime: Arc<tokio::runtime::Runtime>,
}

impl EmbeddingBridge {
    pub fn new(embedder: Arc<dyn Embedder>) -> Result<Self> {
        let runtime = TokioRuntimeBuilder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .map_err(|err| {
                BiblioError::internal(format!(
                    "could not start the embedding runtime: {err}"
                ))
            })?;
        Ok(Self {
            embedder,
            runtime: Arc::new(runtime),
        })
    }

    /// Embed `text` through the configured provider, blocking until the
    /// provider answers. Provider errors come back unchanged.
    pub fn embed_blocking(&self, text: &str, dim_hint: Option<usize>) -> Result<Vec<f32>> {
        let embedder = self.embedder.clone();
        let text = text.to_string();
        let (tx, rx) = mpsc::channel();
        self.runtime.spawn(async move {
            let _ = tx.send(embedder.embed(&text, dim_hint).await);
        });
        rx.recv().map_err(|_| {
            BiblioError::embedding("embedding task ended without producing a result")
        })?
    }

    /// Name of the provider behind this bridge.
    pub fn provider_name(&self) -> &str {
        self.embedder.name()
    }
}
