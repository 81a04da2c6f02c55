//! Mock provider implementation for tests and keyless development runs.

use super::{GenerativeProvider, ProviderError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mock generative provider.
///
/// Counts how many generation calls were made so tests can assert that input
/// validation rejects a request before anything is sent upstream.
pub struct MockGenerativeProvider {
    enabled: bool,
    calls: AtomicUsize,
}

impl MockGenerativeProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of generation calls made against this provider.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) -> Result<(), ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.enabled {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(
                "Mock generative provider not enabled".to_string(),
            ))
        }
    }
}

#[async_trait]
impl GenerativeProvider for MockGenerativeProvider {
    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError> {
        self.record_call()?;
        Ok(format!("Mock reply for: {}", prompt))
    }

    async fn analyze_image(
        &self,
        _prompt: &str,
        mime_type: &str,
        image: &[u8],
    ) -> Result<String, ProviderError> {
        self.record_call()?;
        Ok(format!(
            "Mock analysis of {} image ({} bytes)",
            mime_type,
            image.len()
        ))
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.enabled {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(
                "Mock generative provider not enabled".to_string(),
            ))
        }
    }
}
