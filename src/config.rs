//! Configuration for the contract review pipeline.
//!
//! All behaviour is controlled through [`ReviewConfig`], built via its
//! [`ReviewConfigBuilder`]. The upstream credential lives here and is handed
//! to the model gateway at construction; nothing in the pipeline reads the
//! process environment at call time.

use crate::error::ReviewError;
use crate::pipeline::extract::TextExtractor;
use crate::pipeline::gateway::ChatCompletion;
use crate::report::DEFAULT_JURISDICTION;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default completions endpoint of the hosted model service.
pub const DEFAULT_ENDPOINT: &str = "https://maas-api.lanyun.net/v1/chat/completions";

/// Default model identifier sent upstream.
pub const DEFAULT_MODEL: &str = "qwen3-235b-a22b";

/// Human-readable model name reported in `model_used` and `/health`.
pub const DEFAULT_MODEL_DISPLAY_NAME: &str = "Qwen3-235B-A22B";

/// Configuration for a contract review.
///
/// # Example
/// ```rust
/// use legal_guard::ReviewConfig;
///
/// let config = ReviewConfig::builder()
///     .api_key("sk-test")
///     .timeout_secs(30)
///     .max_document_chars(15_000)
///     .build()
///     .unwrap();
/// assert_eq!(config.temperature, 0.2);
/// ```
#[derive(Clone)]
pub struct ReviewConfig {
    /// Chat-completions URL. Default: [`DEFAULT_ENDPOINT`].
    pub endpoint: String,

    /// Bearer token for the upstream API. An empty key is not rejected here;
    /// the upstream answers with an authentication error instead.
    pub api_key: String,

    /// Model identifier sent in the request body. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Name reported back to callers. Default: [`DEFAULT_MODEL_DISPLAY_NAME`].
    pub model_display_name: String,

    /// Sampling temperature. Default: 0.2.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 2000.
    pub max_tokens: u32,

    /// Hard timeout for the single upstream call, in seconds. Default: 30.
    pub timeout_secs: u64,

    /// Characters of contract text embedded in the prompt. Default: 15 000.
    pub max_document_chars: usize,

    /// Horizontal gap (PDF points) above which a space is inserted between glyphs. Default: 1.0.
    pub x_tolerance: f32,

    /// Vertical distance (PDF points) within which glyphs share a line. Default: 1.0.
    pub y_tolerance: f32,

    /// Directory for temporary upload copies. `None` uses the system temp dir.
    pub temp_dir: Option<PathBuf>,

    /// Directory containing the pdfium shared library. `None` tries the
    /// working directory, then the system library path.
    pub pdfium_library_dir: Option<PathBuf>,

    /// Reject model output lacking the three report fields. Default: false.
    pub strict_report: bool,

    /// Jurisdiction used when a request does not name one.
    pub default_jurisdiction: String,

    /// Largest accepted upload in bytes. Default: 50 MiB.
    pub max_upload_bytes: usize,

    /// Pre-constructed extractor. Takes precedence over the pdfium default.
    pub extractor: Option<Arc<dyn TextExtractor>>,

    /// Pre-constructed gateway. Takes precedence over the HTTP default.
    pub gateway: Option<Arc<dyn ChatCompletion>>,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            model_display_name: DEFAULT_MODEL_DISPLAY_NAME.to_string(),
            temperature: 0.2,
            max_tokens: 2000,
            timeout_secs: 30,
            max_document_chars: 15_000,
            x_tolerance: 1.0,
            y_tolerance: 1.0,
            temp_dir: None,
            pdfium_library_dir: None,
            strict_report: false,
            default_jurisdiction: DEFAULT_JURISDICTION.to_string(),
            max_upload_bytes: 50 * 1024 * 1024,
            extractor: None,
            gateway: None,
        }
    }
}

impl fmt::Debug for ReviewConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReviewConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("model", &self.model)
            .field("model_display_name", &self.model_display_name)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_document_chars", &self.max_document_chars)
            .field("x_tolerance", &self.x_tolerance)
            .field("y_tolerance", &self.y_tolerance)
            .field("temp_dir", &self.temp_dir)
            .field("pdfium_library_dir", &self.pdfium_library_dir)
            .field("strict_report", &self.strict_report)
            .field("default_jurisdiction", &self.default_jurisdiction)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("extractor", &self.extractor.as_ref().map(|_| "<dyn TextExtractor>"))
            .field("gateway", &self.gateway.as_ref().map(|_| "<dyn ChatCompletion>"))
            .finish()
    }
}

impl ReviewConfig {
    /// Create a new builder for `ReviewConfig`.
    pub fn builder() -> ReviewConfigBuilder {
        ReviewConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ReviewConfig`].
#[derive(Debug)]
pub struct ReviewConfigBuilder {
    config: ReviewConfig,
}

impl ReviewConfigBuilder {
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn model_display_name(mut self, name: impl Into<String>) -> Self {
        self.config.model_display_name = name.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn max_document_chars(mut self, n: usize) -> Self {
        self.config.max_document_chars = n;
        self
    }

    pub fn x_tolerance(mut self, pts: f32) -> Self {
        self.config.x_tolerance = pts.max(0.0);
        self
    }

    pub fn y_tolerance(mut self, pts: f32) -> Self {
        self.config.y_tolerance = pts.max(0.0);
        self
    }

    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.temp_dir = Some(dir.into());
        self
    }

    pub fn pdfium_library_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_dir = Some(dir.into());
        self
    }

    pub fn strict_report(mut self, v: bool) -> Self {
        self.config.strict_report = v;
        self
    }

    pub fn default_jurisdiction(mut self, j: impl Into<String>) -> Self {
        self.config.default_jurisdiction = j.into();
        self
    }

    pub fn max_upload_bytes(mut self, n: usize) -> Self {
        self.config.max_upload_bytes = n;
        self
    }

    pub fn extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.config.extractor = Some(extractor);
        self
    }

    pub fn gateway(mut self, gateway: Arc<dyn ChatCompletion>) -> Self {
        self.config.gateway = Some(gateway);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ReviewConfig, ReviewError> {
        let c = &self.config;
        if c.timeout_secs == 0 {
            return Err(ReviewError::InvalidConfig(
                "Upstream timeout must be ≥ 1 second".into(),
            ));
        }
        if c.max_document_chars == 0 {
            return Err(ReviewError::InvalidConfig(
                "Document character budget must be ≥ 1".into(),
            ));
        }
        if c.max_upload_bytes == 0 {
            return Err(ReviewError::InvalidConfig(
                "Maximum upload size must be ≥ 1 byte".into(),
            ));
        }
        if !c.endpoint.starts_with("http://") && !c.endpoint.starts_with("https://") {
            return Err(ReviewError::InvalidConfig(format!(
                "Endpoint must be an HTTP/HTTPS URL, got '{}'",
                c.endpoint
            )));
        }
        if c.model.trim().is_empty() {
            return Err(ReviewError::InvalidConfig("Model must not be empty".into()));
        }
        Ok(self.config)
    }
}
