//! In-process converter double

use async_trait::async_trait;
use schbuild_core::{BuildJob, ConversionError, Converter, ConverterOutput};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

/// One recorded converter invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub working_dir: PathBuf,
    pub input: String,
    pub output: String,
}

/// Converter that records calls and writes a small output file
///
/// Sources can be configured to fail (non-zero exit), to fail after
/// writing part of their output, or to "succeed" without writing it.
///
/// ```rust,no_run
/// use schbuild_test_utils::MockConverter;
///
/// let converter = MockConverter::new().failing_on("broken.sch");
/// assert_eq!(converter.call_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct MockConverter {
    calls: Mutex<Vec<MockCall>>,
    failing: HashSet<String>,
    partial: HashSet<String>,
    silent: HashSet<String>,
    delay: Option<Duration>,
}

impl MockConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exit with status 1 for this source file name
    pub fn failing_on(mut self, source_name: &str) -> Self {
        self.failing.insert(source_name.to_string());
        self
    }

    /// Write a truncated output, then exit with status 1 for this source file name
    pub fn partial_on(mut self, source_name: &str) -> Self {
        self.partial.insert(source_name.to_string());
        self
    }

    /// Exit with status 0 but write nothing for this source file name
    pub fn without_output_for(mut self, source_name: &str) -> Self {
        self.silent.insert(source_name.to_string());
        self
    }

    /// Sleep before every conversion
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Calls made so far, in call order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Input names of the calls made so far
    pub fn inputs(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.input).collect()
    }

    pub fn reset(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl Converter for MockConverter {
    async fn convert(&self, job: &BuildJob) -> Result<ConverterOutput, ConversionError> {
        let call = MockCall {
            working_dir: job.working_dir().to_path_buf(),
            input: job.source_name().to_string_lossy().into_owned(),
            output: job.output_name().to_string_lossy().into_owned(),
        };
        self.calls.lock().unwrap().push(call.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.partial.contains(&call.input) {
            std::fs::write(call.working_dir.join(&call.output), "half")
                .map_err(|e| ConversionError::spawn("mock", e))?;
            return Ok(ConverterOutput::failed(
                1,
                &format!("mock: aborted {} halfway", call.input),
            ));
        }

        if self.failing.contains(&call.input) {
            return Ok(ConverterOutput::failed(
                1,
                &format!("mock: cannot convert {}", call.input),
            ));
        }

        if !self.silent.contains(&call.input) {
            std::fs::write(
                call.working_dir.join(&call.output),
                format!("converted from {}", call.input),
            )
            .map_err(|e| ConversionError::spawn("mock", e))?;
        }

        Ok(ConverterOutput::ok())
    }
}
