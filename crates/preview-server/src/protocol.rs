//! Submit and fetch operations on top of the artifact store
//!
//! Submit renders a PDF, sweeps the store and caches the result under a new
//! handle. Fetch serves a cached PDF verbatim and replays the stored inputs
//! through the renderer for anything else.

use crate::error::PreviewError;
use crate::types::{Artifact, InlineReport, SubmitOutcome, SubmitRequest};
use preview_cache::{ArtifactStore, CacheRow, Clock, EvictionPolicy, Handle, SystemClock};
use preview_render::{OutputFormat, Renderer, Report};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct PreviewService {
    store: ArtifactStore,
    policy: EvictionPolicy,
    renderer: Arc<dyn Renderer>,
    clock: Arc<dyn Clock>,
}

impl PreviewService {
    pub fn new(renderer: Arc<dyn Renderer>, policy: EvictionPolicy) -> Self {
        Self {
            store: ArtifactStore::new(),
            policy,
            renderer,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Render a preview and cache it.
    ///
    /// Definition problems and generation failures come back as
    /// [`SubmitOutcome::Rejected`] and leave the store without a new row.
    pub async fn submit(&self, request: SubmitRequest) -> Result<SubmitOutcome, PreviewError> {
        let format = parse_output_format(request.output_format.as_deref())?;

        let report = self
            .renderer
            .new_report(&request.report, &request.data, request.is_test_data)
            .map_err(|e| PreviewError::ReportInit(e.to_string()))?;

        let errors = report.validation_errors();
        if !errors.is_empty() {
            debug!(errors = errors.len(), "Report definition has errors");
            return Ok(SubmitOutcome::Rejected(errors.to_vec()));
        }

        let now = self.clock.now();
        self.policy.sweep(&self.store, now).await;

        // A PDF is cached whatever format was requested
        let pdf = match report.render_pdf() {
            Ok(pdf) => pdf,
            Err(e) => {
                warn!(error = %e, "Report generation failed");
                return Ok(SubmitOutcome::Rejected(vec![e.error]));
            }
        };

        let row = CacheRow::new(
            request.report.to_string(),
            request.data.to_string(),
            request.is_test_data,
            Some(pdf),
            now,
        );
        let handle = self.store.insert(row).await?;
        debug!(handle = %handle, format = %format, "Preview cached");

        Ok(SubmitOutcome::Cached(handle))
    }

    /// Produce an artifact from a cached handle or from inline input.
    ///
    /// A `key` that is not handle-shaped counts as absent and the inline
    /// input is rendered directly without touching the store.
    pub async fn fetch(
        &self,
        output_format: Option<&str>,
        key: Option<&str>,
        inline: Option<InlineReport>,
    ) -> Result<Artifact, PreviewError> {
        let format = parse_output_format(output_format)?;

        let report = match key.and_then(Handle::parse) {
            Some(handle) => {
                let now = self.clock.now();
                let row = self
                    .store
                    .lookup_where(&handle, |row| !self.policy.is_expired(row, now))
                    .await
                    .ok_or(PreviewError::NotFound)?;

                if format == OutputFormat::Pdf {
                    if let Some(pdf) = row.pdf() {
                        return Ok(Artifact {
                            format,
                            bytes: pdf.to_vec(),
                            from_cache: true,
                        });
                    }
                }

                debug!(handle = %handle, format = %format, "Replaying cached report");
                let definition = parse_stored(row.definition())?;
                let data = parse_stored(row.data())?;
                self.build_report(&definition, &data, row.is_sample())?
            }
            None => {
                let inline = inline.ok_or(PreviewError::MissingInput)?;
                match (inline.report, inline.data) {
                    (Some(definition @ Value::Object(_)), Some(data @ Value::Object(_))) => {
                        self.build_report(&definition, &data, inline.is_test_data)?
                    }
                    _ => return Err(PreviewError::MissingInput),
                }
            }
        };

        let bytes = report
            .render(format)
            .map_err(|e| PreviewError::Generation(e.error))?;

        Ok(Artifact {
            format,
            bytes,
            from_cache: false,
        })
    }

    /// Build a report whose validation errors fail the request
    fn build_report(
        &self,
        definition: &Value,
        data: &Value,
        is_sample: bool,
    ) -> Result<Box<dyn Report>, PreviewError> {
        let report = self
            .renderer
            .new_report(definition, data, is_sample)
            .map_err(|e| PreviewError::ReportInit(e.to_string()))?;

        let errors = report.validation_errors();
        if !errors.is_empty() {
            return Err(PreviewError::InvalidReport(errors.to_vec()));
        }
        Ok(report)
    }
}

fn parse_output_format(value: Option<&str>) -> Result<OutputFormat, PreviewError> {
    value
        .and_then(OutputFormat::parse)
        .ok_or_else(|| PreviewError::InvalidOutputFormat(value.map(str::to_string)))
}

fn parse_stored(json: &str) -> Result<Value, PreviewError> {
    serde_json::from_str(json).map_err(|e| PreviewError::ReportInit(e.to_string()))
}
