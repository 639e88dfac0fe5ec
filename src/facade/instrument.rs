//! The instrumentation pipeline wrapped around every facade call.
//!
//! # Call Sequence
//! ```text
//! request record → delay (races cancellation) → fault policy → store op
//!     → response record (success) | error record (failure)
//! cancelled before settling → cancelled record only
//! ```
//!
//! Exactly one request record and one terminal record per call.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{ApiError, ApiResult};
use crate::facade::fault::{FaultPolicy, SIMULATED_FAILURE_MESSAGE};
use crate::facade::latency::LatencyModel;
use crate::facade::operation::OperationContext;
use crate::facade::MissingRecordPolicy;
use crate::model::Envelope;
use crate::observability::metrics::{self, Outcome};
use crate::observability::{LogValue, SinkError, Telemetry};

pub const REQUEST_EVENT: &str = "API Request";
pub const RESPONSE_EVENT: &str = "API Response Success";
pub const CANCELLED_EVENT: &str = "API Request Cancelled";

/// Runtime-adjustable behavior of the pipeline.
pub struct Behavior {
    pub latency: LatencyModel,
    pub faults: Arc<dyn FaultPolicy>,
    pub missing_records: MissingRecordPolicy,
}

/// Shared by every resource of one `Api`.
pub struct Instrumentation {
    telemetry: Arc<Telemetry>,
    behavior: ArcSwap<Behavior>,
}

impl Instrumentation {
    pub fn new(telemetry: Arc<Telemetry>, behavior: Behavior) -> Self {
        Self {
            telemetry,
            behavior: ArcSwap::from_pointee(behavior),
        }
    }

    pub fn telemetry(&self) -> &Arc<Telemetry> {
        &self.telemetry
    }

    pub fn behavior(&self) -> Arc<Behavior> {
        self.behavior.load_full()
    }

    /// Swap in new behavior. Calls already started keep the old one.
    pub fn set_behavior(&self, behavior: Behavior) {
        self.behavior.store(Arc::new(behavior));
    }

    /// Run `op` inside the pipeline and wrap its result in an envelope.
    pub async fn call<T, F>(
        &self,
        ctx: OperationContext,
        cancel: Option<&CancellationToken>,
        op: F,
    ) -> ApiResult<Envelope<T>>
    where
        F: FnOnce(&Behavior) -> ApiResult<T>,
    {
        let sink = self.telemetry.sink();
        let path = ctx.path();
        let method = ctx.operation.method();
        let started = Instant::now();

        sink.push_log(&[
            REQUEST_EVENT.into(),
            method.into(),
            path.clone().into(),
            request_field(&ctx),
        ]);
        tracing::debug!(request_id = %ctx.request_id, method, path = %path, "API Request");

        let behavior = self.behavior();
        let delay = behavior.latency.sample();
        if !wait(delay, cancel).await {
            sink.push_log(&[
                CANCELLED_EVENT.into(),
                method.into(),
                path.clone().into(),
                request_field(&ctx),
            ]);
            tracing::info!(request_id = %ctx.request_id, method, path = %path, "API Request cancelled");
            metrics::record_request(ctx.entity, ctx.operation, Outcome::Cancelled, started.elapsed());
            return Err(ApiError::Cancelled {
                operation: format!("{} {}", method, path),
            });
        }

        let result = if behavior.faults.should_fail(&ctx) {
            Err(ApiError::simulated(SIMULATED_FAILURE_MESSAGE))
        } else {
            op(&behavior)
        };

        let elapsed = started.elapsed();
        match result {
            Ok(data) => {
                sink.push_log(&[
                    RESPONSE_EVENT.into(),
                    200u16.into(),
                    path.clone().into(),
                    request_field(&ctx),
                ]);
                tracing::debug!(
                    request_id = %ctx.request_id,
                    status = 200,
                    path = %path,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "API Response"
                );
                metrics::record_request(ctx.entity, ctx.operation, Outcome::Success, elapsed);
                Ok(Envelope::ok(data))
            }
            Err(err) => {
                let status = err.status_code();
                let report = SinkError::new(format!("API Error: {} {} - {}", status, path, err))
                    .with_attribute("request_id", ctx.request_id)
                    .with_attribute("code", err.code())
                    .with_attribute("status", status)
                    .with_attribute("entity", ctx.entity)
                    .with_attribute("operation", ctx.operation.as_str());
                sink.push_error(&report);
                tracing::warn!(
                    request_id = %ctx.request_id,
                    status,
                    path = %path,
                    error = %err,
                    "API Response Error"
                );
                metrics::record_request(ctx.entity, ctx.operation, Outcome::Failure, elapsed);
                Err(err)
            }
        }
    }
}

fn request_field(ctx: &OperationContext) -> LogValue {
    LogValue::Text(ctx.request_id.to_string())
}

/// Sleep for `delay`. Returns `false` if `cancel` fired first.
async fn wait(delay: Duration, cancel: Option<&CancellationToken>) -> bool {
    match cancel {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => false,
                _ = tokio::time::sleep(delay) => true,
            }
        }
        None => {
            tokio::time::sleep(delay).await;
            true
        }
    }
}
