//! Per-entity CRUD surface.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::{ApiError, ApiResult};
use crate::facade::instrument::Instrumentation;
use crate::facade::operation::{Operation, OperationContext};
use crate::facade::MissingRecordPolicy;
use crate::model::{Deleted, Envelope, Record};
use crate::store::Store;

/// Instrumented operations over one entity kind.
///
/// Cloning is cheap; clones share the same store and pipeline.
pub struct Resource<R: Record> {
    store: Arc<Store<R>>,
    core: Arc<Instrumentation>,
    cancel: Option<CancellationToken>,
}

impl<R: Record> Clone for Resource<R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            core: self.core.clone(),
            cancel: self.cancel.clone(),
        }
    }
}

impl<R: Record> Resource<R> {
    pub(crate) fn new(store: Arc<Store<R>>, core: Arc<Instrumentation>) -> Self {
        Self {
            store,
            core,
            cancel: None,
        }
    }

    /// A handle whose calls settle with `Cancelled` once `token` fires.
    pub fn cancel_on(&self, token: CancellationToken) -> Self {
        Self {
            cancel: Some(token),
            ..self.clone()
        }
    }

    pub fn store(&self) -> &Store<R> {
        &self.store
    }

    /// Every record, ordered by id.
    pub async fn get_all(&self) -> ApiResult<Envelope<Vec<R>>> {
        let ctx = OperationContext::new(R::KIND, Operation::GetAll, None);
        self.core
            .call(ctx, self.cancel.as_ref(), |_| Ok(self.store.list()))
            .await
    }

    /// Look up one record. An unknown id settles per the missing-record policy.
    pub async fn get_by_id(&self, id: u64) -> ApiResult<Envelope<Option<R>>> {
        let ctx = OperationContext::new(R::KIND, Operation::GetById, Some(id));
        self.core
            .call(ctx, self.cancel.as_ref(), |behavior| {
                match (self.store.get(id), behavior.missing_records) {
                    (Some(record), _) => Ok(Some(record)),
                    (None, MissingRecordPolicy::Absent) => Ok(None),
                    (None, MissingRecordPolicy::NotFound) => Err(not_found::<R>(id)),
                }
            })
            .await
    }

    pub async fn create(&self, draft: R::Draft) -> ApiResult<Envelope<R>> {
        let ctx = OperationContext::new(R::KIND, Operation::Create, None);
        self.core
            .call(ctx, self.cancel.as_ref(), move |_| {
                R::validate_draft(&draft).map_err(invalid::<R>)?;
                Ok(self.store.create(draft))
            })
            .await
    }

    pub async fn update(&self, id: u64, patch: R::Patch) -> ApiResult<Envelope<R>> {
        let ctx = OperationContext::new(R::KIND, Operation::Update, Some(id));
        self.core
            .call(ctx, self.cancel.as_ref(), move |_| {
                R::validate_patch(&patch).map_err(invalid::<R>)?;
                self.store.update(id, patch).ok_or_else(|| not_found::<R>(id))
            })
            .await
    }

    pub async fn delete(&self, id: u64) -> ApiResult<Envelope<Deleted>> {
        let ctx = OperationContext::new(R::KIND, Operation::Delete, Some(id));
        self.core
            .call(ctx, self.cancel.as_ref(), |_| {
                self.store.delete(id).ok_or_else(|| not_found::<R>(id))
            })
            .await
    }
}

fn invalid<R: Record>(message: String) -> ApiError {
    ApiError::InvalidInput {
        entity: R::KIND,
        message,
    }
}

fn not_found<R: Record>(id: u64) -> ApiError {
    ApiError::NotFound { entity: R::KIND, id }
}
