//! Helpers shared by the resource handlers: response envelopes and cursor
//! decoding.

use actix_web::HttpResponse;
use pagination::{Cursor, Page, PageParams};
use serde::Serialize;

use crate::domain::{DocumentId, Error, PageRequest, PageSlice};

/// Success body: `{ "data": ... }`.
#[derive(Debug, Serialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// `200 OK` with `value` wrapped in the data envelope.
pub fn ok<T: Serialize>(value: T) -> HttpResponse {
    HttpResponse::Ok().json(DataEnvelope { data: value })
}

/// `201 Created` with `value` wrapped in the data envelope.
pub fn created<T: Serialize>(value: T) -> HttpResponse {
    HttpResponse::Created().json(DataEnvelope { data: value })
}

/// Build a page request from `?limit=&cursor=`.
pub fn page_request<Id>(params: &PageParams, default_limit: usize) -> Result<PageRequest<Id>, Error>
where
    Id: From<DocumentId>,
{
    let after = params
        .after::<DocumentId>()
        .map_err(|err| Error::invalid_input(format!("Invalid cursor: {err}")))?;
    Ok(PageRequest {
        limit: params.limit_or(default_limit),
        after: after.map(Id::from),
    })
}

/// Wrap a domain page in the cursor envelope.
pub fn page_envelope<T, Id>(slice: PageSlice<T, Id>) -> Result<Page<T>, Error>
where
    Id: Into<DocumentId>,
{
    let next_cursor = slice
        .next_after
        .map(|id| Cursor::<DocumentId>::new(id.into()).encode())
        .transpose()
        .map_err(|err| Error::internal(format!("failed to encode cursor: {err}")))?;
    Ok(Page::new(slice.items, next_cursor))
}
