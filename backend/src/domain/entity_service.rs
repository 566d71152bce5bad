//! Generic CRUD and cursor pagination shared by every entity kind.
//!
//! An [`EntityDescriptor`] names the stored record type and how a record is
//! turned into its client view (populating references). [`EntityService`]
//! implements the operations common to users, articles and comments on top
//! of a typed [`Collection`]; the per-entity services add their own lookups
//! and side effects around it.

use async_trait::async_trait;
use serde::Serialize;

use super::dependency::DependencyValidator;
use super::document::{Collection, Document};
use super::ports::{DeleteAck, Filter, Query};
use super::{DocumentId, Error};

/// Page size used when a request does not ask for one.
pub const DEFAULT_PAGE_SIZE: usize = 10;
/// Largest page a single request may ask for, unless configured otherwise.
pub const DEFAULT_MAX_PAGE_SIZE: usize = 100;

/// Describes one entity kind to the generic service.
#[async_trait]
pub trait EntityDescriptor: Send + Sync {
    /// Stored document.
    type Record: Document;
    /// Client-facing representation with references populated.
    type View: Serialize + Send;

    /// Populate the references of `record`.
    async fn resolve(&self, record: &Self::Record) -> Result<Self::View, Error>;
}

/// Cursor pagination request: up to `limit` records strictly after `after`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest<Id> {
    pub limit: usize,
    pub after: Option<Id>,
}

impl<Id> PageRequest<Id> {
    /// First page of `limit` records.
    pub fn first(limit: usize) -> Self {
        Self { limit, after: None }
    }

    /// Page of `limit` records following `after`.
    pub fn after(limit: usize, after: Id) -> Self {
        Self {
            limit,
            after: Some(after),
        }
    }
}

/// One page of views.
///
/// `next_after` is the identifier to resume from, present only when more
/// records follow this page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice<T, Id> {
    pub items: Vec<T>,
    pub next_after: Option<Id>,
}

/// CRUD operations over one collection.
pub struct EntityService<E: EntityDescriptor> {
    records: Collection<E::Record>,
    descriptor: E,
    max_page_size: usize,
}

type IdOf<E> = <<E as EntityDescriptor>::Record as Document>::Id;
type DraftOf<E> = <<E as EntityDescriptor>::Record as Document>::Draft;
type PatchOf<E> = <<E as EntityDescriptor>::Record as Document>::Patch;

impl<E: EntityDescriptor> EntityService<E> {
    /// Service over `records`, capping pages at `max_page_size`.
    pub fn new(records: Collection<E::Record>, descriptor: E, max_page_size: usize) -> Self {
        Self {
            records,
            descriptor,
            max_page_size,
        }
    }

    /// Underlying collection.
    pub fn records(&self) -> &Collection<E::Record> {
        &self.records
    }

    fn invalid_id() -> Error {
        Error::not_found(format!("Invalid {} id", <E::Record as Document>::NOUN))
    }

    /// Stored record without reference population; `None` when absent.
    pub async fn find_record(&self, id: IdOf<E>) -> Result<Option<E::Record>, Error> {
        self.records.find(id).await
    }

    /// Stored record, failing with `not_found` when absent.
    pub async fn get_record(&self, id: IdOf<E>) -> Result<E::Record, Error> {
        self.find_record(id).await?.ok_or_else(Self::invalid_id)
    }

    /// Populated view of one record.
    pub async fn get_by_id(&self, id: IdOf<E>) -> Result<E::View, Error> {
        let record = self.get_record(id).await?;
        self.descriptor.resolve(&record).await
    }

    /// Validate references, build the draft from what they resolved to,
    /// persist it and return the populated view.
    pub async fn create<V, F>(
        &self,
        validator: &V,
        claim: V::Claim,
        build: F,
    ) -> Result<E::View, Error>
    where
        V: DependencyValidator + ?Sized,
        F: FnOnce(V::Resolved) -> DraftOf<E> + Send,
    {
        let resolved = validator.validate(claim).await?;
        let draft = build(resolved);
        let record = self.records.insert(&draft).await?;
        self.descriptor.resolve(&record).await
    }

    /// Merge `patch` into the stored record.
    pub async fn update(&self, id: IdOf<E>, patch: &PatchOf<E>) -> Result<E::View, Error> {
        let record = self
            .records
            .update(id, patch)
            .await?
            .ok_or_else(Self::invalid_id)?;
        self.descriptor.resolve(&record).await
    }

    /// `true` only when the store acknowledged removing exactly one record.
    pub async fn delete(&self, id: IdOf<E>) -> Result<bool, Error> {
        let ack: DeleteAck = self.records.delete(id).await?;
        Ok(ack.removed_one())
    }

    /// Ascending page over the whole collection.
    pub async fn list_page(
        &self,
        request: PageRequest<IdOf<E>>,
    ) -> Result<PageSlice<E::View, IdOf<E>>, Error> {
        self.list_where(Filter::new(), request).await
    }

    /// Ascending page over the records matching `filter`.
    ///
    /// A page requested after a cursor that yields nothing is reported as
    /// `not_found`; an empty first page is an empty success.
    pub async fn list_where(
        &self,
        filter: Filter,
        request: PageRequest<IdOf<E>>,
    ) -> Result<PageSlice<E::View, IdOf<E>>, Error> {
        if request.limit == 0 || request.limit > self.max_page_size {
            return Err(Error::invalid_input(format!(
                "limit must be between 1 and {}",
                self.max_page_size
            )));
        }
        let query = Query::matching(filter)
            .after(request.after.map(Into::<DocumentId>::into))
            .limit(request.limit.saturating_add(1));
        let mut records = self.records.find_where(&query).await?;

        if records.is_empty() && request.after.is_some() {
            return Err(Error::not_found(format!(
                "No {}s after the given cursor",
                <E::Record as Document>::NOUN
            )));
        }
        let more = records.len() > request.limit;
        records.truncate(request.limit);
        let next_after = more
            .then(|| records.last().map(Document::id))
            .flatten();

        let items = self.resolve_all(&records).await?;
        Ok(PageSlice { items, next_after })
    }

    /// Every record matching `filter`, populated, in ascending order.
    pub async fn find_all(&self, filter: Filter) -> Result<Vec<E::View>, Error> {
        let records = self.records.find_where(&Query::matching(filter)).await?;
        self.resolve_all(&records).await
    }

    async fn resolve_all(&self, records: &[E::Record]) -> Result<Vec<E::View>, Error> {
        let mut views = Vec::with_capacity(records.len());
        for record in records {
            views.push(self.descriptor.resolve(record).await?);
        }
        Ok(views)
    }
}
