//! The CRUD template shared by every accounting resource.
//!
//! Each entity type describes itself through [`Resource`]; [`ResourceApi`] turns that
//! description into create/read/list/update/delete calls. Vendor rejections (HTTP 400)
//! and missing objects (HTTP 404) never surface as errors here: they are logged and
//! come back as an empty result. Everything else propagates.

use std::fmt;
use std::marker::PhantomData;

use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Map, Value};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::client::{ApiRequest, Client};
use crate::endpoints::XeroEndpoint;
use crate::error::{Error, Rejection, Result};

/// How a resource type is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStrategy {
    /// Move each entity to its terminal status and send them back through `update`.
    SoftDelete,
    /// `POST /{Collection}/{id}` with `{"Status": "DELETED"}`.
    StatusDelete,
    /// `DELETE /{Collection}/{id}`.
    HardDelete,
}

pub trait Resource: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync {
    /// Human readable name used in logs and errors.
    const NAME: &'static str;
    /// JSON key wrapping lists of this resource in requests and responses.
    const COLLECTION: &'static str;
    const DELETE_STRATEGY: DeleteStrategy;
    const SUPPORTS_UPDATE: bool = true;
    /// Whether calls carry the `unitdp` decimal-places parameter.
    const USES_UNITDP: bool = false;

    fn collection_endpoint() -> XeroEndpoint;

    fn entity_endpoint(id: Uuid) -> XeroEndpoint;

    fn id(&self) -> Option<Uuid>;

    /// Moves the entity to its deleted state. Returns `false`, leaving the entity
    /// untouched, when its current status has no such transition.
    fn soft_delete(&mut self) -> bool {
        false
    }
}

/// Query for [`ResourceApi::list`]. `where` and `order` are passed to Xero verbatim.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub r#where: Option<String>,
    pub order: Option<String>,
    pub modified_since: Option<OffsetDateTime>,
}

impl Filter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_where(mut self, clause: impl Into<String>) -> Self {
        self.r#where = Some(clause.into());
        self
    }

    #[must_use]
    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    #[must_use]
    pub fn modified_since(mut self, since: OffsetDateTime) -> Self {
        self.modified_since = Some(since);
        self
    }
}

/// What [`ResourceApi::delete`] acts on.
#[derive(Debug, Clone)]
pub enum Selector<R> {
    ById(Uuid),
    ByList(Vec<R>),
    ByFilter(Filter),
}

/// The three ways a call can end that are not a propagated error.
#[derive(Debug)]
pub enum Outcome<T> {
    Found(T),
    NotFound,
    Rejected(Box<Rejection>),
}

impl<T> Outcome<T> {
    /// Separates not-found and rejected answers from errors that must propagate.
    pub fn classify(result: Result<T>) -> Result<Self> {
        match result {
            Ok(value) => Ok(Self::Found(value)),
            Err(Error::NotFound { .. }) => Ok(Self::NotFound),
            Err(Error::BadRequest(rejection)) => Ok(Self::Rejected(rejection)),
            Err(e) => Err(e),
        }
    }

    /// Logs a rejection and drops it.
    pub fn into_option(self, resource: &str, operation: &str) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound => {
                debug!(resource, operation, "not found");
                None
            }
            Self::Rejected(rejection) => {
                error!(resource, operation, url = %rejection.url, "xero rejected the request: {rejection}");
                None
            }
        }
    }
}

fn take_collection<R: Resource>(mut body: Map<String, Value>) -> Result<Vec<R>> {
    match body.remove(R::COLLECTION) {
        Some(list) => serde_json::from_value(list).map_err(|e| Error::DeserializationError(e, None)),
        None => {
            warn!(collection = R::COLLECTION, "response carried no collection");
            Ok(Vec::new())
        }
    }
}

/// CRUD calls for one resource type, borrowed from a [`Client`].
#[derive(Debug)]
pub struct ResourceApi<'a, R> {
    client: &'a Client,
    _resource: PhantomData<R>,
}

impl<'a, R: Resource> ResourceApi<'a, R> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    fn request<'b>(&self, method: Method, endpoint: XeroEndpoint) -> ApiRequest<'b> {
        let request = ApiRequest::new(method, endpoint);
        match self.client.unitdp() {
            Some(unitdp) if R::USES_UNITDP => request.query("unitdp", unitdp),
            _ => request,
        }
    }

    async fn fetch(&self, request: ApiRequest<'_>, operation: &str) -> Result<Vec<R>> {
        let result = self
            .client
            .send::<Map<String, Value>>(request)
            .await
            .and_then(take_collection::<R>);
        Ok(Outcome::classify(result)?
            .into_option(R::NAME, operation)
            .unwrap_or_default())
    }

    async fn mutate(&self, method: Method, entities: Vec<R>, operation: &str) -> Result<Vec<R>> {
        if entities.is_empty() {
            return Ok(Vec::new());
        }
        let mut envelope = Map::new();
        envelope.insert(R::COLLECTION.to_string(), serde_json::to_value(entities)?);
        let body = Value::Object(envelope);
        let request = self
            .request(method, R::collection_endpoint())
            .body(&body);
        self.fetch(request, operation).await
    }

    /// Creates the given entities with `PUT /{Collection}`.
    #[instrument(skip(self, entities), fields(resource = R::NAME, count = entities.len()))]
    pub async fn create(&self, entities: Vec<R>) -> Result<Vec<R>> {
        self.mutate(Method::PUT, entities, "create").await
    }

    /// Fetches one entity. `None` unless exactly one came back.
    #[instrument(skip(self), fields(resource = R::NAME))]
    pub async fn read(&self, id: Uuid) -> Result<Option<R>> {
        let request = self.request(Method::GET, R::entity_endpoint(id));
        let mut found = self.fetch(request, "read").await?;
        if found.len() == 1 {
            Ok(found.pop())
        } else {
            debug!(count = found.len(), "expected exactly one entity");
            Ok(None)
        }
    }

    #[instrument(skip(self), fields(resource = R::NAME))]
    pub async fn list(&self, filter: &Filter) -> Result<Vec<R>> {
        let mut request = self
            .request(Method::GET, R::collection_endpoint())
            .modified_since(filter.modified_since);
        if let Some(clause) = &filter.r#where {
            request = request.query("where", clause);
        }
        if let Some(order) = &filter.order {
            request = request.query("order", order);
        }
        self.fetch(request, "list").await
    }

    /// Lists every entity of this type.
    pub async fn list_all(&self) -> Result<Vec<R>> {
        self.list(&Filter::default()).await
    }

    /// Creates or updates the given entities with `POST /{Collection}`.
    #[instrument(skip(self, entities), fields(resource = R::NAME, count = entities.len()))]
    pub async fn update(&self, entities: Vec<R>) -> Result<Vec<R>> {
        if !R::SUPPORTS_UPDATE {
            return Err(Error::Unsupported {
                operation: "update",
                entity: R::NAME,
            });
        }
        self.mutate(Method::POST, entities, "update").await
    }

    /// Deletes what `selector` resolves to and returns the entities as Xero left them.
    ///
    /// Nothing is sent when the selector matches nothing.
    #[instrument(skip(self, selector), fields(resource = R::NAME))]
    pub async fn delete(&self, selector: Selector<R>) -> Result<Vec<R>> {
        let entities = match selector {
            Selector::ById(id) => self.read(id).await?.into_iter().collect(),
            Selector::ByList(entities) => entities,
            Selector::ByFilter(filter) => self.list(&filter).await?,
        };
        if entities.is_empty() {
            debug!("nothing matched, skipping delete");
            return Ok(Vec::new());
        }

        match R::DELETE_STRATEGY {
            DeleteStrategy::SoftDelete => {
                let entities = entities
                    .into_iter()
                    .filter(|entity| {
                        if entity.id().is_none() {
                            warn!(?entity, "entity has no id, skipping delete");
                        }
                        entity.id().is_some()
                    })
                    .map(|mut entity| {
                        if !entity.soft_delete() {
                            debug!(id = ?entity.id(), "status has no delete transition, sending unchanged");
                        }
                        entity
                    })
                    .collect();
                self.update(entities).await
            }
            DeleteStrategy::StatusDelete => self.delete_each(entities, Method::POST).await,
            DeleteStrategy::HardDelete => self.delete_each(entities, Method::DELETE).await,
        }
    }

    async fn delete_each(&self, entities: Vec<R>, method: Method) -> Result<Vec<R>> {
        let body = json!({ "Status": "DELETED" });
        let mut deleted = Vec::with_capacity(entities.len());
        for entity in entities {
            let Some(id) = entity.id() else {
                warn!(?entity, "entity has no id, skipping delete");
                continue;
            };
            let mut request = ApiRequest::new(method.clone(), R::entity_endpoint(id));
            if method == Method::POST {
                request = request.body(&body);
            }

            let result = self.client.send::<Value>(request).await;
            let Some(response) = Outcome::classify(result)?.into_option(R::NAME, "delete") else {
                continue;
            };
            // Status deletes echo the entity; hard deletes answer with nothing.
            let echoed = match response {
                Value::Object(map) => take_collection::<R>(map)?.into_iter().next(),
                _ => None,
            };
            deleted.push(echoed.unwrap_or(entity));
        }
        Ok(deleted)
    }
}
