//! Catalog domain: product catalog read/write with a transactional outbox on
//! price mutation and ranked similarity search.
//!
//! The two coordinators live in [`service::CatalogService`]:
//!
//! - **Mutations**: a price-changing update commits the row change and a
//!   pending integration event in one transaction, then hands the event to
//!   the [`dispatcher::EventDispatcher`]. A dispatch failure leaves the row
//!   pending; the outbox relay re-drives it later.
//! - **Search**: queries rank the whole catalog by cosine distance to the
//!   query embedding, or fall back to name-prefix matching when the
//!   embedding subsystem is disabled, under one pagination contract.

pub mod dispatcher;
pub mod embedding;
pub mod entity;
pub mod error;
pub mod events;
pub mod models;
pub mod postgres;
pub mod ranking;
pub mod repository;
pub mod service;

pub use dispatcher::{
    EventDispatcher, IntegrationEventPublisher, RedisIntegrationEventPublisher,
};
pub use embedding::{
    provider_from_config, DisabledEmbeddingProvider, EmbeddingError, EmbeddingProvider,
    OpenAiEmbeddingProvider,
};
pub use error::{CatalogError, CatalogResult};
pub use events::{EventState, PriceChangedIntegrationEvent};
pub use models::{
    CatalogBrand, CatalogItem, CatalogType, CreateCatalogItem, PageRequest, PaginatedItems,
    UpdateCatalogItem,
};
pub use postgres::{PgCatalogRepository, PgEventLogRepository};
pub use repository::{
    CatalogRepository, EventLogRepository, InMemoryCatalogRepository, ItemMutation,
};
pub use service::CatalogService;
