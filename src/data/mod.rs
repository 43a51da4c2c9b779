//! Data module - collision CSV loading, caching and queries

mod cache;
mod loader;
mod processor;
mod schema;

pub use cache::LoadCache;
pub use loader::{parse_timestamp, CollisionTable, DatasetLoader, LoadError};
pub use processor::{
    DashboardView, MinuteHistogram, QueryError, QueryParams, QueryProcessor, StreetRank,
    MAX_HOUR, MAX_INJURY_THRESHOLD, MINUTE_BUCKETS, TOP_STREETS,
};
pub use schema::{Category, CollisionRecord, SourceSchema, DATE_TIME_COLUMN};
