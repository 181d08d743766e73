#![forbid(unsafe_code)]

pub mod repository;
pub mod seed;
pub mod sqlite;

pub use repository::{
    CardFilter, CardPage, CardStore, CategoryCount, InMemoryRepository, PageRequest, Storage,
    StorageError, StoreSummary,
};
