//! Views module - fetch a page's rows and wire the grid to persistence.

mod views_service;
mod views_traits;


pub use views_service::GridService;
pub use views_traits::{GridServiceTrait, RowFetchRepositoryTrait};
