//! Core library for the `tempo` CLI.
//!
//! This crate defines:
//! - Configuration handling (API key, default city, forecast length)
//! - The remote WeatherAPI.com data source and its response models
//! - The SQLite favorites store with reactive list queries
//! - The best-effort location lookup
//! - The repository facade and the observable view-model on top of it
//!
//! It is used by `tempo-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod location;
pub mod model;
pub mod remote;
pub mod repository;
pub mod store;
pub mod viewmodel;

pub use config::Config;
pub use location::{IpLocationProvider, LocationSource};
pub use model::{FavoriteCity, SearchLocation, WeatherResponse};
pub use remote::{WeatherApi, WeatherSource};
pub use repository::WeatherRepository;
pub use store::{FavoriteStore, StoreError};
pub use viewmodel::{FetchState, SearchState, WeatherViewModel};
