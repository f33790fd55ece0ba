use anyhow::Result;
use std::sync::Arc;
use tokio::sync::watch;

use crate::model::{FavoriteCity, SearchLocation, WeatherResponse};
use crate::remote::WeatherSource;
use crate::store::{FavoriteStore, StoreResult};

/// Facade over the remote source and the favorites store. Pure delegation;
/// all decisions live in the view-model.
#[derive(Debug)]
pub struct WeatherRepository {
    source: Box<dyn WeatherSource>,
    store: Arc<FavoriteStore>,
}

impl WeatherRepository {
    pub fn new(source: Box<dyn WeatherSource>, store: Arc<FavoriteStore>) -> Self {
        Self { source, store }
    }

    // Weather data

    pub async fn current(&self, query: &str) -> Result<WeatherResponse> {
        self.source.current(query).await
    }

    pub async fn forecast(&self, query: &str, days: u8) -> Result<WeatherResponse> {
        self.source.forecast(query, days).await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchLocation>> {
        self.source.search(query).await
    }

    // Favorite cities

    pub fn favorites(&self) -> watch::Receiver<Vec<FavoriteCity>> {
        self.store.watch()
    }

    pub fn add_favorite(&self, city: &FavoriteCity) -> StoreResult<()> {
        self.store.add(city)
    }

    pub fn remove_favorite(&self, name: &str) -> StoreResult<bool> {
        self.store.remove(name)
    }

    pub fn favorite_by_name(&self, name: &str) -> StoreResult<Option<FavoriteCity>> {
        self.store.get(name)
    }

    pub fn is_favorite(&self, name: &str) -> StoreResult<bool> {
        self.store.is_favorite(name)
    }
}
