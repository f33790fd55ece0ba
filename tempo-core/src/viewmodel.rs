//! Observable state over the repository.
//!
//! Four independent pieces of state, each behind a `watch` channel: current
//! conditions, forecast, search results, and the favorite flag for the city
//! currently on display. Imperative methods mutate them by issuing
//! repository calls and mapping the outcome into a state variant.

use tokio::sync::watch;

use crate::location::LocationSource;
use crate::model::{FavoriteCity, SearchLocation, WeatherResponse};
use crate::repository::WeatherRepository;
use crate::store::StoreResult;

/// Status of one asynchronous fetch, for display purposes.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Loading,
    Ready(T),
    Failed(String),
}

/// Status of the location search. Queries under two characters stay `Idle`;
/// a successful search with no matches is `Empty`.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    Idle,
    Loading,
    Empty,
    Ready(Vec<SearchLocation>),
    Failed(String),
}

pub struct WeatherViewModel {
    repository: WeatherRepository,
    location: Box<dyn LocationSource>,
    default_location: String,
    forecast_days: u8,

    current_tx: watch::Sender<FetchState<WeatherResponse>>,
    forecast_tx: watch::Sender<FetchState<WeatherResponse>>,
    search_tx: watch::Sender<SearchState>,
    favorite_tx: watch::Sender<bool>,
}

impl WeatherViewModel {
    pub fn new(
        repository: WeatherRepository,
        location: Box<dyn LocationSource>,
        default_location: String,
        forecast_days: u8,
    ) -> Self {
        let (current_tx, _) = watch::channel(FetchState::Loading);
        let (forecast_tx, _) = watch::channel(FetchState::Loading);
        let (search_tx, _) = watch::channel(SearchState::Idle);
        let (favorite_tx, _) = watch::channel(false);

        Self {
            repository,
            location,
            default_location,
            forecast_days,
            current_tx,
            forecast_tx,
            search_tx,
            favorite_tx,
        }
    }

    // State subscriptions

    pub fn current_state(&self) -> watch::Receiver<FetchState<WeatherResponse>> {
        self.current_tx.subscribe()
    }

    pub fn forecast_state(&self) -> watch::Receiver<FetchState<WeatherResponse>> {
        self.forecast_tx.subscribe()
    }

    pub fn search_state(&self) -> watch::Receiver<SearchState> {
        self.search_tx.subscribe()
    }

    pub fn favorite_flag(&self) -> watch::Receiver<bool> {
        self.favorite_tx.subscribe()
    }

    pub fn favorites(&self) -> watch::Receiver<Vec<FavoriteCity>> {
        self.repository.favorites()
    }

    // Imperative state mutations

    /// Locate the user and load weather + forecast for the result, falling
    /// back to the default city when no coordinates are available.
    pub async fn refresh_from_location(&self) {
        self.current_tx.send_replace(FetchState::Loading);
        self.forecast_tx.send_replace(FetchState::Loading);

        let query = match self.location.coordinates().await {
            Some((lat, lon)) => format!("{lat},{lon}"),
            None => {
                tracing::debug!("No coordinates available, using default city");
                self.default_location.clone()
            }
        };

        self.load_current(&query).await;
        self.load_forecast(&query).await;
    }

    pub async fn load_current(&self, query: &str) {
        self.current_tx.send_replace(FetchState::Loading);

        match self.repository.current(query).await {
            Ok(response) => {
                let flag = self
                    .repository
                    .is_favorite(&response.location.name)
                    .unwrap_or_else(|e| {
                        tracing::warn!("Favorite check failed: {e}");
                        false
                    });
                self.favorite_tx.send_replace(flag);
                self.current_tx.send_replace(FetchState::Ready(response));
            }
            Err(e) => {
                self.current_tx.send_replace(FetchState::Failed(format!("{e:#}")));
            }
        }
    }

    pub async fn load_forecast(&self, query: &str) {
        self.forecast_tx.send_replace(FetchState::Loading);

        match self.repository.forecast(query, self.forecast_days).await {
            Ok(response) => {
                self.forecast_tx.send_replace(FetchState::Ready(response));
            }
            Err(e) => {
                self.forecast_tx.send_replace(FetchState::Failed(format!("{e:#}")));
            }
        }
    }

    pub async fn search(&self, query: &str) {
        if query.chars().count() < 2 {
            self.search_tx.send_replace(SearchState::Idle);
            return;
        }

        self.search_tx.send_replace(SearchState::Loading);

        match self.repository.search(query).await {
            Ok(locations) if locations.is_empty() => {
                self.search_tx.send_replace(SearchState::Empty);
            }
            Ok(locations) => {
                self.search_tx.send_replace(SearchState::Ready(locations));
            }
            Err(e) => {
                self.search_tx.send_replace(SearchState::Failed(format!("{e:#}")));
            }
        }
    }

    pub fn reset_search(&self) {
        self.search_tx.send_replace(SearchState::Idle);
    }

    /// Save the city currently on display. Does nothing unless the current
    /// state is `Ready`; the returned bool says whether a city was saved.
    pub fn add_favorite(&self) -> StoreResult<bool> {
        let city = match &*self.current_tx.borrow() {
            FetchState::Ready(response) => Some(FavoriteCity::from_location(&response.location)),
            _ => None,
        };

        let Some(city) = city else { return Ok(false) };

        self.repository.add_favorite(&city)?;
        self.favorite_tx.send_replace(true);
        Ok(true)
    }

    /// Remove the city currently on display from the favorites. A city that
    /// was never stored is left alone.
    pub fn remove_favorite(&self) -> StoreResult<bool> {
        let name = match &*self.current_tx.borrow() {
            FetchState::Ready(response) => Some(response.location.name.clone()),
            _ => None,
        };

        let Some(name) = name else { return Ok(false) };

        let Some(stored) = self.repository.favorite_by_name(&name)? else {
            return Ok(false);
        };

        self.repository.remove_favorite(&stored.name)?;
        self.favorite_tx.send_replace(false);
        Ok(true)
    }
}
