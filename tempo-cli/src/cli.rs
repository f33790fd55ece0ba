use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use inquire::{Confirm, InquireError, Password, Text};
use std::sync::Arc;

use tempo_core::{
    Config, FavoriteStore, FetchState, IpLocationProvider, LocationSource, SearchState,
    WeatherApi, WeatherRepository, WeatherResponse, WeatherViewModel,
};

use crate::view;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "tempo", version, about = "Previsão do tempo no terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the WeatherAPI.com key and the default city.
    Configure,

    /// Current conditions for a location (or for wherever you are).
    Now {
        /// City name, or "lat,lon". Defaults to your location.
        location: Option<String>,
    },

    /// Hourly and multi-day forecast.
    Forecast {
        /// City name, or "lat,lon". Defaults to your location.
        location: Option<String>,

        /// Number of forecast days to request.
        #[arg(long)]
        days: Option<u8>,
    },

    /// Search for a city and optionally save it as a favorite.
    Search {
        /// Free-text query, at least 2 characters.
        query: String,
    },

    /// Manage favorite cities.
    Favorites {
        #[command(subcommand)]
        command: FavoritesCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum FavoritesCommand {
    /// List saved cities, newest first.
    List,

    /// Fetch a city and save it.
    Add { location: String },

    /// Remove a saved city by name.
    Remove { name: String },

    /// Show current conditions for a saved city.
    Show { name: String },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            None => home().await,
            Some(Command::Configure) => configure(),
            Some(Command::Now { location }) => now(location).await,
            Some(Command::Forecast { location, days }) => forecast(location, days).await,
            Some(Command::Search { query }) => search(&query).await,
            Some(Command::Favorites { command }) => favorites(command).await,
        }
    }
}

/// Everything a weather-fetching command needs.
struct App {
    config: Config,
    store: Arc<FavoriteStore>,
    vm: WeatherViewModel,
}

fn build_app(days_override: Option<u8>) -> Result<App> {
    let config = Config::load()?;
    let api_key = config.api_key()?.to_string();

    let store = Arc::new(open_store()?);
    let repository =
        WeatherRepository::new(Box::new(WeatherApi::new(api_key)), Arc::clone(&store));

    let vm = WeatherViewModel::new(
        repository,
        Box::new(IpLocationProvider::new()),
        config.default_location().to_string(),
        days_override.unwrap_or_else(|| config.forecast_days()),
    );

    Ok(App { config, store, vm })
}

fn open_store() -> Result<FavoriteStore> {
    Ok(FavoriteStore::open(Config::database_path()?)?)
}

/// Explicit location if given, otherwise the IP lookup, otherwise the
/// configured default city.
async fn resolve_query(config: &Config, explicit: Option<String>) -> String {
    if let Some(q) = explicit {
        return q;
    }

    match IpLocationProvider::new().coordinates().await {
        Some((lat, lon)) => format!("{lat},{lon}"),
        None => {
            tracing::debug!("Location lookup failed, using the default city");
            config.default_location().to_string()
        }
    }
}

/// Default view: locate the user, then current conditions plus forecast,
/// like the app's home screen.
async fn home() -> Result<()> {
    let app = build_app(None)?;

    app.vm.refresh_from_location().await;

    print_current_state(&app.vm.current_state().borrow().clone())?;

    println!();
    match app.vm.forecast_state().borrow().clone() {
        FetchState::Ready(response) => print!("{}", view::render_forecast(&response)),
        FetchState::Failed(msg) => eprintln!("Erro ao obter previsão: {msg}"),
        FetchState::Loading => {}
    }

    if *app.vm.favorite_flag().borrow() {
        println!("★ Esta cidade está nos seus favoritos.");
    }

    Ok(())
}

async fn now(location: Option<String>) -> Result<()> {
    let app = build_app(None)?;
    let query = resolve_query(&app.config, location).await;

    app.vm.load_current(&query).await;
    print_current_state(&app.vm.current_state().borrow().clone())
}

async fn forecast(location: Option<String>, days: Option<u8>) -> Result<()> {
    let app = build_app(days)?;
    let query = resolve_query(&app.config, location).await;

    app.vm.load_forecast(&query).await;

    match app.vm.forecast_state().borrow().clone() {
        FetchState::Ready(response) => {
            println!("{}, {}", response.location.name, response.location.country);
            println!();
            print!("{}", view::render_forecast(&response));
            Ok(())
        }
        FetchState::Failed(msg) => bail!("Erro ao obter previsão: {msg}"),
        FetchState::Loading => Ok(()),
    }
}

async fn search(query: &str) -> Result<()> {
    let app = build_app(None)?;

    app.vm.search(query).await;

    let results = match app.vm.search_state().borrow().clone() {
        SearchState::Idle => {
            println!("Digite pelo menos 2 caracteres para buscar.");
            return Ok(());
        }
        SearchState::Empty => {
            println!("Nenhuma cidade encontrada");
            return Ok(());
        }
        SearchState::Failed(msg) => bail!("Erro na busca: {msg}"),
        SearchState::Ready(results) => results,
        SearchState::Loading => return Ok(()),
    };

    let options: Vec<String> = results.iter().map(view::describe_search_location).collect();
    let picked = match inquire::Select::new("Ver o tempo de qual cidade?", options).raw_prompt() {
        Ok(choice) => choice.index,
        Err(e) if is_cancel(&e) => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    let location = &results[picked];
    app.vm.load_current(&format!("{},{}", location.lat, location.lon)).await;
    print_current_state(&app.vm.current_state().borrow().clone())?;

    if *app.vm.favorite_flag().borrow() {
        println!("★ Esta cidade já está nos seus favoritos.");
        return Ok(());
    }

    match Confirm::new("Salvar esta cidade nos favoritos?").with_default(false).prompt() {
        Ok(true) => {
            if app.vm.add_favorite()? {
                println!("Cidade adicionada aos favoritos.");
            }
        }
        Ok(false) => {}
        Err(e) if is_cancel(&e) => {}
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

async fn favorites(command: FavoritesCommand) -> Result<()> {
    match command {
        FavoritesCommand::List => {
            let store = open_store()?;
            print!("{}", view::render_favorites(&store.list()?));
            Ok(())
        }

        FavoritesCommand::Remove { name } => {
            let store = open_store()?;
            if store.remove(&name)? {
                println!("'{name}' removida dos favoritos.");
            } else {
                println!("'{name}' não estava nos favoritos.");
            }
            Ok(())
        }

        FavoritesCommand::Add { location } => {
            let app = build_app(None)?;

            app.vm.load_current(&location).await;
            print_current_state(&app.vm.current_state().borrow().clone())?;

            if app.vm.add_favorite()? {
                println!("Cidade adicionada aos favoritos.");
            }
            Ok(())
        }

        FavoritesCommand::Show { name } => {
            let app = build_app(None)?;

            let Some(city) = app.store.get(&name)? else {
                bail!("'{name}' não está nos favoritos. Use `tempo favorites list`.");
            };

            app.vm.load_current(&city.query()).await;
            print_current_state(&app.vm.current_state().borrow().clone())
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let key = match Password::new("Chave da API (WeatherAPI.com):")
        .without_confirmation()
        .prompt()
    {
        Ok(key) => key,
        Err(e) if is_cancel(&e) => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    let city = match Text::new("Cidade padrão:")
        .with_default(config.default_location())
        .prompt()
    {
        Ok(city) => city,
        Err(e) if is_cancel(&e) => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    config.set_api_key(key);
    config.set_default_location(city);
    config.save()?;

    println!("Configuração salva em {}", Config::config_file_path()?.display());
    Ok(())
}

fn print_current_state(state: &FetchState<WeatherResponse>) -> Result<()> {
    match state {
        FetchState::Ready(response) => {
            print!("{}", view::render_current(response));
            Ok(())
        }
        FetchState::Failed(msg) => bail!("Erro ao obter clima: {msg}"),
        FetchState::Loading => Ok(()),
    }
}

fn is_cancel(err: &InquireError) -> bool {
    matches!(err, InquireError::OperationCanceled | InquireError::OperationInterrupted)
}
