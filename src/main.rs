mod cli;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::Parser;
use cli::{Args, Command, PlaceArgs, SettingsAction};
use nebokrug::ai::server::{self, GeminiModel};
use nebokrug::ai::RecommendationClient;
use nebokrug::history::{CollectionRequest, HistoryCollector, HistoryJob, JobState};
use nebokrug::models::location::validate_coordinates;
use nebokrug::provider::DateRange;
use nebokrug::{
    AppConfig, ArchiveCache, Geocoder, Location, NeboKrugError, OpenMeteoClient, Settings,
    SettingsStore, UnitSelection, WeatherProvider, logging,
};
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match AppConfig::load_from_path(args.config.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    logging::init(&config.logging, args.verbose);

    match run(args, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            let message = e
                .downcast_ref::<NeboKrugError>()
                .map_or_else(|| format!("{e:#}"), NeboKrugError::user_message);
            eprintln!("Error: {message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args, mut config: AppConfig) -> Result<()> {
    let store = match &args.settings {
        Some(path) => SettingsStore::new(path),
        None => SettingsStore::default_location()?,
    };

    match args.command {
        Command::History {
            place,
            start_year,
            json,
        } => {
            if let Some(year) = start_year {
                config.history.start_year = year;
                config.validate()?;
            }
            history(&config, &store, &place, json, args.verbose).await
        }
        Command::Daily { place, from, to } => daily(&config, &store, &place, from, to).await,
        Command::Search { name } => search(&config, &name).await,
        Command::Current { place } => current(&config, &store, &place).await,
        Command::Recommend { place, locale } => recommend(&config, &store, &place, locale).await,
        Command::Settings { action } => settings(&config, &store, action).await,
        Command::ServeAi { host, port } => serve_ai(&config, SocketAddr::new(host, port)).await,
    }
}

fn weather_client(config: &AppConfig) -> Result<OpenMeteoClient> {
    let client = OpenMeteoClient::new(&config.weather)?;
    if !config.cache.enabled {
        return Ok(client);
    }
    let Some(dir) = config.cache_dir() else {
        warn!("No cache directory available, archive cache disabled");
        return Ok(client);
    };
    let ttl = Duration::from_secs(u64::from(config.cache.ttl_hours) * 3600);
    match ArchiveCache::open(&dir, ttl) {
        Ok(cache) => Ok(client.with_cache(cache)),
        Err(e) => {
            warn!("Archive cache disabled: {}", e);
            Ok(client)
        }
    }
}

/// Coordinates, then a saved or geocoded name, then the first saved location
async fn resolve_place(
    place: &PlaceArgs,
    settings: &Settings,
    geocoder: &dyn Geocoder,
) -> Result<Location> {
    if let (Some(latitude), Some(longitude)) = (place.latitude, place.longitude) {
        validate_coordinates(latitude, longitude)?;
        let name = format!("{latitude:.4}, {longitude:.4}");
        return Ok(Location::new(name, String::new(), latitude, longitude));
    }

    if let Some(name) = &place.location {
        if let Some(saved) = settings.find_location(name) {
            return Ok(saved.clone());
        }
        let found = geocoder.search(name).await?;
        return found
            .into_iter()
            .next()
            .map(Location::from)
            .with_context(|| format!("No place called '{name}' was found"));
    }

    settings.locations.first().cloned().context(
        "No location given. Use --location, --latitude/--longitude or `nebokrug settings add-location`.",
    )
}

async fn history(
    config: &AppConfig,
    store: &SettingsStore,
    place: &PlaceArgs,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let settings = store.load()?;
    let client = Arc::new(weather_client(config)?);
    let location = resolve_place(place, &settings, client.as_ref()).await?;

    let collector = HistoryCollector::new(client, &config.history);
    let request = CollectionRequest::new(location.latitude, location.longitude, settings.units());
    let job = HistoryJob::spawn(collector, request);

    eprint!(
        "Comparing today in {location} with every year since {}",
        config.history.start_year
    );
    let mut updates = job.subscribe();
    let mut ticker = tokio::time::interval(Duration::from_millis(500));
    loop {
        tokio::select! {
            _ = ticker.tick() => eprint!("."),
            changed = updates.changed() => {
                if changed.is_err() || job.state().is_finished() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => job.cancel(),
        }
    }
    eprintln!();

    match job.wait().await {
        JobState::Ready(outcome) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome.report)?);
            } else {
                println!("{}", outcome.report);
            }
            if !outcome.warnings.is_empty() {
                eprintln!(
                    "\nNote: {} years were left out of the comparison.",
                    outcome.warnings.len()
                );
                if verbose {
                    for warning in &outcome.warnings {
                        eprintln!("  {warning}");
                    }
                }
            }
            Ok(())
        }
        JobState::Cancelled => {
            eprintln!("Cancelled.");
            Ok(())
        }
        JobState::Failed(message) => bail!(message),
        JobState::Loading => bail!("History comparison did not finish"),
    }
}

async fn daily(
    config: &AppConfig,
    store: &SettingsStore,
    place: &PlaceArgs,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<()> {
    let range = DateRange::new(from, to)?;
    let settings = store.load()?;
    let client = weather_client(config)?;
    let location = resolve_place(place, &settings, &client).await?;
    let units = settings.units();

    let records = client
        .fetch_daily(location.latitude, location.longitude, range, units)
        .await?;
    if records.is_empty() {
        println!("No daily data for {location} in {range}.");
        return Ok(());
    }

    println!("{location}, {range}");
    for record in &records {
        println!("{}", record.table_row(units));
    }
    let missing = (to - from).num_days() + 1 - i64::try_from(records.len())?;
    if missing > 0 {
        eprintln!("Note: {missing} days had no complete data.");
    }
    Ok(())
}

async fn search(config: &AppConfig, name: &str) -> Result<()> {
    let client = OpenMeteoClient::new(&config.weather)?;
    let results = client.search(name).await?;
    if results.is_empty() {
        println!("No places found for '{name}'.");
        return Ok(());
    }
    for result in results {
        let location = Location::from(result);
        println!("{location} ({})", location.format_coordinates());
    }
    Ok(())
}

async fn current(config: &AppConfig, store: &SettingsStore, place: &PlaceArgs) -> Result<()> {
    let settings = store.load()?;
    let client = weather_client(config)?;
    let location = resolve_place(place, &settings, &client).await?;
    let units = settings.units();

    let now = client
        .fetch_current(location.latitude, location.longitude, units)
        .await?;

    let temperature = units.temperature.symbol();
    let wind = units.wind_speed.symbol();
    let precipitation = units.precipitation.symbol();
    println!("{location} at {}", now.time.format("%Y-%m-%d %H:%M"));
    println!("  Feels like:  {:.1}{temperature}", now.apparent_temperature);
    println!("  Humidity:    {:.0}%", now.relative_humidity);
    println!(
        "  Rain:        {:.1} {precipitation} (showers {:.1} {precipitation})",
        now.rain, now.showers
    );
    println!("  Snowfall:    {:.1} {precipitation}", now.snowfall);
    println!(
        "  Wind:        {:.1} {wind}, gusts {:.1} {wind}",
        now.wind_speed, now.wind_gusts
    );
    Ok(())
}

async fn recommend(
    config: &AppConfig,
    store: &SettingsStore,
    place: &PlaceArgs,
    locale: Option<nebokrug::Locale>,
) -> Result<()> {
    let settings = store.load()?;
    let client = weather_client(config)?;
    let location = resolve_place(place, &settings, &client).await?;

    // the prompt describes values in celsius, m/s and mm
    let conditions = client
        .fetch_current(location.latitude, location.longitude, UnitSelection::default())
        .await?;

    let ai = RecommendationClient::new(&config.ai)?;
    let advice = ai
        .recommend_clothing(locale.unwrap_or(settings.locale), &conditions)
        .await?;
    println!("{advice}");
    Ok(())
}

async fn settings(config: &AppConfig, store: &SettingsStore, action: SettingsAction) -> Result<()> {
    let mut settings = store.load()?;

    match action {
        SettingsAction::Show => {
            println!("Settings file: {}", store.path().display());
            println!("Temperature:   {}", settings.temperature_unit.label());
            println!("Wind speed:    {}", settings.wind_speed_unit.label());
            println!("Precipitation: {}", settings.precipitation_unit.label());
            println!("Locale:        {}", settings.locale);
            if settings.locations.is_empty() {
                println!("Locations:     none");
            } else {
                println!("Locations:");
                for location in &settings.locations {
                    println!("  {location} ({})", location.format_coordinates());
                }
            }
            return Ok(());
        }
        SettingsAction::Units {
            temperature,
            wind,
            precipitation,
        } => {
            let current = settings.units();
            let (units, invalid) = UnitSelection::from_labels_strict(
                temperature.as_deref().unwrap_or(current.temperature.label()),
                wind.as_deref().unwrap_or(current.wind_speed.label()),
                precipitation
                    .as_deref()
                    .unwrap_or(current.precipitation.label()),
            );
            if let Some(first) = invalid.first() {
                bail!("{first}. Settings were not changed.");
            }
            settings.set_units(units);
        }
        SettingsAction::AddLocation { name } => {
            let client = OpenMeteoClient::new(&config.weather)?;
            let location = client
                .search(&name)
                .await?
                .into_iter()
                .next()
                .map(Location::from)
                .with_context(|| format!("No place called '{name}' was found"))?;
            println!("Saved {location}");
            settings.locations.push(location);
        }
        SettingsAction::RemoveLocation { name } => {
            let before = settings.locations.len();
            settings
                .locations
                .retain(|l| !l.name.eq_ignore_ascii_case(name.trim()));
            if settings.locations.len() == before {
                bail!("No saved location called '{name}'");
            }
        }
        SettingsAction::Locale { locale } => settings.locale = locale,
    }

    store.save(&settings)?;
    Ok(())
}

async fn serve_ai(config: &AppConfig, addr: SocketAddr) -> Result<()> {
    let model = GeminiModel::new(&config.ai)?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    server::serve(listener, Arc::new(model), async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for shutdown signal: {}", e);
        }
    })
    .await?;
    Ok(())
}
