use clap::builder::{Styles, styling::AnsiColor};
use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand};
use nebokrug::Locale;
use std::net::IpAddr;
use std::path::PathBuf;

const ABOUT: &str = "This-day-in-history weather comparison";

const LONG_ABOUT: &str = "
Compares today's weather at a place with the same calendar day in every year since the
configured start year, using the Open-Meteo forecast and archive APIs.

Places can be given by name (saved locations are matched first, then looked up with the
geocoder), by coordinates, or left out to use the first saved location. Units and saved
locations live in the settings file shared with the desktop app.
";

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default())
    .usage(AnsiColor::Green.on_default())
    .literal(AnsiColor::Green.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(Parser, Debug)]
#[command(name = "nebokrug", version, styles = STYLES, about = ABOUT, long_about = LONG_ABOUT)]
pub struct Args {
    /// Configuration file (defaults to the platform config dir)
    #[arg(long, global = true, env = "NEBOKRUG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Settings file (defaults to the platform config dir)
    #[arg(long, global = true, env = "NEBOKRUG_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct PlaceArgs {
    /// Saved location or place name
    #[arg(short, long, conflicts_with_all = ["latitude", "longitude"])]
    pub location: Option<String>,

    #[arg(long, requires = "longitude", allow_hyphen_values = true)]
    pub latitude: Option<f64>,

    #[arg(long, requires = "latitude", allow_hyphen_values = true)]
    pub longitude: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compare today's weather with the same day in past years
    History {
        #[command(flatten)]
        place: PlaceArgs,

        /// First year to compare against
        #[arg(long)]
        start_year: Option<i32>,

        /// Print the structured report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Daily aggregates over a date range, one row per day
    ///
    /// Past ranges come from the archive, recent and future ones from the forecast.
    Daily {
        #[command(flatten)]
        place: PlaceArgs,

        /// First day (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,

        /// Last day, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
    },

    /// Look up places by name
    Search { name: String },

    /// Show current conditions
    Current {
        #[command(flatten)]
        place: PlaceArgs,
    },

    /// Ask the AI service what to wear today
    Recommend {
        #[command(flatten)]
        place: PlaceArgs,

        /// Answer language (en or ua), defaults to the saved locale
        #[arg(long)]
        locale: Option<Locale>,
    },

    /// Show or change saved settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Run the AI companion service
    ServeAi {
        #[arg(long, default_value = "0.0.0.0")]
        host: IpAddr,

        #[arg(short, long, default_value_t = 8080)]
        port: u16,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    Show,

    /// Change units using their labels, e.g. "Fahrenheit °F", "Km/h", "Inch"
    Units {
        #[arg(long)]
        temperature: Option<String>,
        #[arg(long)]
        wind: Option<String>,
        #[arg(long)]
        precipitation: Option<String>,
    },

    /// Look up a place and save it
    AddLocation { name: String },

    RemoveLocation { name: String },

    Locale { locale: Locale },
}
