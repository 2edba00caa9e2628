use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use waqi::{
    AirQuality, Pollutant, SearchResult, Series, WaqiClient, WaqiConfig, WaqiError, logging,
};

/// Air quality readings from the World Air Quality Index feed
#[derive(Parser, Debug)]
#[command(name = "waqi", version, about)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Feed of a city
    City { name: String },
    /// Feed of a station, by name or by number
    Station { station: String },
    /// Feed of the station nearest to a position
    Geo {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },
    /// Feed of the station nearest to this machine
    Here,
    /// Search stations by keyword
    Search { keyword: String },
    /// Convert an AQI value into a concentration, offline
    Convert { series: Series, index: f64 },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err, verbose),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = WaqiConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    logging::init(&config.logging)?;

    let client = || WaqiClient::new(&config.api);
    match cli.command {
        Commands::Convert { series, index } => {
            let concentration = waqi::convert(series, index)?;
            println!("{series} at AQI {index}: {concentration} {}", series.unit());
        }
        Commands::City { name } => print_air_quality(&client()?.get_by_city(&name).await?),
        Commands::Station { station } => {
            let client = client()?;
            let record = match station.parse::<i64>() {
                Ok(number) => client.get_by_station_number(number).await?,
                Err(_) => client.get_by_name(&station).await?,
            };
            print_air_quality(&record);
        }
        Commands::Geo {
            latitude,
            longitude,
        } => print_air_quality(&client()?.get_by_coordinates(latitude, longitude).await?),
        Commands::Here => print_air_quality(&client()?.get_by_ip().await?),
        Commands::Search { keyword } => {
            let results = client()?
                .search(&keyword)
                .await
                .with_context(|| format!("Search for '{keyword}' failed"))?;
            print_search_results(&results);
        }
    }

    Ok(())
}

/// Print a failure for humans; feed errors exit with status 2.
fn report(err: &anyhow::Error, verbose: bool) -> ExitCode {
    let Some(waqi_error) = err.downcast_ref::<WaqiError>() else {
        eprintln!("Error: {err:#}");
        return ExitCode::FAILURE;
    };

    eprintln!("Error: {}", waqi_error.user_message());
    if verbose {
        eprintln!("  {err:#}");
    }

    if waqi_error.is_feed_error() {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}

fn print_air_quality(record: &AirQuality) {
    let city = &record.city;
    println!("{} (station {})", city.location.name, record.station_id);
    println!("  {}", city.location.coordinates.format());
    match record.air_quality_index {
        Some(aqi) => println!("  AQI: {aqi}"),
        None => println!("  AQI: no data"),
    }
    if let Some(pollutant) = record.dominant_pollutant {
        println!("  Dominant pollutant: {pollutant}");
    }
    if let Some(measured_at) = record.measured_at {
        println!("  Measured at: {}", measured_at.to_rfc3339());
    }

    let extended = &record.extended_air_quality;
    for pollutant in [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::Ozone,
        Pollutant::NitrogenDioxide,
        Pollutant::CarbonMonoxide,
        Pollutant::SulfurDioxide,
    ] {
        let Some(index) = extended.index(pollutant) else {
            continue;
        };
        match (extended.concentration(pollutant), pollutant.series()) {
            (Some(concentration), Some(series)) => println!(
                "  {:<5} {:>6.1}  ({} {})",
                pollutant,
                index,
                concentration,
                series.unit()
            ),
            _ => println!("  {pollutant:<5} {index:>6.1}"),
        }
    }

    for attribution in &record.attributions {
        println!("  Source: {} <{}>", attribution.name, attribution.url);
    }
}

fn print_search_results(results: &[SearchResult]) {
    if results.is_empty() {
        println!("No stations found");
        return;
    }
    for result in results {
        let aqi = result
            .air_quality_index
            .map_or_else(|| "-".to_string(), |aqi| aqi.to_string());
        println!(
            "{:>7}  AQI {:>4}  {}",
            result.station_id, aqi, result.station.name
        );
    }
}
