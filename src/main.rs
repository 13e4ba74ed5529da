mod cli;
mod config;
mod db;
mod error;
mod logic;
mod models;
mod providers;
mod reference;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{
    CatalogCommand, Cli, Commands, CropArgs, DiseaseArgs, FertilizerArgs, HistoryArgs, SensorArgs,
};
use config::Config;
use db::Database;
use logic::{AdvisoryGateway, DiseaseClassifier, SensorSimulator};
use models::{
    CropRequest, DiseaseRequest, FertilizerRequest, Language, Npk, Prediction, PredictionKind,
    PredictionRecord, Scored, SensorReading, SoilClimateSample,
};
use providers::ProviderRegistry;
use reference::ReferenceData;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Commands::Init = cli.command {
        let (config, path) = Config::setup_interactive().context("Setup failed")?;
        let registry = ProviderRegistry::from_config(&config.providers)?;
        println!(
            "Wrote {} ({} provider(s) usable)",
            path.display(),
            registry.len()
        );
        return Ok(());
    }

    let Cli {
        command,
        config: config_path,
        data_dir,
        farmer,
        ..
    } = cli;
    let data_dir = data_dir.as_ref();

    let config = Config::load(config_path).context("Failed to load configuration")?;
    let reference = ReferenceData::builtin().context("Built-in reference data is invalid")?;
    let farmer = farmer.unwrap_or_else(|| config.farmer.clone());

    match command {
        Commands::Crop(args) => {
            let (gateway, db) = open_services(data_dir, &config, reference)?;
            run_crop(&gateway, &db, &farmer, args).await
        }
        Commands::Fertilizer(args) => {
            let (gateway, db) = open_services(data_dir, &config, reference)?;
            run_fertilizer(&gateway, &db, &farmer, args).await
        }
        Commands::Disease(args) => {
            let (gateway, db) = open_services(data_dir, &config, reference)?;
            run_disease(&gateway, &db, &farmer, args).await
        }
        Commands::History(args) => run_history(&open_db(data_dir)?, &farmer, args),
        Commands::Sensor(args) => run_sensor(&open_db(data_dir)?, &config, args).await,
        Commands::Catalog(command) => run_catalog(&reference, command),
        Commands::Check => run_check(data_dir, &config, &reference),
        Commands::Init => Ok(()),
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };

    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn open_db(data_dir: Option<&PathBuf>) -> Result<Database> {
    let path = Config::db_path(data_dir)?;
    let db = Database::open(&path)
        .with_context(|| format!("Failed to open database at {}", path.display()))?;
    tracing::debug!(path = %db.path().display(), "Using database");
    Ok(db)
}

fn open_services(
    data_dir: Option<&PathBuf>,
    config: &Config,
    reference: Arc<ReferenceData>,
) -> Result<(AdvisoryGateway, Database)> {
    let registry = ProviderRegistry::from_config(&config.providers)
        .context("Failed to build provider clients")?;
    let gateway = AdvisoryGateway::new(Arc::new(registry), reference);
    tracing::debug!(providers = ?gateway.registry().kinds(), "Gateway ready");
    Ok((gateway, open_db(data_dir)?))
}

/// Prediction as printed, with the history id it was filed under.
#[derive(Serialize)]
struct Filed<'a, T> {
    id: i64,
    #[serde(flatten)]
    prediction: &'a Prediction<T>,
}

fn file_and_print<I, T>(
    db: &Database,
    farmer: &str,
    kind: PredictionKind,
    input: &I,
    prediction: &Prediction<T>,
) -> Result<()>
where
    I: Serialize,
    T: Serialize + Scored,
{
    let record = PredictionRecord::new(farmer, kind, input, prediction)?;
    let id = db
        .record_prediction(&record)
        .context("Failed to save prediction")?;
    tracing::info!(id, kind = %kind, model = %prediction.model_used, "Prediction saved");

    println!("{}", serde_json::to_string_pretty(&Filed { id, prediction })?);
    Ok(())
}

async fn run_crop(
    gateway: &AdvisoryGateway,
    db: &Database,
    farmer: &str,
    args: CropArgs,
) -> Result<()> {
    let request = CropRequest {
        sample: SoilClimateSample {
            nitrogen: args.nitrogen,
            phosphorus: args.phosphorus,
            potassium: args.potassium,
            temperature: args.temperature,
            humidity: args.humidity,
            ph: args.ph,
            rainfall: args.rainfall,
        },
        language: Language::from_code(&args.language),
        location: args.location,
        latitude: args.lat,
        longitude: args.lon,
    };
    request.validate().context("Invalid crop input")?;

    let prediction = gateway.predict_crop(&request).await;
    file_and_print(db, farmer, PredictionKind::Crop, &request, &prediction)
}

async fn run_fertilizer(
    gateway: &AdvisoryGateway,
    db: &Database,
    farmer: &str,
    args: FertilizerArgs,
) -> Result<()> {
    let request = FertilizerRequest {
        crop_type: args.crop,
        soil_type: args.soil,
        current_npk: Npk::new(args.nitrogen, args.phosphorus, args.potassium),
        soil_ph: args.ph,
        moisture: args.moisture,
        language: Language::from_code(&args.language),
    };
    request.validate().context("Invalid fertilizer input")?;

    let prediction = gateway.recommend_fertilizer(&request).await;
    file_and_print(db, farmer, PredictionKind::Fertilizer, &request, &prediction)
}

async fn run_disease(
    gateway: &AdvisoryGateway,
    db: &Database,
    farmer: &str,
    args: DiseaseArgs,
) -> Result<()> {
    let request = DiseaseRequest {
        crop_type: args.crop,
        symptoms: args.symptoms,
        language: Language::from_code(&args.language),
    };
    request.validate().context("Invalid disease input")?;

    let prediction = gateway.diagnose_disease(&request).await;
    file_and_print(db, farmer, PredictionKind::Disease, &request, &prediction)
}

fn run_history(db: &Database, farmer: &str, args: HistoryArgs) -> Result<()> {
    if args.summary {
        let summary = db.prediction_summary(farmer)?;
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if let Some(id) = args.id {
        let record = db
            .get_prediction(farmer, id)
            .with_context(|| format!("No prediction {} for farmer '{}'", id, farmer))?;
        let detail = serde_json::json!({
            "id": record.id,
            "type": record.kind,
            "model_used": record.model_used,
            "confidence": record.confidence,
            "created_at": record.created_at,
            "input": serde_json::from_str::<serde_json::Value>(&record.input_data)?,
            "output": serde_json::from_str::<serde_json::Value>(&record.output_data)?,
        });
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    let kind = match args.kind.as_deref() {
        Some(s) => match PredictionKind::from_str(s) {
            Some(k) => Some(k),
            None => bail!("Unknown prediction type '{}' (expected crop, fertilizer or disease)", s),
        },
        None => None,
    };

    let records = db.list_predictions(farmer, kind, args.limit)?;
    if records.is_empty() {
        println!("No predictions for '{}'", farmer);
        return Ok(());
    }

    println!(
        "{:>5}  {:<20}  {:<10}  {:>10}  MODEL",
        "ID", "CREATED", "TYPE", "CONFIDENCE"
    );
    for record in records {
        let confidence = record
            .confidence
            .map(|c| format!("{:.2}", c))
            .unwrap_or_else(|| "-".into());
        println!(
            "{:>5}  {:<20}  {:<10}  {:>10}  {}",
            record.id.unwrap_or_default(),
            record.created_at.format("%Y-%m-%d %H:%M:%S"),
            record.kind,
            confidence,
            record.model_used
        );
    }
    Ok(())
}

async fn run_sensor(db: &Database, config: &Config, args: SensorArgs) -> Result<()> {
    if args.stats {
        let stats = db.sensor_stats()?;
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    if args.recent {
        for reading in db.recent_sensor_readings(args.limit)? {
            println!("{}", serde_json::to_string(&reading)?);
        }
        return Ok(());
    }

    let simulator = SensorSimulator::new(config.sensor.location.clone());
    let take = |sim: &SensorSimulator| -> Result<SensorReading> {
        let reading = match args.hour {
            Some(hour) => sim.reading_at_hour(hour),
            None => sim.reading(),
        };
        db.record_sensor_reading(&reading)
            .context("Failed to save sensor reading")?;
        Ok(reading)
    };

    let Some(count) = args.watch else {
        println!("{}", serde_json::to_string_pretty(&take(&simulator)?)?);
        return Ok(());
    };

    let mut interval =
        tokio::time::interval(Duration::from_secs(config.sensor.update_interval_secs));
    for _ in 0..count {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
        println!("{}", serde_json::to_string(&take(&simulator)?)?);
    }
    Ok(())
}

fn run_catalog(reference: &Arc<ReferenceData>, command: CatalogCommand) -> Result<()> {
    let json = match command {
        CatalogCommand::Crops => serde_json::to_string_pretty(reference.crops())?,
        CatalogCommand::Fertilizers => serde_json::to_string_pretty(reference.fertilizers())?,
        CatalogCommand::SoilTypes => serde_json::to_string_pretty(crate::reference::crops::SOIL_TYPES)?,
        CatalogCommand::Diseases { crop } => {
            let diseases = reference.common_diseases_for(&crop);
            if diseases.is_empty() {
                bail!("No disease catalogue for '{}'", crop);
            }
            serde_json::to_string_pretty(diseases)?
        }
        CatalogCommand::Rules => {
            let classifier = DiseaseClassifier::new(reference.clone());
            for (disease, keywords) in classifier.list_rules() {
                println!("{:<40} {}", disease, keywords.join(", "));
            }
            println!(
                "{:<40} (no keyword matched)",
                reference.default_disease().disease_name
            );
            return Ok(());
        }
    };
    println!("{}", json);
    Ok(())
}

fn run_check(data_dir: Option<&PathBuf>, config: &Config, reference: &ReferenceData) -> Result<()> {
    let registry = ProviderRegistry::from_config(&config.providers)
        .context("Failed to build provider clients")?;
    let db_path = Config::db_path(data_dir)?;

    println!("Farmer:    {}", config.farmer);
    println!("Database:  {}", db_path.display());
    println!(
        "Sensor:    {} (every {}s)",
        config.sensor.location, config.sensor.update_interval_secs
    );
    println!("Timeout:   {}s", config.providers.timeout_secs);
    println!();

    if registry.is_empty() {
        println!("Providers: none usable, rule-based engines will answer");
    } else {
        println!("Providers (in call order):");
        for (i, provider) in registry.iter().enumerate() {
            println!("  {}. {}", i + 1, provider.label());
        }
    }
    println!();
    println!(
        "Reference data: {} crops, {} fertilizers, {} disease rules",
        reference.crops().len(),
        reference.fertilizers().len(),
        reference.disease_rules().len()
    );
    tracing::debug!(?config, "Effective configuration");
    Ok(())
}
