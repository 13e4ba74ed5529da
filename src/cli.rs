use crate::db::queries::{DEFAULT_HISTORY_LIMIT, DEFAULT_SENSOR_LIMIT};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "agrisense",
    version,
    about = "Crop, fertilizer and disease advisor with rule-based fallbacks"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override SQLite data directory
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Farmer account to file history under (defaults to config)
    #[arg(short, long, global = true)]
    pub farmer: Option<String>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Recommend a crop for the given soil and climate
    Crop(CropArgs),
    /// Recommend a fertilizer for a crop and soil test
    Fertilizer(FertilizerArgs),
    /// Diagnose a disease from described symptoms
    Disease(DiseaseArgs),
    /// Show past predictions
    History(HistoryArgs),
    /// Read simulated soil sensors
    Sensor(SensorArgs),
    /// Browse reference data
    #[command(subcommand)]
    Catalog(CatalogCommand),
    /// Validate config and show configured providers
    Check,
    /// Re-run interactive setup
    Init,
}

#[derive(Args)]
pub struct CropArgs {
    /// Nitrogen (kg/ha)
    #[arg(short = 'N', long)]
    pub nitrogen: f64,
    /// Phosphorus (kg/ha)
    #[arg(short = 'P', long)]
    pub phosphorus: f64,
    /// Potassium (kg/ha)
    #[arg(short = 'K', long)]
    pub potassium: f64,
    /// Temperature (°C)
    #[arg(long, allow_hyphen_values = true)]
    pub temperature: f64,
    /// Relative humidity (%)
    #[arg(long)]
    pub humidity: f64,
    #[arg(long)]
    pub ph: f64,
    /// Rainfall (mm)
    #[arg(long)]
    pub rainfall: f64,
    /// Response language code (en, hi, ta, ur, ml)
    #[arg(short, long, default_value = "en")]
    pub language: String,
    /// Place name passed to AI providers
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<f64>,
}

#[derive(Args)]
pub struct FertilizerArgs {
    #[arg(long)]
    pub crop: String,
    #[arg(long, default_value = "loamy")]
    pub soil: String,
    /// Current nitrogen
    #[arg(short = 'N', long)]
    pub nitrogen: f64,
    /// Current phosphorus
    #[arg(short = 'P', long)]
    pub phosphorus: f64,
    /// Current potassium
    #[arg(short = 'K', long)]
    pub potassium: f64,
    #[arg(long, default_value_t = 6.5)]
    pub ph: f64,
    /// Soil moisture (%)
    #[arg(long, default_value_t = 50.0)]
    pub moisture: f64,
    #[arg(short, long, default_value = "en")]
    pub language: String,
}

#[derive(Args)]
pub struct DiseaseArgs {
    #[arg(long, default_value = "general")]
    pub crop: String,
    /// Free-text description of what the plant looks like
    #[arg(long)]
    pub symptoms: String,
    #[arg(short, long, default_value = "en")]
    pub language: String,
}

#[derive(Args)]
pub struct HistoryArgs {
    /// Show a single prediction in full
    #[arg(long, conflicts_with = "summary")]
    pub id: Option<i64>,
    /// Show counts instead of records
    #[arg(long)]
    pub summary: bool,
    /// Only show one kind (crop, fertilizer, disease)
    #[arg(short = 't', long = "type")]
    pub kind: Option<String>,
    #[arg(short = 'n', long, default_value_t = DEFAULT_HISTORY_LIMIT)]
    pub limit: usize,
}

#[derive(Args)]
pub struct SensorArgs {
    /// Apply the day-cycle adjustment for this hour (0-23)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..24))]
    pub hour: Option<u32>,
    /// Stream this many readings at the configured interval
    #[arg(short, long, conflicts_with = "stats")]
    pub watch: Option<u32>,
    /// Show aggregate statistics over stored readings
    #[arg(long, conflicts_with = "recent")]
    pub stats: bool,
    /// List stored readings, newest first
    #[arg(long, conflicts_with = "watch")]
    pub recent: bool,
    /// How many stored readings to list
    #[arg(short = 'n', long, default_value_t = DEFAULT_SENSOR_LIMIT, requires = "recent")]
    pub limit: usize,
}

#[derive(Subcommand)]
pub enum CatalogCommand {
    /// Crops and their suitable ranges
    Crops,
    /// Fertilizer products
    Fertilizers,
    /// Soil types
    SoilTypes,
    /// Common diseases for a crop
    Diseases { crop: String },
    /// Keyword rules used by the offline diagnosis
    Rules,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_crop() {
        let cli = Cli::try_parse_from([
            "agrisense", "crop", "-N", "90", "-P", "42", "-K", "43", "--temperature", "25",
            "--humidity", "82", "--ph", "6", "--rainfall", "200", "-l", "ta",
        ])
        .unwrap();
        match cli.command {
            Commands::Crop(args) => {
                assert_eq!(args.nitrogen, 90.0);
                assert_eq!(args.language, "ta");
                assert!(args.location.is_none());
            }
            _ => panic!("expected crop"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["agrisense", "history", "--farmer", "ravi", "-vv"]).unwrap();
        assert_eq!(cli.farmer.as_deref(), Some("ravi"));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_sensor_hour_range() {
        assert!(Cli::try_parse_from(["agrisense", "sensor", "--hour", "24"]).is_err());
        assert!(Cli::try_parse_from(["agrisense", "sensor", "--hour", "23"]).is_ok());
    }

    #[test]
    fn test_sensor_recent_limit() {
        let cli = Cli::try_parse_from(["agrisense", "sensor", "--recent", "-n", "5"]).unwrap();
        match cli.command {
            Commands::Sensor(args) => {
                assert!(args.recent);
                assert_eq!(args.limit, 5);
            }
            _ => panic!("expected sensor"),
        }
        assert!(Cli::try_parse_from(["agrisense", "sensor", "--recent", "--stats"]).is_err());
    }

    #[test]
    fn test_catalog_diseases() {
        let cli = Cli::try_parse_from(["agrisense", "catalog", "diseases", "rice"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Catalog(CatalogCommand::Diseases { ref crop }) if crop == "rice"
        ));
    }
}
