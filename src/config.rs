//! CLI configuration

use std::path::PathBuf;

use clap::{Args, Parser};
use rust_decimal::Decimal;

use crate::pricing::{
    DEFAULT_MINIMUM_ORDER_UNITS, DEFAULT_NEAR_UPGRADE_FLOOR, PricingConfig, PricingError,
};

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Pricing rule settings.
#[derive(Debug, Args)]
pub struct PricingArgs {
    /// Minimum units across the cart before checkout is allowed
    #[arg(
        long,
        env = "WHOLESALE_MINIMUM_ORDER_UNITS",
        default_value_t = DEFAULT_MINIMUM_ORDER_UNITS
    )]
    pub minimum_order_units: u32,

    /// Fraction of a tier threshold at which upgrade hints are shown
    #[arg(
        long,
        env = "WHOLESALE_NEAR_UPGRADE_FLOOR",
        default_value_t = DEFAULT_NEAR_UPGRADE_FLOOR
    )]
    pub near_upgrade_floor: Decimal,
}

impl PricingArgs {
    /// Validate into a [`PricingConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidNearUpgradeFloor`] if the floor is out of range.
    pub fn pricing_config(&self) -> Result<PricingConfig, PricingError> {
        PricingConfig::new(self.minimum_order_units, self.near_upgrade_floor)
    }
}

/// Wholesale cart pricing CLI configuration
#[derive(Debug, Parser)]
#[command(name = "wholesale", about = "Price a wholesale cart fixture", long_about = None)]
pub struct CliConfig {
    /// Fixture base directory
    #[arg(long, env = "WHOLESALE_FIXTURES", default_value = "./fixtures")]
    pub fixtures: PathBuf,

    /// Fixture set to load
    #[arg(short, long, default_value = "accessories")]
    pub set: String,

    /// Commit the cart as an order after printing the summary
    #[arg(long)]
    pub place_order: bool,

    /// Pricing rules.
    #[command(flatten)]
    pub pricing: PricingArgs,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl CliConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}
