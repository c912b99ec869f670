//! Wholesale cart pricing CLI
//!
//! Loads a fixture set, prints the priced cart and optionally commits it as an order.

use std::{
    io::{self, Write},
    process::ExitCode,
};

use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::util::TryInitError;

use wholesale::{
    config::CliConfig,
    fixtures::{Fixture, FixtureError},
    observability::init_logging,
    orders::{OrderError, OrderRequest, place_order},
    pricing::{PricingCalculator, PricingError},
    receipt::{CartSummary, ReceiptError},
};

/// CLI failures
#[derive(Debug, Error)]
enum CliError {
    #[error("failed to initialise logging: {0}")]
    Logging(#[from] TryInitError),

    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

fn main() -> ExitCode {
    let config = CliConfig::load().unwrap_or_else(|err| err.exit());

    if let Err(source) = init_logging(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized, must use eprintln for setup errors"
        )]
        {
            eprintln!("{}", CliError::from(source));
        }

        return ExitCode::FAILURE;
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(source) => {
            error!("{source}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &CliConfig) -> Result<(), CliError> {
    let calculator = PricingCalculator::new(config.pricing.pricing_config()?);

    let fixture = Fixture::from_set_in(&config.fixtures, &config.set)?;
    let catalog = fixture.catalog();
    let cart = fixture.cart()?;

    info!(
        set = %config.set,
        products = catalog.len(),
        lines = cart.len(),
        "loaded fixture set"
    );

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    CartSummary::build(&cart, &calculator)?.write_to(&mut handle, catalog)?;

    if config.place_order {
        let request = OrderRequest::from_cart(&cart, catalog, &calculator)?;
        let order = place_order(catalog, &request, &calculator)?;

        writeln!(
            handle,
            " Order committed: {} lines, {} units, {} charged",
            order.lines().len(),
            order.item_count(),
            order.subtotal()
        )?;

        info!(
            subtotal = %order.subtotal(),
            savings = %order.savings(),
            units = order.item_count(),
            "order committed"
        );
    }

    Ok(())
}
