use checkout::application::checkout::CheckoutService;
use checkout::application::payment::PaymentIntentService;
use checkout::domain::order::TrackingNumber;
use checkout::domain::payment::PaymentInfo;
use checkout::domain::ports::{CustomerStoreBox, PaymentGatewayBox};
use checkout::infrastructure::in_memory::{InMemoryCustomerStore, InMemoryPaymentGateway};
use checkout::infrastructure::stripe::{DEFAULT_API_BASE, StripeConfig, StripeGateway};
use checkout::interfaces::csv::order_writer::OrderWriter;
use checkout::interfaces::json::purchase_reader::PurchaseReader;
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, miette};
use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true, env = "CHECKOUT_DB_PATH")]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Place every purchase in a JSON Lines file and print the tracking numbers as CSV
    PlaceOrders {
        /// Input purchases, one JSON document per line
        input: PathBuf,
    },
    /// Print a CSV summary of every stored customer
    Customers,
    /// Print a placed order as JSON
    Track { tracking_number: TrackingNumber },
    /// Create a payment intent from a JSON payment info document
    PaymentIntent {
        input: PathBuf,

        /// Gateway secret key. Without one, an offline in-memory gateway is used.
        #[arg(long, env = "STRIPE_SECRET_KEY", hide_env_values = true)]
        stripe_secret_key: Option<String>,

        #[arg(long, env = "STRIPE_API_BASE", default_value = DEFAULT_API_BASE)]
        stripe_api_base: String,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

fn open_store(db_path: Option<PathBuf>) -> Result<CustomerStoreBox> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = checkout::infrastructure::rocksdb::RocksDBStore::open(path)
                .into_diagnostic()?;
            Ok(Box::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
            );
            Ok(Box::new(InMemoryCustomerStore::new()))
        }
        None => Ok(Box::new(InMemoryCustomerStore::new())),
    }
}

fn open_gateway(secret_key: Option<String>, api_base: String) -> PaymentGatewayBox {
    match secret_key {
        Some(key) => Box::new(StripeGateway::new(
            StripeConfig::new(key).with_api_base(api_base),
        )),
        None => {
            warn!("No gateway secret key configured. Using the offline in-memory gateway.");
            Box::new(InMemoryPaymentGateway::new())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::PlaceOrders { input } => {
            let service = CheckoutService::new(open_store(cli.db_path)?);
            let file = File::open(input).into_diagnostic()?;
            let reader = PurchaseReader::new(file);

            let stdout = io::stdout();
            let mut writer = OrderWriter::new(stdout.lock());
            for purchase in reader.purchases() {
                match purchase {
                    Ok(purchase) => {
                        let email = purchase.customer.email.clone();
                        match service.place_order(purchase).await {
                            Ok(response) => {
                                writer.write_placement(&email, &response).into_diagnostic()?
                            }
                            Err(e) => error!("Error placing order: {}", e),
                        }
                    }
                    Err(e) => error!("Error reading purchase: {}", e),
                }
            }
            writer.flush().into_diagnostic()?;
        }
        Command::Customers => {
            let service = CheckoutService::new(open_store(cli.db_path)?);
            let customers = service.customers().await.into_diagnostic()?;

            let stdout = io::stdout();
            let mut writer = OrderWriter::new(stdout.lock());
            writer.write_customers(&customers).into_diagnostic()?;
            writer.flush().into_diagnostic()?;
        }
        Command::Track { tracking_number } => {
            let service = CheckoutService::new(open_store(cli.db_path)?);
            let order = service
                .track_order(&tracking_number)
                .await
                .into_diagnostic()?
                .ok_or_else(|| miette!("No order with tracking number {tracking_number}"))?;
            serde_json::to_writer_pretty(io::stdout().lock(), &order).into_diagnostic()?;
            println!();
        }
        Command::PaymentIntent {
            input,
            stripe_secret_key,
            stripe_api_base,
        } => {
            let file = File::open(input).into_diagnostic()?;
            let payment_info: PaymentInfo = serde_json::from_reader(file).into_diagnostic()?;

            let service =
                PaymentIntentService::new(open_gateway(stripe_secret_key, stripe_api_base));
            let intent = service
                .create_payment_intent(payment_info)
                .await
                .into_diagnostic()?;
            serde_json::to_writer_pretty(io::stdout().lock(), intent.as_json())
                .into_diagnostic()?;
            println!();
        }
    }

    Ok(())
}
