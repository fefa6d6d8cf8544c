//! parkctl - command-line front end for parkwise
//!
//! Wires together:
//! - Configuration loading
//! - Store initialization
//! - The parking service
//!
//! Results are printed as pretty JSON on stdout; logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use parkwise_api::{
    EntryRequest, GuardStatus, GuardUpdate, NewGuard, PricingUpdate, Shift, VehicleCategory,
    VehicleDetails, VehicleFilter, VehicleStatus,
};
use parkwise_config::{load_config, FacilityConfig};
use parkwise_core::ParkingService;
use parkwise_store::{AuditEvent, AuditEventType, SqliteStore, Store};
use parkwise_util::{default_config_path, GuardId, VehicleId, DATABASE_FILENAME};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// parkctl - Parking facility entry, exit and billing
#[derive(Parser, Debug)]
#[command(name = "parkctl")]
#[command(about = "Parking facility entry, exit and billing", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/parkwise/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Data directory override (or set PARKWISE_DATA_DIR env var)
    #[arg(short, long, env = "PARKWISE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Admit a vehicle
    Entry {
        vehicle_number: String,

        /// two_wheeler, three_wheeler or four_wheeler
        #[arg(short = 't', long = "type")]
        vehicle_type: VehicleCategory,

        /// ID of the guard on duty
        #[arg(short, long)]
        guard: String,

        #[arg(long)]
        spot: Option<String>,

        #[arg(long)]
        color: Option<String>,

        #[arg(long)]
        brand: Option<String>,
    },

    /// Bill a parked vehicle and check it out
    Exit { vehicle_number: String },

    /// Show the current stay of a plate
    Lookup { vehicle_number: String },

    /// Sell a prepaid pass to a vehicle, parked or not
    Pass {
        vehicle_number: String,

        #[arg(short, long)]
        months: u32,

        /// Price per month
        #[arg(short, long)]
        rate: u64,
    },

    /// List vehicle records
    Vehicles {
        #[arg(long)]
        status: Option<VehicleStatus>,

        #[arg(short = 't', long = "type")]
        vehicle_type: Option<VehicleCategory>,

        #[arg(long)]
        number: Option<String>,

        #[arg(long)]
        guard: Option<String>,
    },

    /// Bills, passes and audit events of one stay
    History { vehicle_id: String },

    /// Manage guard accounts
    Guards {
        #[command(subcommand)]
        command: GuardCommand,
    },

    /// Show or change day rates
    Pricing {
        #[command(subcommand)]
        command: PricingCommand,
    },

    /// Dashboard summary
    Stats,

    /// Latest audit events
    Activity {
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },
}

#[derive(Subcommand, Debug)]
enum GuardCommand {
    List,

    Add {
        name: String,
        email: String,

        #[arg(short, long)]
        shift: Shift,

        #[arg(long)]
        inactive: bool,
    },

    Update {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        shift: Option<Shift>,

        #[arg(long)]
        status: Option<GuardStatus>,
    },

    Remove { id: String },
}

#[derive(Subcommand, Debug)]
enum PricingCommand {
    Show,

    Set {
        #[arg(long)]
        two_wheeler: Option<u64>,

        #[arg(long)]
        three_wheeler: Option<u64>,

        #[arg(long)]
        four_wheeler: Option<u64>,
    },
}

fn init_logging(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    if args.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Load the config file, falling back to defaults when it does not exist
fn load_facility_config(args: &Args) -> Result<FacilityConfig> {
    if !args.config.exists() {
        warn!(
            config_path = %args.config.display(),
            "Config file not found, using defaults"
        );
        return Ok(FacilityConfig::default());
    }

    let config = load_config(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;

    info!(
        config_path = %args.config.display(),
        guard_count = config.guards.len(),
        "Configuration loaded"
    );

    Ok(config)
}

fn open_service(args: &Args) -> Result<ParkingService> {
    let config = load_facility_config(args)?;

    let data_dir = args
        .data_dir
        .clone()
        .unwrap_or_else(|| config.facility.data_dir.clone());

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

    let db_path = data_dir.join(DATABASE_FILENAME);
    let store: Arc<dyn Store> = Arc::new(
        SqliteStore::open(&db_path)
            .with_context(|| format!("Failed to open database {:?}", db_path))?,
    );

    debug!(db_path = %db_path.display(), "Store initialized");

    let now = parkwise_util::now();
    store.append_audit(AuditEvent::new(AuditEventType::ServiceStarted, now))?;

    ParkingService::from_config(&config, store, now).context("Failed to initialize parking service")
}

fn to_json<T: Serialize>(value: &T) -> parkwise_api::Result<Value> {
    serde_json::to_value(value).map_err(|e| parkwise_api::ParkingError::internal(e.to_string()))
}

/// Run one command. Domain failures are returned as `ParkingError` so they
/// can be printed as structured output.
fn execute(service: &ParkingService, command: Command) -> parkwise_api::Result<Value> {
    let now = parkwise_util::now();

    match command {
        Command::Entry {
            vehicle_number,
            vehicle_type,
            guard,
            spot,
            color,
            brand,
        } => {
            let request = EntryRequest {
                vehicle_number,
                vehicle_type,
                guard_id: GuardId::new(guard),
                details: VehicleDetails {
                    parking_spot: spot,
                    color,
                    brand,
                },
            };
            to_json(&service.register_entry(request, now)?)
        }

        Command::Exit { vehicle_number } => {
            let vehicle = service.find_active_vehicle(&vehicle_number)?;
            to_json(&service.process_exit(&vehicle.id, now)?)
        }

        Command::Lookup { vehicle_number } => {
            to_json(&service.find_active_vehicle(&vehicle_number)?)
        }

        Command::Pass {
            vehicle_number,
            months,
            rate,
        } => {
            let vehicle = service.find_latest_vehicle(&vehicle_number)?;
            to_json(&service.create_parking_pass(&vehicle.id, months, rate, now)?)
        }

        Command::Vehicles {
            status,
            vehicle_type,
            number,
            guard,
        } => {
            let filter = VehicleFilter {
                status,
                vehicle_type,
                vehicle_number: number,
                guard_id: guard.map(GuardId::new),
            };
            to_json(&service.vehicles(&filter)?)
        }

        Command::History { vehicle_id } => {
            to_json(&service.vehicle_history(&VehicleId::new(vehicle_id))?)
        }

        Command::Guards { command } => match command {
            GuardCommand::List => to_json(&service.list_guards()?),
            GuardCommand::Add {
                name,
                email,
                shift,
                inactive,
            } => {
                let status = if inactive {
                    GuardStatus::Inactive
                } else {
                    GuardStatus::Active
                };
                let new_guard = NewGuard {
                    name,
                    email,
                    shift,
                    status,
                };
                to_json(&service.create_guard(new_guard, now)?)
            }
            GuardCommand::Update {
                id,
                name,
                email,
                shift,
                status,
            } => {
                let update = GuardUpdate {
                    name,
                    email,
                    shift,
                    status,
                };
                to_json(&service.update_guard(&GuardId::new(id), &update, now)?)
            }
            GuardCommand::Remove { id } => {
                let id = GuardId::new(id);
                service.delete_guard(&id, now)?;
                Ok(serde_json::json!({ "deleted": id }))
            }
        },

        Command::Pricing { command } => match command {
            PricingCommand::Show => to_json(&service.pricing()?),
            PricingCommand::Set {
                two_wheeler,
                three_wheeler,
                four_wheeler,
            } => {
                let update = PricingUpdate {
                    two_wheeler,
                    three_wheeler,
                    four_wheeler,
                };
                to_json(&service.update_pricing(&update, now)?)
            }
        },

        Command::Stats => to_json(&service.dashboard_stats(now)?),

        Command::Activity { limit } => to_json(&service.recent_activity(limit)?),
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(&args);

    debug!(
        version = env!("CARGO_PKG_VERSION"),
        mock_time = parkwise_util::is_mock_time_active(),
        "parkctl starting"
    );

    let service = open_service(&args)?;

    match execute(&service, args.command) {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            if e.is_validation() {
                debug!(error = %e, "Request rejected");
            } else {
                warn!(error = %e, "Request failed");
            }
            println!("{}", serde_json::to_string_pretty(&e.to_info())?);
            Ok(ExitCode::FAILURE)
        }
    }
}
