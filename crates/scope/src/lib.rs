//! SwellScope service library
//!
//! Collects hourly marine and atmospheric observations for a single surf
//! spot, stores them in SQLite, and serves a query API, tide passthrough,
//! and dashboard.

pub mod collector;
pub mod db;
pub mod providers;
pub mod routes;
pub mod scheduler;
mod startup;
pub mod templates;
mod utils;

pub use collector::{Collector, CycleError, CycleOutcome};
pub use db::{Database, DailySummary, ObservationRecord, StoreStats};
pub use providers::{
    AtmosphericHourly, MarineHourly, OpenMeteoClient, ProviderData, ProviderError, Site,
    StormglassClient, TideData, TideError, TideExtreme,
};
pub use routes::*;
pub use scheduler::Scheduler;
pub use startup::{app, build_app_state, AppState};
pub use utils::{get_config_info, get_log_level, setup_logger, Cli};

use time::{macros::offset, UtcOffset};

/// Source tag for rows collected from Open-Meteo
pub const SOURCE_OPEN_METEO: &str = "open-meteo";

/// Source tag for synthetic rows created by the debug seed route
pub const SOURCE_SEED: &str = "seed";

/// Source tag attached to tide passthrough items
pub const SOURCE_STORMGLASS: &str = "stormglass";

/// Fixed offset for the site timezone (America/Sao_Paulo, no DST since 2019)
pub const SITE_UTC_OFFSET: UtcOffset = offset!(-3);
