mod open_meteo;
mod stormglass;

pub use open_meteo::{
    parse_hourly_timestamp, AtmosphericHourly, MarineHourly, OpenMeteoClient, ProviderData,
    ProviderError,
};
pub use stormglass::{StormglassClient, TideData, TideError, TideExtreme};

/// The fixed site coordinate every external request is made for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Site {
    pub latitude: f64,
    pub longitude: f64,
}
