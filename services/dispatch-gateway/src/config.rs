use lifeline_core::config::DispatchConfig;
use std::env;

/// Service wiring taken from the environment; dispatch tuning comes from
/// the optional `LIFELINE_CONFIG` toml file.
#[derive(Clone)]
pub struct Config {
    pub http_port: u16,
    pub ws_port: u16,
    pub seismic_feed_url: Option<String>,
    pub weather_feed_url: Option<String>,
    pub dispatch: DispatchConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let dispatch = match env::var("LIFELINE_CONFIG") {
            Ok(path) => DispatchConfig::from_file(&path)?,
            Err(_) => DispatchConfig::default_config(),
        };

        Ok(Config {
            http_port: env::var("HTTP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            ws_port: env::var("WS_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8081),
            seismic_feed_url: env::var("SEISMIC_FEED_URL").ok(),
            weather_feed_url: env::var("WEATHER_FEED_URL").ok(),
            dispatch,
        })
    }
}
