use std::net::{IpAddr, Ipv4Addr};

use figment::{providers::Env, Figment};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: IpAddr,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_http_client_agent")]
    pub http_client_agent: String,

    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: String,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    3000
}

fn default_http_client_agent() -> String {
    "prism-media-relay/0.1".to_string()
}

fn default_ytdlp_path() -> String {
    "yt-dlp".to_string()
}

/// Extracts the configuration from `PRISM_`-prefixed environment variables.
/// Every field has a default, so an empty environment is a valid one.
pub fn load_config() -> Result<Config, figment::Error> {
    let figment = Figment::new().merge(Env::prefixed("PRISM_"));
    figment.extract()
}
