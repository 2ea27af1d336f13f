use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

pub const DEFAULT_DATA_PATH: &str = "data/calorie_counter.json";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: PathBuf,
    pub host: IpAddr,
    pub port: u16,
}

impl Config {
    /// Reads `APP_DATA_PATH`, `HOST` and `PORT`; unset or unparsable values fall back to defaults.
    pub fn from_env() -> Self {
        Self {
            data_path: resolve_data_path(),
            host: env::var("HOST")
                .ok()
                .and_then(|value| value.parse::<IpAddr>().ok())
                .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST)),
            port: env::var("PORT")
                .ok()
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

pub fn resolve_data_path() -> PathBuf {
    match env::var("APP_DATA_PATH") {
        Ok(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_DATA_PATH),
    }
}
