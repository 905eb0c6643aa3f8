use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = env::var("RUNTIME_PORT").or_else(|_| env::var("PORT")).ok();
        Self::from_port(port.as_deref())
    }

    fn from_port(port: Option<&str>) -> Result<Self, ConfigError> {
        Ok(Config {
            port: port
                .unwrap_or("9000")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("RUNTIME_PORT".to_string()))?,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue(var) => write!(f, "Invalid value for: {}", var),
        }
    }
}

impl std::error::Error for ConfigError {}
