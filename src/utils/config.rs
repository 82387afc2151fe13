use config::{Config, ConfigError};
use serde::Deserialize;
use std::env;
use std::net::IpAddr;
use std::time::Duration;

pub fn parse_args() -> Option<String> {
  let args: Vec<String> = env::args().collect();

  let mut opts = getopts::Options::new();
  opts.optopt("c", "config", "config file source (basename only, ex: /etc/keymint/config)", "CONFIG");

  let matches = match opts.parse(&args[1..]) {
    Ok(m) => m,
    Err(f) => {
      panic!("{}", f.to_string())
    }
  };
  matches.opt_str("c")
}

pub fn load_config(path: String) -> Result<GlobalConfig, ConfigError> {
  let config = Config::builder().add_source(config::File::with_name(&path)).build()?;
  config.try_deserialize::<GlobalConfig>()
}

#[derive(Clone, Deserialize)]
pub struct GlobalConfig {
  pub api: ApiConfig,
  pub issuer: IssuerConfig,
  pub cache: CacheConfigContainer,
  pub mongodb: MongoDBConfig,
  pub log4rs: Log4rsConfig,
}

#[derive(Clone, Deserialize)]
pub struct ApiConfig {
  pub listen: IpAddr,
  pub port: u16,
  pub backlog: u32,
}

#[derive(Clone, Deserialize)]
pub struct IssuerConfig {
  pub max_batch: u32,
  #[serde(with = "humantime_serde")]
  pub credential_validity: Duration,
}

#[derive(Clone, Deserialize)]
pub struct CacheConfigContainer {
  pub catalog: CacheConfig,
  pub geo: CacheConfig,
}

#[derive(Clone, Deserialize)]
pub struct CacheConfig {
  pub max_size: u64,
  #[serde(with = "humantime_serde")]
  pub time_to_live: Duration,
}

#[derive(Clone, Deserialize)]
pub struct MongoDBConfig {
  pub uri: String,
  pub database: String,
}

#[derive(Clone, Deserialize)]
pub struct Log4rsConfig {
  pub location: String,
}
