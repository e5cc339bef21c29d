use pali_reader::config::{AppConfig, ConfigOverrides};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn parse_arg(flag: &str) -> Option<String> {
    let mut args = std::env::args();
    while let Some(arg) = args.next() {
        if arg == flag {
            return args.next();
        }
    }
    None
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = parse_arg("--config").map(PathBuf::from);
    let overrides = ConfigOverrides {
        listen: parse_arg("--listen").map(|s| s.parse()).transpose()?,
        data_dir: parse_arg("--data-dir").map(PathBuf::from),
    };
    let config = AppConfig::load(config_path.as_deref(), overrides)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    pali_reader::run(config).await
}
