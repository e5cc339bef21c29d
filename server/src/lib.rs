pub mod api;
pub mod config;
pub mod database;
pub mod dictionary_store;
pub mod models;
pub mod reading;
pub mod routes;
pub mod server;
pub mod state;
pub mod text_store;

use crate::config::AppConfig;
use crate::database::DataDir;
use crate::state::AppState;

pub async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let app_state = AppState::new(&DataDir::new(&config.data_dir));
    server::start_server(&config, app_state).await
}
