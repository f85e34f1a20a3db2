pub mod cli;
pub mod config;
pub mod error;
pub mod routes;
pub mod series;
pub mod state;
pub mod static_assets;
pub mod thingspeak;

#[cfg(test)]
pub mod test_support;
