use crate::config::{Config, FieldMapping};
use crate::static_assets::DashboardPage;
use crate::thingspeak::ThingSpeakClient;
use anyhow::Result;
use reqwest::Client;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub thingspeak: ThingSpeakClient,
    pub fields: Arc<FieldMapping>,
    pub page: Arc<DashboardPage>,
}

impl AppState {
    pub fn new(config: &Config, http: Client) -> Result<Self> {
        Ok(Self {
            thingspeak: ThingSpeakClient::new(http, config.thingspeak.clone())?,
            fields: Arc::new(config.fields.clone()),
            page: Arc::new(DashboardPage::render(config.refresh_interval)),
        })
    }
}
