use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabled::Tabled;
use uuid::Uuid;

use crate::client::ApiClient;
use crate::config::Config;
use crate::output::{self, Format};

#[derive(Subcommand)]
pub enum Commands {
    /// Onboard a new restaurant
    Onboard {
        /// JSON file with the full onboarding request body (timings etc.)
        #[arg(long, conflicts_with = "name")]
        file: Option<PathBuf>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        state: Option<String>,
        #[arg(long)]
        pincode: Option<String>,
        #[arg(long)]
        latitude: Option<f64>,
        #[arg(long)]
        longitude: Option<f64>,
        /// Cuisine type; repeat for more than one
        #[arg(long = "cuisine")]
        cuisines: Vec<String>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OnboardRequest {
    restaurant_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    address_line1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pincode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    longitude: Option<f64>,
    cuisine_types: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Tabled)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    #[tabled(skip)]
    pub id: Uuid,
    pub tiny_id: String,
    pub restaurant_name: String,
    #[tabled(display_with = "display_option")]
    pub city: Option<String>,
    #[tabled(display_with = "display_option")]
    pub state: Option<String>,
    #[tabled(display_with = "display_list")]
    pub cuisine_types: Vec<String>,
    pub created_at: DateTime<Utc>,
}

fn display_option(o: &Option<String>) -> String {
    o.clone().unwrap_or_else(|| "-".into())
}

fn display_list(items: &Vec<String>) -> String {
    items.join(", ")
}

pub async fn run(cmd: Commands, config: &Config, format: Format) -> Result<()> {
    let client = ApiClient::new(config);

    match cmd {
        Commands::Onboard {
            file,
            name,
            address,
            city,
            state,
            pincode,
            latitude,
            longitude,
            cuisines,
        } => {
            let restaurant: Restaurant = match file {
                Some(path) => {
                    let content = std::fs::read_to_string(&path)
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    let body: Value =
                        serde_json::from_str(&content).context("request file is not valid JSON")?;
                    client.post("/api/restaurants/onboard", &body).await?
                }
                None => {
                    let Some(restaurant_name) = name else {
                        bail!("either --file or --name is required");
                    };
                    let req = OnboardRequest {
                        restaurant_name,
                        address_line1: address,
                        city,
                        state,
                        pincode,
                        latitude,
                        longitude,
                        cuisine_types: cuisines,
                    };
                    client.post("/api/restaurants/onboard", &req).await?
                }
            };

            output::print_created(restaurant, format);
        }
    }

    Ok(())
}
