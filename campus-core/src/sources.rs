//! Dining and tuition-cost lookups.
//!
//! Dining is a fixed list until a menu API is wired in; cost only probes the
//! page and reports its size.

use std::sync::Arc;

use serde::Serialize;

use crate::error::CampusResult;
use crate::fetch::Fetch;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiningVenue {
    pub name: String,
    pub url: String,
    pub hours: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiningInfo {
    pub source: String,
    pub venues: Vec<DiningVenue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostInfo {
    pub source: String,
    /// Length of the page body in characters.
    pub html_length: usize,
}

const VENUES: &[(&str, &str)] = &[
    ("Connection Café", "7:00 AM – 9:00 PM"),
    ("Panda Express", "11:00 AM – 8:00 PM"),
];

pub struct CampusSources {
    fetcher: Arc<dyn Fetch>,
    dining_base_url: String,
    avg_cost_url: String,
}

impl CampusSources {
    pub fn new(
        fetcher: Arc<dyn Fetch>,
        dining_base_url: impl Into<String>,
        avg_cost_url: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            dining_base_url: dining_base_url.into(),
            avg_cost_url: avg_cost_url.into(),
        }
    }

    /// Today's dining venues. Does not touch the network.
    pub fn dining_today(&self) -> DiningInfo {
        let url = &self.dining_base_url;
        DiningInfo {
            source: url.clone(),
            venues: VENUES
                .iter()
                .map(|(name, hours)| DiningVenue {
                    name: name.to_string(),
                    url: url.clone(),
                    hours: hours.to_string(),
                })
                .collect(),
        }
    }

    /// Fetch the average-cost page and report its length.
    pub async fn average_cost(&self) -> CampusResult<CostInfo> {
        let body = self.fetcher.fetch(&self.avg_cost_url).await?;
        let html_length = String::from_utf8_lossy(&body).chars().count();

        Ok(CostInfo {
            source: self.avg_cost_url.clone(),
            html_length,
        })
    }
}
