use crate::{building::GeoExtractor, config::ScrapingConfig, requests::RequestClient};

pub struct ScrapingContext {
    pub scraping_config: ScrapingConfig,
    pub geo_extractor: GeoExtractor,
    pub request_client: RequestClient,
}

impl ScrapingContext {
    pub fn from_config(scraping_config: ScrapingConfig) -> anyhow::Result<Self> {
        let geo_extractor = GeoExtractor::new()?;
        let request_client = RequestClient::new(scraping_config.credentials().cloned())?;
        Ok(ScrapingContext {
            scraping_config,
            geo_extractor,
            request_client,
        })
    }
}
