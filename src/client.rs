
use aws_config::{meta::region::RegionProviderChain, retry::RetryConfig, BehaviorVersion};
use aws_sdk_glacier::{
    Client,
    config::Region};

use crate::config::DEFAULT_REGION;


// the region actually used and a client for this region.
// SDK retries are off: throttling is retried by `ThrottlePolicy` alone.
pub async fn get_region_client(region: &str) -> (Region, Client) {
    let region_provider = RegionProviderChain::first_try(Region::new(region.to_owned()))
        .or_default_provider();
    let region = region_provider
        .region()
        .await
        .unwrap_or_else(|| Region::new(DEFAULT_REGION));

    let shared_config = aws_config::defaults(BehaviorVersion::latest())
        .region(region.clone())
        .retry_config(RetryConfig::disabled())
        .load()
        .await;
    let client = Client::new(&shared_config);

    (region, client)
}

/// get a Glacier client for `region`; credentials come from the default provider chain
pub async fn get_client(region: &str) -> Client {
    let (_, client) = get_region_client(region).await;

    client
}
