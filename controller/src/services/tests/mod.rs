//! Service-specific tests
//!
//! Each service has its own test file with dedicated fixtures and helpers.


// Common test utilities for services
pub mod common {
    use std::time::Duration;

    use crate::config::ClientConfig;
    use crate::services::RealMapApi;

    /// Build a client pointed at a mock server
    pub fn api_for(server_uri: &str) -> RealMapApi {
        let config = ClientConfig::defaults()
            .unwrap()
            .with_server_url(server_uri)
            .unwrap()
            .with_timeout(Duration::from_secs(2));
        RealMapApi::new(&config).unwrap()
    }
}
