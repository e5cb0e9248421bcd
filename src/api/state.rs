use std::sync::Arc;

use crate::core::AppConfig;
use crate::notify::{MessagingTransport, SubscriptionRegistry};

pub struct AppState {
    // What this process believes it subscribed, not the provider's view
    pub registry: SubscriptionRegistry,
    pub transport: Arc<dyn MessagingTransport>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(transport: Arc<dyn MessagingTransport>, config: AppConfig) -> Self {
        Self {
            registry: SubscriptionRegistry::new(),
            transport,
            config,
        }
    }
}
