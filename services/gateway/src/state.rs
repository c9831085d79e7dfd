use crate::config::GatewayConfig;
use jsonwebtoken::DecodingKey;
use std::sync::Arc;
use swap_engine::NegotiationEngine;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<NegotiationEngine>,
    pub decoding_key: DecodingKey,
    pub config: Arc<GatewayConfig>,
}

impl AppState {
    pub fn new(engine: NegotiationEngine, config: GatewayConfig) -> Self {
        Self {
            engine: Arc::new(engine),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            config: Arc::new(config),
        }
    }
}
