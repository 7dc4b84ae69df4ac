use std::env;

/// Runtime configuration, read once at startup.
///
/// Pool sizing and the per-batch write deadline are tuning constants in
/// [`crate::wavefront`], not configuration — they match the reference
/// deployment and rarely need changing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP receiver binds to.
    pub listen_addr: String,
    /// `host:port` of the downstream Wavefront proxy.
    pub proxy_addr: String,
    /// Prefix joined onto every metric name as `{prefix}_{name}`.
    pub prefix: String,
}

impl Config {
    /// Build a `Config` from environment variables, falling back to the
    /// defaults of the reference deployment.
    pub fn from_env() -> Self {
        Self {
            listen_addr: env::var("RELAY_LISTEN_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:1234".into()),
            proxy_addr: env::var("WAVEFRONT_PROXY_ADDR")
                .unwrap_or_else(|_| "localhost:2878".into()),
            prefix: env::var("WAVEFRONT_PREFIX").unwrap_or_else(|_| "prom".into()),
        }
    }
}
