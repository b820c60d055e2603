use crate::client::{ClientConfig, SourceClient};
use crate::command::target_ip;
use crate::config::Config;
use crate::render::render;
use crate::resolver::{LookupOutcome, Resolver};
use crate::source::SourceRegistry;

/// Answers one chat command with one text reply, safe to share between concurrent commands.
pub struct IpQueryService {
    command: String,
    sources: SourceRegistry,
    client_config: ClientConfig,
}

impl IpQueryService {
    pub fn from_config(config: Config) -> Self {
        let client_config = config.client_config();
        let Config {
            command, sources, ..
        } = config;

        if !client_config.tls_verify {
            log::warn!("TLS certificate verification is disabled for all sources");
        }
        log::info!(
            "{} sources: {}",
            sources.len(),
            sources
                .iter()
                .map(|source| source.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Self {
            command,
            sources,
            client_config,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// A fresh HTTP session per lookup, dropped on every return path.
    pub async fn lookup(&self, ip: &str) -> LookupOutcome {
        let client = match SourceClient::open(&self.client_config) {
            Ok(client) => client,
            Err(err) => {
                log::error!("cannot open HTTP session: {}", err);
                return LookupOutcome::AllSourcesFailed;
            }
        };
        Resolver::new(&self.sources, &client).resolve(ip).await
    }

    pub async fn respond(&self, message: &str) -> String {
        let ip = target_ip(message, &self.command);
        log::info!(r#"target IP: "{}""#, ip);
        render(&self.lookup(ip).await)
    }
}
