use crate::{
    cli::OutputFormat,
    config::AppConfig,
    error::{CliError, Result},
    output::{OutputManager, write_output},
};
#[cfg(feature = "colored-output")]
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use sportdeutschland_parser::{
    extractor::{
        ClientConfig, ProxyConfig, factory::ExtractorFactory, factory_with_config,
        platform_extractor::PlatformExtractor,
    },
    media::MediaDescriptor,
};
use std::{path::Path, time::Duration};
use tracing::{debug, info};

/// Proxy and timeout settings given on the command line.
#[derive(Debug, Default)]
pub struct NetworkOverrides {
    pub timeout: Option<u64>,
    pub proxy: Option<String>,
    pub proxy_username: Option<String>,
    pub proxy_password: Option<String>,
}

pub struct CommandExecutor {
    config: AppConfig,
    extractor_factory: ExtractorFactory,
}

impl CommandExecutor {
    pub fn new(config: AppConfig, overrides: NetworkOverrides) -> Result<Self> {
        let client_config = client_config(&config, overrides);
        debug!("Using client config: {:?}", client_config);

        let extractor_factory = factory_with_config(&client_config)?;
        Ok(Self {
            config,
            extractor_factory,
        })
    }

    pub async fn extract_single(
        &self,
        url: &str,
        output_file: Option<&Path>,
        output_format: OutputFormat,
        best_only: bool,
    ) -> Result<()> {
        let extractor = self
            .extractor_factory
            .create_extractor(url, self.config.extractor_extras())?;

        let pb = self.create_progress_bar("Resolving streams...");
        let result = extractor.extract().await;
        pb.finish_and_clear();

        let mut media = result?;
        info!(
            "Resolved {} ({}) with {} formats",
            media.display_id,
            media.id,
            media.formats.len()
        );

        if best_only {
            keep_best_format(&mut media)?;
        }

        let output_manager = OutputManager::new(self.config.colored_output);
        let output = output_manager.format_media(&media, &output_format)?;
        write_output(&output, output_file)?;
        Ok(())
    }

    pub fn list_platforms(colored: bool) {
        #[cfg(feature = "colored-output")]
        let title = if colored {
            "Supported Platforms:".green().bold().to_string()
        } else {
            "Supported Platforms:".to_string()
        };

        #[cfg(not(feature = "colored-output"))]
        let title = {
            let _ = colored;
            "Supported Platforms:".to_string()
        };

        println!("{title}");

        for (name, pattern) in ExtractorFactory::supported_platforms() {
            #[cfg(feature = "colored-output")]
            {
                if colored {
                    println!("  {} - {}", name.cyan().bold(), pattern.blue());
                    continue;
                }
            }
            println!("  {name} - {pattern}");
        }
    }

    fn create_progress_bar(&self, message: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

fn client_config(config: &AppConfig, overrides: NetworkOverrides) -> ClientConfig {
    let mut client_config = ClientConfig {
        timeout: Duration::from_secs(overrides.timeout.unwrap_or(config.default_timeout)),
        ..Default::default()
    };
    if let Some(user_agent) = &config.user_agent {
        client_config.user_agent = user_agent.clone();
    }

    let proxy_url = overrides.proxy.or_else(|| config.default_proxy.clone());
    client_config.proxy = proxy_url.map(|url| ProxyConfig {
        url,
        username: overrides
            .proxy_username
            .or_else(|| config.default_proxy_username.clone()),
        password: overrides
            .proxy_password
            .or_else(|| config.default_proxy_password.clone()),
    });
    client_config
}

fn keep_best_format(media: &mut MediaDescriptor) -> Result<()> {
    let best = media.formats.pop().ok_or_else(CliError::no_streams_found)?;
    media.formats = vec![best];
    Ok(())
}
