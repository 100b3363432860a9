mod default;
pub mod error;
pub mod factory;
pub mod format_sort;
pub mod platform_extractor;
pub mod platforms;

pub use default::{
    ClientConfig, ProxyConfig, create_client, default_client, default_factory,
    factory_with_config,
};

pub mod hls_extractor;
pub mod smil_extractor;
