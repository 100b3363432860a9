//! Stream extraction for sportdeutschland.tv.
//!
//! ```no_run
//! use sportdeutschland_parser::extractor::default_factory;
//! use sportdeutschland_parser::extractor::platform_extractor::PlatformExtractor;
//!
//! # async fn run() -> Result<(), sportdeutschland_parser::extractor::error::ExtractorError> {
//! let factory = default_factory()?;
//! let extractor = factory.create_extractor("https://sportdeutschland.tv/badminton/finals", None)?;
//! let media = extractor.extract().await?;
//! println!("{} has {} formats", media.title, media.formats.len());
//! # Ok(())
//! # }
//! ```

pub mod extractor;
pub mod media;
pub mod utils;
