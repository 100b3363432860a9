mod builder;
pub mod models;

pub use builder::SportDeutschland;
pub use builder::SportDeutschlandEndpoints;
pub use builder::URL_REGEX;
