mod config;

pub use config::ForgeConfig;
