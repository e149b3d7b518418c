//! Demo application: the example site's routes declared against Trellis
//!
//! - `site`: root layout, home, not-found, marketing group, profile, dashboard
//! - `products`: product list, product details, optional catch-all filter
//! - `metadata`: static and dynamic metadata examples
//! - `examples`: error and loading examples

mod examples;
mod metadata;
mod products;
mod site;

use std::time::Duration;

use trellis::{App, AppBuilder, AppError, Config};

/// Knobs the tests turn down
#[derive(Debug, Clone)]
pub struct DemoOptions {
    /// How long the loading example's data takes to arrive
    pub loading_delay: Duration,
    /// Chance that one fetch in the error example fails, from 0.0 to 1.0
    pub fetch_failure_rate: f64,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            loading_delay: Duration::from_secs(2),
            fetch_failure_rate: 0.4,
        }
    }
}

pub fn app(config: &Config) -> Result<App, AppError> {
    app_with(config, DemoOptions::default())
}

pub fn app_with(config: &Config, options: DemoOptions) -> Result<App, AppError> {
    let builder = AppBuilder::from_config(config);
    let builder = site::routes(builder);
    let builder = products::routes(builder);
    let builder = metadata::routes(builder);
    let builder = examples::routes(builder, &options);
    builder.build()
}
