//! Utility functions for the classification pipeline.

pub mod image;

pub use image::{create_rgb_image, decode_image, dynamic_to_rgb, load_image};

/// Initializes the tracing subscriber for logging.
///
/// Sets up the subscriber with an environment filter (`RUST_LOG`, falling
/// back to `info`) and a formatting layer. Typically called once at the
/// start of an application.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
