// Platform logger setup

use crate::config::LogConfig;
use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Install the platform logger. Only the first call has any effect.
pub fn init_logging(config: &LogConfig) {
    let level = config.level_filter().unwrap_or(log::LevelFilter::Info);

    INIT_LOGGER.call_once(|| {
        #[cfg(target_os = "android")]
        {
            android_logger::init_once(
                android_logger::Config::default()
                    .with_max_level(level)
                    .with_tag(config.tag.as_str()),
            );
        }

        #[cfg(not(target_os = "android"))]
        {
            // Another logger may already be installed by the host
            let _ = env_logger::builder()
                .is_test(false)
                .filter_level(level)
                .try_init();
        }
    });

    log::debug!("Logging initialised at {}", level);
}
