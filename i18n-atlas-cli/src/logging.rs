use std::str::FromStr;

use fern::Dispatch;
use log::LevelFilter;

/// Environment variable selecting the log level (`error`, `warn`, `info`, `debug`, `trace`, `off`).
pub const LOG_ENV: &str = "I18N_ATLAS_LOG";

/// Parses a level name, falling back to `Info` for missing or unknown values.
pub fn level_from(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|v| LevelFilter::from_str(v.trim()).ok())
        .unwrap_or(LevelFilter::Info)
}

pub fn setup_logger() {
    let level = level_from(std::env::var(LOG_ENV).ok().as_deref());
    let logger = Dispatch::new()
        .format(move |out, message, record| {
            let (color, reset) = match record.level() {
                log::Level::Error => ("\x1b[31m", "\x1b[0m"), // Red
                log::Level::Warn => ("\x1b[33m", "\x1b[0m"),  // Yellow
                log::Level::Info | log::Level::Debug | log::Level::Trace => ("", ""),
            };
            out.finish(format_args!(
                "{}{}: {}{}",
                color,
                record.level(),
                if level >= LevelFilter::Debug {
                    format!("({}) {}", record.target(), message)
                } else {
                    message.to_string()
                },
                reset
            ))
        })
        .level(level)
        .chain(std::io::stderr());

    if let Err(e) = logger.apply() {
        eprintln!("Failed to apply logger: {:?}", e);
    }
}
