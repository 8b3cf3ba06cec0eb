use serde_derive::Deserialize;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::fmt::{time::ChronoUtc, MakeWriter};
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum LogType {
    Stdout,
    Stderr,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Log {
    pub level: String,
    #[serde(default)]
    pub structured: bool,
    #[serde(default = "default_backend")]
    pub backend: LogType,
}

fn default_backend() -> LogType {
    LogType::Stderr
}

/// setup log from an optional environment filter and the config file
///
/// if the environment filter is present, then the config level is not used;
/// with neither, no subscriber is installed
pub fn setup(
    env_filter: Result<EnvFilter, tracing_subscriber::filter::FromEnvError>,
    config: Option<&Log>,
) -> Result<(), SetGlobalDefaultError> {
    let filter = match (env_filter, config) {
        (Ok(env_filter), _) => env_filter,
        (Err(_), Some(log)) => {
            EnvFilter::try_new(&log.level).unwrap_or_else(|_| EnvFilter::new("info"))
        }
        (Err(_), None) => return Ok(()),
    };
    let structured = config.map_or(false, |log| log.structured);
    match config.map_or(LogType::Stderr, |log| log.backend) {
        LogType::Stdout => install(filter, structured, std::io::stdout),
        LogType::Stderr => install(filter, structured, std::io::stderr),
    }
}

fn install<W>(filter: EnvFilter, structured: bool, writer: W) -> Result<(), SetGlobalDefaultError>
where
    W: MakeWriter + Send + Sync + 'static,
{
    let builder = Subscriber::builder()
        .with_timer(ChronoUtc::rfc3339())
        .with_level(true)
        .with_env_filter(filter)
        .with_writer(writer);
    if structured {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.with_ansi(true).finish())
    }
}
