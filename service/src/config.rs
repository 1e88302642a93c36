use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use semver::Version;
use serde::Deserialize;
use utoipa::IntoParams;

type APiVersionList = [&'static str; 1];

const DEFAULT_API_VERSION: &str = "1.0.0-beta1";
// Expand this array to include all valid API versions. Versions that have been
// completely removed should be removed from this list - they're no longer valid.
const API_VERSIONS: APiVersionList = [DEFAULT_API_VERSION];

pub static X_VERSION: &str = "x-version";

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Header)]
pub struct ApiVersion {
    /// The version of the API to use for a request.
    #[param(
        rename = "x-version",
        style = Simple,
        required,
        example = "1.0.0-beta1",
        value_type = String
    )]
    pub version: Version,
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// Set the current semantic version of the endpoint API to expose to clients. All
    /// endpoints not contained in the specified version will not be exposed by the router.
    #[arg(short, long, env, default_value = DEFAULT_API_VERSION,
        value_parser = clap::builder::PossibleValuesParser::new(API_VERSIONS)
            .map(|s| s.parse::<String>().unwrap()),
        )]
    pub api_version: Option<String>,

    /// Sets the Redis URL used for session lookups and for the cross-instance
    /// events topic. When unset, the server runs single-instance: events stay
    /// in-process and sessions live in memory.
    #[arg(long, env)]
    redis_url: Option<String>,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "0.0.0.0")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Session expiry duration in seconds (default: 24 hours = 86400 seconds)
    #[arg(long, env, default_value_t = 86400)]
    pub session_expiry_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn api_version(&self) -> &str {
        self.api_version
            .as_ref()
            .expect("No API version string provided")
    }

    pub fn redis_url(&self) -> Option<&str> {
        self.redis_url.as_deref()
    }

    pub fn set_redis_url(mut self, redis_url: String) -> Self {
        self.redis_url = Some(redis_url);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_config(args: &[&str]) -> Config {
        Config::parse_from(std::iter::once("talk_events_rs").chain(args.iter().copied()))
    }

    #[test]
    fn default_config_is_single_instance() {
        let config = parse_config(&[]);
        assert_eq!(config.api_version(), DEFAULT_API_VERSION);
        assert_eq!(config.redis_url(), None);
        assert_eq!(config.port, 4000);
        assert_eq!(config.session_expiry_seconds, 86400);
        assert_eq!(config.log_level_filter, LevelFilter::Info);
    }

    #[test]
    fn allowed_origins_are_comma_separated() {
        let config = parse_config(&["--allowed-origins", "https://a.example,https://b.example"]);
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn redis_url_enables_bridged_mode() {
        let config = parse_config(&["--redis-url", "redis://localhost:6379"]);
        assert_eq!(config.redis_url(), Some("redis://localhost:6379"));
    }

    #[test]
    fn api_version_header_param_is_documented() {
        use utoipa::IntoParams;

        let params = ApiVersion::into_params(|| None);
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, X_VERSION);
    }
}
