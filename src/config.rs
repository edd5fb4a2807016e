use std::env;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};

use crate::selector::SizingConfig;

/// Complete application configuration, loaded from environment variables or default values.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub catalog: CatalogConfig,
    pub sizing: SizingSettings,
}

impl AppConfig {
    /// Creates a configuration from the currently available environment variables.
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig::from_env(),
            catalog: CatalogConfig::from_env(),
            sizing: SizingSettings::from_env(),
        }
    }
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    bind_ip: IpAddr,
    display_host: String,
    port: u16,
}

impl ApiConfig {
    const DEFAULT_HOST: &'static str = "0.0.0.0";
    const DEFAULT_PORT: u16 = 8080;
    const DEFAULT_BIND_IP: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

    fn from_env() -> Self {
        let host_value =
            env_string("CARTONIZE_API_HOST").unwrap_or_else(|| Self::DEFAULT_HOST.to_string());
        let (bind_ip, effective_host) = match host_value.parse::<IpAddr>() {
            Ok(ip) => (ip, host_value),
            Err(err) => {
                warn!(
                    "⚠️ Could not parse CARTONIZE_API_HOST ('{}'): {}. Using {}.",
                    host_value,
                    err,
                    Self::DEFAULT_HOST
                );
                (Self::DEFAULT_BIND_IP, Self::DEFAULT_HOST.to_string())
            }
        };

        let port = match env_string("CARTONIZE_API_PORT") {
            Some(raw) => match raw.parse::<u16>() {
                Ok(value) if value != 0 => value,
                Ok(_) => {
                    warn!(
                        "⚠️ CARTONIZE_API_PORT must not be 0. Using {}.",
                        Self::DEFAULT_PORT
                    );
                    Self::DEFAULT_PORT
                }
                Err(err) => {
                    warn!(
                        "⚠️ Could not parse CARTONIZE_API_PORT ('{}'): {}. Using {}.",
                        raw,
                        err,
                        Self::DEFAULT_PORT
                    );
                    Self::DEFAULT_PORT
                }
            },
            None => Self::DEFAULT_PORT,
        };

        Self {
            bind_ip,
            display_host: effective_host,
            port,
        }
    }

    /// Socket address to bind the server to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }

    /// Visible hostname for logging and hints.
    pub fn display_host(&self) -> &str {
        &self.display_host
    }

    /// Configured port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Indicates whether binding to all interfaces.
    pub fn binds_to_all_interfaces(&self) -> bool {
        match self.bind_ip {
            IpAddr::V4(addr) => addr == Ipv4Addr::UNSPECIFIED,
            IpAddr::V6(addr) => addr == Ipv6Addr::UNSPECIFIED,
        }
    }

    /// Checks whether the hostname matches the default value.
    pub fn uses_default_host(&self) -> bool {
        self.display_host == Self::DEFAULT_HOST
    }
}

/// Where the container catalog comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum CatalogSource {
    /// Remote catalog service returning a JSON array of rows.
    Http { url: String, timeout: Duration },
    /// Local JSON file, re-read on every request.
    File(PathBuf),
    /// No catalog configured: every quote uses the synthesized default.
    Empty,
}

/// Configuration for the catalog collaborator.
#[derive(Clone, Debug)]
pub struct CatalogConfig {
    source: CatalogSource,
}

impl CatalogConfig {
    const URL_VAR: &'static str = "CARTONIZE_CATALOG_URL";
    const FILE_VAR: &'static str = "CARTONIZE_CATALOG_FILE";
    const TIMEOUT_VAR: &'static str = "CARTONIZE_CATALOG_TIMEOUT_SECS";
    const DEFAULT_TIMEOUT_SECS: u64 = 10;

    fn from_env() -> Self {
        let source = Self::resolve_source(
            env_string(Self::URL_VAR),
            env_string(Self::FILE_VAR).map(PathBuf::from),
            catalog_timeout(),
        );
        Self { source }
    }

    /// Picks the catalog source: an http(s) URL wins over a file, otherwise empty.
    fn resolve_source(
        url: Option<String>,
        file: Option<PathBuf>,
        timeout: Duration,
    ) -> CatalogSource {
        let url = url.and_then(|raw| {
            if raw.starts_with("http://") || raw.starts_with("https://") {
                Some(raw)
            } else {
                warn!(
                    "⚠️ {} ('{}') is not an http(s) URL. Ignoring value.",
                    Self::URL_VAR,
                    raw
                );
                None
            }
        });

        match (url, file) {
            (Some(url), file) => {
                if file.is_some() {
                    info!(
                        "ℹ️ Both {} and {} are set; the catalog service URL takes precedence.",
                        Self::URL_VAR,
                        Self::FILE_VAR
                    );
                }
                CatalogSource::Http { url, timeout }
            }
            (None, Some(path)) => CatalogSource::File(path),
            (None, None) => CatalogSource::Empty,
        }
    }

    /// Returns the configured catalog source.
    pub fn source(&self) -> &CatalogSource {
        &self.source
    }
}

fn catalog_timeout() -> Duration {
    let default = CatalogConfig::DEFAULT_TIMEOUT_SECS;
    match env_string(CatalogConfig::TIMEOUT_VAR) {
        Some(raw) => match raw.parse::<u64>() {
            Ok(0) => {
                warn!(
                    "⚠️ {} must be greater than 0. Using {}s.",
                    CatalogConfig::TIMEOUT_VAR,
                    default
                );
                Duration::from_secs(default)
            }
            Ok(parsed) => Duration::from_secs(parsed),
            Err(err) => {
                warn!(
                    "⚠️ Could not parse {} ('{}'): {}. Using {}s.",
                    CatalogConfig::TIMEOUT_VAR,
                    raw,
                    err,
                    default
                );
                Duration::from_secs(default)
            }
        },
        None => Duration::from_secs(default),
    }
}

/// Configuration for the sizing engine tunables.
#[derive(Clone, Debug)]
pub struct SizingSettings {
    sizing: SizingConfig,
}

impl SizingSettings {
    const VOLUME_TOLERANCE_VAR: &'static str = "CARTONIZE_VOLUME_TOLERANCE";
    const OVERSIZE_MARGIN_VAR: &'static str = "CARTONIZE_OVERSIZE_MARGIN_CM";
    const DEFAULT_MARGIN_VAR: &'static str = "CARTONIZE_DEFAULT_MARGIN_CM";
    const PACKAGING_WEIGHT_VAR: &'static str = "CARTONIZE_DEFAULT_PACKAGING_WEIGHT";
    const VOLUMETRIC_DIVISOR_VAR: &'static str = "CARTONIZE_VOLUMETRIC_DIVISOR";
    const CUBIC_DENSITY_VAR: &'static str = "CARTONIZE_CUBIC_DENSITY";

    fn from_env() -> Self {
        let volume_tolerance = load_f64_with_warning(
            Self::VOLUME_TOLERANCE_VAR,
            SizingConfig::DEFAULT_VOLUME_TOLERANCE,
            |value| value > 0.0 && value <= 1.0,
            "must be greater than 0 and at most 1",
            "Warning: Adjusted volume tolerance changes which containers are accepted",
        );

        let oversize_margin = load_f64_with_warning(
            Self::OVERSIZE_MARGIN_VAR,
            SizingConfig::DEFAULT_OVERSIZE_MARGIN,
            |value| value >= 0.0,
            "must not be negative",
            "Warning: Adjusted oversize margin changes quoted parcel sizes",
        );

        let default_margin = load_f64_with_warning(
            Self::DEFAULT_MARGIN_VAR,
            SizingConfig::DEFAULT_DEFAULT_MARGIN,
            |value| value >= 0.0,
            "must not be negative",
            "Warning: Adjusted default margin changes quoted parcel sizes",
        );

        let default_packaging_weight = load_f64_with_warning(
            Self::PACKAGING_WEIGHT_VAR,
            SizingConfig::DEFAULT_PACKAGING_WEIGHT,
            |value| value >= 0.0,
            "must not be negative",
            "Warning: Adjusted packaging weight changes quoted parcel weights",
        );

        let volumetric_divisor = load_f64_with_warning(
            Self::VOLUMETRIC_DIVISOR_VAR,
            SizingConfig::DEFAULT_VOLUMETRIC_DIVISOR,
            |value| value > 0.0,
            "must be greater than 0",
            "Warning: Volumetric divisor differs from the reference carrier",
        );

        let cubic_density = load_f64_with_warning(
            Self::CUBIC_DENSITY_VAR,
            SizingConfig::DEFAULT_CUBIC_DENSITY,
            |value| value > 0.0,
            "must be greater than 0",
            "Warning: Cubic density factor differs from the reference carrier",
        );

        let sizing = SizingConfig::builder()
            .volume_tolerance(volume_tolerance)
            .oversize_margin(oversize_margin)
            .default_margin(default_margin)
            .default_packaging_weight(default_packaging_weight)
            .volumetric_divisor(volumetric_divisor)
            .cubic_density(cubic_density)
            .build();

        Self { sizing }
    }

    /// Returns the configured SizingConfig.
    pub fn sizing_config(&self) -> SizingConfig {
        self.sizing
    }
}

fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!(
                "⚠️ Access to {} failed: {}. Using default value.",
                name, err
            );
            None
        }
    }
}

fn parse_f64_setting(
    var_name: &str,
    raw: &str,
    default: f64,
    validator: impl Fn(f64) -> bool,
    invalid_hint: &str,
    warning: &str,
) -> f64 {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && validator(value) => {
            let tolerance = (default.abs().max(1.0)) * 1e-9;
            if (value - default).abs() > tolerance {
                info!("⚠️ {} ({} = {}).", warning, var_name, value);
            }
            value
        }
        Ok(_) => {
            warn!(
                "⚠️ {} contains invalid value '{}': {}. Using {}.",
                var_name, raw, invalid_hint, default
            );
            default
        }
        Err(err) => {
            warn!(
                "⚠️ Could not parse {} ('{}') as number: {}. Using {}.",
                var_name, raw, err, default
            );
            default
        }
    }
}

fn load_f64_with_warning(
    var_name: &str,
    default: f64,
    validator: impl Fn(f64) -> bool,
    invalid_hint: &str,
    warning: &str,
) -> f64 {
    match env_string(var_name) {
        Some(raw) => parse_f64_setting(var_name, &raw, default, validator, invalid_hint, warning),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str, default: f64) -> f64 {
        parse_f64_setting(
            "TEST_VAR",
            raw,
            default,
            |value| value > 0.0 && value <= 1.0,
            "must be greater than 0 and at most 1",
            "Warning",
        )
    }

    #[test]
    fn test_parse_f64_accepts_valid_values() {
        assert_eq!(parse("0.8", 0.9), 0.8);
        assert_eq!(parse("1", 0.9), 1.0);
        assert_eq!(parse("0.9", 0.9), 0.9);
    }

    #[test]
    fn test_parse_f64_rejects_out_of_range_values() {
        assert_eq!(parse("0", 0.9), 0.9);
        assert_eq!(parse("1.5", 0.9), 0.9);
        assert_eq!(parse("-0.2", 0.9), 0.9);
        assert_eq!(parse("NaN", 0.9), 0.9);
        assert_eq!(parse("inf", 0.9), 0.9);
    }

    #[test]
    fn test_parse_f64_rejects_garbage() {
        assert_eq!(parse("ninety", 0.9), 0.9);
        assert_eq!(parse("0,8", 0.9), 0.9);
    }

    #[test]
    fn test_default_sizing_settings_match_engine_defaults() {
        let settings = SizingSettings {
            sizing: SizingConfig::default(),
        };
        let config = settings.sizing_config();
        assert_eq!(config.volume_tolerance, 0.9);
        assert_eq!(config.volumetric_divisor, 6000.0);
        assert_eq!(config.cubic_density, 300.0);
        assert_eq!(config.oversize_margin, 2.0);
        assert_eq!(config.default_margin, 4.0);
        assert_eq!(config.default_packaging_weight, 0.1);
    }

    #[test]
    fn catalog_url_takes_precedence_over_file() {
        let timeout = Duration::from_secs(3);
        let source = CatalogConfig::resolve_source(
            Some("https://catalog.internal/containers".to_string()),
            Some(PathBuf::from("catalog.json")),
            timeout,
        );
        assert_eq!(
            source,
            CatalogSource::Http {
                url: "https://catalog.internal/containers".to_string(),
                timeout,
            }
        );
    }

    #[test]
    fn non_http_catalog_url_is_ignored() {
        let timeout = Duration::from_secs(3);
        assert_eq!(
            CatalogConfig::resolve_source(
                Some("ftp://catalog.internal/containers".to_string()),
                Some(PathBuf::from("catalog.json")),
                timeout,
            ),
            CatalogSource::File(PathBuf::from("catalog.json"))
        );
        assert_eq!(
            CatalogConfig::resolve_source(Some("catalog.json".to_string()), None, timeout),
            CatalogSource::Empty
        );
    }

    #[test]
    fn no_catalog_settings_mean_empty_catalog() {
        assert_eq!(
            CatalogConfig::resolve_source(None, None, Duration::from_secs(3)),
            CatalogSource::Empty
        );
        assert_eq!(
            CatalogConfig::resolve_source(None, Some(PathBuf::from("rows.json")), Duration::from_secs(3)),
            CatalogSource::File(PathBuf::from("rows.json"))
        );
    }
}
