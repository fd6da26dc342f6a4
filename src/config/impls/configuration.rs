use std::fs::File;
use std::io::Write;
use std::thread::available_parallelism;
use regex::Regex;
use crate::common::structs::custom_error::CustomError;
use crate::config::enums::configuration_error::ConfigurationError;
use crate::config::enums::registration_policy::RegistrationPolicy;
use crate::config::structs::configuration::Configuration;
use crate::config::structs::geo_config::GeoConfig;
use crate::config::structs::http_trackers_config::HttpTrackersConfig;
use crate::config::structs::sentry_config::SentryConfig;
use crate::config::structs::store_config::StoreConfig;
use crate::config::structs::tracker_config::TrackerConfig;
use crate::store::enums::store_engine::StoreEngine;

impl Configuration {
    pub fn init() -> Configuration {
        Configuration {
            log_level: String::from("info"),
            log_console_interval: 60,
            tracker_config: TrackerConfig {
                announce_interval: 1800,
                announce_interval_minimum: 900,
                peers_returned: 50,
                peer_ttl: 3600,
                registration_policy: RegistrationPolicy::Open,
                allow_anonymous_announces: false,
                credit_multiplier: 1.0,
                credit_whole_session: false,
            },
            store: StoreConfig {
                engine: StoreEngine::redis,
                address: String::from("127.0.0.1:6379"),
                password: String::from(""),
                database: 0,
                prefix: String::from("tracker_"),
                request_timeout: 5,
            },
            http_server: vec!(
                HttpTrackersConfig {
                    enabled: true,
                    bind_address: String::from("0.0.0.0:6969"),
                    real_ip: String::from("X-Real-IP"),
                    keep_alive: 60,
                    request_timeout: 15,
                    disconnect_timeout: 15,
                    threads: available_parallelism().unwrap().get() as u64,
                    ssl: false,
                    ssl_key: String::from(""),
                    ssl_cert: String::from(""),
                }
            ),
            geo: GeoConfig {
                enabled: false,
                path: String::from("geo.csv"),
            },
            sentry_config: SentryConfig {
                enabled: false,
                dsn: String::from(""),
                debug: false,
                sample_rate: 1.0,
                max_breadcrumbs: 100,
                attach_stacktrace: true,
                send_default_pii: false,
                traces_sample_rate: 1.0,
            },
        }
    }

    pub fn load(data: &[u8]) -> Result<Configuration, toml::de::Error> {
        toml::from_str(&String::from_utf8_lossy(data))
    }

    pub fn load_file(path: &str) -> Result<Configuration, ConfigurationError> {
        match std::fs::read(path) {
            Err(e) => Err(ConfigurationError::IOError(e)),
            Ok(data) => {
                match Self::load(data.as_slice()) {
                    Ok(cfg) => Ok(cfg),
                    Err(e) => Err(ConfigurationError::ParseError(e)),
                }
            }
        }
    }

    pub fn save_file(path: &str, data: String) -> Result<(), ConfigurationError> {
        match File::create(path) {
            Ok(mut file) => {
                match file.write_all(data.as_ref()) {
                    Ok(_) => Ok(()),
                    Err(e) => Err(ConfigurationError::IOError(e))
                }
            }
            Err(e) => Err(ConfigurationError::IOError(e))
        }
    }

    pub fn load_from_file(path: &str, create: bool) -> Result<Configuration, CustomError> {
        let config = match Configuration::load_file(path) {
            Ok(c) => c,
            Err(error) => {
                eprintln!("No config file found or corrupt.");
                eprintln!("[ERROR] {error}");

                if !create {
                    eprintln!("You can either create your own {path} file, or start this app using '--create-config' as parameter.");
                    return Err(CustomError::new("will not automatically create config file"));
                }
                eprintln!("Creating config file..");

                let config_toml = match toml::to_string(&Configuration::init()) {
                    Ok(data) => data,
                    Err(_) => return Err(CustomError::new("could not serialize default configuration")),
                };
                return match Configuration::save_file(path, config_toml) {
                    Ok(_) => {
                        eprintln!("Please edit the {path} file in the root folder, exiting now...");
                        Err(CustomError::new("created config file"))
                    }
                    Err(e) => {
                        eprintln!("{path} file could not be created, check permissions...");
                        eprintln!("{e}");
                        Err(CustomError::new("could not create config file"))
                    }
                };
            }
        };

        println!("[VALIDATE] Validating configuration...");
        Self::validate(&config)?;
        Ok(config)
    }

    pub fn validate(config: &Configuration) -> Result<(), CustomError> {
        Self::validate_value(
            "[store] prefix",
            config.store.prefix.clone(),
            r"^[A-Za-z0-9_:-]{0,64}$".to_string(),
        )?;
        if config.tracker_config.announce_interval_minimum > config.tracker_config.announce_interval {
            return Err(CustomError::new("announce_interval_minimum exceeds announce_interval"));
        }
        if config.tracker_config.peer_ttl <= config.tracker_config.announce_interval {
            return Err(CustomError::new("peer_ttl must exceed announce_interval or every peer expires between announces"));
        }
        if config.tracker_config.credit_multiplier < 0.0 {
            return Err(CustomError::new("credit_multiplier must not be negative"));
        }
        for http_server in &config.http_server {
            if http_server.enabled && http_server.ssl && (http_server.ssl_key.is_empty() || http_server.ssl_cert.is_empty()) {
                return Err(CustomError::new("ssl enabled without ssl_key and ssl_cert"));
            }
        }
        Ok(())
    }

    pub fn validate_value(name: &str, value: String, regex: String) -> Result<(), CustomError> {
        let regex_check = match Regex::new(regex.as_str()) {
            Ok(regex_check) => regex_check,
            Err(_) => return Err(CustomError::new("invalid validation regex")),
        };
        if !regex_check.is_match(value.as_str()) {
            return Err(CustomError::new(&format!("config check failed for {name} [:] Value: \"{value}\" [:] Regex: \"{regex_check}\"")));
        }
        Ok(())
    }
}
