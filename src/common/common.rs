use std::collections::HashMap;
use std::fmt;
use std::fmt::Formatter;
use std::time::SystemTime;
use fern::colors::{Color, ColoredLevelConfig};
use log::info;
use crate::config::structs::configuration::Configuration;
use crate::tracker::errors::TrackerError;

/// Parses a raw HTTP query string into a multimap of percent-decoded values.
///
/// Values are kept as raw bytes because `info_hash` and `peer_id` are binary
/// and not valid UTF-8 in general. Repeated keys (multiple `info_hash` in a
/// scrape) accumulate in order.
pub fn parse_query(query: Option<String>) -> Result<HashMap<String, Vec<Vec<u8>>>, TrackerError> {
    let mut queries: HashMap<String, Vec<Vec<u8>>> = HashMap::new();
    let Some(raw) = query else {
        return Ok(queries);
    };
    for query_item in raw.split('&') {
        if query_item.is_empty() {
            continue;
        }
        match query_item.split_once('=') {
            Some((key_raw, value_raw)) => {
                let key_name = percent_encoding::percent_decode_str(key_raw)
                    .decode_utf8_lossy()
                    .to_lowercase();
                if key_name.is_empty() {
                    continue;
                }
                let value_data = percent_encoding::percent_decode_str(value_raw).collect::<Vec<u8>>();
                queries.entry(key_name).or_default().push(value_data);
            }
            None => {
                let key_name = percent_encoding::percent_decode_str(query_item)
                    .decode_utf8_lossy()
                    .to_lowercase();
                if !key_name.is_empty() {
                    queries.entry(key_name).or_default();
                }
            }
        }
    }
    Ok(queries)
}

pub(crate) fn bin2hex(data: &[u8; 20], f: &mut Formatter) -> fmt::Result {
    let mut chars = [0u8; 40];
    binascii::bin2hex(data, &mut chars).expect("failed to hexlify");
    write!(f, "{}", std::str::from_utf8(&chars).unwrap())
}

pub(crate) fn hex_to_nibble(byte: u8) -> u8 {
    match byte {
        b'0'..=b'9' => byte - b'0',
        b'a'..=b'f' => byte - b'a' + 10,
        b'A'..=b'F' => byte - b'A' + 10,
        _ => 0xFF,
    }
}

pub fn current_time() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH).unwrap()
        .as_secs()
}

pub fn setup_logging(config: &Configuration)
{
    let level = match config.log_level.as_str() {
        "off" => log::LevelFilter::Off,
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => {
            panic!("Unknown log level encountered: '{}'", config.log_level.as_str());
        }
    };

    let colors = ColoredLevelConfig::new()
        .trace(Color::Cyan)
        .debug(Color::Magenta)
        .info(Color::Green)
        .warn(Color::Yellow)
        .error(Color::Red);

    if let Err(_err) = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} [{:width$}][{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.9f"),
                colors.color(record.level()),
                record.target(),
                message,
                width = 5
            ))
        })
        .level(level)
        .chain(std::io::stdout())
        .apply()
    {
        panic!("Failed to initialize logging.")
    }
    info!("logging initialized.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_binary_values() {
        let parsed = parse_query(Some("info_hash=%00%01%ff&port=6881".to_string())).unwrap();
        assert_eq!(parsed.get("info_hash").unwrap()[0], vec![0x00, 0x01, 0xff]);
        assert_eq!(parsed.get("port").unwrap()[0], b"6881".to_vec());
    }

    #[test]
    fn test_parse_query_repeated_keys() {
        let parsed = parse_query(Some("info_hash=a&info_hash=b".to_string())).unwrap();
        assert_eq!(parsed.get("info_hash").unwrap().len(), 2);
    }

    #[test]
    fn test_parse_query_bare_key() {
        let parsed = parse_query(Some("compact".to_string())).unwrap();
        assert!(parsed.contains_key("compact"));
        assert!(parsed.get("compact").unwrap().is_empty());
    }

    #[test]
    fn test_hex_to_nibble_rejects_garbage() {
        assert_eq!(hex_to_nibble(b'a'), 10);
        assert_eq!(hex_to_nibble(b'F'), 15);
        assert_eq!(hex_to_nibble(b'g'), 0xFF);
    }
}
