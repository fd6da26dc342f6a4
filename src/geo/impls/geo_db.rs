use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use log::{info, warn};
use crate::common::structs::custom_error::CustomError;
use crate::geo::structs::geo_db::{GeoDb, GeoLocation, GeoRange};

fn ip_to_u128(ip: IpAddr) -> u128 {
    match ip {
        IpAddr::V4(v4) => u128::from(v4.to_ipv6_mapped()),
        IpAddr::V6(v6) => u128::from(v6),
    }
}

fn parse_ip_field(field: &str) -> Option<u128> {
    if let Ok(ip) = IpAddr::from_str(field) {
        return Some(ip_to_u128(ip));
    }
    // Numeric form, as some datasets ship IPv4 as plain integers.
    field.parse::<u32>().ok().map(|n| ip_to_u128(IpAddr::V4(Ipv4Addr::from(n))))
}

impl GeoDb {
    /// Loads a dataset of `start_ip,end_ip,country,latitude,longitude`
    /// lines. Malformed lines are skipped with a warning rather than
    /// failing the load, since geo data is best-effort by contract.
    pub fn load(path: &str) -> Result<GeoDb, CustomError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| CustomError::new(&format!("could not read geo dataset {}: {}", path, e)))?;
        let mut ranges = Vec::new();
        for (line_number, line) in data.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split(',').map(|f| f.trim().trim_matches('"')).collect();
            if fields.len() < 5 {
                warn!("[Geo] skipping line {}: expected 5 fields", line_number + 1);
                continue;
            }
            let parsed = (
                parse_ip_field(fields[0]),
                parse_ip_field(fields[1]),
                fields[3].parse::<f64>(),
                fields[4].parse::<f64>(),
            );
            match parsed {
                (Some(start), Some(end), Ok(latitude), Ok(longitude)) if start <= end => {
                    ranges.push(GeoRange {
                        start,
                        end,
                        country: fields[2].to_uppercase(),
                        latitude,
                        longitude,
                    });
                }
                _ => warn!("[Geo] skipping line {}: malformed range", line_number + 1),
            }
        }
        ranges.sort_by_key(|r| r.start);
        info!("[Geo] loaded {} ranges from {}", ranges.len(), path);
        Ok(GeoDb { ranges })
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Binary search over the sorted ranges. Returns `None` for
    /// addresses outside every range.
    pub fn lookup(&self, ip: IpAddr) -> Option<GeoLocation> {
        let needle = ip_to_u128(ip);
        let index = self.ranges.partition_point(|r| r.start <= needle);
        if index == 0 {
            return None;
        }
        let range = &self.ranges[index - 1];
        if needle > range.end {
            return None;
        }
        Some(GeoLocation {
            country: range.country.clone(),
            latitude: range.latitude,
            longitude: range.longitude,
        })
    }
}

/// Great-circle distance in kilometers, used to order peer lists with
/// nearer peers first.
pub fn distance_km(a: &GeoLocation, b: &GeoLocation) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;
    let (lat_a, lon_a) = (a.latitude.to_radians(), a.longitude.to_radians());
    let (lat_b, lon_b) = (b.latitude.to_radians(), b.longitude.to_radians());
    let dlat = lat_b - lat_a;
    let dlon = lon_b - lon_a;
    let h = (dlat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}
