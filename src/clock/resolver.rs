//! Location-to-time resolution.
//!
//! Known location names resolve through a static timezone table with zero
//! latency. Unmatched locations fall back to a coordinate lookup against a
//! remote time API, with results cached for an hour per coordinate pair.

use super::ClockError;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Cache freshness window for coordinate lookups.
const CACHE_TTL: Duration = Duration::from_secs(3600);

/// HTTP timeout for the fallback API.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Static location-name to IANA-timezone table.
///
/// Matched by substring against the lowercased query, first match in
/// declared order wins. Exact city names are declared before country
/// names so "hanoi, vietnam" resolves through the city entry.
const TIMEZONE_TABLE: &[(&str, &str)] = &[
    ("hanoi", "Asia/Ho_Chi_Minh"),
    ("ha noi", "Asia/Ho_Chi_Minh"),
    ("hà nội", "Asia/Ho_Chi_Minh"),
    ("ho chi minh", "Asia/Ho_Chi_Minh"),
    ("hồ chí minh", "Asia/Ho_Chi_Minh"),
    ("saigon", "Asia/Ho_Chi_Minh"),
    ("sài gòn", "Asia/Ho_Chi_Minh"),
    ("da nang", "Asia/Ho_Chi_Minh"),
    ("đà nẵng", "Asia/Ho_Chi_Minh"),
    ("tokyo", "Asia/Tokyo"),
    ("seoul", "Asia/Seoul"),
    ("beijing", "Asia/Shanghai"),
    ("shanghai", "Asia/Shanghai"),
    ("bangkok", "Asia/Bangkok"),
    ("singapore", "Asia/Singapore"),
    ("new york", "America/New_York"),
    ("los angeles", "America/Los_Angeles"),
    ("london", "Europe/London"),
    ("paris", "Europe/Paris"),
    ("berlin", "Europe/Berlin"),
    ("moscow", "Europe/Moscow"),
    ("sydney", "Australia/Sydney"),
    ("vietnam", "Asia/Ho_Chi_Minh"),
    ("viet nam", "Asia/Ho_Chi_Minh"),
    ("việt nam", "Asia/Ho_Chi_Minh"),
    ("japan", "Asia/Tokyo"),
    ("korea", "Asia/Seoul"),
    ("china", "Asia/Shanghai"),
    ("thailand", "Asia/Bangkok"),
    ("india", "Asia/Kolkata"),
];

/// Static city coordinates for the remote fallback.
const COORDINATE_TABLE: &[(&str, f64, f64)] = &[
    ("hanoi", 21.0285, 105.8542),
    ("ho chi minh", 10.8231, 106.6297),
    ("da nang", 16.0544, 108.2022),
    ("tokyo", 35.6762, 139.6503),
    ("seoul", 37.5665, 126.9780),
    ("beijing", 39.9042, 116.4074),
    ("bangkok", 13.7563, 100.5018),
    ("singapore", 1.3521, 103.8198),
    ("new york", 40.7128, -74.0060),
    ("london", 51.5074, -0.1278),
    ("paris", 48.8566, 2.3522),
    ("sydney", -33.8688, 151.2093),
    ("chicago", 41.8781, -87.6298),
    ("dubai", 25.2048, 55.2708),
];

/// How a time result was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSource {
    /// Static timezone table plus the system clock
    LocalTable,
    /// Fresh remote coordinate lookup
    CoordinateApi,
    /// Cached remote coordinate lookup
    CoordinateCache,
}

/// A resolved time for a queried location.
#[derive(Debug, Clone)]
pub struct ResolvedTime {
    /// Matched location label
    pub location: String,
    /// Timezone name the result is expressed in
    pub zone_name: String,
    /// Current time at the location
    pub time: DateTime<FixedOffset>,
    /// How the result was obtained
    pub source: TimeSource,
}

impl ResolvedTime {
    /// Human-readable summary line.
    pub fn summary(&self) -> String {
        format!(
            "{}: {} ({})",
            self.location,
            self.time.format("%H:%M:%S %d/%m/%Y"),
            self.zone_name
        )
    }
}

/// Cached result of a coordinate lookup.
#[derive(Debug, Clone)]
struct TimeCacheEntry {
    /// Local epoch seconds reported by the API (offset already applied)
    timestamp: i64,
    zone_name: String,
    gmt_offset: i32,
    fetched_at: Instant,
}

impl TimeCacheEntry {
    fn is_fresh(&self) -> bool {
        self.fetched_at.elapsed() < CACHE_TTL
    }
}

/// Remote API response shape.
#[derive(Debug, Deserialize)]
struct TimeApiResponse {
    status: String,
    #[serde(rename = "zoneName")]
    zone_name: String,
    #[serde(rename = "gmtOffset")]
    gmt_offset: i32,
    timestamp: i64,
}

/// Resolves location queries to current wall-clock times.
pub struct TimeResolver {
    home: Tz,
    api_key: Option<String>,
    http: reqwest::blocking::Client,
    cache: Mutex<HashMap<String, TimeCacheEntry>>,
}

impl TimeResolver {
    /// Create a resolver with the given home timezone and optional API key.
    pub fn new(home_timezone: &str, api_key: Option<String>) -> Result<Self, ClockError> {
        let home: Tz = home_timezone
            .parse()
            .map_err(|_| ClockError::InvalidZone(home_timezone.to_string()))?;

        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClockError::NetworkError(e.to_string()))?;

        Ok(Self {
            home,
            api_key,
            http,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// The configured home timezone.
    pub fn home_timezone(&self) -> Tz {
        self.home
    }

    /// Current time in the home timezone. Never touches the network.
    pub fn home_now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.home)
    }

    /// Resolve the current time at a named location.
    ///
    /// The static table is consulted first; only unmatched locations reach
    /// the coordinate fallback, so this is never a network call for known
    /// names.
    pub fn resolve(&self, location: &str) -> Result<ResolvedTime, ClockError> {
        let query = location.trim().to_lowercase();

        for (name, zone) in TIMEZONE_TABLE {
            if query.contains(name) {
                let tz: Tz = zone
                    .parse()
                    .map_err(|_| ClockError::InvalidZone(zone.to_string()))?;
                let now = Utc::now().with_timezone(&tz);
                tracing::debug!(location = %name, zone = %zone, "resolved via timezone table");
                return Ok(ResolvedTime {
                    location: (*name).to_string(),
                    zone_name: (*zone).to_string(),
                    time: now.with_timezone(&now.offset().fix()),
                    source: TimeSource::LocalTable,
                });
            }
        }

        let (name, lat, lng) = COORDINATE_TABLE
            .iter()
            .find(|(name, _, _)| query.contains(name))
            .ok_or_else(|| ClockError::UnknownLocation(location.to_string()))?;

        self.resolve_by_coordinates(name, *lat, *lng)
    }

    fn resolve_by_coordinates(
        &self,
        label: &str,
        lat: f64,
        lng: f64,
    ) -> Result<ResolvedTime, ClockError> {
        let key = cache_key(lat, lng);

        if let Some(entry) = self.cache_lookup(&key) {
            tracing::debug!(location = label, "coordinate cache hit");
            return entry_to_time(label, &entry, TimeSource::CoordinateCache);
        }

        let api_key = self.api_key.as_deref().ok_or(ClockError::ApiKeyMissing)?;
        let url = build_url(api_key, lat, lng);

        tracing::debug!(location = label, "fetching time by coordinates");
        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|e| ClockError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClockError::ApiError(format!("HTTP {}", response.status())));
        }

        let body: TimeApiResponse = response
            .json()
            .map_err(|e| ClockError::ApiError(e.to_string()))?;

        if body.status != "OK" {
            return Err(ClockError::ApiError(format!(
                "API returned status {}",
                body.status
            )));
        }

        let entry = TimeCacheEntry {
            timestamp: body.timestamp,
            zone_name: body.zone_name,
            gmt_offset: body.gmt_offset,
            fetched_at: Instant::now(),
        };

        self.cache
            .lock()
            .unwrap()
            .insert(key, entry.clone());

        entry_to_time(label, &entry, TimeSource::CoordinateApi)
    }

    /// Look up a fresh cache entry, lazily evicting an expired one.
    fn cache_lookup(&self, key: &str) -> Option<TimeCacheEntry> {
        let mut cache = self.cache.lock().unwrap();
        match cache.get(key) {
            Some(entry) if entry.is_fresh() => Some(entry.clone()),
            Some(_) => {
                cache.remove(key);
                None
            }
            None => None,
        }
    }
}

fn cache_key(lat: f64, lng: f64) -> String {
    format!("{lat:.4},{lng:.4}")
}

fn build_url(api_key: &str, lat: f64, lng: f64) -> String {
    format!(
        "http://api.timezonedb.com/v2.1/get-time-zone?key={api_key}&format=json&by=position&lat={lat}&lng={lng}"
    )
}

/// Convert a cache entry into a current time.
///
/// The API reports local epoch seconds with the offset already applied;
/// cached entries advance by the wall time elapsed since the fetch so a
/// near-expiry entry still reports the current minute.
fn entry_to_time(
    label: &str,
    entry: &TimeCacheEntry,
    source: TimeSource,
) -> Result<ResolvedTime, ClockError> {
    let offset = FixedOffset::east_opt(entry.gmt_offset)
        .ok_or_else(|| ClockError::ApiError(format!("invalid gmtOffset {}", entry.gmt_offset)))?;

    let elapsed = entry.fetched_at.elapsed().as_secs() as i64;
    let utc_secs = entry.timestamp - i64::from(entry.gmt_offset) + elapsed;
    let utc = DateTime::from_timestamp(utc_secs, 0)
        .ok_or_else(|| ClockError::ApiError(format!("invalid timestamp {}", entry.timestamp)))?;

    Ok(ResolvedTime {
        location: label.to_string(),
        zone_name: entry.zone_name.clone(),
        time: utc.with_timezone(&offset),
        source,
    })
}
