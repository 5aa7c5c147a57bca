use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use macaddr::MacAddr;
use measurements::{AngularVelocity, Current, Frequency, Power, Temperature, Voltage};
use serde::{Deserialize, Serialize};

use super::difficulty::{Difficulty, DifficultyParseError};
use super::hashrate::HashRate;
use super::pool::StratumPool;

/// One category of rejected shares and how often it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareRejectionReason {
    pub message: String,
    pub count: i32,
}

impl ShareRejectionReason {
    pub fn new(message: impl Into<String>, count: i32) -> Self {
        Self {
            message: message.into(),
            count,
        }
    }
}

/// A snapshot of the `system/info` status an ESP-Miner device reports.
///
/// Field order is the wire order used when encoding. Fields the device did
/// not report hold their zero value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryRecord {
    /// The network hostname of the miner
    pub hostname: String,
    /// The MAC address as reported, see [`TelemetryRecord::mac_address`]
    #[serde(rename = "macAddr")]
    pub mac_addr: String,

    /// Power draw in watts
    pub power: f64,
    /// Input voltage in millivolts
    pub voltage: f64,
    /// Input current in milliamperes
    pub current: f64,
    /// Power limit in watts
    #[serde(rename = "maxPower")]
    pub max_power: i32,
    /// Nominal supply voltage in volts
    #[serde(rename = "nominalVoltage")]
    pub nominal_voltage: i32,
    /// ASIC core voltage set point in millivolts
    #[serde(rename = "coreVoltage")]
    pub core_voltage: i32,
    /// Measured ASIC core voltage in millivolts
    #[serde(rename = "coreVoltageActual")]
    pub core_voltage_actual: i32,

    /// ASIC temperature in celsius
    pub temp: f64,
    /// Voltage regulator temperature in celsius
    #[serde(rename = "vrTemp")]
    pub vr_temp: i32,
    /// Target temperature for automatic fan control
    #[serde(rename = "temptarget")]
    pub temp_target: i32,
    pub overheat_mode: i32,

    /// Current hash rate in GH/s
    #[serde(rename = "hashRate")]
    pub hash_rate: f64,
    /// Expected hash rate in GH/s for the configured frequency
    #[serde(rename = "expectedHashrate")]
    pub expected_hashrate: i32,
    /// ASIC frequency in MHz
    pub frequency: i32,
    /// All-time best difficulty, kept as text since it may be suffixed or exceed u64
    #[serde(rename = "bestDiff")]
    pub best_diff: String,
    /// Best difficulty since boot
    #[serde(rename = "bestSessionDiff")]
    pub best_session_diff: String,
    /// Difficulty currently assigned by the pool
    #[serde(rename = "stratumDiff")]
    pub stratum_diff: i32,

    #[serde(rename = "sharesAccepted")]
    pub shares_accepted: i32,
    #[serde(rename = "sharesRejected")]
    pub shares_rejected: i32,
    /// Rejection reasons in the order the device reported them
    #[serde(rename = "sharesRejectedReasons")]
    pub shares_rejected_reasons: Vec<ShareRejectionReason>,

    #[serde(rename = "uptimeSeconds")]
    pub uptime_seconds: i32,
    /// Number of ASIC chips
    #[serde(rename = "asicCount")]
    pub asic_count: i32,
    /// Number of small cores per chip
    #[serde(rename = "smallCoreCount")]
    pub small_core_count: i32,
    /// ASIC model, e.g. `BM1370`
    #[serde(rename = "ASICModel")]
    pub asic_model: String,
    /// Firmware version
    pub version: String,
    /// ESP-IDF (platform) version
    #[serde(rename = "idfVersion")]
    pub idf_version: String,
    #[serde(rename = "boardVersion")]
    pub board_version: String,
    /// The OTA partition the firmware booted from
    #[serde(rename = "runningPartition")]
    pub running_partition: String,

    pub ssid: String,
    #[serde(rename = "wifiStatus")]
    pub wifi_status: String,
    /// Signal strength in dBm
    #[serde(rename = "wifiRSSI")]
    pub wifi_rssi: i32,
    #[serde(rename = "apEnabled")]
    pub ap_enabled: i32,
    #[serde(rename = "isUsingFallbackStratum")]
    pub is_using_fallback_stratum: i32,

    #[serde(rename = "stratumURL")]
    pub stratum_url: String,
    #[serde(rename = "fallbackStratumURL")]
    pub fallback_stratum_url: String,
    #[serde(rename = "stratumPort")]
    pub stratum_port: i32,
    #[serde(rename = "fallbackStratumPort")]
    pub fallback_stratum_port: i32,
    #[serde(rename = "stratumUser")]
    pub stratum_user: String,
    #[serde(rename = "fallbackStratumUser")]
    pub fallback_stratum_user: String,

    #[serde(rename = "isPSRAMAvailable")]
    pub is_psram_available: i32,
    /// Free heap in bytes
    #[serde(rename = "freeHeap")]
    pub free_heap: i64,

    #[serde(rename = "overclockEnabled")]
    pub overclock_enabled: i32,
    /// Display identifier, e.g. `SSD1306 (128x32)`
    pub display: String,
    #[serde(rename = "flipscreen")]
    pub flip_screen: i32,
    #[serde(rename = "invertscreen")]
    pub invert_screen: i32,
    /// Minutes before the display turns off, negative when disabled
    #[serde(rename = "displayTimeout")]
    pub display_timeout: i32,
    #[serde(rename = "autofanspeed")]
    pub auto_fan_speed: i32,
    /// Manual fan speed in percent
    #[serde(rename = "fanspeed")]
    pub fan_speed: i32,
    #[serde(rename = "fanrpm")]
    pub fan_rpm: i32,

    #[serde(rename = "statsLimit")]
    pub stats_limit: i32,
    #[serde(rename = "statsDuration")]
    pub stats_duration: i32,

    /// When this snapshot was collected. Set by the collector, never by the device.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collected_at: Option<DateTime<Utc>>,
}

impl TelemetryRecord {
    /// Attaches the collection time.
    pub fn with_collected_at(mut self, collected_at: DateTime<Utc>) -> Self {
        self.collected_at = Some(collected_at);
        self
    }

    pub fn mac_address(&self) -> Option<MacAddr> {
        MacAddr::from_str(self.mac_addr.trim()).ok()
    }

    pub fn wattage(&self) -> Power {
        Power::from_watts(self.power)
    }

    pub fn wattage_limit(&self) -> Power {
        Power::from_watts(f64::from(self.max_power))
    }

    pub fn input_voltage(&self) -> Voltage {
        Voltage::from_millivolts(self.voltage)
    }

    pub fn input_current(&self) -> Current {
        Current::from_milliamperes(self.current)
    }

    pub fn core_voltage(&self) -> Voltage {
        Voltage::from_millivolts(f64::from(self.core_voltage))
    }

    pub fn core_voltage_actual(&self) -> Voltage {
        Voltage::from_millivolts(f64::from(self.core_voltage_actual))
    }

    pub fn asic_frequency(&self) -> Frequency {
        Frequency::from_megahertz(f64::from(self.frequency))
    }

    pub fn chip_temperature(&self) -> Temperature {
        Temperature::from_celsius(self.temp)
    }

    pub fn vr_temperature(&self) -> Temperature {
        Temperature::from_celsius(f64::from(self.vr_temp))
    }

    pub fn fan_speed_rpm(&self) -> AngularVelocity {
        AngularVelocity::from_rpm(f64::from(self.fan_rpm))
    }

    /// Uptime, with negative values read as zero.
    pub fn uptime(&self) -> Duration {
        Duration::from_secs(u64::try_from(self.uptime_seconds).unwrap_or(0))
    }

    pub fn hashrate(&self) -> HashRate {
        HashRate::sha256_gigahash(self.hash_rate)
    }

    pub fn expected_hashrate(&self) -> HashRate {
        HashRate::sha256_gigahash(f64::from(self.expected_hashrate))
    }

    /// Efficiency in J/TH, `None` while the miner is not hashing.
    pub fn efficiency(&self) -> Option<f64> {
        (self.hash_rate > 0.0).then(|| self.wattage() / self.hashrate())
    }

    pub fn is_mining(&self) -> bool {
        self.hash_rate > 0.0
    }

    pub fn best_difficulty(&self) -> Result<Difficulty, DifficultyParseError> {
        self.best_diff.parse()
    }

    pub fn best_session_difficulty(&self) -> Result<Difficulty, DifficultyParseError> {
        self.best_session_diff.parse()
    }

    /// Fraction of submitted shares that were rejected, `None` before any share.
    pub fn reject_rate(&self) -> Option<f64> {
        let total = i64::from(self.shares_accepted) + i64::from(self.shares_rejected);
        (total > 0).then(|| self.shares_rejected as f64 / total as f64)
    }

    pub fn primary_pool(&self) -> StratumPool {
        StratumPool {
            url: self.stratum_url.clone(),
            port: u16::try_from(self.stratum_port).unwrap_or(0),
            user: self.stratum_user.clone(),
        }
    }

    pub fn fallback_pool(&self) -> StratumPool {
        StratumPool {
            url: self.fallback_stratum_url.clone(),
            port: u16::try_from(self.fallback_stratum_port).unwrap_or(0),
            user: self.fallback_stratum_user.clone(),
        }
    }

    /// The pool the device is currently mining on.
    pub fn active_pool(&self) -> StratumPool {
        if self.using_fallback_stratum() {
            self.fallback_pool()
        } else {
            self.primary_pool()
        }
    }

    pub fn using_fallback_stratum(&self) -> bool {
        self.is_using_fallback_stratum != 0
    }

    pub fn access_point_enabled(&self) -> bool {
        self.ap_enabled != 0
    }

    pub fn psram_available(&self) -> bool {
        self.is_psram_available != 0
    }

    pub fn overheating(&self) -> bool {
        self.overheat_mode != 0
    }

    pub fn overclock(&self) -> bool {
        self.overclock_enabled != 0
    }

    pub fn auto_fan(&self) -> bool {
        self.auto_fan_speed != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> TelemetryRecord {
        TelemetryRecord {
            hostname: "bitaxe-gamma".to_string(),
            mac_addr: "24:58:7C:CD:E1:2A".to_string(),
            power: 18.75,
            voltage: 5102.5,
            current: 3750.0,
            max_power: 40,
            core_voltage: 1200,
            core_voltage_actual: 1187,
            frequency: 525,
            temp: 58.25,
            vr_temp: 64,
            hash_rate: 1250.0,
            best_diff: "4.5G".to_string(),
            best_session_diff: "garbage".to_string(),
            shares_accepted: 990,
            shares_rejected: 10,
            uptime_seconds: 3600,
            stratum_url: "public-pool.io".to_string(),
            stratum_port: 21496,
            stratum_user: "bc1qexample.gamma".to_string(),
            fallback_stratum_url: "solo.ckpool.org".to_string(),
            fallback_stratum_port: 3333,
            fan_rpm: 4200,
            ..Default::default()
        }
    }

    #[test]
    fn unit_projections() {
        let record = sample();
        assert!((record.wattage().as_watts() - 18.75).abs() < 1e-9);
        assert!((record.input_voltage().as_volts() - 5.1025).abs() < 1e-9);
        assert!((record.input_current().as_amperes() - 3.75).abs() < 1e-9);
        assert!((record.core_voltage().as_volts() - 1.2).abs() < 1e-9);
        assert!((record.core_voltage_actual().as_volts() - 1.187).abs() < 1e-9);
        assert!((record.wattage_limit().as_watts() - 40.0).abs() < 1e-9);
        assert!((record.asic_frequency().as_megahertz() - 525.0).abs() < 1e-9);
        assert!((record.chip_temperature().as_celsius() - 58.25).abs() < 1e-9);
        assert!((record.fan_speed_rpm().as_rpm() - 4200.0).abs() < 1e-6);
        assert_eq!(record.uptime(), Duration::from_secs(3600));
    }

    #[test]
    fn mac_address_parses() {
        let record = sample();
        let mac = record.mac_address().unwrap();
        assert_eq!(mac.to_string(), "24:58:7C:CD:E1:2A");

        let blank = TelemetryRecord::default();
        assert!(blank.mac_address().is_none());
    }

    #[test]
    fn efficiency_requires_hashing() {
        let record = sample();
        assert!((record.efficiency().unwrap() - 15.0).abs() < 1e-9);
        assert!(record.is_mining());

        let idle = TelemetryRecord::default();
        assert_eq!(idle.efficiency(), None);
        assert!(!idle.is_mining());
    }

    #[test]
    fn difficulties() {
        let record = sample();
        assert_eq!(record.best_difficulty(), Ok(Difficulty(4.5e9)));
        assert!(record.best_session_difficulty().is_err());
    }

    #[test]
    fn reject_rate() {
        assert_eq!(sample().reject_rate(), Some(0.01));
        assert_eq!(TelemetryRecord::default().reject_rate(), None);
    }

    #[test]
    fn active_pool_follows_fallback_flag() {
        let mut record = sample();
        assert_eq!(record.active_pool().url, "public-pool.io");

        record.is_using_fallback_stratum = 1;
        let active = record.active_pool();
        assert_eq!(active.url, "solo.ckpool.org");
        assert_eq!(active.port, 3333);
    }

    #[test]
    fn negative_values_clamp_in_projections() {
        let record = TelemetryRecord {
            uptime_seconds: -5,
            stratum_port: 70_000,
            ..Default::default()
        };
        assert_eq!(record.uptime(), Duration::ZERO);
        assert_eq!(record.primary_pool().port, 0);
    }

    #[test]
    fn collected_at_builder() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let record = TelemetryRecord::default().with_collected_at(at);
        assert_eq!(record.collected_at, Some(at));
    }
}
