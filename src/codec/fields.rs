use serde_json::{Map, Value};
use strum::{EnumIter, EnumString, IntoStaticStr};

/// The semantic type a wire field is converted to on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Any JSON number, stored as `f64`.
    Float,
    /// A 32-bit signed integer, also used for the device's 0/1 flags.
    Int32,
    /// A 64-bit signed integer.
    Int64,
    /// A JSON string.
    Text,
    /// The ordered list of `{message, count}` share rejection reasons.
    RejectReasons,
    /// An RFC 3339 timestamp attached after collection.
    Timestamp,
}

impl FieldKind {
    /// Human readable name used in decode errors.
    pub fn describe(self) -> &'static str {
        match self {
            FieldKind::Float => "number",
            FieldKind::Int32 => "32-bit integer",
            FieldKind::Int64 => "64-bit integer",
            FieldKind::Text => "string",
            FieldKind::RejectReasons => "array of rejection reasons",
            FieldKind::Timestamp => "RFC 3339 timestamp",
        }
    }
}

/// Every key of the `system/info` payload understood by the codec.
///
/// Variants are listed in schema declaration order, which is also the order
/// the encoder writes keys in.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, EnumIter, EnumString, IntoStaticStr)]
pub enum WireField {
    #[strum(serialize = "hostname")]
    Hostname,
    #[strum(serialize = "macAddr")]
    MacAddr,
    #[strum(serialize = "power")]
    Power,
    #[strum(serialize = "voltage")]
    Voltage,
    #[strum(serialize = "current")]
    Current,
    #[strum(serialize = "maxPower")]
    MaxPower,
    #[strum(serialize = "nominalVoltage")]
    NominalVoltage,
    #[strum(serialize = "coreVoltage")]
    CoreVoltage,
    #[strum(serialize = "coreVoltageActual")]
    CoreVoltageActual,
    #[strum(serialize = "temp")]
    Temp,
    #[strum(serialize = "vrTemp")]
    VrTemp,
    #[strum(serialize = "temptarget")]
    TempTarget,
    #[strum(serialize = "overheat_mode")]
    OverheatMode,
    #[strum(serialize = "hashRate")]
    HashRate,
    #[strum(serialize = "expectedHashrate")]
    ExpectedHashrate,
    #[strum(serialize = "frequency")]
    Frequency,
    #[strum(serialize = "bestDiff")]
    BestDiff,
    #[strum(serialize = "bestSessionDiff")]
    BestSessionDiff,
    #[strum(serialize = "stratumDiff")]
    StratumDiff,
    #[strum(serialize = "sharesAccepted")]
    SharesAccepted,
    #[strum(serialize = "sharesRejected")]
    SharesRejected,
    #[strum(serialize = "sharesRejectedReasons")]
    SharesRejectedReasons,
    #[strum(serialize = "uptimeSeconds")]
    UptimeSeconds,
    #[strum(serialize = "asicCount")]
    AsicCount,
    #[strum(serialize = "smallCoreCount")]
    SmallCoreCount,
    #[strum(serialize = "ASICModel")]
    AsicModel,
    #[strum(serialize = "version")]
    Version,
    #[strum(serialize = "idfVersion")]
    IdfVersion,
    #[strum(serialize = "boardVersion")]
    BoardVersion,
    #[strum(serialize = "runningPartition")]
    RunningPartition,
    #[strum(serialize = "ssid")]
    Ssid,
    #[strum(serialize = "wifiStatus")]
    WifiStatus,
    #[strum(serialize = "wifiRSSI")]
    WifiRssi,
    #[strum(serialize = "apEnabled")]
    ApEnabled,
    #[strum(serialize = "isUsingFallbackStratum")]
    IsUsingFallbackStratum,
    #[strum(serialize = "stratumURL")]
    StratumUrl,
    #[strum(serialize = "fallbackStratumURL")]
    FallbackStratumUrl,
    #[strum(serialize = "stratumPort")]
    StratumPort,
    #[strum(serialize = "fallbackStratumPort")]
    FallbackStratumPort,
    #[strum(serialize = "stratumUser")]
    StratumUser,
    #[strum(serialize = "fallbackStratumUser")]
    FallbackStratumUser,
    #[strum(serialize = "isPSRAMAvailable")]
    IsPsramAvailable,
    #[strum(serialize = "freeHeap")]
    FreeHeap,
    #[strum(serialize = "overclockEnabled")]
    OverclockEnabled,
    #[strum(serialize = "display")]
    Display,
    #[strum(serialize = "flipscreen")]
    FlipScreen,
    #[strum(serialize = "invertscreen")]
    InvertScreen,
    #[strum(serialize = "displayTimeout")]
    DisplayTimeout,
    #[strum(serialize = "autofanspeed")]
    AutoFanSpeed,
    #[strum(serialize = "fanspeed")]
    FanSpeed,
    #[strum(serialize = "fanrpm")]
    FanRpm,
    #[strum(serialize = "statsLimit")]
    StatsLimit,
    #[strum(serialize = "statsDuration")]
    StatsDuration,
    #[strum(serialize = "collected_at")]
    CollectedAt,
}

impl WireField {
    /// The exact key used in the JSON payload.
    pub fn wire_name(self) -> &'static str {
        self.into()
    }

    /// Looks up a field by its wire name. Matching is case sensitive.
    pub fn from_wire_name(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    pub fn kind(self) -> FieldKind {
        use WireField::*;

        match self {
            Power | Voltage | Current | Temp | HashRate => FieldKind::Float,
            MaxPower | NominalVoltage | CoreVoltage | CoreVoltageActual | VrTemp | TempTarget
            | OverheatMode | ExpectedHashrate | Frequency | StratumDiff | SharesAccepted
            | SharesRejected | UptimeSeconds | AsicCount | SmallCoreCount | WifiRssi | ApEnabled
            | IsUsingFallbackStratum | StratumPort | FallbackStratumPort | IsPsramAvailable
            | OverclockEnabled | FlipScreen | InvertScreen | DisplayTimeout | AutoFanSpeed
            | FanSpeed | FanRpm | StatsLimit | StatsDuration => FieldKind::Int32,
            FreeHeap => FieldKind::Int64,
            Hostname | MacAddr | BestDiff | BestSessionDiff | AsicModel | Version | IdfVersion
            | BoardVersion | RunningPartition | Ssid | WifiStatus | StratumUrl
            | FallbackStratumUrl | StratumUser | FallbackStratumUser | Display => FieldKind::Text,
            SharesRejectedReasons => FieldKind::RejectReasons,
            CollectedAt => FieldKind::Timestamp,
        }
    }
}

/// Extracts the value for a field from a payload object (flat lookup).
///
/// A JSON `null` is reported as absent, the device uses it for unset values.
pub fn get_by_key(data: &Map<String, Value>, field: WireField) -> Option<&Value> {
    data.get(field.wire_name()).filter(|value| !value.is_null())
}

/// Returns the keys of a payload object that no `WireField` claims.
pub fn unknown_keys(data: &Map<String, Value>) -> impl Iterator<Item = &str> {
    data.keys()
        .map(String::as_str)
        .filter(|key| WireField::from_wire_name(key).is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;
    use strum::IntoEnumIterator;

    #[test]
    fn wire_names_are_unique() {
        let names: HashSet<&str> = WireField::iter().map(WireField::wire_name).collect();
        assert_eq!(names.len(), WireField::iter().count());
    }

    #[test]
    fn lookup_by_wire_name() {
        assert_eq!(WireField::from_wire_name("ASICModel"), Some(WireField::AsicModel));
        assert_eq!(WireField::from_wire_name("asicmodel"), None);
        assert_eq!(WireField::from_wire_name("overheat_mode"), Some(WireField::OverheatMode));
        assert_eq!(WireField::from_wire_name("stratumURL"), Some(WireField::StratumUrl));
        assert_eq!(WireField::from_wire_name("StratumUrl"), None);
    }

    #[test]
    fn every_variant_parses_from_its_wire_name() {
        for field in WireField::iter() {
            assert_eq!(WireField::from_wire_name(field.wire_name()), Some(field));
        }
    }

    #[test]
    fn kinds_match_schema() {
        assert_eq!(WireField::HashRate.kind(), FieldKind::Float);
        assert_eq!(WireField::ExpectedHashrate.kind(), FieldKind::Int32);
        assert_eq!(WireField::FreeHeap.kind(), FieldKind::Int64);
        assert_eq!(WireField::BestDiff.kind(), FieldKind::Text);
        assert_eq!(WireField::ApEnabled.kind(), FieldKind::Int32);
        assert_eq!(WireField::Display.kind(), FieldKind::Text);
        assert_eq!(WireField::Temp.kind(), FieldKind::Float);
        assert_eq!(WireField::CollectedAt.kind(), FieldKind::Timestamp);
    }

    #[test]
    fn null_values_read_as_absent() {
        let payload = json!({ "hostname": null, "temp": 51.2, "extra": 1 });
        let object = payload.as_object().unwrap();

        assert!(get_by_key(object, WireField::Hostname).is_none());
        assert_eq!(get_by_key(object, WireField::Temp), Some(&json!(51.2)));
        assert_eq!(unknown_keys(object).collect::<Vec<_>>(), vec!["extra"]);
    }
}
