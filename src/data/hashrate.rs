use measurements::Power;
use std::fmt;
use std::ops::Div;
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
pub enum HashRateUnit {
    #[strum(serialize = "H/s")]
    Hash,
    #[strum(serialize = "KH/s")]
    KiloHash,
    #[strum(serialize = "MH/s")]
    MegaHash,
    #[strum(serialize = "GH/s")]
    GigaHash,
    #[strum(serialize = "TH/s")]
    TeraHash,
    #[strum(serialize = "PH/s")]
    PetaHash,
    #[strum(serialize = "EH/s")]
    ExaHash,
    #[strum(serialize = "ZH/s")]
    ZettaHash,
    #[strum(serialize = "YH/s")]
    YottaHash,
}

impl HashRateUnit {
    /// Number of hashes per second one of this unit represents.
    pub fn multiplier(self) -> f64 {
        let exponent = match self {
            HashRateUnit::Hash => 0,
            HashRateUnit::KiloHash => 3,
            HashRateUnit::MegaHash => 6,
            HashRateUnit::GigaHash => 9,
            HashRateUnit::TeraHash => 12,
            HashRateUnit::PetaHash => 15,
            HashRateUnit::ExaHash => 18,
            HashRateUnit::ZettaHash => 21,
            HashRateUnit::YottaHash => 24,
        };
        10f64.powi(exponent)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HashRate {
    /// The current amount of hashes being computed
    pub value: f64,
    /// The unit of the hashes in value
    pub unit: HashRateUnit,
    /// The algorithm of the computed hashes
    pub algo: String,
}

impl HashRate {
    /// A SHA256 hash rate as reported by ESP-Miner, which always uses GH/s.
    pub fn sha256_gigahash(value: f64) -> Self {
        HashRate {
            value,
            unit: HashRateUnit::GigaHash,
            algo: String::from("SHA256"),
        }
    }

    /// The same rate expressed in another unit.
    pub fn to_unit(&self, unit: HashRateUnit) -> HashRate {
        HashRate {
            value: self.value * self.unit.multiplier() / unit.multiplier(),
            unit,
            algo: self.algo.clone(),
        }
    }
}

impl fmt::Display for HashRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.value, self.unit)
    }
}

/// Efficiency in joules per terahash (W/TH/s).
impl Div<HashRate> for Power {
    type Output = f64;

    fn div(self, hash_rate: HashRate) -> Self::Output {
        self.as_watts() / hash_rate.to_unit(HashRateUnit::TeraHash).value
    }
}
