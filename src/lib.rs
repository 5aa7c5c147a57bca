//! Typed access to the `system/info` status payload of ESP-Miner based ASIC
//! miners (BitAxe and derivatives).
//!
//! ```
//! use asic_telemetry::codec::{TelemetryCodec, NumericPolicy};
//!
//! let codec = TelemetryCodec::new().with_numeric_policy(NumericPolicy::Truncate);
//! let record = codec.decode(br#"{"hostname": "bitaxe", "hashRate": 1063.4, "vrTemp": 49.5}"#).unwrap();
//! assert_eq!(record.vr_temp, 49);
//! ```

pub mod codec;
pub mod data;
pub mod logging;

pub use codec::{DecodeError, EncodeError, NumericPolicy, TelemetryCodec, decode, encode};
pub use data::telemetry::{ShareRejectionReason, TelemetryRecord};
