use std::io::Write;
use std::path::PathBuf;

use asic_telemetry::logging::{DEFAULT_FILTER, init_tracing};
use asic_telemetry::{NumericPolicy, TelemetryCodec};
use chrono::Utc;
use clap::Parser;

/// Decode a saved `system/info` payload and print it normalized.
#[derive(Debug, Parser)]
#[command(name = "asic-telemetry", version)]
struct Args {
    /// Payload file, bare JSON or an HTML page wrapping it
    path: PathBuf,
    /// How integer fields treat fractional or out-of-range numbers
    #[arg(default_value_t)]
    policy: NumericPolicy,
    /// Emit log lines as JSON
    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(DEFAULT_FILTER, args.log_json);

    let payload = std::fs::read(&args.path)?;
    let codec = TelemetryCodec::new()
        .with_numeric_policy(args.policy)
        .with_envelope_unwrapping(true);

    let record = codec.decode(&payload)?.with_collected_at(Utc::now());

    tracing::info!(
        path = %args.path.display(),
        hostname = %record.hostname,
        model = %record.asic_model,
        hashrate = %record.hashrate(),
        temp = record.temp,
        efficiency = ?record.efficiency(),
        "decoded payload"
    );
    if let Ok(endpoint) = record.active_pool().endpoint() {
        tracing::info!(%endpoint, fallback = record.using_fallback_stratum(), "active pool");
    }

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&codec.encode_pretty(&record)?)?;
    writeln!(stdout)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn policy_defaults_to_reject() {
        let args = Args::try_parse_from(["asic-telemetry", "info.json"]).unwrap();
        assert_eq!(args.path, PathBuf::from("info.json"));
        assert_eq!(args.policy, NumericPolicy::Reject);
        assert!(!args.log_json);
    }

    #[test]
    fn policy_and_flags_parse() {
        let args =
            Args::try_parse_from(["asic-telemetry", "info.json", "saturate", "--log-json"]).unwrap();
        assert_eq!(args.policy, NumericPolicy::Saturate);
        assert!(args.log_json);
    }

    #[test]
    fn missing_path_and_bad_policy_are_rejected() {
        assert!(Args::try_parse_from(["asic-telemetry"]).is_err());
        assert!(Args::try_parse_from(["asic-telemetry", "info.json", "round"]).is_err());
    }
}
