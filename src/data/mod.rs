pub mod difficulty;
pub mod hashrate;
pub mod pool;
pub mod telemetry;
