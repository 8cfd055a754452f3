//! Test harness for CLI integration tests.
//!
//! Provides isolated test environments, seeded subscriptions,
//! and CLI assertion helpers using `assert_cmd`.

mod command;
mod env;
mod subscription;

// Re-export main types for external use
#[allow(unused_imports)]
pub use command::RadarCommand;
#[allow(unused_imports)]
pub use env::TestEnv;
#[allow(unused_imports)]
pub use subscription::TestSubscription;
