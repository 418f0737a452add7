//! Upgrade flow adapters - where upsell triggers end up.
//!
//! - `ChannelUpgradeFlow` - Forwards triggers to a UI task over a channel
//! - `LoggingUpgradeFlow` - Writes triggers to the log (headless runs)
//! - `RecordingUpgradeFlow` - Keeps triggers in memory for assertions

mod channel;
mod logging;
mod recording;

pub use channel::ChannelUpgradeFlow;
pub use logging::LoggingUpgradeFlow;
pub use recording::RecordingUpgradeFlow;
