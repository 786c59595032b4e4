use derive_builder::Builder;

use std::time::Duration;

/// How long the dispatch loop dozes between passes when nothing is pending.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Minimum spacing Twitch requires between regular IRC writes.
pub const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(1750);

/// Host token used to address keepalive lines.
pub const DEFAULT_SERVER_HOST: &str = "tmi.twitch.tv";

/// Dispatcher configuration for one connection.
#[derive(Builder, Clone, Debug)]
pub struct Config {
    /// Channel that chat messages are addressed to, without the leading `#`.
    #[builder(setter(into))]
    pub channel: String,
    /// Host token used when formatting `PING`/`PONG` lines.
    #[builder(setter(into), default = "DEFAULT_SERVER_HOST.to_owned()")]
    pub server_host: String,
    /// Idle wake-up period of the dispatch loop.
    #[builder(default = "DEFAULT_TICK_INTERVAL")]
    pub tick_interval: Duration,
    /// Minimum spacing enforced after each regular send.
    #[builder(default = "DEFAULT_RATE_LIMIT")]
    pub rate_limit: Duration,
}
