pub mod config;
pub mod line;
pub mod outbox;
pub mod send;
pub mod shutdown;
pub mod transport;

pub use config::{
    Config, ConfigBuilder, ConfigBuilderError, DEFAULT_RATE_LIMIT, DEFAULT_SERVER_HOST,
    DEFAULT_TICK_INTERVAL,
};
pub use line::Line;
pub use outbox::Outbox;
pub use send::SendLoop;
pub use shutdown::Shutdown;
pub use transport::{LineTransmitter, Transmit, TxError};
