//! External collaborators behind traits, with the default implementations

pub mod backend;
pub mod market_data;
pub mod notifier;
pub mod recording;
pub mod retry;
pub mod sink;
pub mod store;

pub use backend::HttpBackend;
pub use market_data::{MarketDataProvider, SimulatedMarketData};
pub use notifier::{LogNotifier, Notifier};
pub use recording::RecordingSink;
pub use retry::RetryPolicy;
pub use sink::{SignalSink, StatusSink};
pub use store::{InMemoryParameterStore, JsonFileParameterStore, ParameterStore};
