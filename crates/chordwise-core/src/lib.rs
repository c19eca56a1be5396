pub mod adapter;
pub mod config;
pub mod engine;
pub mod fingerprint;
pub mod parser;
pub mod types;

pub use config::EngineConfig;
pub use engine::{callback, Callback, Command, Engine, OngoingMatch};
pub use fingerprint::Fingerprint;
pub use parser::ParseError;
pub use types::{ChordStep, Key, KeyPress, KeyboardEvent, Modifier, Modifiers};
