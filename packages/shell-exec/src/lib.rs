pub mod argmap;
pub mod argument;
pub mod builtins;
pub mod classify;
pub mod command;
pub mod commander;
pub mod completer;
pub mod config;
pub mod control;
pub mod error;
pub mod executor;
pub mod flag;
pub mod host;

#[cfg(test)]
pub mod test_support;
