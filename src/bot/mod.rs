//! # Bot Command Poller
//!
//! Long-polls the Telegram Bot API for chat messages and answers the two
//! commands the bot understands: `/start` greets the user and `/todo` offers
//! a keyboard button that opens the mini app. Everything else is ignored.

pub mod commands;
pub mod poller;

pub use commands::{BotCommand, CommandResponder};
pub use poller::{BotCommandPoller, BotPollerConfig};
