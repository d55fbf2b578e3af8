//! KoordBook: a Telegram diary bot for coordinators' meetings with
//! first-year students.

pub mod bot;
pub mod channels;
pub mod config;
pub mod error;
pub mod store;
pub mod survey;
