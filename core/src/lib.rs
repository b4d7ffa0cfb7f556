#![no_std]

extern crate alloc;

pub use achievements::*;
pub use battle::*;
pub use boss::*;
pub use controller::*;
pub use effect::*;
pub use error::*;
pub use history::*;
pub use profile::*;
pub use shop::*;
pub use timer::*;
pub use tutorial::*;
pub use types::*;

mod achievements;
mod battle;
mod boss;
mod controller;
mod effect;
mod error;
mod history;
mod profile;
mod shop;
mod timer;
mod tutorial;
mod types;
