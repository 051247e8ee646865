//! Terminal presentation for the `tsflow` binary

pub mod blocks;
pub mod ci;
pub mod components;
pub mod context;
pub mod json;
pub mod output;
pub mod primitives;
pub mod terminal;
pub mod theme;
pub mod views;
