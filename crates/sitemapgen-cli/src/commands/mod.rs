//! CLI command implementations.

pub(crate) mod generate;
mod input;

pub(crate) use generate::GenerateArgs;
pub(crate) use input::EntryError;
