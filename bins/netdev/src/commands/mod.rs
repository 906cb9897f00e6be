//! netdev command implementations.

pub mod link;
pub mod monitor;
pub mod status;
pub mod wait;

use std::io::Write;

use serde::Serialize;

/// Output settings shared by all commands.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
    pub pretty: bool,
}

impl Output {
    /// Write `value` as one JSON document followed by a newline.
    pub fn write_json<W: Write, T: Serialize + ?Sized>(
        &self,
        out: &mut W,
        value: &T,
    ) -> anyhow::Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut *out, value)?;
        } else {
            serde_json::to_writer(&mut *out, value)?;
        }
        writeln!(out)?;
        Ok(())
    }
}
