//! Built-in vendor platform definitions.

pub mod cisco_ios;
pub mod cisco_nxos;
