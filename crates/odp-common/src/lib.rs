//! Shared foundation for the ODP upload tools.
//!
//! Currently this crate carries the centralized logging setup used by the
//! `odp` binary. Keeping it in its own crate means any future component logs
//! the same way without re-declaring the subscriber stack.

pub mod logging;
