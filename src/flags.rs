//! Per-list behavior flags.

use bitflags::bitflags;

bitflags! {
    /// Flags controlling how a [`crate::List`] treats its endpoint names.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Flags: u8 {
        /// Endpoint names are literal (IP or opaque) and are never handed
        /// to the resolver.
        const NO_RESOLVE = 1 << 0;
        /// Endpoint names are SRV targets; resolution expands each into
        /// synthetic child endpoints.
        const SRV_RESOLVE = 1 << 1;
    }
}
