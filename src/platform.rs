//! Host platform traits that drive output defaults.
//!
//! Byte-order-mark avoidance and line-ending normalization default differently
//! on Windows-like hosts. The transformer asks an injected [`Platform`]
//! instead of reading the OS directly, so tests can pin either behavior.

/// Capability describing the host a transformed package is produced on.
pub trait Platform: Send + Sync {
    fn is_windows(&self) -> bool;

    /// The native line ending for this platform.
    fn newline(&self) -> &'static str {
        if self.is_windows() { "\r\n" } else { "\n" }
    }
}

/// The platform this process is actually running on.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostPlatform;

impl Platform for HostPlatform {
    fn is_windows(&self) -> bool {
        cfg!(windows)
    }
}

/// A fixed platform answer, independent of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedPlatform {
    pub windows: bool,
}

impl SimulatedPlatform {
    pub fn windows() -> Self {
        Self { windows: true }
    }

    pub fn unix() -> Self {
        Self { windows: false }
    }
}

impl Platform for SimulatedPlatform {
    fn is_windows(&self) -> bool {
        self.windows
    }
}
