//! Process-wide tracing setup shared by the tenantry binaries.

/// Initialize tracing for the process.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    tracing::init();
}

/// Subscriber configuration (filters, formatting).
pub mod tracing;
