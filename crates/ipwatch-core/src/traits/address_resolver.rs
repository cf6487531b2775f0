// # Address Resolver Trait
//
// Defines the interface for looking up the host's current public IP address.
//
// ## Implementations
//
// - HTTP IP-echo service: `ipwatch-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ipwatch_core::AddressResolver;
//
// let resolver = /* AddressResolver implementation */;
// let address = resolver.resolve().await?;
// println!("public address: {address}");
// ```

use async_trait::async_trait;

use crate::error::ResolutionError;

/// Trait for public address lookups
///
/// # Trust Level: Untrusted
///
/// Resolvers talk to a third-party service and must stay single-shot:
///
/// ## Allowed Capabilities
/// - ✅ Perform one bounded-timeout request per call
/// - ✅ Parse the service response into an address string
///
/// ## Forbidden Capabilities
/// - ❌ Retry or back off (a failed cycle is retried by the next timer tick)
/// - ❌ Cache results (every call must be a fresh lookup)
/// - ❌ Access the address store or notifier
///
/// The returned string is passed through verbatim; no format validation is
/// done beyond what the service itself guarantees.
#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Look up the current public address
    async fn resolve(&self) -> Result<String, ResolutionError>;

    /// Name of the lookup backend, for logging
    fn resolver_name(&self) -> &'static str {
        "unknown"
    }
}
