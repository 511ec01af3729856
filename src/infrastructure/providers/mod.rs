//! # Provider Adapters
//!
//! Integrations with external financing providers.
//!
//! - [`traits::ProviderAdapter`]: the port every provider implements
//! - [`registry::ProviderRegistry`]: `provider_id -> adapter` lookup
//! - [`fastbank`], [`solidbank`]: concrete bank adapters
//! - [`http_client::HttpClient`]: shared reqwest wrapper

pub mod error;
pub mod fastbank;
pub mod http_client;
pub mod registry;
pub mod solidbank;
pub mod traits;
pub mod wire;

pub use error::{ProviderError, ProviderResult};
pub use fastbank::{FASTBANK_ID, FastBankAdapter};
pub use registry::ProviderRegistry;
pub use solidbank::{SOLIDBANK_ID, SolidBankAdapter};
pub use traits::{DEFAULT_PROVIDER_TIMEOUT_MS, ProviderAdapter};
