//! Provider Adapter Registry
//!
//! Compile-time registration of provider adapters with `linkme`.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                   Adapter Registration Flow                      │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  1. Adapter defines:  #[linkme::distributed_slice(               │
//! │                           PROVIDER_ADAPTERS)]                    │
//! │                       static ENTRY: ProviderAdapterEntry = ...   │
//! │  2. Registry declares the slice (this module)                    │
//! │  3. Resolver queries: PROVIDER_ADAPTERS.iter()                   │
//! │  4. Config selects:   adapter = "in_memory" → InMemoryCloud      │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Registering an adapter (in orb-providers)
//!
//! ```ignore
//! use orb_application::ports::registry::{ProviderAdapterEntry, PROVIDER_ADAPTERS};
//!
//! #[linkme::distributed_slice(PROVIDER_ADAPTERS)]
//! static NULL_ADAPTER: ProviderAdapterEntry = ProviderAdapterEntry {
//!     name: "null",
//!     description: "Adapter that rejects every call",
//!     factory: |config| Ok(Arc::new(NullProviderAdapter::from_config(config))),
//! };
//! ```

pub mod adapter;

pub use adapter::{
    PROVIDER_ADAPTERS, ProviderAdapterConfig, ProviderAdapterEntry, list_provider_adapters,
    resolve_provider_adapter,
};
