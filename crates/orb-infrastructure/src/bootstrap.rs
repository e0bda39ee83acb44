//! Composition Root
//!
//! Wires configuration into the running broker:
//!
//! ```text
//! AppConfig ──▶ ProviderRegistry ◀── linkme adapter registry
//!                    │
//!     CircuitBreakerRegistry, ProviderPools, RetryPolicy
//!                    ▼
//!             ResilientInvoker ──▶ RequestOrchestrator ◀── repositories, clock
//!                                         ▲
//!                              ReconciliationScheduler
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let context = init_app(ConfigLoader::new().load()?).await?;
//! let scheduler = context.scheduler();
//! scheduler.spawn();
//!
//! let orchestrator = context.orchestrator();
//! let request_id = orchestrator.create_request("tpl-web", 5).await?;
//! scheduler.track(request_id);
//! ```

use crate::clock::SystemClock;
use crate::config::{AppConfig, ProviderConfig};
use crate::registry::ProviderRegistry;
use crate::resilience::{
    CircuitBreakerConfig, CircuitBreakerRegistry, InvokerComponents, ProviderPools,
    ResilientInvoker, RetryPolicy,
};
use crate::scheduler::{ReconciliationScheduler, SchedulerConfig};
use orb_application::domain_services::{
    CapabilityValidator, ProviderSelector, RandomSource, SeededRandom, ThreadRandom,
};
use orb_application::ports::{ProviderCatalog, ProviderInvoker, RequestOrchestratorInterface};
use orb_application::use_cases::{OrchestratorComponents, RequestOrchestrator};
use orb_domain::error::Result;
use orb_domain::ports::Clock;
use orb_domain::repositories::{MachineRepository, RequestRepository, TemplateRepository};
use orb_providers::discovery::default_discovery_registry;
use orb_providers::storage::{
    InMemoryMachineRepository, InMemoryRequestRepository, InMemoryTemplateRepository,
};
use std::sync::Arc;
use tracing::info;

/// Running broker: configuration plus every wired service
pub struct AppContext {
    /// Application configuration
    pub config: Arc<AppConfig>,

    registry: Arc<ProviderRegistry>,
    breakers: Arc<CircuitBreakerRegistry>,
    invoker: Arc<ResilientInvoker>,
    orchestrator: Arc<RequestOrchestrator>,
    requests: Arc<dyn RequestRepository>,
    machines: Arc<dyn MachineRepository>,
    templates: Arc<dyn TemplateRepository>,
    clock: Arc<dyn Clock>,
    random: Arc<dyn RandomSource>,
}

impl AppContext {
    /// Provider registry
    pub fn registry(&self) -> Arc<ProviderRegistry> {
        Arc::clone(&self.registry)
    }

    /// Provider registry as the orchestrator sees it
    pub fn catalog(&self) -> Arc<dyn ProviderCatalog> {
        self.registry.clone()
    }

    /// Per-provider circuit breakers
    pub fn breakers(&self) -> Arc<CircuitBreakerRegistry> {
        Arc::clone(&self.breakers)
    }

    /// Resilient provider invoker
    pub fn invoker(&self) -> Arc<dyn ProviderInvoker> {
        self.invoker.clone()
    }

    /// Orchestrator API
    pub fn orchestrator(&self) -> Arc<dyn RequestOrchestratorInterface> {
        self.orchestrator.clone()
    }

    /// Request storage
    pub fn requests(&self) -> Arc<dyn RequestRepository> {
        Arc::clone(&self.requests)
    }

    /// Machine storage
    pub fn machines(&self) -> Arc<dyn MachineRepository> {
        Arc::clone(&self.machines)
    }

    /// Template storage
    pub fn templates(&self) -> Arc<dyn TemplateRepository> {
        Arc::clone(&self.templates)
    }

    /// Time source
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Reconciliation scheduler over this context's orchestrator
    pub fn scheduler(&self) -> Arc<ReconciliationScheduler> {
        ReconciliationScheduler::new(
            self.orchestrator(),
            SchedulerConfig::from(&self.config.reconciliation),
            Arc::clone(&self.random),
        )
    }

    /// Swap the provider instances; requests already bound keep their adapter
    pub fn reload_providers(&self, providers: &[ProviderConfig]) -> Result<()> {
        self.registry.reload(providers)
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("providers", &self.registry.names())
            .field("selection", &self.config.selection.policy)
            .field("validation", &self.config.validation.level)
            .finish_non_exhaustive()
    }
}

/// Initialize the broker with the wall clock
pub async fn init_app(config: AppConfig) -> Result<AppContext> {
    init_app_with_clock(config, Arc::new(SystemClock)).await
}

/// Initialize the broker with an explicit time source
///
/// Resolves provider adapters through the linkme registry, so `orb-providers`
/// must be linked. Templates listed in the configuration are seeded into
/// storage.
pub async fn init_app_with_clock(config: AppConfig, clock: Arc<dyn Clock>) -> Result<AppContext> {
    info!("Initializing resource broker");
    let config = Arc::new(config);

    let random: Arc<dyn RandomSource> = match config.selection.seed {
        Some(seed) => Arc::new(SeededRandom::new(seed)),
        None => Arc::new(ThreadRandom),
    };

    let breakers = Arc::new(CircuitBreakerRegistry::new(CircuitBreakerConfig::from(
        &config.resilience,
    )));
    let registry = Arc::new(ProviderRegistry::from_config(
        &config.providers,
        Some(Arc::clone(&breakers)),
    )?);
    info!(providers = ?registry.names(), "Resolved provider adapters");

    let validator = CapabilityValidator::new(config.validation.level);
    let invoker = Arc::new(ResilientInvoker::new(InvokerComponents {
        registry: Arc::clone(&registry),
        validator,
        discovery: default_discovery_registry(),
        breakers: Arc::clone(&breakers),
        pools: ProviderPools::new(config.resilience.max_concurrent_calls),
        retry: RetryPolicy::from(&config.resilience),
        random: Arc::clone(&random),
    }));

    let requests: Arc<dyn RequestRepository> = Arc::new(InMemoryRequestRepository::new());
    let machines: Arc<dyn MachineRepository> = Arc::new(InMemoryMachineRepository::new());
    let templates: Arc<dyn TemplateRepository> = Arc::new(InMemoryTemplateRepository::new());
    for template in &config.templates {
        templates.save(template).await?;
    }
    info!(templates = config.templates.len(), "Seeded templates");

    let orchestrator = Arc::new(RequestOrchestrator::new(OrchestratorComponents {
        catalog: registry.clone(),
        selector: ProviderSelector::new(
            config.selection.policy,
            config.selection.default_provider.clone(),
            Arc::clone(&random),
        ),
        validator,
        invoker: invoker.clone(),
        requests: Arc::clone(&requests),
        machines: Arc::clone(&machines),
        templates: Arc::clone(&templates),
        clock: Arc::clone(&clock),
        policy: config.reconciliation.policy(),
    }));

    info!(
        selection = %config.selection.policy,
        validation = %config.validation.level,
        "Resource broker initialized"
    );

    Ok(AppContext {
        config,
        registry,
        breakers,
        invoker,
        orchestrator,
        requests,
        machines,
        templates,
        clock,
        random,
    })
}

/// Initialize the broker from default configuration
pub async fn init_test_app() -> Result<AppContext> {
    init_app(AppConfig::default()).await
}
