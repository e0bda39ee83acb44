//! Provider Selection
//!
//! Resolves the template's hints against a registry snapshot, in order:
//!
//! 1. `provider_name` pins one instance (no fallback search)
//! 2. `provider_type` restricts candidates to enabled instances of that type
//! 3. `provider_api` restricts candidates to instances advertising the API
//! 4. otherwise the configured default instance, or the policy over every
//!    enabled instance
//!
//! The configured [`SelectionPolicy`] then picks one candidate and orders
//! the rest as fallback alternatives.

use std::sync::Arc;

use orb_domain::constants::{
    CONFIDENCE_DEFAULT_POLICY, CONFIDENCE_EXPLICIT, CONFIDENCE_PRIORITY,
    CONFIDENCE_PRIORITY_TIED,
};
use orb_domain::entities::{ProviderInstance, Template};
use orb_domain::error::SelectionError;
use orb_domain::value_objects::{ProviderSelectionResult, SelectionPolicy};
use tracing::debug;

use super::random::RandomSource;

type SelectionResult<T> = std::result::Result<T, SelectionError>;

/// Picks one provider instance for a template
pub struct ProviderSelector {
    policy: SelectionPolicy,
    default_provider: Option<String>,
    random: Arc<dyn RandomSource>,
}

/// Chosen candidate and the ordered remainder
struct Pick<'a> {
    chosen: &'a ProviderInstance,
    reason: String,
    confidence: f64,
    alternatives: Vec<&'a ProviderInstance>,
}

impl ProviderSelector {
    /// Create a selector
    pub fn new(
        policy: SelectionPolicy,
        default_provider: Option<String>,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            policy,
            default_provider,
            random,
        }
    }

    /// Configured policy
    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    /// Select a provider instance for `count` instances of `template`
    pub fn select(
        &self,
        template: &Template,
        count: u32,
        providers: &[ProviderInstance],
    ) -> SelectionResult<ProviderSelectionResult> {
        if let Some(name) = &template.provider_name {
            let chosen = resolve_named(name, providers)?;
            debug!(provider = %chosen.name, "Provider selected by explicit name");
            return Ok(result(
                SelectionPolicy::Explicit,
                Pick {
                    chosen,
                    reason: format!("template names provider '{}'", name),
                    confidence: CONFIDENCE_EXPLICIT,
                    alternatives: Vec::new(),
                },
            ));
        }

        let enabled: Vec<&ProviderInstance> = providers.iter().filter(|p| p.enabled).collect();

        if let Some(provider_type) = &template.provider_type {
            let mut candidates: Vec<&ProviderInstance> = enabled
                .iter()
                .copied()
                .filter(|p| &p.provider_type == provider_type)
                .collect();
            if candidates.is_empty() {
                return Err(SelectionError::NoEnabledProviders {
                    scope: format!("type={}", provider_type),
                });
            }
            if let Some(api) = template.provider_api {
                candidates.retain(|p| p.capabilities.supports_api(api));
                if candidates.is_empty() {
                    return Err(SelectionError::NoCompatibleProvider {
                        requirement: format!("type={} api={}", provider_type, api),
                    });
                }
            }
            let pick = self.apply_policy(&candidates, template, count)?;
            return Ok(result(self.policy, pick));
        }

        if let Some(api) = template.provider_api {
            if enabled.is_empty() {
                return Err(SelectionError::NoEnabledProviders {
                    scope: "all".to_string(),
                });
            }
            let candidates: Vec<&ProviderInstance> = enabled
                .iter()
                .copied()
                .filter(|p| p.capabilities.supports_api(api))
                .collect();
            if candidates.is_empty() {
                return Err(SelectionError::NoCompatibleProvider {
                    requirement: format!("api={}", api),
                });
            }
            let pick = self.apply_policy(&candidates, template, count)?;
            return Ok(result(self.policy, pick));
        }

        if let Some(name) = &self.default_provider {
            let chosen = resolve_named(name, providers)?;
            let mut alternatives: Vec<&ProviderInstance> = enabled
                .iter()
                .copied()
                .filter(|p| p.name != chosen.name && p.provider_type == chosen.provider_type)
                .collect();
            alternatives.sort_by(|a, b| a.priority.cmp(&b.priority).then(a.name.cmp(&b.name)));
            return Ok(result(
                SelectionPolicy::Default,
                Pick {
                    chosen,
                    reason: format!("configured default provider '{}'", name),
                    confidence: CONFIDENCE_EXPLICIT,
                    alternatives,
                },
            ));
        }

        if enabled.is_empty() {
            return Err(SelectionError::NoEnabledProviders {
                scope: "all".to_string(),
            });
        }
        let pick = self.apply_policy(&enabled, template, count)?;
        Ok(result(self.policy, pick))
    }

    fn apply_policy<'a>(
        &self,
        candidates: &[&'a ProviderInstance],
        template: &Template,
        count: u32,
    ) -> SelectionResult<Pick<'a>> {
        let mut pick = match self.policy {
            SelectionPolicy::Explicit => {
                return Err(SelectionError::NoCompatibleProvider {
                    requirement: "an explicit provider_name (selection policy is explicit)"
                        .to_string(),
                });
            }
            SelectionPolicy::WeightedRoundRobin => self.pick_weighted(candidates)?,
            SelectionPolicy::Priority => pick_priority(candidates),
            SelectionPolicy::CapabilityBased => pick_capability(candidates, template, count),
            SelectionPolicy::Default => pick_first(candidates),
        };
        if candidates.len() == 1 {
            pick.confidence = CONFIDENCE_EXPLICIT;
        }
        Ok(pick)
    }

    /// Draw in `[1, total_weight]` and return the first cumulative match
    ///
    /// Zero-weight candidates are never drawn; they trail the alternatives.
    fn pick_weighted<'a>(&self, candidates: &[&'a ProviderInstance]) -> SelectionResult<Pick<'a>> {
        let weighted: Vec<&'a ProviderInstance> = candidates
            .iter()
            .copied()
            .filter(|p| p.weight > 0)
            .collect();
        let total: u64 = weighted.iter().map(|p| u64::from(p.weight)).sum();
        if total == 0 {
            return Err(SelectionError::NoEnabledProviders {
                scope: "weight>0".to_string(),
            });
        }

        let draw = self.random.next_in_range(1, total);
        let mut cumulative = 0u64;
        let mut chosen = weighted[weighted.len() - 1];
        for provider in weighted.iter().copied() {
            cumulative += u64::from(provider.weight);
            if cumulative >= draw {
                chosen = provider;
                break;
            }
        }

        let mut alternatives: Vec<&'a ProviderInstance> = weighted
            .iter()
            .copied()
            .filter(|p| p.name != chosen.name)
            .collect();
        alternatives.sort_by(|a, b| b.weight.cmp(&a.weight).then(a.name.cmp(&b.name)));

        // Never drawn, but still usable when every weighted provider fails
        let mut unweighted: Vec<&'a ProviderInstance> = candidates
            .iter()
            .copied()
            .filter(|p| p.weight == 0)
            .collect();
        unweighted.sort_by(|a, b| a.name.cmp(&b.name));
        alternatives.extend(unweighted);

        Ok(Pick {
            chosen,
            reason: format!(
                "weighted draw {}/{} (weight {})",
                draw, total, chosen.weight
            ),
            confidence: f64::from(chosen.weight) / total as f64,
            alternatives,
        })
    }
}

fn result(policy: SelectionPolicy, pick: Pick<'_>) -> ProviderSelectionResult {
    ProviderSelectionResult {
        provider_name: pick.chosen.name.clone(),
        provider_type: pick.chosen.provider_type.clone(),
        policy,
        reason: pick.reason,
        confidence: pick.confidence,
        alternatives: pick.alternatives.iter().map(|p| p.name.clone()).collect(),
    }
}

fn resolve_named<'a>(
    name: &str,
    providers: &'a [ProviderInstance],
) -> SelectionResult<&'a ProviderInstance> {
    let provider = providers
        .iter()
        .find(|p| p.name == name)
        .ok_or_else(|| SelectionError::ProviderNotFound {
            name: name.to_string(),
        })?;
    if !provider.enabled {
        return Err(SelectionError::ProviderDisabled {
            name: name.to_string(),
        });
    }
    Ok(provider)
}

/// Lowest priority wins; ties broken by name
fn pick_priority<'a>(candidates: &[&'a ProviderInstance]) -> Pick<'a> {
    let mut ordered = candidates.to_vec();
    ordered.sort_by(|a, b| a.priority.cmp(&b.priority).then(a.name.cmp(&b.name)));
    let chosen = ordered.remove(0);
    let tied = ordered.first().is_some_and(|p| p.priority == chosen.priority);
    Pick {
        chosen,
        reason: format!("lowest priority {}", chosen.priority),
        confidence: if tied {
            CONFIDENCE_PRIORITY_TIED
        } else {
            CONFIDENCE_PRIORITY
        },
        alternatives: ordered,
    }
}

/// First candidate in configuration order
fn pick_first<'a>(candidates: &[&'a ProviderInstance]) -> Pick<'a> {
    let mut ordered = candidates.to_vec();
    let chosen = ordered.remove(0);
    Pick {
        chosen,
        reason: "first enabled provider".to_string(),
        confidence: CONFIDENCE_DEFAULT_POLICY,
        alternatives: ordered,
    }
}

/// Best capability score; ties broken by health, priority, then name
fn pick_capability<'a>(
    candidates: &[&'a ProviderInstance],
    template: &Template,
    count: u32,
) -> Pick<'a> {
    let mut scored: Vec<(&'a ProviderInstance, f64)> = candidates
        .iter()
        .map(|p| (*p, capability_score(p, template, count)))
        .collect();
    scored.sort_by(|(a, sa), (b, sb)| {
        sb.total_cmp(sa)
            .then(a.health.rank().cmp(&b.health.rank()))
            .then(a.priority.cmp(&b.priority))
            .then(a.name.cmp(&b.name))
    });
    let (chosen, score) = scored.remove(0);
    Pick {
        chosen,
        reason: format!("best capability match (score {:.2})", score),
        confidence: score,
        alternatives: scored.into_iter().map(|(p, _)| p).collect(),
    }
}

/// Fraction of the template's requirements the provider satisfies
pub(crate) fn capability_score(provider: &ProviderInstance, template: &Template, count: u32) -> f64 {
    let caps = &provider.capabilities;
    let mut evaluated = 1u32;
    let mut passed = u32::from(count <= caps.max_instances_per_request);

    if let Some(api) = template.provider_api {
        evaluated += 1;
        passed += u32::from(caps.supports_api(api));
    }
    if let Some(model) = template.pricing_model {
        evaluated += 1;
        passed += u32::from(caps.supports_pricing_model(model));
    }
    if let Some(fleet_type) = template.fleet_type {
        if template.effective_api().uses_fleet_type() {
            evaluated += 1;
            passed += u32::from(caps.supports_fleet_type(fleet_type));
        }
    }
    f64::from(passed) / f64::from(evaluated)
}
