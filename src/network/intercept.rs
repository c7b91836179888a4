// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Intercept registry
//!
//! Intercepts are kept in registration order so that the ids listed in a
//! blocked event are deterministic.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;

use super::transport::ContextRegistry;
use super::types::{ContextId, EventKind, InterceptId, Phase};
use crate::error::{Error, Result};
use crate::pattern::{CompiledUrlPattern, UrlPattern};

/// A registered intercept
#[derive(Debug, Clone)]
pub struct Intercept {
    pub id: InterceptId,
    /// `None` means every top-level context
    pub contexts: Option<HashSet<ContextId>>,
    pub phases: HashSet<Phase>,
    pub url_patterns: Vec<CompiledUrlPattern>,
}

impl Intercept {
    /// Whether this intercept applies to an event in `phase` for `url`
    /// issued under `top_context`
    pub fn matches(&self, phase: Phase, url: &str, top_context: Option<&ContextId>) -> bool {
        if let Some(ref contexts) = self.contexts {
            match top_context {
                Some(context) if contexts.contains(context) => {}
                _ => return false,
            }
        }

        if !self.phases.contains(&phase) {
            return false;
        }

        self.url_patterns.is_empty() || self.url_patterns.iter().any(|p| p.matches(url))
    }
}

/// Registry of intercepts for one session
pub struct InterceptRegistry {
    intercepts: RwLock<Vec<Intercept>>,
    contexts: Arc<dyn ContextRegistry>,
}

impl InterceptRegistry {
    pub fn new(contexts: Arc<dyn ContextRegistry>) -> Self {
        Self {
            intercepts: RwLock::new(Vec::new()),
            contexts,
        }
    }

    /// Validate and register an intercept
    ///
    /// Everything is validated before the registry is touched: phases must be
    /// non-empty, `contexts` (when given) non-empty and made of existing
    /// top-level contexts, and every URL pattern must compile.
    pub fn add(
        &self,
        contexts: Option<Vec<ContextId>>,
        phases: Vec<Phase>,
        url_patterns: &[UrlPattern],
    ) -> Result<InterceptId> {
        if phases.is_empty() {
            return Err(Error::invalid_argument(
                "Expected \"phases\" to be a non-empty array",
            ));
        }

        let contexts = match contexts {
            Some(ids) => Some(self.validate_contexts(ids)?),
            None => None,
        };

        let url_patterns = url_patterns
            .iter()
            .map(UrlPattern::compile)
            .collect::<Result<Vec<_>>>()?;

        let intercept = Intercept {
            id: InterceptId::generate(),
            contexts,
            phases: phases.into_iter().collect(),
            url_patterns,
        };
        let id = intercept.id;

        tracing::info!(
            intercept = %id,
            phases = ?intercept.phases,
            patterns = intercept.url_patterns.len(),
            "Intercept added"
        );

        self.intercepts.write().push(intercept);
        Ok(id)
    }

    /// Remove an intercept; exchanges it already blocked stay blocked
    pub fn remove(&self, id: &InterceptId) -> Result<()> {
        let mut intercepts = self.intercepts.write();
        let position = intercepts
            .iter()
            .position(|i| &i.id == id)
            .ok_or_else(|| Error::no_such_intercept(id.to_string()))?;
        intercepts.remove(position);

        tracing::info!(intercept = %id, "Intercept removed");
        Ok(())
    }

    /// Ids of the intercepts matching an event, in registration order
    ///
    /// Events without an interceptable phase never match.
    pub fn matches_for_event(
        &self,
        kind: EventKind,
        url: &str,
        top_context: Option<&ContextId>,
    ) -> Vec<InterceptId> {
        let Some(phase) = kind.phase() else {
            return Vec::new();
        };

        self.intercepts
            .read()
            .iter()
            .filter(|i| i.matches(phase, url, top_context))
            .map(|i| i.id)
            .collect()
    }

    pub fn get(&self, id: &InterceptId) -> Option<Intercept> {
        self.intercepts.read().iter().find(|i| &i.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.intercepts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.intercepts.read().is_empty()
    }

    fn validate_contexts(&self, ids: Vec<ContextId>) -> Result<HashSet<ContextId>> {
        if ids.is_empty() {
            return Err(Error::invalid_argument(
                "Expected \"contexts\" to be a non-empty array",
            ));
        }

        for id in &ids {
            let info = self
                .contexts
                .get_context(id)
                .ok_or_else(|| Error::no_such_frame(id.to_string()))?;
            if !info.is_top_level() {
                return Err(Error::invalid_argument(format!(
                    "Context with id {} is not a top-level browsing context",
                    id
                )));
            }
        }

        Ok(ids.into_iter().collect())
    }
}
