//! Query evaluation against a snapshot.
//!
//! A query is a resource type plus name/value pairs. Each value is split on
//! commas into OR-terms; the per-parameter results are intersected (AND).
//! Query input comes from untrusted callers, so anything the evaluator does
//! not understand (unknown names, unsupported modifiers, unparseable numbers)
//! is ignored rather than rejected.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::types::{Resource, SearchModifier, SearchParamType};

use super::normalizer::{IndexKey, TOKEN_SEPARATOR};
use super::registry::SearchParameterDefinition;
use super::snapshot::{ParamIndex, Snapshot};

/// Options controlling how query parameter names are interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// Names starting with this prefix are control parameters (`_sort`,
    /// `_count`, ...) handled by a higher layer.
    pub reserved_prefix: String,
    /// Resolve reserved-prefix names that the registry defines (e.g. `_id`)
    /// instead of ignoring them.
    pub honor_reserved_params: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            reserved_prefix: "_".to_string(),
            honor_reserved_params: false,
        }
    }
}

/// One resolved query parameter: a definition plus its OR-terms.
#[derive(Debug, Clone)]
struct Clause<'q> {
    param: Arc<SearchParameterDefinition>,
    modifier: Option<SearchModifier>,
    terms: Vec<&'q str>,
}

/// Evaluates queries against snapshots.
#[derive(Debug, Clone, Default)]
pub struct QueryEvaluator {
    options: QueryOptions,
}

impl QueryEvaluator {
    /// Creates an evaluator with the given options.
    pub fn new(options: QueryOptions) -> Self {
        Self { options }
    }

    /// Returns the options.
    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Returns the resources of `resource_type` matching all parameters.
    ///
    /// With no applicable parameters every resource of the type is returned.
    /// An unknown type yields an empty result. Results are in id order.
    pub fn search<I, K, V>(
        &self,
        snapshot: &Snapshot,
        resource_type: &str,
        params: I,
    ) -> Vec<Arc<Resource>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let Some(records) = snapshot.records_of(resource_type) else {
            return Vec::new();
        };

        match self.matching_ids(snapshot, resource_type, params) {
            None => records.values().cloned().collect(),
            Some(ids) => ids
                .into_iter()
                .filter_map(|id| records.get(id))
                .cloned()
                .collect(),
        }
    }

    /// Returns the matching ids, or `None` when no parameter applied.
    pub fn matching_ids<'s, I, K, V>(
        &self,
        snapshot: &'s Snapshot,
        resource_type: &str,
        params: I,
    ) -> Option<BTreeSet<&'s str>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut accumulator: Option<BTreeSet<&'s str>> = None;

        for (name, value) in params {
            let Some(clause) =
                self.resolve(snapshot, resource_type, name.as_ref(), value.as_ref())
            else {
                continue;
            };

            let matched = match snapshot.index(resource_type, &clause.param.code) {
                Some(index) => match_clause(index, &clause),
                None => BTreeSet::new(),
            };

            let combined = match accumulator {
                None => matched,
                Some(previous) => previous.intersection(&matched).copied().collect(),
            };

            if combined.is_empty() {
                tracing::trace!(
                    resource_type,
                    param = %clause.param.code,
                    "Query short-circuited on empty result"
                );
                return Some(combined);
            }
            accumulator = Some(combined);
        }

        accumulator
    }

    /// Resolves a name/value pair, or `None` if the pair should be ignored.
    fn resolve<'q>(
        &self,
        snapshot: &Snapshot,
        resource_type: &str,
        name: &str,
        value: &'q str,
    ) -> Option<Clause<'q>> {
        let reserved = &self.options.reserved_prefix;
        if !reserved.is_empty()
            && name.starts_with(reserved.as_str())
            && !self.options.honor_reserved_params
        {
            tracing::trace!(name, "Ignoring reserved query parameter");
            return None;
        }

        let (code, modifier) = match name.split_once(':') {
            Some((code, modifier)) => (code, Some(modifier)),
            None => (name, None),
        };

        let Some(param) = snapshot.registry().get_param(resource_type, code) else {
            tracing::trace!(resource_type, name, "Ignoring unknown query parameter");
            return None;
        };

        let modifier = match modifier {
            None => None,
            Some(raw) => match raw.parse::<SearchModifier>() {
                Ok(m) if m.supports(param.param_type) => Some(m),
                _ => {
                    tracing::trace!(name, modifier = raw, "Ignoring unsupported modifier");
                    return None;
                }
            },
        };

        let terms: Vec<&str> = value
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();
        if terms.is_empty() {
            return None;
        }

        Some(Clause {
            param,
            modifier,
            terms,
        })
    }
}

/// Union of the ids matching any of the clause's terms.
fn match_clause<'s>(index: &'s ParamIndex, clause: &Clause<'_>) -> BTreeSet<&'s str> {
    let mut ids = BTreeSet::new();
    for term in &clause.terms {
        match_term(index, clause.param.param_type, clause.modifier, term, &mut ids);
    }
    ids
}

fn match_term<'s>(
    index: &'s ParamIndex,
    param_type: SearchParamType,
    modifier: Option<SearchModifier>,
    term: &str,
    ids: &mut BTreeSet<&'s str>,
) {
    let mut add = |set: &'s BTreeSet<String>| ids.extend(set.iter().map(String::as_str));

    match param_type {
        SearchParamType::String => {
            let term = term.to_lowercase();
            match modifier {
                Some(SearchModifier::Exact) => {
                    if let Some(set) = index.get(&IndexKey::text(term)) {
                        add(set);
                    }
                }
                Some(SearchModifier::Contains) => {
                    for (key, set) in index.iter() {
                        if key.as_text().is_some_and(|k| k.contains(term.as_str())) {
                            add(set);
                        }
                    }
                }
                None => {
                    for (_, set) in index.prefix(&term) {
                        add(set);
                    }
                }
            }
        }
        SearchParamType::Token => {
            let term = term.to_lowercase();
            if term.contains(TOKEN_SEPARATOR) {
                if let Some(set) = index.get(&IndexKey::text(term)) {
                    add(set);
                }
            } else {
                // Code-only: match the code under any system.
                for (key, set) in index.iter() {
                    let code = key
                        .as_text()
                        .and_then(|k| k.rsplit(TOKEN_SEPARATOR).next());
                    if code == Some(term.as_str()) {
                        add(set);
                    }
                }
            }
        }
        SearchParamType::Reference | SearchParamType::Uri => {
            if let Some(set) = index.get(&IndexKey::text(term)) {
                add(set);
            }
        }
        SearchParamType::Date => {
            for (_, set) in index.prefix(term) {
                add(set);
            }
        }
        SearchParamType::Number | SearchParamType::Quantity => {
            let key = term.parse::<f64>().ok().and_then(IndexKey::number);
            if let Some(set) = key.as_ref().and_then(|k| index.get(k)) {
                add(set);
            }
        }
        SearchParamType::Composite | SearchParamType::Special => {
            if let Some(set) = index.get(&IndexKey::text(term.to_lowercase())) {
                add(set);
            }
        }
    }
}
