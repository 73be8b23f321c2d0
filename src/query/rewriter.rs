//! Combines a caller query with alias filters and type restrictions.

use super::types::Query;
use crate::alias::types::Resolution;
use crate::routing::types::TargetQuery;

pub struct QueryRewriter;

impl QueryRewriter {
    /// `base` unchanged without a filter, otherwise `base AND filter`.
    pub fn rewrite(base: &Query, filter: Option<&Query>) -> Query {
        match filter {
            None => base.clone(),
            Some(_) if base.is_match_none() => Query::MatchNone,
            Some(filter) => Query::filtered(base.clone(), filter.clone()),
        }
    }

    /// Restricts `base` to the given mapping types; no types means no restriction.
    pub fn restrict_types(base: Query, types: &[String]) -> Query {
        if types.is_empty() || base.is_match_none() {
            return base;
        }
        let filter = Query::any_of(types.iter().map(Query::doc_type).collect());
        Query::filtered(base, filter)
    }

    /// One effective query per resolved (index, filter) pair of `target`.
    ///
    /// Resolutions are never merged, so two aliases over the same index keep their
    /// own filters within one request.
    pub fn rewrite_target(target: &str, base: &Query, resolutions: &[Resolution]) -> Vec<TargetQuery> {
        resolutions
            .iter()
            .map(|resolution| TargetQuery {
                target: target.to_string(),
                index: resolution.index.clone(),
                query: Self::rewrite(base, resolution.filter.as_ref()),
            })
            .collect()
    }
}
