use serde::{Deserialize, Serialize};

/// Field name that matches every field of a document.
pub const ALL_FIELDS: &str = "_all";

fn default_boost() -> f32 {
    1.0
}

/// An immutable query tree.
///
/// Built once per request (or per effective target) and never mutated afterwards;
/// rewriting always produces a new tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    MatchAll,
    MatchNone,
    /// Matches documents whose analysed `field` contains the analysed `value`.
    Term {
        field: String,
        value: String,
        #[serde(default = "default_boost")]
        boost: f32,
    },
    /// Matches documents by id.
    Ids { values: Vec<String> },
    /// Matches documents of one mapping type.
    Type { name: String },
    Bool(BoolQuery),
    /// Restricts `query` to documents that also match `filter`. Only `query` scores.
    Filtered {
        query: Box<Query>,
        filter: Box<Query>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoolQuery {
    #[serde(default)]
    pub must: Vec<Query>,
    #[serde(default)]
    pub should: Vec<Query>,
    #[serde(default)]
    pub must_not: Vec<Query>,
    /// Defaults to one when there are `should` clauses and no `must` clause.
    #[serde(default)]
    pub minimum_should_match: Option<usize>,
    #[serde(default = "default_boost")]
    pub boost: f32,
}

impl Default for BoolQuery {
    fn default() -> Self {
        Self {
            must: vec![],
            should: vec![],
            must_not: vec![],
            minimum_should_match: None,
            boost: 1.0,
        }
    }
}

impl BoolQuery {
    /// Number of `should` clauses a document must match.
    pub fn required_should_matches(&self) -> usize {
        if self.should.is_empty() {
            return 0;
        }
        match self.minimum_should_match {
            Some(required) if required > 0 => required,
            _ if self.must.is_empty() => 1,
            _ => 0,
        }
    }
}

impl Query {
    pub fn term(field: impl Into<String>, value: impl Into<String>) -> Self {
        Query::Term {
            field: field.into(),
            value: value.into(),
            boost: 1.0,
        }
    }

    pub fn term_with_boost(field: impl Into<String>, value: impl Into<String>, boost: f32) -> Self {
        Query::Term {
            field: field.into(),
            value: value.into(),
            boost,
        }
    }

    pub fn ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Query::Ids {
            values: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn doc_type(name: impl Into<String>) -> Self {
        Query::Type { name: name.into() }
    }

    /// Disjunction over `clauses`; an empty disjunction matches nothing.
    pub fn any_of(clauses: Vec<Query>) -> Self {
        if clauses.is_empty() {
            return Query::MatchNone;
        }
        Query::Bool(BoolQuery {
            should: clauses,
            ..BoolQuery::default()
        })
    }

    /// Conjunction over `clauses`; an empty conjunction matches everything.
    pub fn all_of(clauses: Vec<Query>) -> Self {
        if clauses.is_empty() {
            return Query::MatchAll;
        }
        Query::Bool(BoolQuery {
            must: clauses,
            ..BoolQuery::default()
        })
    }

    pub fn filtered(query: Query, filter: Query) -> Self {
        Query::Filtered {
            query: Box::new(query),
            filter: Box::new(filter),
        }
    }

    /// `self` minus every document matching `excluded`.
    pub fn excluding(self, excluded: Query) -> Self {
        if self.is_match_none() {
            return self;
        }
        Query::Bool(BoolQuery {
            must: vec![self],
            must_not: vec![excluded],
            ..BoolQuery::default()
        })
    }

    pub fn is_match_none(&self) -> bool {
        matches!(self, Query::MatchNone)
    }
}
