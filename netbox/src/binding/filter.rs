//! Filter clauses and their per-kind dispatch tables

use tfplug::types::{AttributePath, Dynamic, DynamicValue};

use super::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterClause {
    pub name: String,
    pub value: String,
}

impl FilterClause {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Read the `filter` blocks of a data source config, in config order
    pub fn from_config(config: &DynamicValue) -> Result<Vec<Self>, ValidationError> {
        let blocks = match config.get(&AttributePath::new("filter")) {
            None | Some(Dynamic::Null) | Some(Dynamic::Unknown) => return Ok(Vec::new()),
            Some(Dynamic::List(blocks)) => blocks,
            Some(other) => {
                return Err(ValidationError::InvalidAttribute {
                    attribute: "filter".to_string(),
                    message: format!("expected a set of blocks, got {}", other.type_name()),
                })
            }
        };

        blocks
            .iter()
            .map(|block| {
                let field = |key: &str| {
                    block
                        .as_map()
                        .and_then(|m| m.get(key))
                        .and_then(Dynamic::as_string)
                        .map(str::to_string)
                        .ok_or_else(|| ValidationError::MissingAttribute(format!("filter.{}", key)))
                };
                Ok(FilterClause::new(field("name")?, field("value")?))
            })
            .collect()
    }
}

pub type Setter<P> = fn(&mut P, &str);

/// Maps filter names onto setters of a list parameter struct
pub struct FilterSet<P: 'static> {
    setters: &'static [(&'static str, Setter<P>)],
}

impl<P: 'static> FilterSet<P> {
    pub const fn new(setters: &'static [(&'static str, Setter<P>)]) -> Self {
        Self { setters }
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.setters.iter().map(|(name, _)| *name)
    }

    fn setter(&self, name: &str) -> Option<Setter<P>> {
        self.setters
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, setter)| *setter)
    }

    /// Every clause name is resolved before any setter runs, so an unknown
    /// name leaves `params` untouched
    pub fn apply(&self, clauses: &[FilterClause], params: &mut P) -> Result<(), ValidationError> {
        let resolved = clauses
            .iter()
            .map(|clause| {
                self.setter(&clause.name)
                    .map(|setter| (setter, clause.value.as_str()))
                    .ok_or_else(|| ValidationError::UnsupportedFilter(clause.name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (setter, value) in resolved {
            setter(params, value);
        }
        Ok(())
    }
}
