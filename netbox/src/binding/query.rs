//! Filtered listings

use regex::Regex;
use tfplug::types::{AttributePath, DynamicValue};
use tracing::debug;

use super::filter::{FilterClause, FilterSet};
use super::{BindingError, ValidationError};
use crate::api::{ListCollection, ListParams, Named};

/// Everything a list data source asks for
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListRequest {
    pub filters: Vec<FilterClause>,
    pub limit: Option<i64>,
    pub name_regex: Option<String>,
}

impl ListRequest {
    /// Reads the `filter` blocks plus the `limit` and `name_regex` attributes
    pub fn from_config(config: &DynamicValue) -> Result<Self, ValidationError> {
        let limit = config
            .get_optional_i64(&AttributePath::new("limit"))
            .map_err(|e| ValidationError::InvalidAttribute {
                attribute: "limit".to_string(),
                message: e.to_string(),
            })?;
        let name_regex = config
            .get_optional_string(&AttributePath::new("name_regex"))
            .map_err(|e| ValidationError::InvalidAttribute {
                attribute: "name_regex".to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            filters: FilterClause::from_config(config)?,
            limit,
            name_regex,
        })
    }
}

pub struct ListQuery<C: ListCollection> {
    collection: C,
    filters: &'static FilterSet<C::Params>,
}

impl<C> ListQuery<C>
where
    C: ListCollection,
    C::Entity: Named,
{
    pub fn new(collection: C, filters: &'static FilterSet<C::Params>) -> Self {
        Self {
            collection,
            filters,
        }
    }

    /// Runs one listing. Limit, regex and filter names are all checked
    /// before the collection is called. Results keep the remote order.
    pub async fn run(&self, request: &ListRequest) -> Result<Vec<C::Entity>, BindingError> {
        if let Some(limit) = request.limit.filter(|l| *l < 1) {
            return Err(ValidationError::InvalidLimit(limit).into());
        }
        let pattern = request
            .name_regex
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(ValidationError::from)?;

        let mut params = C::Params::default();
        self.filters.apply(&request.filters, &mut params)?;
        if let Some(limit) = request.limit {
            params.set_limit(limit);
        }

        debug!(
            "Listing with {} filter(s), limit={:?}, name_regex={:?}",
            request.filters.len(),
            request.limit,
            request.name_regex
        );
        let listing = self.collection.list(&params).await?;
        if listing.count == 0 {
            return Err(BindingError::NoResult);
        }

        let results = match pattern {
            Some(re) => listing
                .results
                .into_iter()
                .filter(|entity| re.is_match(entity.name()))
                .collect(),
            None => listing.results,
        };
        Ok(results)
    }
}

/// Fetch the single record matching `params`
pub async fn lookup_one<C: ListCollection>(
    collection: &C,
    mut params: C::Params,
    kind: &'static str,
) -> Result<C::Entity, BindingError> {
    params.set_limit(2);
    let listing = collection.list(&params).await?;
    if listing.count > 1 {
        return Err(BindingError::Ambiguous {
            kind,
            count: listing.count,
        });
    }
    listing
        .results
        .into_iter()
        .next()
        .ok_or(BindingError::NoResult)
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::api::dcim::ConsolePortListParams;
    use crate::binding::fake::{port, FakePorts};
    use crate::binding::filter::Setter;

    const SETTERS: &[(&str, Setter<ConsolePortListParams>)] = &[
        ("name", |p, v| p.name = Some(v.to_string())),
        ("tag", |p, v| p.tag.push(v.to_string())),
        ("device_id", |p, v| p.device_id = Some(v.to_string())),
    ];
    static FILTERS: FilterSet<ConsolePortListParams> = FilterSet::new(SETTERS);

    /// Four console ports on device 4, three of them tagged
    fn device_ports() -> FakePorts {
        FakePorts::new(vec![
            port(1, "con0", 4, &["acctest"]),
            port(2, "con1", 4, &["acctest"]),
            port(3, "con2", 4, &["acctest"]),
            port(4, "con_regex", 4, &[]),
        ])
    }

    fn request(filters: &[(&str, &str)]) -> ListRequest {
        ListRequest {
            filters: filters
                .iter()
                .map(|(n, v)| FilterClause::new(*n, *v))
                .collect(),
            ..Default::default()
        }
    }

    fn names<E: Named>(entities: &[E]) -> Vec<&str> {
        entities.iter().map(Named::name).collect()
    }

    #[tokio::test]
    async fn tag_device_and_regex_filters() {
        let query = ListQuery::new(device_ports(), &FILTERS);

        let tagged = query.run(&request(&[("tag", "acctest")])).await.unwrap();
        assert_eq!(names(&tagged), vec!["con0", "con1", "con2"]);

        let on_device = query.run(&request(&[("device_id", "4")])).await.unwrap();
        assert_eq!(on_device.len(), 4);

        let mut by_regex = request(&[("device_id", "4")]);
        by_regex.name_regex = Some("_regex".to_string());
        let matched = query.run(&by_regex).await.unwrap();
        assert_eq!(names(&matched), vec!["con_regex"]);
        assert!(matched[0].tags.is_empty());
    }

    #[tokio::test]
    async fn limit_returns_first_in_remote_order() {
        let query = ListQuery::new(device_ports(), &FILTERS);
        let mut limited = request(&[("tag", "acctest")]);
        limited.limit = Some(1);

        let ports = query.run(&limited).await.unwrap();

        assert_eq!(names(&ports), vec!["con0"]);
    }

    #[tokio::test]
    async fn regex_is_an_unanchored_stable_filter() {
        let query = ListQuery::new(device_ports(), &FILTERS);
        let mut req = request(&[]);
        req.name_regex = Some("con[02]".to_string());

        let ports = query.run(&req).await.unwrap();

        assert_eq!(names(&ports), vec!["con0", "con2"]);
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_collection() {
        let query = ListQuery::new(device_ports(), &FILTERS);

        let err = query.run(&request(&[("rack", "1")])).await.unwrap_err();
        assert_eq!(err.to_string(), "'rack' is not a supported filter parameter");

        let mut zero = request(&[]);
        zero.limit = Some(0);
        assert!(matches!(
            query.run(&zero).await,
            Err(BindingError::Validation(ValidationError::InvalidLimit(0)))
        ));

        let mut bad_regex = request(&[]);
        bad_regex.name_regex = Some("con(".to_string());
        assert!(matches!(
            query.run(&bad_regex).await,
            Err(BindingError::Validation(ValidationError::InvalidRegex(_)))
        ));

        assert_eq!(query.collection.calls(), 0);
    }

    #[tokio::test]
    async fn zero_count_is_no_result() {
        let query = ListQuery::new(device_ports(), &FILTERS);

        let err = query.run(&request(&[("device_id", "99")])).await.unwrap_err();

        assert!(matches!(err, BindingError::NoResult));
        assert_eq!(err.to_string(), "no result");
    }

    #[tokio::test]
    async fn regex_miss_after_nonzero_count_is_empty() {
        let query = ListQuery::new(device_ports(), &FILTERS);
        let mut req = request(&[]);
        req.name_regex = Some("^eth".to_string());

        let ports = query.run(&req).await.unwrap();

        assert!(ports.is_empty());
    }

    #[tokio::test]
    async fn lookup_one_rejects_ambiguous_matches() {
        let ports = device_ports();

        let single = lookup_one(
            &ports,
            ConsolePortListParams {
                name: Some("con1".to_string()),
                ..Default::default()
            },
            "console port",
        )
        .await
        .unwrap();
        assert_eq!(single.id, 2);

        let err = lookup_one(&ports, ConsolePortListParams::default(), "console port")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "more than one console port returned, specify a more narrow filter"
        );

        let missing = lookup_one(
            &ports,
            ConsolePortListParams {
                name: Some("con9".to_string()),
                ..Default::default()
            },
            "console port",
        )
        .await;
        assert!(matches!(missing, Err(BindingError::NoResult)));
    }
}
