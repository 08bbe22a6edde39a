//! Combination of the authorizations of several authentications.
//!
//! Each query family has one combination rule:
//!
//! - base gates: OR over all authorizations
//! - feature decisions: OR over the authorizations with feature rules for
//!   the layer, falling back to the base gates when none has any
//! - attribute decisions: OR over the authorizations with attribute rules
//!   for the layer, falling back to the feature decision
//! - areas: intersection over all area authorizations, starting from the
//!   layer extent
//! - partly sufficient flags: AND over all area authorizations
//! - select filters: AND over all filter authorizations
//!
//! All functions are pure; they never mutate an authorization.

use layergate_authorization::{
    AreaAuthorization, AttributeAuthorization, Authentication, Authorization,
    FeatureAuthorization, SharedAuthorization,
};
use layergate_core::{Filter, Geometry, Services, UNKNOWN_SRID};
use tracing::{debug, warn};

fn authorizations(authentications: &[Authentication]) -> impl Iterator<Item = &SharedAuthorization> {
    authentications.iter().flat_map(|a| a.authorizations())
}

/// OR over all authorizations of all authentications.
pub fn any_authorization(
    authentications: &[Authentication],
    grant: impl Fn(&dyn Authorization) -> bool,
) -> bool {
    authorizations(authentications).any(|a| grant(a.as_ref()))
}

/// Feature decision for a layer: authorizations with feature rules for the
/// layer decide when any exists, otherwise the base gate decides.
pub fn feature_decision(
    authentications: &[Authentication],
    layer_id: &str,
    decide: impl Fn(&dyn FeatureAuthorization) -> bool,
    fallback: impl Fn(&dyn Authorization) -> bool,
) -> bool {
    let mut ruled = authorizations(authentications)
        .filter_map(|a| a.as_feature())
        .filter(|f| f.has_rules(layer_id))
        .peekable();
    if ruled.peek().is_some() {
        ruled.any(|f| decide(f))
    } else {
        any_authorization(authentications, fallback)
    }
}

/// Attribute decision for a layer: authorizations with attribute rules for
/// the layer decide when any exists, otherwise the feature decision applies.
pub fn attribute_decision(
    authentications: &[Authentication],
    layer_id: &str,
    decide: impl Fn(&dyn AttributeAuthorization) -> bool,
    fallback: impl FnOnce() -> bool,
) -> bool {
    let mut ruled = authorizations(authentications)
        .filter_map(|a| a.as_attribute())
        .filter(|a| a.has_rules(layer_id))
        .peekable();
    if ruled.peek().is_some() {
        ruled.any(|a| decide(a))
    } else {
        fallback()
    }
}

/// Intersect the layer extent with the area of every area authorization.
///
/// Returns `None` when there are no authentications or when the layer
/// cannot be resolved. The result carries the SRID of the layer CRS.
pub fn combine_area(
    authentications: &[Authentication],
    services: &Services,
    layer_id: &str,
    area: impl Fn(&dyn AreaAuthorization) -> Option<Geometry>,
) -> Option<Geometry> {
    if authentications.is_empty() {
        return None;
    }

    let layer = match services.layers.layer(layer_id) {
        Ok(layer) => layer,
        Err(e) => {
            warn!(layer = %layer_id, error = %e, "Area requested for unknown layer");
            return None;
        }
    };

    let extent = services
        .geometry
        .srid(&layer.crs)
        .and_then(|srid| {
            let extent = Geometry::from_envelope(layer.max_extent, UNKNOWN_SRID);
            services.geometry.transform(&extent, srid).map(|g| (srid, g))
        });
    let (srid, mut geometry) = match extent {
        Ok(extent) => extent,
        Err(e) => {
            warn!(layer = %layer_id, crs = %layer.crs, error = %e, "Cannot resolve layer extent");
            return None;
        }
    };

    for authorization in authorizations(authentications) {
        if let Some(area_authorization) = authorization.as_area() {
            geometry = match area(area_authorization) {
                Some(area) => services.geometry.intersection(&geometry, &area),
                None => Geometry::empty(srid),
            };
        }
    }

    debug!(layer = %layer_id, empty = geometry.is_empty(), "Area combined");
    Some(geometry.with_srid(srid))
}

/// AND over the partly sufficient flag of every area authorization.
///
/// Authorizations without the area capability are skipped. Without any area
/// authorization the result is `false`.
pub fn combine_partly_sufficient(
    authentications: &[Authentication],
    flag: impl Fn(&dyn AreaAuthorization) -> bool,
) -> bool {
    let mut sufficient = false;
    for area_authorization in authorizations(authentications).filter_map(|a| a.as_area()) {
        sufficient = flag(area_authorization);
        if !sufficient {
            return false;
        }
    }
    sufficient
}

/// AND over the select filters for a layer. `None` when no authorization
/// adds a filter.
pub fn combine_filter(
    authentications: &[Authentication],
    services: &Services,
    layer_id: &str,
) -> Option<Filter> {
    authorizations(authentications)
        .filter_map(|a| a.as_select_filter())
        .filter_map(|f| f.feature_filter(layer_id))
        .reduce(|left, right| services.filters.and(left, right))
}

/// Cache key for a set of authentications.
///
/// Per authentication the sorted authorization ids are joined with `|` and
/// suffixed with `@` and the security service id. These parts are sorted and
/// joined with `|`, so the key does not depend on insertion order.
pub fn context_id(authentications: &[Authentication]) -> String {
    let mut parts: Vec<String> = authentications
        .iter()
        .map(|a| format!("{}@{}", a.authorization_ids().join("|"), a.security_service_id()))
        .collect();
    parts.sort_by(|a, b| {
        service_of(a)
            .cmp(service_of(b))
            .then_with(|| a.cmp(b))
    });
    parts.join("|")
}

fn service_of(part: &str) -> &str {
    part.rsplit_once('@').map(|(_, service)| service).unwrap_or(part)
}
