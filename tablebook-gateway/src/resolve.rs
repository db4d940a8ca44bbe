use crate::api::{ApiClient, RestaurantInfo};

/// Which strategy in the chain produced the details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailSource {
    Direct,
    Search,
    Fallback,
}

/// Resolve restaurant details through an ordered list of strategies:
/// the details endpoint, then a filtered search, then details synthesized
/// from what the caller already knows. Each failure is logged and the next
/// strategy tried; the last one cannot fail, so the confirmation view can
/// always render at least partial info.
pub async fn resolve_details(
    api: &ApiClient,
    restaurant_id: Option<i64>,
    known_name: Option<&str>,
    city_hint: Option<&str>,
) -> (RestaurantInfo, DetailSource) {
    if let Some(id) = restaurant_id {
        match api.restaurant_details(id).await {
            Ok(details) => return (details, DetailSource::Direct),
            Err(err) => {
                tracing::debug!("details endpoint failed for restaurant {}: {}", id, err);
            }
        }

        match api.search_restaurants(city_hint, None, None).await {
            Ok(candidates) => {
                let matched = candidates.into_iter().find(|c| {
                    c.id == Some(id)
                        || known_name.is_some_and(|name| c.name.eq_ignore_ascii_case(name))
                });
                if let Some(details) = matched {
                    return (details, DetailSource::Search);
                }
                tracing::debug!("search returned no candidate for restaurant {}", id);
            }
            Err(err) => {
                tracing::debug!("search fallback failed for restaurant {}: {}", id, err);
            }
        }
    }

    let name = known_name
        .map(str::to_string)
        .or_else(|| restaurant_id.map(|id| format!("Restaurant #{}", id)))
        .unwrap_or_else(|| "Restaurant".to_string());

    (
        RestaurantInfo::fallback(restaurant_id, &name),
        DetailSource::Fallback,
    )
}
