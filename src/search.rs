//! In-memory filtering and sorting of the service catalog.
//!
//! Filters form an AND-conjunction and are applied in a fixed order: free text,
//! category, location, city, state, minimum rating, price range. Sorting happens
//! after filtering. There is no pagination; the full result set is returned.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ServiceError;
use crate::models::services::Service;

/// Inclusive price bounds parsed from `"min-max"` or `"min"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub min: f64,
    pub max: Option<f64>,
}

impl PriceRange {
    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && self.max.is_none_or(|max| price <= max)
    }
}

impl FromStr for PriceRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |raw: &str| {
            raw.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| format!("invalid price range '{s}'"))
        };

        let (min, max) = match s.split_once('-') {
            Some((min, max)) if max.trim().is_empty() => (parse(min)?, None),
            Some((min, max)) => (parse(min)?, Some(parse(max)?)),
            None => (parse(s)?, None),
        };

        if max.is_some_and(|max| max < min) {
            return Err(format!("invalid price range '{s}'"));
        }

        Ok(Self { min, max })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    Rating,
    PriceLow,
    PriceHigh,
    Reviews,
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rating" => Ok(SortBy::Rating),
            "price-low" => Ok(SortBy::PriceLow),
            "price-high" => Ok(SortBy::PriceHigh),
            "reviews" => Ok(SortBy::Reviews),
            other => Err(format!("unknown sort '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceFilters {
    pub query: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub min_rating: Option<f64>,
    pub price_range: Option<PriceRange>,
}

/// Raw query string of `GET /api/services`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub query: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub rating: Option<f64>,
    pub price_range: Option<String>,
    pub sort: Option<String>,
}

impl SearchParams {
    /// Blank values mean "no filter", as the search form sends empty strings.
    pub fn parse(self) -> Result<(ServiceFilters, Option<SortBy>), ServiceError> {
        let price_range = non_blank(self.price_range)
            .map(|raw| raw.parse::<PriceRange>())
            .transpose()
            .map_err(ServiceError::Validation)?;
        let sort = non_blank(self.sort)
            .map(|raw| raw.parse::<SortBy>())
            .transpose()
            .map_err(ServiceError::Validation)?;

        let filters = ServiceFilters {
            query: non_blank(self.query),
            category: non_blank(self.category),
            location: non_blank(self.location),
            city: non_blank(self.city),
            state: non_blank(self.state),
            min_rating: self.rating.filter(|r| *r > 0.0),
            price_range,
        };

        Ok((filters, sort))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn matches_text(service: &Service, query: &str) -> bool {
    let q = query.to_lowercase();
    contains_ci(&service.title, &q)
        || contains_ci(&service.description, &q)
        || contains_ci(&service.category, &q)
        || service.tags.iter().any(|tag| contains_ci(tag, &q))
}

fn matches_location(service: &Service, location: &str) -> bool {
    let l = location.to_lowercase();
    contains_ci(&service.location, &l)
        || service.city.as_deref().is_some_and(|c| contains_ci(c, &l))
        || service.state.as_deref().is_some_and(|s| contains_ci(s, &l))
}

impl ServiceFilters {
    pub fn matches(&self, service: &Service) -> bool {
        if let Some(query) = &self.query {
            if !matches_text(service, query) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if &service.category != category {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if !matches_location(service, location) {
                return false;
            }
        }
        if let Some(city) = &self.city {
            if service.city.as_ref() != Some(city) {
                return false;
            }
        }
        if let Some(state) = &self.state {
            if service.state.as_ref() != Some(state) {
                return false;
            }
        }
        if let Some(min_rating) = self.min_rating {
            if service.rating < min_rating {
                return false;
            }
        }
        if let Some(range) = &self.price_range {
            if !range.contains(service.price) {
                return false;
            }
        }
        true
    }
}

pub fn filter_services(services: &[Service], filters: &ServiceFilters) -> Vec<Service> {
    services
        .iter()
        .filter(|s| filters.matches(s))
        .cloned()
        .collect()
}

/// Stable sort, so ties keep the catalog's newest-first order.
pub fn sort_services(services: &mut [Service], sort: SortBy) {
    let by_f64 = |a: f64, b: f64| a.partial_cmp(&b).unwrap_or(Ordering::Equal);
    match sort {
        SortBy::Rating => services.sort_by(|a, b| by_f64(b.rating, a.rating)),
        SortBy::PriceLow => services.sort_by(|a, b| by_f64(a.price, b.price)),
        SortBy::PriceHigh => services.sort_by(|a, b| by_f64(b.price, a.price)),
        SortBy::Reviews => services.sort_by(|a, b| b.review_count.cmp(&a.review_count)),
    }
}

/// Filter then optionally sort.
pub fn search(services: &[Service], filters: &ServiceFilters, sort: Option<SortBy>) -> Vec<Service> {
    let mut found = filter_services(services, filters);
    if let Some(sort) = sort {
        sort_services(&mut found, sort);
    }
    found
}
