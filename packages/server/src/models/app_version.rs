use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::app_version::{self, AppVersionType};
use crate::error::AppError;
use crate::models::filter::{Filter, RangeFilter, StringFilter};

/// Request body for create, update and partial update. Every field is
/// optional; for PATCH an absent field means "leave the stored value alone".
#[derive(Debug, Clone, Default, PartialEq, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AppVersionPayload {
    pub id: Option<Uuid>,
    pub major: Option<i32>,
    pub minor: Option<i32>,
    pub patch: Option<i32>,
    pub release_date: Option<DateTime<FixedOffset>>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub r#type: Option<AppVersionType>,
    pub created_by: Option<String>,
    pub created_date: Option<DateTime<Utc>>,
    pub last_modified_by: Option<String>,
    pub last_modified_date: Option<DateTime<Utc>>,
}

impl AppVersionPayload {
    /// True when no field besides the id is set, i.e. a PATCH that would
    /// change nothing.
    pub fn is_noop_update(&self) -> bool {
        let mut probe = self.clone();
        probe.id = None;
        probe == AppVersionPayload::default()
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppVersionResponse {
    pub id: Uuid,
    pub major: Option<i32>,
    pub minor: Option<i32>,
    pub patch: Option<i32>,
    pub release_date: Option<DateTime<FixedOffset>>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub r#type: Option<AppVersionType>,
    pub created_by: Option<String>,
    pub created_date: Option<DateTime<Utc>>,
    pub last_modified_by: Option<String>,
    pub last_modified_date: Option<DateTime<Utc>>,
}

impl From<app_version::Model> for AppVersionResponse {
    fn from(m: app_version::Model) -> Self {
        Self {
            id: m.id,
            major: m.major,
            minor: m.minor,
            patch: m.patch,
            release_date: m.release_date,
            description: m.description,
            location: m.location,
            r#type: m.r#type,
            created_by: m.created_by,
            created_date: m.created_date,
            last_modified_by: m.last_modified_by,
            last_modified_date: m.last_modified_date,
        }
    }
}

/// Top-level list controls, separate from the per-field filters.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// 1-based page number. Pagination applies only when `page` or
    /// `per_page` is given; otherwise all matching records are returned.
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Field to sort by, camelCase (e.g. `releaseDate`).
    pub sort_by: Option<String>,
    /// `asc` or `desc` (default).
    pub sort_order: Option<String>,
}

/// Request-scoped query descriptor: one optional filter per queryable field
/// plus the `distinct` flag. Built from `<field>.<operator>=<value>` query
/// parameters; never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppVersionCriteria {
    pub id: Option<Filter<Uuid>>,
    pub major: Option<RangeFilter<i32>>,
    pub minor: Option<RangeFilter<i32>>,
    pub patch: Option<RangeFilter<i32>>,
    pub release_date: Option<RangeFilter<DateTime<FixedOffset>>>,
    pub description: Option<StringFilter>,
    pub location: Option<StringFilter>,
    pub r#type: Option<Filter<AppVersionType>>,
    pub created_by: Option<StringFilter>,
    pub created_date: Option<RangeFilter<DateTime<Utc>>>,
    pub last_modified_by: Option<StringFilter>,
    pub last_modified_date: Option<RangeFilter<DateTime<Utc>>>,
    pub distinct: Option<bool>,
}

/// Keys consumed by [`ListParams`] rather than the criteria parser.
const LIST_PARAM_KEYS: [&str; 4] = ["page", "per_page", "sort_by", "sort_order"];

impl AppVersionCriteria {
    pub fn id_mut(&mut self) -> &mut Filter<Uuid> {
        self.id.get_or_insert_with(Default::default)
    }

    pub fn major_mut(&mut self) -> &mut RangeFilter<i32> {
        self.major.get_or_insert_with(Default::default)
    }

    pub fn minor_mut(&mut self) -> &mut RangeFilter<i32> {
        self.minor.get_or_insert_with(Default::default)
    }

    pub fn patch_mut(&mut self) -> &mut RangeFilter<i32> {
        self.patch.get_or_insert_with(Default::default)
    }

    pub fn release_date_mut(&mut self) -> &mut RangeFilter<DateTime<FixedOffset>> {
        self.release_date.get_or_insert_with(Default::default)
    }

    pub fn description_mut(&mut self) -> &mut StringFilter {
        self.description.get_or_insert_with(Default::default)
    }

    pub fn location_mut(&mut self) -> &mut StringFilter {
        self.location.get_or_insert_with(Default::default)
    }

    pub fn type_mut(&mut self) -> &mut Filter<AppVersionType> {
        self.r#type.get_or_insert_with(Default::default)
    }

    pub fn created_by_mut(&mut self) -> &mut StringFilter {
        self.created_by.get_or_insert_with(Default::default)
    }

    pub fn created_date_mut(&mut self) -> &mut RangeFilter<DateTime<Utc>> {
        self.created_date.get_or_insert_with(Default::default)
    }

    pub fn last_modified_by_mut(&mut self) -> &mut StringFilter {
        self.last_modified_by.get_or_insert_with(Default::default)
    }

    pub fn last_modified_date_mut(&mut self) -> &mut RangeFilter<DateTime<Utc>> {
        self.last_modified_date.get_or_insert_with(Default::default)
    }

    /// Parse raw query pairs into a typed criteria. Filter keys follow the
    /// `<field>.<operator>` convention with camelCase field names; list
    /// controls are skipped; anything else is rejected so that typos do not
    /// silently produce an unfiltered result.
    pub fn from_query_pairs<'a, I>(pairs: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut criteria = AppVersionCriteria::default();

        for (key, value) in pairs {
            if key == "distinct" {
                criteria.distinct = Some(value.parse().map_err(|_| {
                    AppError::Validation(format!("Invalid value '{value}' for distinct"))
                })?);
                continue;
            }
            if LIST_PARAM_KEYS.contains(&key) {
                continue;
            }

            let Some((field, op)) = key.split_once('.') else {
                return Err(AppError::Validation(format!(
                    "Unknown query parameter '{key}'"
                )));
            };

            match field {
                "id" => criteria.id_mut().apply(field, op, value)?,
                "major" => criteria.major_mut().apply(field, op, value)?,
                "minor" => criteria.minor_mut().apply(field, op, value)?,
                "patch" => criteria.patch_mut().apply(field, op, value)?,
                "releaseDate" => criteria.release_date_mut().apply(field, op, value)?,
                "description" => criteria.description_mut().apply(field, op, value)?,
                "location" => criteria.location_mut().apply(field, op, value)?,
                "type" => criteria.type_mut().apply(field, op, value)?,
                "createdBy" => criteria.created_by_mut().apply(field, op, value)?,
                "createdDate" => criteria.created_date_mut().apply(field, op, value)?,
                "lastModifiedBy" => criteria.last_modified_by_mut().apply(field, op, value)?,
                "lastModifiedDate" => {
                    criteria.last_modified_date_mut().apply(field, op, value)?
                }
                _ => {
                    return Err(AppError::Validation(format!(
                        "Unknown filter field '{field}'"
                    )));
                }
            }
        }

        Ok(criteria)
    }
}
