use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One software release. The id is assigned on first insert and never
/// changes; every other column is independently nullable.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "app_version")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub major: Option<i32>,
    pub minor: Option<i32>,
    pub patch: Option<i32>,

    pub release_date: Option<DateTimeWithTimeZone>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub r#type: Option<AppVersionType>,

    pub created_by: Option<String>,
    pub created_date: Option<DateTimeUtc>,
    pub last_modified_by: Option<String>,
    pub last_modified_date: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}

/// Distribution kind of a release, stored as its wire name.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum AppVersionType {
    #[sea_orm(string_value = "PORTABLE")]
    #[serde(rename = "PORTABLE")]
    Portable,
    #[sea_orm(string_value = "INSTALLABLE")]
    #[serde(rename = "INSTALLABLE")]
    Installable,
}

impl AppVersionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppVersionType::Portable => "PORTABLE",
            AppVersionType::Installable => "INSTALLABLE",
        }
    }
}

impl fmt::Display for AppVersionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppVersionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PORTABLE" => Ok(AppVersionType::Portable),
            "INSTALLABLE" => Ok(AppVersionType::Installable),
            other => Err(format!("unknown app version type '{other}'")),
        }
    }
}
