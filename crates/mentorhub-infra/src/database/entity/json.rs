//! JSON-encoded list columns.

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

use mentorhub_core::domain::Availability;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct StringList(pub Vec<String>);

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct AvailabilityList(pub Vec<Availability>);
