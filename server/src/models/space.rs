use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::money;
use crate::models::user::require_non_empty;
use crate::utils::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "space_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SpaceType {
    MeetingRoom,
    EventSpace,
    Coworking,
    Studio,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "space_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SpaceStatus {
    Available,
    Booked,
    Maintenance,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Space {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
    #[serde(rename = "type")]
    pub space_type: SpaceType,
    pub status: SpaceStatus,
    pub capacity: i32,
    pub price_per_hour: Decimal,
    pub price_per_day: Decimal,
    pub amenities: Vec<String>,
    pub rules: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Space {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSpace {
    pub name: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
    #[serde(rename = "type")]
    pub space_type: SpaceType,
    pub capacity: i32,
    pub price_per_hour: Decimal,
    pub price_per_day: Decimal,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub rules: Option<String>,
}

impl CreateSpace {
    pub fn validate(&self) -> Result<(), AppError> {
        for (field, value) in [
            ("name", &self.name),
            ("description", &self.description),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("country", &self.country),
            ("postal_code", &self.postal_code),
        ] {
            require_non_empty(field, value)?;
        }
        validate_capacity(self.capacity)?;
        validate_price("price_per_hour", self.price_per_hour)?;
        validate_price("price_per_day", self.price_per_day)
    }

    /// New listings always start available and active.
    pub fn into_space(self, owner_id: Uuid, now: DateTime<Utc>) -> Space {
        Space {
            id: Uuid::new_v4(),
            owner_id,
            name: self.name,
            description: self.description,
            address: self.address,
            city: self.city,
            state: self.state,
            country: self.country,
            postal_code: self.postal_code,
            space_type: self.space_type,
            status: SpaceStatus::Available,
            capacity: self.capacity,
            price_per_hour: self.price_per_hour,
            price_per_day: self.price_per_day,
            amenities: self.amenities,
            rules: self.rules,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a listing. `status` only accepts the operator values
/// (`available`, `maintenance`); `booked` is derived from bookings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpaceChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    #[serde(rename = "type")]
    pub space_type: Option<SpaceType>,
    pub capacity: Option<i32>,
    pub price_per_hour: Option<Decimal>,
    pub price_per_day: Option<Decimal>,
    pub amenities: Option<Vec<String>>,
    pub rules: Option<String>,
    pub status: Option<SpaceStatus>,
}

impl SpaceChanges {
    pub fn validate(&self) -> Result<(), AppError> {
        for (field, value) in [
            ("name", &self.name),
            ("description", &self.description),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("country", &self.country),
            ("postal_code", &self.postal_code),
        ] {
            if let Some(value) = value {
                require_non_empty(field, value)?;
            }
        }
        if let Some(capacity) = self.capacity {
            validate_capacity(capacity)?;
        }
        if let Some(price) = self.price_per_hour {
            validate_price("price_per_hour", price)?;
        }
        if let Some(price) = self.price_per_day {
            validate_price("price_per_day", price)?;
        }
        if self.status == Some(SpaceStatus::Booked) {
            return Err(AppError::ValidationError(
                "Space status 'booked' is derived from confirmed bookings and cannot be set"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Copies descriptive fields onto `space`. Status is left to the caller,
    /// which re-derives it against the space's confirmed bookings.
    pub fn apply_to(self, space: &mut Space) -> Option<SpaceStatus> {
        let SpaceChanges {
            name,
            description,
            address,
            city,
            state,
            country,
            postal_code,
            space_type,
            capacity,
            price_per_hour,
            price_per_day,
            amenities,
            rules,
            status,
        } = self;

        if let Some(v) = name {
            space.name = v;
        }
        if let Some(v) = description {
            space.description = v;
        }
        if let Some(v) = address {
            space.address = v;
        }
        if let Some(v) = city {
            space.city = v;
        }
        if let Some(v) = state {
            space.state = v;
        }
        if let Some(v) = country {
            space.country = v;
        }
        if let Some(v) = postal_code {
            space.postal_code = v;
        }
        if let Some(v) = space_type {
            space.space_type = v;
        }
        if let Some(v) = capacity {
            space.capacity = v;
        }
        if let Some(v) = price_per_hour {
            space.price_per_hour = v;
        }
        if let Some(v) = price_per_day {
            space.price_per_day = v;
        }
        if let Some(v) = amenities {
            space.amenities = v;
        }
        if let Some(v) = rules {
            space.rules = Some(v);
        }
        status
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpaceFilter {
    #[serde(rename = "type")]
    pub space_type: Option<SpaceType>,
    pub city: Option<String>,
    pub status: Option<SpaceStatus>,
    #[serde(skip)]
    pub owner_id: Option<Uuid>,
    #[serde(skip)]
    pub include_inactive: bool,
}

impl SpaceFilter {
    pub fn matches(&self, space: &Space) -> bool {
        (self.include_inactive || space.is_active)
            && self.space_type.map_or(true, |t| space.space_type == t)
            && self.status.map_or(true, |s| space.status == s)
            && self.owner_id.map_or(true, |o| space.owner_id == o)
            && self
                .city
                .as_deref()
                .map_or(true, |c| space.city.eq_ignore_ascii_case(c.trim()))
    }
}

fn validate_capacity(capacity: i32) -> Result<(), AppError> {
    if capacity <= 0 {
        return Err(AppError::ValidationError(
            "capacity must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

fn validate_price(field: &str, price: Decimal) -> Result<(), AppError> {
    if price < Decimal::ZERO {
        return Err(AppError::ValidationError(format!(
            "{field} must not be negative"
        )));
    }
    if !money::fits_column(price) {
        return Err(AppError::ValidationError(format!(
            "{field} must have at most {} decimal places and not exceed {}",
            money::MONEY_SCALE,
            money::max_amount()
        )));
    }
    Ok(())
}
