use crate::core::predicate::EstateColumn;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// A listing as stored in the `estates` table
///
/// Prices are kept in model units (millions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Estate {
    pub estate_id: i32,
    pub price: f64,
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub time: Option<NaiveTime>,
    pub latitude: f64,
    pub longitude: f64,
    pub region: Option<i32>,
    pub building_type: Option<i32>,
    pub level: Option<i32>,
    pub levels: Option<i32>,
    pub rooms: Option<i32>,
    pub area: Option<f64>,
    pub kitchen_area: Option<f64>,
    pub object_type: Option<i32>,
    pub address: Option<String>,
    pub region_name: Option<String>,
    pub user_id: Option<i32>,
}

impl Estate {
    /// Numeric value of a filterable column, `None` when the column is NULL
    pub fn value_of(&self, column: EstateColumn) -> Option<f64> {
        match column {
            EstateColumn::Price => Some(self.price),
            EstateColumn::Area => self.area,
            EstateColumn::KitchenArea => self.kitchen_area,
            EstateColumn::Levels => self.levels.map(f64::from),
            EstateColumn::Level => self.level.map(f64::from),
            EstateColumn::Rooms => self.rooms.map(f64::from),
            EstateColumn::BuildingType => self.building_type.map(f64::from),
            EstateColumn::ObjectType => self.object_type.map(f64::from),
            EstateColumn::Latitude => Some(self.latitude),
            EstateColumn::Longitude => Some(self.longitude),
        }
    }
}

/// A listing about to be inserted; the id is assigned by the database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEstate {
    pub price: f64,
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub time: Option<NaiveTime>,
    pub latitude: f64,
    pub longitude: f64,
    pub building_type: Option<i32>,
    pub level: Option<i32>,
    pub levels: Option<i32>,
    pub rooms: Option<i32>,
    pub area: Option<f64>,
    pub kitchen_area: Option<f64>,
    pub object_type: Option<i32>,
    pub address: Option<String>,
    pub user_id: Option<i32>,
}

impl NewEstate {
    pub fn into_estate(self, estate_id: i32) -> Estate {
        Estate {
            estate_id,
            price: self.price,
            year: self.year,
            month: self.month,
            day: self.day,
            time: self.time,
            latitude: self.latitude,
            longitude: self.longitude,
            region: None,
            building_type: self.building_type,
            level: self.level,
            levels: self.levels,
            rooms: self.rooms,
            area: self.area,
            kitchen_area: self.kitchen_area,
            object_type: self.object_type,
            address: self.address,
            region_name: None,
            user_id: self.user_id,
        }
    }
}

#[cfg(test)]
impl Estate {
    /// Two-room flat in central Moscow listed on 2022-02-25
    pub fn sample(estate_id: i32) -> Self {
        Self {
            estate_id,
            price: 9.5,
            year: 2022,
            month: 2,
            day: 25,
            time: NaiveTime::from_hms_opt(13, 40, 25),
            latitude: 55.75,
            longitude: 37.61,
            region: Some(3),
            building_type: Some(2),
            level: Some(14),
            levels: Some(25),
            rooms: Some(2),
            area: Some(56.5),
            kitchen_area: Some(10.0),
            object_type: Some(1),
            address: None,
            region_name: None,
            user_id: Some(1),
        }
    }
}
