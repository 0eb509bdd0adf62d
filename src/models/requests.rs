use serde::{Deserialize, Serialize};
use validator::Validate;

/// Offset/limit query string, e.g. `?limit=5&offset=20`
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Request to publish a new listing
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateEstateRequest {
    /// Asking price in model units (millions)
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(range(min = 1900, max = 2100))]
    pub year: i32,
    #[validate(range(min = 1, max = 12))]
    pub month: i32,
    #[validate(range(min = 1, max = 31))]
    pub day: i32,
    /// Time of day as `HH:MM:SS`
    pub time: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub address: Option<String>,
    #[serde(default, alias = "houseType")]
    pub building_type: Option<i32>,
    #[serde(default, alias = "objectType")]
    pub object_type: Option<i32>,
    #[validate(range(min = 1))]
    pub levels: Option<i32>,
    pub level: Option<i32>,
    #[validate(range(min = 0))]
    #[serde(default, alias = "numberOfRooms")]
    pub rooms: Option<i32>,
    #[validate(range(min = 0.0))]
    #[serde(default, alias = "totalArea")]
    pub area: Option<f64>,
    #[validate(range(min = 0.0))]
    #[serde(default, alias = "kitchenArea")]
    pub kitchen_area: Option<f64>,
    #[serde(default, alias = "userId")]
    pub user_id: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateEstateRequest {
        serde_json::from_value(serde_json::json!({
            "price": 1.0,
            "year": 2022,
            "month": 2,
            "day": 25,
            "time": "13:40:25",
            "city": "Москва",
            "building_type": 2,
            "object_type": 1,
            "levels": 35,
            "level": 14,
            "rooms": 2,
            "area": 56.5,
            "kitchen_area": 5.0,
            "user_id": 1
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_listing() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_month() {
        let mut req = request();
        req.month = 13;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_city() {
        let mut req = request();
        req.city = String::new();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_accepts_client_field_names() {
        let req: CreateEstateRequest = serde_json::from_value(serde_json::json!({
            "price": 3.2, "year": 2021, "month": 7, "day": 1, "city": "Казань",
            "houseType": 1, "numberOfRooms": 2, "totalArea": 48.0, "userId": 5
        }))
        .unwrap();

        assert_eq!(req.building_type, Some(1));
        assert_eq!(req.rooms, Some(2));
        assert_eq!(req.area, Some(48.0));
        assert_eq!(req.user_id, Some(5));
        assert!(req.time.is_none());
    }
}
