//! Synthesized degraded-mode responses. Each body keeps the schema the real
//! endpoint returns and adds a `fallback: true` marker so clients can tell
//! canned data from live data without special-casing the shape.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackKind {
    Vehicles,
    Statistics,
    MarketData,
    Opportunities,
    Chat,
    Generic,
}

impl FallbackKind {
    pub fn for_path(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "/api/vehicles" | "/vehicles" => Self::Vehicles,
            "/api/statistics" | "/statistics" => Self::Statistics,
            "/api/market-data" | "/market-data" => Self::MarketData,
            "/api/opportunities" | "/opportunities" => Self::Opportunities,
            _ if trimmed.starts_with("/chat") => Self::Chat,
            _ => Self::Generic,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FallbackVehicle {
    pub id: String,
    pub make: String,
    pub model: String,
    pub year: u16,
    pub color: String,
    pub price: u32,
    pub mileage: u32,
    pub condition: String,
    pub features: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct VehiclesFallback {
    pub vehicles: Vec<FallbackVehicle>,
    pub fallback: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    pub min: u32,
    pub max: u32,
    pub median: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsFallback {
    pub vehicle_count: u32,
    pub average_price: u32,
    pub average_mileage: u32,
    pub make_distribution: BTreeMap<String, u32>,
    pub year_distribution: BTreeMap<String, u32>,
    pub price_range: PriceRange,
    pub fallback: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketTrend {
    pub month: String,
    pub average_price: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketDataFallback {
    pub trends: Vec<MarketTrend>,
    pub demand_index: BTreeMap<String, u32>,
    pub fallback: bool,
}

#[derive(Debug, Serialize)]
pub struct Opportunity {
    pub id: String,
    pub title: String,
    pub description: String,
    pub confidence: u8,
    pub impact: String,
    pub category: String,
}

#[derive(Debug, Serialize)]
pub struct OpportunitiesFallback {
    pub opportunities: Vec<Opportunity>,
    pub fallback: bool,
}

#[derive(Debug, Serialize)]
pub struct ChatFallback {
    pub agent_name: String,
    pub response: String,
    pub success: bool,
    pub fallback: bool,
}

#[derive(Debug, Serialize)]
pub struct GenericFallback {
    pub error: String,
    pub message: String,
    pub success: bool,
    pub fallback: bool,
}

pub fn vehicles() -> VehiclesFallback {
    VehiclesFallback {
        vehicles: vec![
            FallbackVehicle {
                id: "1".to_string(),
                make: "Toyota".to_string(),
                model: "Camry".to_string(),
                year: 2021,
                color: "Blue".to_string(),
                price: 28_500,
                mileage: 15_000,
                condition: "Excellent".to_string(),
                features: vec![
                    "Bluetooth".to_string(),
                    "Backup Camera".to_string(),
                    "Sunroof".to_string(),
                ],
            },
            FallbackVehicle {
                id: "2".to_string(),
                make: "Honda".to_string(),
                model: "Civic".to_string(),
                year: 2022,
                color: "White".to_string(),
                price: 24_700,
                mileage: 8_000,
                condition: "Like New".to_string(),
                features: vec![
                    "Apple CarPlay".to_string(),
                    "Lane Assist".to_string(),
                    "Heated Seats".to_string(),
                ],
            },
            FallbackVehicle {
                id: "3".to_string(),
                make: "Ford".to_string(),
                model: "F-150".to_string(),
                year: 2020,
                color: "Black".to_string(),
                price: 38_500,
                mileage: 22_000,
                condition: "Good".to_string(),
                features: vec![
                    "Towing Package".to_string(),
                    "4x4".to_string(),
                    "Navigation".to_string(),
                ],
            },
        ],
        fallback: true,
    }
}

pub fn statistics() -> StatisticsFallback {
    StatisticsFallback {
        vehicle_count: 200,
        average_price: 32_450,
        average_mileage: 18_750,
        make_distribution: [
            ("Toyota", 45),
            ("Honda", 38),
            ("Ford", 33),
            ("Chevrolet", 29),
            ("BMW", 22),
            ("Other", 33),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect(),
        year_distribution: [
            ("2023", 35),
            ("2022", 42),
            ("2021", 51),
            ("2020", 38),
            ("2019", 22),
            ("Older", 12),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect(),
        price_range: PriceRange {
            min: 12_500,
            max: 85_000,
            median: 31_250,
        },
        fallback: true,
    }
}

pub fn market_data() -> MarketDataFallback {
    MarketDataFallback {
        trends: vec![
            MarketTrend {
                month: "January".to_string(),
                average_price: 31_200,
            },
            MarketTrend {
                month: "February".to_string(),
                average_price: 31_050,
            },
            MarketTrend {
                month: "March".to_string(),
                average_price: 31_500,
            },
            MarketTrend {
                month: "April".to_string(),
                average_price: 32_100,
            },
            MarketTrend {
                month: "May".to_string(),
                average_price: 32_450,
            },
        ],
        demand_index: [
            ("sedans", 72),
            ("suvs", 88),
            ("trucks", 76),
            ("luxury", 64),
            ("electric", 91),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect(),
        fallback: true,
    }
}

pub fn opportunities() -> OpportunitiesFallback {
    OpportunitiesFallback {
        opportunities: vec![
            Opportunity {
                id: "opp1".to_string(),
                title: "High Demand: Electric Sedans".to_string(),
                description: "Electric sedans are showing increased demand with 15% growth in searches."
                    .to_string(),
                confidence: 85,
                impact: "high".to_string(),
                category: "inventory".to_string(),
            },
            Opportunity {
                id: "opp2".to_string(),
                title: "Underpriced Models".to_string(),
                description: "Several Toyota Camry models are priced 8% below market average."
                    .to_string(),
                confidence: 92,
                impact: "medium".to_string(),
                category: "pricing".to_string(),
            },
        ],
        fallback: true,
    }
}

pub fn chat() -> ChatFallback {
    ChatFallback {
        agent_name: "attribute_agent".to_string(),
        response: "I can only answer simple attribute questions about vehicles right now. \
                   The main analysis service is currently unavailable. Try asking about counts \
                   of vehicles by color, make, model, or year."
            .to_string(),
        success: true,
        fallback: true,
    }
}

pub fn generic(path: &str) -> GenericFallback {
    GenericFallback {
        error: "Server unavailable".to_string(),
        message: format!("The endpoint {} is not available at this time.", path),
        success: false,
        fallback: true,
    }
}

/// Renders the fallback response for a path. Known shapes are 200 so client
/// code keeps working; unknown paths get an honest 503.
pub fn respond(kind: FallbackKind, path: &str) -> Response {
    match kind {
        FallbackKind::Vehicles => (StatusCode::OK, Json(vehicles())).into_response(),
        FallbackKind::Statistics => (StatusCode::OK, Json(statistics())).into_response(),
        FallbackKind::MarketData => (StatusCode::OK, Json(market_data())).into_response(),
        FallbackKind::Opportunities => (StatusCode::OK, Json(opportunities())).into_response(),
        FallbackKind::Chat => (StatusCode::OK, Json(chat())).into_response(),
        FallbackKind::Generic => {
            (StatusCode::SERVICE_UNAVAILABLE, Json(generic(path))).into_response()
        }
    }
}
