use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};

use streamrich_domain::model::{PlanRecord, ProductRecord};
use streamrich_domain::storage::{PlanStore, ProductStore};

use crate::state::AppState;

use super::ApiError;

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductBody {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub in_stock: bool,
    pub purchase_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlanBody {
    pub id: i64,
    pub name: String,
    pub amount: i64,
    pub interval: String,
    pub description: Option<String>,
}

pub async fn list_products_handler(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let listing = match state.product_cache().get() {
        Some(cached) => {
            counter!("api_catalog_requests_total", "endpoint" => "products", "source" => "cache")
                .increment(1);
            cached
        }
        None => {
            let fresh = state.storage().list_products().await?;
            counter!("api_catalog_requests_total", "endpoint" => "products", "source" => "storage")
                .increment(1);
            state.product_cache().store(fresh)
        }
    };

    let bodies: Vec<ProductBody> = listing.iter().cloned().map(product_body).collect();
    Ok(HttpResponse::Ok().json(bodies))
}

pub async fn list_plans_handler(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let plans = state.storage().list_plans().await?;
    counter!("api_catalog_requests_total", "endpoint" => "plans", "source" => "storage")
        .increment(1);
    let bodies: Vec<PlanBody> = plans.into_iter().map(plan_body).collect();
    Ok(HttpResponse::Ok().json(bodies))
}

fn product_body(record: ProductRecord) -> ProductBody {
    ProductBody {
        id: record.id,
        name: record.name,
        price: record.price,
        in_stock: record.in_stock,
        purchase_count: record.purchase_count,
        created_at: record.created_at,
    }
}

fn plan_body(record: PlanRecord) -> PlanBody {
    PlanBody {
        id: record.id,
        name: record.name,
        amount: record.amount,
        interval: record.interval,
        description: record.description,
    }
}
