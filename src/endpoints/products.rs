use actix_web::error::InternalError;
use actix_web::web::{self, Data, Json, Query, ServiceConfig};
use actix_web::{delete, get, post, put, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::models::product::NewProduct;
use crate::services::SharedProductStore;

pub const EMPTY_BODY_MESSAGE: &str = "El contenido no puede estar vacío!";

#[derive(Debug, Deserialize)]
pub struct ProductFilter {
    name: Option<String>,
}

fn message<S: Into<String>>(text: S) -> serde_json::Value {
    json!({ "message": text.into() })
}

fn not_found_message(id: i64) -> serde_json::Value {
    message(format!("No se encontró el producto con id {}.", id))
}

/// Registers the product routes under `/api/productos`.
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/api/productos")
            .service(create)
            .service(find_all)
            .service(find_one)
            .service(update)
            .service(delete)
            .service(delete_all),
    );
}

/// Json extractor configuration: an absent, empty or malformed body becomes
/// a 400 with the original empty-body message.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _| {
        InternalError::from_response(err, HttpResponse::BadRequest().json(message(EMPTY_BODY_MESSAGE)))
            .into()
    })
}

#[post("/")]
pub async fn create(store: Data<SharedProductStore>, body: Json<NewProduct>) -> impl Responder {
    let mut store = store.lock().await;
    match store.create(body.into_inner()).await {
        Ok(product) => HttpResponse::Ok().json(product),
        Err(err) => HttpResponse::InternalServerError().json(message(err.to_string())),
    }
}

#[get("/")]
pub async fn find_all(
    store: Data<SharedProductStore>,
    filter: Query<ProductFilter>,
) -> impl Responder {
    let mut store = store.lock().await;
    match store.get_all(filter.name.as_deref()).await {
        Ok(products) => HttpResponse::Ok().json(products),
        Err(err) => HttpResponse::InternalServerError().json(message(err.to_string())),
    }
}

#[get("/{id}/")]
pub async fn find_one(path: web::Path<i64>, store: Data<SharedProductStore>) -> impl Responder {
    let id = path.into_inner();
    let mut store = store.lock().await;
    match store.find_by_id(id).await {
        Ok(product) => HttpResponse::Ok().json(product),
        Err(err) if err.is_not_found() => HttpResponse::NotFound().json(not_found_message(id)),
        Err(err) => {
            log::error!("find_one({}): {}", id, err);
            HttpResponse::InternalServerError()
                .json(message(format!("Error al obtener el producto con id {}.", id)))
        }
    }
}

#[put("/{id}/")]
pub async fn update(
    path: web::Path<i64>,
    store: Data<SharedProductStore>,
    body: Json<NewProduct>,
) -> impl Responder {
    let id = path.into_inner();
    let mut store = store.lock().await;
    match store.update_by_id(id, body.into_inner()).await {
        Ok(product) => HttpResponse::Ok().json(product),
        Err(err) if err.is_not_found() => HttpResponse::NotFound().json(not_found_message(id)),
        Err(err) => {
            log::error!("update({}): {}", id, err);
            HttpResponse::InternalServerError().json(message(format!(
                "Error al actualizar el producto con id {}.",
                id
            )))
        }
    }
}

#[delete("/{id}/")]
pub async fn delete(path: web::Path<i64>, store: Data<SharedProductStore>) -> impl Responder {
    let id = path.into_inner();
    let mut store = store.lock().await;
    match store.remove(id).await {
        Ok(()) => HttpResponse::Ok().json(message("El producto fue eliminado con éxito!")),
        Err(err) if err.is_not_found() => HttpResponse::NotFound().json(not_found_message(id)),
        Err(err) => {
            log::error!("delete({}): {}", id, err);
            HttpResponse::InternalServerError().json(message(format!(
                "No se pudo eliminar el producto con id {}.",
                id
            )))
        }
    }
}

#[delete("/")]
pub async fn delete_all(store: Data<SharedProductStore>) -> impl Responder {
    let mut store = store.lock().await;
    match store.remove_all().await {
        Ok(_) => HttpResponse::Ok().json(message("Todos los productos fueron eliminados con éxito!")),
        Err(err) => HttpResponse::InternalServerError().json(message(err.to_string())),
    }
}
