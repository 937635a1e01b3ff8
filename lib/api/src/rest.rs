use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use unimatch_core::{Error, PreferenceQuery, Recommender, COLLEGE_NOT_FOUND};

#[derive(Deserialize)]
struct CollegeQuery {
    college_name: String,
}

#[derive(Serialize)]
struct Recommendations<T> {
    recommendations: Vec<T>,
}

#[derive(Serialize)]
struct CollegeList<'a> {
    colleges: Vec<&'a str>,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(recommender: Arc<Recommender>, host: &str, port: u16) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(recommender.clone()))
                .configure(Self::configure)
        })
        .bind((host, port))?
        .run()
        .await
    }

    /// Route table, shared by the server and tests
    pub fn configure(cfg: &mut web::ServiceConfig) {
        cfg.route("/health", web::get().to(health))
            .route("/options", web::get().to(options))
            .route("/colleges", web::get().to(list_colleges))
            .route("/recommend/preferences", web::post().to(recommend_preferences))
            .route("/recommend/college", web::post().to(recommend_college));
    }
}

fn error_response(err: &Error) -> HttpResponse {
    if err.is_not_found() {
        HttpResponse::NotFound().json(serde_json::json!({
            "detail": COLLEGE_NOT_FOUND
        }))
    } else {
        error!("Request failed: {}", err);
        HttpResponse::InternalServerError().json(serde_json::json!({
            "detail": err.to_string()
        }))
    }
}

async fn health(recommender: web::Data<Arc<Recommender>>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "colleges": recommender.catalog().len(),
        "reference_colleges": recommender.reference_catalog().len(),
    })))
}

async fn options(recommender: web::Data<Arc<Recommender>>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(recommender.options()))
}

async fn list_colleges(recommender: web::Data<Arc<Recommender>>) -> ActixResult<HttpResponse> {
    let colleges = recommender.reference_catalog().names();
    Ok(HttpResponse::Ok().json(CollegeList { colleges }))
}

async fn recommend_preferences(
    recommender: web::Data<Arc<Recommender>>,
    req: web::Json<PreferenceQuery>,
) -> ActixResult<HttpResponse> {
    match recommender.recommend_by_preferences(&req) {
        Ok(recommendations) => {
            info!(results = recommendations.len(), "Preference recommendations served");
            Ok(HttpResponse::Ok().json(Recommendations { recommendations }))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

async fn recommend_college(
    recommender: web::Data<Arc<Recommender>>,
    req: web::Json<CollegeQuery>,
) -> ActixResult<HttpResponse> {
    match recommender.recommend_by_college(&req.college_name) {
        Ok(recommendations) => {
            info!(
                college = %req.college_name,
                results = recommendations.len(),
                "College recommendations served"
            );
            Ok(HttpResponse::Ok().json(Recommendations { recommendations }))
        }
        Err(e) => {
            if e.is_not_found() {
                info!(college = %req.college_name, "College not found");
            }
            Ok(error_response(&e))
        }
    }
}
