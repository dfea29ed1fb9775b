//! Public calculator endpoints. None of them touch the database.

use axum::{extract::Query, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use crate::error::Result;
use crate::tools::{
    password::{self, CharClasses, StrengthLabel},
    unit_converter::{self, Category},
    wellness::{self, TipCategory},
    QrPayload,
};

#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    pub category: String,
    pub from: String,
    pub to: String,
    /// Raw text as typed; anything non-numeric yields "Invalid input".
    pub value: Value,
}

#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub result: String,
    pub category: Category,
    pub from: &'static str,
    pub to: &'static str,
}

/// POST /api/tools/convert
pub async fn convert(Json(req): Json<ConvertRequest>) -> Result<Json<ConvertResponse>> {
    let category: Category = req.category.parse()?;
    let from = category.find_unit(&req.from)?;
    let to = category.find_unit(&req.to)?;
    let input = match &req.value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    };
    let result = unit_converter::convert_input(category, from.name, to.name, &input)?;
    Ok(Json(ConvertResponse {
        result,
        category,
        from: from.name,
        to: to.name,
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateRequest {
    #[validate(range(min = 1, max = 128))]
    pub length: usize,
    #[serde(flatten)]
    pub classes: CharClasses,
}

/// POST /api/tools/password/generate
pub async fn generate_password(Json(req): Json<GenerateRequest>) -> Result<Json<Value>> {
    req.validate()?;
    let generated = password::generate(req.length, req.classes, &mut rand::thread_rng());
    let strength = StrengthLabel::of(&generated);
    Ok(Json(json!({
        "password": generated,
        "length": req.length,
        "strength": strength,
    })))
}

#[derive(Debug, Deserialize)]
pub struct StrengthRequest {
    pub password: String,
}

/// POST /api/tools/password/strength
pub async fn password_strength(Json(req): Json<StrengthRequest>) -> Json<Value> {
    let score = password::strength_score(&req.password);
    Json(json!({
        "score": score,
        "strength": StrengthLabel::from_score(score),
        "length": req.password.chars().count(),
    }))
}

/// POST /api/tools/qr
pub async fn qr_payload(Json(payload): Json<QrPayload>) -> Json<Value> {
    Json(json!({ "payload": payload.encode() }))
}

#[derive(Debug, Deserialize)]
pub struct WellnessQuery {
    #[serde(default)]
    pub category: Option<TipCategory>,
}

/// GET /api/tools/wellness?category=sleep
pub async fn wellness_tips(Query(query): Query<WellnessQuery>) -> Json<Value> {
    let groups: Vec<Value> = wellness::tips_for(query.category)
        .into_iter()
        .map(|(category, tips)| json!({ "category": category, "tips": tips }))
        .collect();
    Json(json!({ "categories": groups }))
}
