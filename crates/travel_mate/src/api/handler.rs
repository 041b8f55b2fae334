use axum::extract::{Extension, Json, Path, Query};
use axum::routing::{get, post};
use axum::Router;
use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use std::str::FromStr;
use tracing::{info, warn};

use crate::api::error::{map_generate_error, map_weather_error, InnerApiError};
use crate::api::request::{
    AddPackingItemRequest, CreateTripRequest, SendChatRequest, UpdateConfigRequest, UpdatePackingItemRequest,
    UpdateTripRequest, WeatherQuery,
};
use crate::api::response::{
    group_packing_items, group_tip_items, ChatHistoryResponse, ChatMessageInfo, ChatReplyResponse, ConfigResponse,
    ForecastEntryInfo, GenerateResponse, PackingItemInfo, PackingListResponse, TravelTipsResponse, TripInfo,
    WeatherForecastResponse,
};
use crate::api::wrapper::{ApiError, ApiResponse};
use crate::config::ConfigManager;
use crate::generator::{self, chat, packing, tips};
use crate::openrouter::OpenRouterClient;
use crate::utils::time_format::to_standard_string;
use crate::weather::{self, filter, forecast, geocode};
use travel_mate_entity::category::PackingCategory;
use travel_mate_entity::entities::{packing_item, trip};

/// 缺省账号 ID（账号体系由外部系统维护）
const DEFAULT_USER_ID: i32 = 1;

/// 组装 API 路由
pub fn router() -> Router {
    Router::new()
        .route("/api/weather", get(get_weather))
        .route("/api/trips", get(list_trips).post(create_trip))
        .route(
            "/api/trips/{id}",
            get(get_trip).put(update_trip).delete(delete_trip),
        )
        .route("/api/trips/{id}/packing", get(get_packing_list))
        .route("/api/trips/{id}/packing/generate", post(generate_packing_list))
        .route("/api/trips/{id}/packing/items", post(add_packing_item))
        .route(
            "/api/packing/items/{item_id}",
            axum::routing::put(update_packing_item).delete(delete_packing_item),
        )
        .route("/api/packing/items/{item_id}/toggle", post(toggle_packing_item))
        .route("/api/trips/{id}/tips", get(get_travel_tips))
        .route("/api/trips/{id}/tips/generate", post(generate_travel_tips))
        .route("/api/trips/{id}/chat", get(get_chat_history).post(send_chat_message))
        .route("/api/config", get(get_config).put(update_config))
        .route("/api/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    use utoipa::OpenApi;
    Json(crate::api::ApiDoc::openapi())
}

/// 查找行程，不存在返回 404
async fn find_trip(db: &DatabaseConnection, trip_id: i32) -> Result<trip::Model, ApiError> {
    trip::Entity::find_by_id(trip_id)
        .one(db)
        .await?
        .ok_or_else(|| InnerApiError::NotFound(trip_id).into())
}

#[utoipa::path(
    get,
    path = "/api/weather",
    params(WeatherQuery),
    responses(
        (status = 200, body = ApiResponse<WeatherForecastResponse>),
    )
)]
pub async fn get_weather(
    Extension(manager): Extension<ConfigManager>,
    Query(params): Query<WeatherQuery>,
) -> Result<ApiResponse<WeatherForecastResponse>, ApiError> {
    let (city, start_raw, end_raw) = match (params.city, params.start_date, params.end_date) {
        (Some(city), Some(start), Some(end)) if !city.trim().is_empty() => (city, start, end),
        _ => {
            return Err(InnerApiError::BadRequest("city、start_date、end_date 参数必填".to_string()).into());
        }
    };

    let start = NaiveDate::parse_from_str(&start_raw, "%Y-%m-%d")
        .map_err(|_| InnerApiError::BadRequest("start_date 格式应为 YYYY-MM-DD".to_string()))?;
    let end = NaiveDate::parse_from_str(&end_raw, "%Y-%m-%d")
        .map_err(|_| InnerApiError::BadRequest("end_date 格式应为 YYYY-MM-DD".to_string()))?;
    if start > end {
        return Err(InnerApiError::BadRequest("start_date 不能晚于 end_date".to_string()).into());
    }
    let trip_duration = (end - start).num_days() + 1;

    let config = manager.load_config().await?;

    // 出发日期超出预报视界：返回空列表与说明，调用方应按"预报尚不可用"处理
    if filter::beyond_forecast_horizon(start, Utc::now(), config.weather.forecast_horizon_days) {
        warn!("请求日期超出预报范围: {} ~ {}", start, end);
        return Ok(ApiResponse::ok(WeatherForecastResponse {
            city,
            list: Vec::new(),
            trip_duration,
            message: Some(format!(
                "Requested dates are beyond the available {}-day forecast range.",
                config.weather.forecast_horizon_days
            )),
        }));
    }

    let client = weather::build_client(&config.weather).map_err(map_weather_error)?;
    let (latitude, longitude) = geocode::geocode_city(&client, &config.weather, &city)
        .await
        .map_err(map_weather_error)?;
    let response = forecast::fetch_forecast(&client, &config.weather, latitude, longitude)
        .await
        .map_err(map_weather_error)?;

    let filtered = filter::filter_entries(&response.list, start, end);
    if !response.list.is_empty() && filtered.is_empty() {
        info!(
            "过滤后没有预报条目: {} ~ {}，原始条目 {} 条",
            start,
            end,
            response.list.len()
        );
    }

    Ok(ApiResponse::ok(WeatherForecastResponse {
        city: response.city.name,
        list: filtered.iter().map(ForecastEntryInfo::from).collect(),
        trip_duration,
        message: None,
    }))
}

#[utoipa::path(
    get,
    path = "/api/trips",
    responses(
        (status = 200, body = ApiResponse<Vec<TripInfo>>),
    )
)]
pub async fn list_trips(
    Extension(db): Extension<DatabaseConnection>,
) -> Result<ApiResponse<Vec<TripInfo>>, ApiError> {
    let trips = trip::Entity::find()
        .order_by_desc(trip::Column::CreatedAt)
        .all(&db)
        .await?;
    Ok(ApiResponse::ok(trips.into_iter().map(TripInfo::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/trips",
    request_body = CreateTripRequest,
    responses(
        (status = 200, body = ApiResponse<TripInfo>),
    )
)]
pub async fn create_trip(
    Extension(db): Extension<DatabaseConnection>,
    Json(request): Json<CreateTripRequest>,
) -> Result<ApiResponse<TripInfo>, ApiError> {
    if request.destination.trim().is_empty() {
        return Err(InnerApiError::BadRequest("目的地不能为空".to_string()).into());
    }
    if request.date_leaving > request.date_returning {
        return Err(InnerApiError::BadRequest("出发日期不能晚于返程日期".to_string()).into());
    }

    let model = trip::ActiveModel {
        user_id: Set(request.user_id.unwrap_or(DEFAULT_USER_ID)),
        destination: Set(request.destination.trim().to_string()),
        date_leaving: Set(request.date_leaving),
        date_returning: Set(request.date_returning),
        activities: Set(request.activities.unwrap_or_default()),
        notes: Set(request.notes.unwrap_or_default()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let inserted = model.insert(&db).await?;
    info!("创建行程 {}（{}）", inserted.id, inserted.destination);
    Ok(ApiResponse::ok(TripInfo::from(inserted)))
}

#[utoipa::path(
    get,
    path = "/api/trips/{id}",
    params(("id" = i32, Path, description = "行程 ID")),
    responses(
        (status = 200, body = ApiResponse<TripInfo>),
    )
)]
pub async fn get_trip(
    Extension(db): Extension<DatabaseConnection>,
    Path(trip_id): Path<i32>,
) -> Result<ApiResponse<TripInfo>, ApiError> {
    let trip = find_trip(&db, trip_id).await?;
    Ok(ApiResponse::ok(TripInfo::from(trip)))
}

#[utoipa::path(
    put,
    path = "/api/trips/{id}",
    params(("id" = i32, Path, description = "行程 ID")),
    request_body = UpdateTripRequest,
    responses(
        (status = 200, body = ApiResponse<TripInfo>),
    )
)]
pub async fn update_trip(
    Extension(db): Extension<DatabaseConnection>,
    Path(trip_id): Path<i32>,
    Json(request): Json<UpdateTripRequest>,
) -> Result<ApiResponse<TripInfo>, ApiError> {
    let existing = find_trip(&db, trip_id).await?;

    let date_leaving = request.date_leaving.unwrap_or(existing.date_leaving);
    let date_returning = request.date_returning.unwrap_or(existing.date_returning);
    if date_leaving > date_returning {
        return Err(InnerApiError::BadRequest("出发日期不能晚于返程日期".to_string()).into());
    }
    if let Some(destination) = &request.destination {
        if destination.trim().is_empty() {
            return Err(InnerApiError::BadRequest("目的地不能为空".to_string()).into());
        }
    }

    let mut active: trip::ActiveModel = existing.into();
    if let Some(destination) = request.destination {
        active.destination = Set(destination.trim().to_string());
    }
    active.date_leaving = Set(date_leaving);
    active.date_returning = Set(date_returning);
    if let Some(activities) = request.activities {
        active.activities = Set(activities);
    }
    if let Some(notes) = request.notes {
        active.notes = Set(notes);
    }
    let updated = active.update(&db).await?;
    Ok(ApiResponse::ok(TripInfo::from(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/trips/{id}",
    params(("id" = i32, Path, description = "行程 ID")),
    responses(
        (status = 200, body = ApiResponse<TripInfo>),
    )
)]
pub async fn delete_trip(
    Extension(db): Extension<DatabaseConnection>,
    Path(trip_id): Path<i32>,
) -> Result<ApiResponse<TripInfo>, ApiError> {
    let existing = find_trip(&db, trip_id).await?;
    // 外键级联会一并删除清单 / 贴士 / 对话等全部派生内容
    trip::Entity::delete_by_id(trip_id).exec(&db).await?;
    info!("删除行程 {} 及其全部生成内容", trip_id);
    Ok(ApiResponse::ok(TripInfo::from(existing)))
}

#[utoipa::path(
    get,
    path = "/api/trips/{id}/packing",
    params(("id" = i32, Path, description = "行程 ID")),
    responses(
        (status = 200, body = ApiResponse<PackingListResponse>),
    )
)]
pub async fn get_packing_list(
    Extension(db): Extension<DatabaseConnection>,
    Path(trip_id): Path<i32>,
) -> Result<ApiResponse<PackingListResponse>, ApiError> {
    find_trip(&db, trip_id).await?;
    let list = packing::get_or_create_packing_list(&db, trip_id).await?;
    let items = packing::list_items(&db, list.id).await?;

    Ok(ApiResponse::ok(PackingListResponse {
        trip_id,
        generated: list.generated,
        last_updated: to_standard_string(list.last_updated),
        categories: group_packing_items(items),
    }))
}

#[utoipa::path(
    post,
    path = "/api/trips/{id}/packing/generate",
    params(("id" = i32, Path, description = "行程 ID")),
    responses(
        (status = 200, body = ApiResponse<GenerateResponse>),
    )
)]
pub async fn generate_packing_list(
    Extension(db): Extension<DatabaseConnection>,
    Extension(manager): Extension<ConfigManager>,
    Path(trip_id): Path<i32>,
) -> Result<ApiResponse<GenerateResponse>, ApiError> {
    let trip = find_trip(&db, trip_id).await?;

    // 同一行程的生成请求串行化
    let lock = generator::trip_generation_lock(trip_id);
    let _guard = lock.lock().await;

    let config = manager.load_config().await?;

    // 天气失败不阻断生成，摘要退化为占位句
    let digest = weather::fetch_weather_digest(
        &config.weather,
        &trip.destination,
        trip.date_leaving,
        trip.date_returning,
    )
    .await;
    info!("行程 {} 的天气摘要: {}", trip_id, digest);

    let client = OpenRouterClient::new(&config.openrouter)
        .map_err(|e| map_generate_error(generator::GenerateError::Completion(e)))?;
    let plan = packing::generate_packing_plan(&client, &trip, &digest)
        .await
        .map_err(map_generate_error)?;

    let list = packing::get_or_create_packing_list(&db, trip_id).await?;
    let items_created = packing::save_packing_plan(&db, list.id, &plan).await?;
    Ok(ApiResponse::ok(GenerateResponse { items_created }))
}

#[utoipa::path(
    post,
    path = "/api/trips/{id}/packing/items",
    params(("id" = i32, Path, description = "行程 ID")),
    request_body = AddPackingItemRequest,
    responses(
        (status = 200, body = ApiResponse<PackingItemInfo>),
    )
)]
pub async fn add_packing_item(
    Extension(db): Extension<DatabaseConnection>,
    Path(trip_id): Path<i32>,
    Json(request): Json<AddPackingItemRequest>,
) -> Result<ApiResponse<PackingItemInfo>, ApiError> {
    let trip = find_trip(&db, trip_id).await?;

    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(InnerApiError::BadRequest("条目名称不能为空".to_string()).into());
    }
    if let Some(for_day) = request.for_day {
        if for_day < trip.date_leaving || for_day > trip.date_returning {
            return Err(InnerApiError::BadRequest("指定日期必须在行程日期范围内".to_string()).into());
        }
    }

    // 非法类别代码降级为 MISC，不拒绝请求
    let category = match request.category.as_deref() {
        Some(code) => match PackingCategory::from_str(code) {
            Ok(category) => category,
            Err(_) => {
                warn!("收到非法类别代码 '{}'，降级为 MISC", code);
                PackingCategory::Misc
            }
        },
        None => PackingCategory::Misc,
    };

    let list = packing::get_or_create_packing_list(&db, trip_id).await?;
    let model = packing_item::ActiveModel {
        packing_list_id: Set(list.id),
        name: Set(name),
        category: Set(category.code().to_string()),
        quantity: Set(request.quantity.unwrap_or(1).max(1)),
        is_essential: Set(request.is_essential.unwrap_or(false)),
        notes: Set(request.notes.unwrap_or_default()),
        for_day: Set(request.for_day),
        custom_added: Set(true),
        completed: Set(false),
        ..Default::default()
    };
    let inserted = model.insert(&db).await?;
    Ok(ApiResponse::ok(PackingItemInfo::from(inserted)))
}

#[utoipa::path(
    put,
    path = "/api/packing/items/{item_id}",
    params(("item_id" = i32, Path, description = "条目 ID")),
    request_body = UpdatePackingItemRequest,
    responses(
        (status = 200, body = ApiResponse<PackingItemInfo>),
    )
)]
pub async fn update_packing_item(
    Extension(db): Extension<DatabaseConnection>,
    Path(item_id): Path<i32>,
    Json(request): Json<UpdatePackingItemRequest>,
) -> Result<ApiResponse<PackingItemInfo>, ApiError> {
    let existing = packing_item::Entity::find_by_id(item_id)
        .one(&db)
        .await?
        .ok_or(InnerApiError::NotFound(item_id))?;

    let mut active: packing_item::ActiveModel = existing.into();
    if let Some(name) = request.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(InnerApiError::BadRequest("条目名称不能为空".to_string()).into());
        }
        active.name = Set(name);
    }
    if let Some(code) = request.category {
        match PackingCategory::from_str(&code) {
            Ok(category) => active.category = Set(category.code().to_string()),
            // 非法类别代码忽略本次变更
            Err(_) => warn!("更新条目 {} 时收到非法类别代码 '{}'，忽略", item_id, code),
        }
    }
    if let Some(quantity) = request.quantity {
        active.quantity = Set(quantity.max(1));
    }
    if let Some(essential) = request.is_essential {
        active.is_essential = Set(essential);
    }
    if let Some(notes) = request.notes {
        active.notes = Set(notes);
    }
    if let Some(for_day) = request.for_day {
        active.for_day = Set(for_day);
    }

    let updated = active.update(&db).await?;
    Ok(ApiResponse::ok(PackingItemInfo::from(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/packing/items/{item_id}",
    params(("item_id" = i32, Path, description = "条目 ID")),
    responses(
        (status = 200, body = ApiResponse<PackingItemInfo>),
    )
)]
pub async fn delete_packing_item(
    Extension(db): Extension<DatabaseConnection>,
    Path(item_id): Path<i32>,
) -> Result<ApiResponse<PackingItemInfo>, ApiError> {
    let existing = packing_item::Entity::find_by_id(item_id)
        .one(&db)
        .await?
        .ok_or(InnerApiError::NotFound(item_id))?;
    packing_item::Entity::delete_by_id(item_id).exec(&db).await?;
    info!("删除行李条目 {}（{}）", item_id, existing.name);
    Ok(ApiResponse::ok(PackingItemInfo::from(existing)))
}

#[utoipa::path(
    post,
    path = "/api/packing/items/{item_id}/toggle",
    params(("item_id" = i32, Path, description = "条目 ID")),
    responses(
        (status = 200, body = ApiResponse<PackingItemInfo>),
    )
)]
pub async fn toggle_packing_item(
    Extension(db): Extension<DatabaseConnection>,
    Path(item_id): Path<i32>,
) -> Result<ApiResponse<PackingItemInfo>, ApiError> {
    let existing = packing_item::Entity::find_by_id(item_id)
        .one(&db)
        .await?
        .ok_or(InnerApiError::NotFound(item_id))?;

    let completed = !existing.completed;
    let mut active: packing_item::ActiveModel = existing.into();
    active.completed = Set(completed);
    let updated = active.update(&db).await?;
    Ok(ApiResponse::ok(PackingItemInfo::from(updated)))
}

#[utoipa::path(
    get,
    path = "/api/trips/{id}/tips",
    params(("id" = i32, Path, description = "行程 ID")),
    responses(
        (status = 200, body = ApiResponse<TravelTipsResponse>),
    )
)]
pub async fn get_travel_tips(
    Extension(db): Extension<DatabaseConnection>,
    Path(trip_id): Path<i32>,
) -> Result<ApiResponse<TravelTipsResponse>, ApiError> {
    find_trip(&db, trip_id).await?;
    let tips_model = tips::get_or_create_travel_tips(&db, trip_id).await?;
    let items = tips::list_tips(&db, tips_model.id).await?;

    Ok(ApiResponse::ok(TravelTipsResponse {
        trip_id,
        generated: tips_model.generated,
        last_updated: to_standard_string(tips_model.last_updated),
        categories: group_tip_items(items),
    }))
}

#[utoipa::path(
    post,
    path = "/api/trips/{id}/tips/generate",
    params(("id" = i32, Path, description = "行程 ID")),
    responses(
        (status = 200, body = ApiResponse<GenerateResponse>),
    )
)]
pub async fn generate_travel_tips(
    Extension(db): Extension<DatabaseConnection>,
    Extension(manager): Extension<ConfigManager>,
    Path(trip_id): Path<i32>,
) -> Result<ApiResponse<GenerateResponse>, ApiError> {
    let trip = find_trip(&db, trip_id).await?;

    let lock = generator::trip_generation_lock(trip_id);
    let _guard = lock.lock().await;

    let config = manager.load_config().await?;
    let client = OpenRouterClient::new(&config.openrouter)
        .map_err(|e| map_generate_error(generator::GenerateError::Completion(e)))?;
    let plan = tips::generate_tips_plan(&client, &trip)
        .await
        .map_err(map_generate_error)?;

    let tips_model = tips::get_or_create_travel_tips(&db, trip_id).await?;
    let items_created = tips::save_tips_plan(&db, tips_model.id, &plan).await?;
    Ok(ApiResponse::ok(GenerateResponse { items_created }))
}

#[utoipa::path(
    get,
    path = "/api/trips/{id}/chat",
    params(("id" = i32, Path, description = "行程 ID")),
    responses(
        (status = 200, body = ApiResponse<ChatHistoryResponse>),
    )
)]
pub async fn get_chat_history(
    Extension(db): Extension<DatabaseConnection>,
    Path(trip_id): Path<i32>,
) -> Result<ApiResponse<ChatHistoryResponse>, ApiError> {
    find_trip(&db, trip_id).await?;
    let messages = chat::list_messages(&db, trip_id).await?;
    Ok(ApiResponse::ok(ChatHistoryResponse {
        trip_id,
        messages: messages.into_iter().map(ChatMessageInfo::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/trips/{id}/chat",
    params(("id" = i32, Path, description = "行程 ID")),
    request_body = SendChatRequest,
    responses(
        (status = 200, body = ApiResponse<ChatReplyResponse>),
    )
)]
pub async fn send_chat_message(
    Extension(db): Extension<DatabaseConnection>,
    Extension(manager): Extension<ConfigManager>,
    Path(trip_id): Path<i32>,
    Json(request): Json<SendChatRequest>,
) -> Result<ApiResponse<ChatReplyResponse>, ApiError> {
    let trip = find_trip(&db, trip_id).await?;

    let message = request.message.trim().to_string();
    if message.is_empty() {
        return Err(InnerApiError::BadRequest("消息不能为空".to_string()).into());
    }

    let config = manager.load_config().await?;
    let client = OpenRouterClient::new(&config.openrouter)
        .map_err(|e| map_generate_error(generator::GenerateError::Completion(e)))?;

    let reply = chat::send_chat_message(
        &db,
        &client,
        &trip,
        request.user_id.unwrap_or(DEFAULT_USER_ID),
        &message,
    )
    .await
    .map_err(map_generate_error)?;

    Ok(ApiResponse::ok(ChatReplyResponse { reply }))
}

#[utoipa::path(
    get,
    path = "/api/config",
    responses(
        (status = 200, body = ApiResponse<ConfigResponse>),
    )
)]
pub async fn get_config(
    Extension(manager): Extension<ConfigManager>,
) -> Result<ApiResponse<ConfigResponse>, ApiError> {
    let config = manager.load_config().await?;
    Ok(ApiResponse::ok(ConfigResponse::from(&config)))
}

#[utoipa::path(
    put,
    path = "/api/config",
    request_body = UpdateConfigRequest,
    responses(
        (status = 200, body = ApiResponse<ConfigResponse>),
    )
)]
pub async fn update_config(
    Extension(manager): Extension<ConfigManager>,
    Json(request): Json<UpdateConfigRequest>,
) -> Result<ApiResponse<ConfigResponse>, ApiError> {
    let updated = manager
        .update_item(&request.key_name, request.value)
        .await
        .map_err(|e| InnerApiError::BadRequest(e.to_string()))?;
    Ok(ApiResponse::ok(ConfigResponse::from(&updated)))
}
