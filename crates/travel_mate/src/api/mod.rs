pub mod error;
pub mod handler;
pub mod request;
pub mod response;
pub mod wrapper;

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "travel-mate",
        description = "AI 行李清单 / 旅行贴士 / 天气摘要 API"
    ),
    paths(
        handler::get_weather,
        handler::list_trips,
        handler::create_trip,
        handler::get_trip,
        handler::update_trip,
        handler::delete_trip,
        handler::get_packing_list,
        handler::generate_packing_list,
        handler::add_packing_item,
        handler::update_packing_item,
        handler::delete_packing_item,
        handler::toggle_packing_item,
        handler::get_travel_tips,
        handler::generate_travel_tips,
        handler::get_chat_history,
        handler::send_chat_message,
        handler::get_config,
        handler::update_config,
    )
)]
pub struct ApiDoc;
