use chrono::{DateTime, Local, Utc};

/// 当前本地时间的标准格式字符串
pub fn now_standard_string() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// 将 UTC 时间转为本地标准格式字符串（用于 API 展示）
pub fn to_standard_string(datetime: DateTime<Utc>) -> String {
    datetime
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
