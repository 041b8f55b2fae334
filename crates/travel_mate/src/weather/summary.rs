//! 预报摘要：把过滤后的条目压缩成一段英文摘要
//!
//! 摘要会原样嵌入行李清单提示词，句式保持稳定，便于测试断言。

use crate::weather::forecast::ForecastEntry;

/// 这些状况标签本身就意味着降水
const PRECIP_CONDITIONS: [&str; 4] = ["Rain", "Snow", "Drizzle", "Thunderstorm"];

/// 降水概率超过该阈值即认为可能降水
const PRECIP_POP_THRESHOLD: f64 = 0.3;

/// 生成天气摘要
///
/// 空输入返回固定的"暂无数据"句子，避免除零。
pub fn summarize_forecast(entries: &[ForecastEntry], city_name: &str) -> String {
    if entries.is_empty() {
        return format!(
            "No specific forecast data available for the selected dates in {} (may be too far out).",
            city_name
        );
    }

    let count = entries.len() as f64;
    let avg_temp = entries.iter().map(|e| e.main.temp).sum::<f64>() / count;
    let avg_feels_like = entries.iter().map(|e| e.main.feels_like).sum::<f64>() / count;
    let min_temp = entries.iter().map(|e| e.main.temp).fold(f64::INFINITY, f64::min);
    let max_temp = entries.iter().map(|e| e.main.temp).fold(f64::NEG_INFINITY, f64::max);

    let top_conditions = dominant_conditions(entries);
    let precip_chance = entries.iter().any(|entry| {
        entry.pop.is_some_and(|p| p > PRECIP_POP_THRESHOLD) || PRECIP_CONDITIONS.contains(&entry.condition())
    });

    let mut summary = format!(
        "Weather forecast for {}: Average temperature around {:.1}°C (feels like {:.1}°C). \
         Highs reaching near {:.1}°C, lows around {:.1}°C. Conditions mainly {}. ",
        city_name, avg_temp, avg_feels_like, max_temp, min_temp, top_conditions
    );
    if precip_chance {
        summary.push_str("Possibility of precipitation (rain/snow). ");
    } else {
        summary.push_str("Likely dry. ");
    }
    summary.push_str(" (Note: This is a general forecast for the period).");

    summary
}

/// 出现最多的一到两个状况标签，计数相同时按首次出现顺序取先出现者
fn dominant_conditions(entries: &[ForecastEntry]) -> String {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for entry in entries {
        let condition = entry.condition();
        if condition.is_empty() {
            continue;
        }
        match counts.iter_mut().find(|(name, _)| name == condition) {
            Some((_, count)) => *count += 1,
            None => counts.push((condition.to_string(), 1)),
        }
    }

    if counts.is_empty() {
        return "Unknown conditions".to_string();
    }

    // 稳定排序保证计数并列时维持插入顺序
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .iter()
        .take(2)
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::forecast::{ForecastCondition, ForecastMain};

    fn entry(temp: f64, feels_like: f64, condition: &str, pop: Option<f64>) -> ForecastEntry {
        ForecastEntry {
            dt: 0,
            main: ForecastMain { temp, feels_like },
            weather: vec![ForecastCondition {
                main: condition.to_string(),
            }],
            pop,
        }
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize_forecast(&[], "Paris");
        assert_eq!(
            summary,
            "No specific forecast data available for the selected dates in Paris (may be too far out)."
        );
    }

    #[test]
    fn test_summarize_dry_clear() {
        let entries = vec![
            entry(21.0, 20.0, "Clear", Some(0.0)),
            entry(23.0, 22.0, "Clear", Some(0.1)),
        ];
        let summary = summarize_forecast(&entries, "Paris");
        assert!(summary.contains("Average temperature around 22.0°C"));
        assert!(summary.contains("feels like 21.0°C"));
        assert!(summary.contains("Highs reaching near 23.0°C"));
        assert!(summary.contains("lows around 21.0°C"));
        assert!(summary.contains("mainly Clear"));
        assert!(summary.contains("Likely dry."));
    }

    #[test]
    fn test_precip_flag_from_pop() {
        // 状况标签没有降水，但概率超过阈值
        let entries = vec![entry(20.0, 19.0, "Clouds", Some(0.5))];
        let summary = summarize_forecast(&entries, "Paris");
        assert!(summary.contains("Possibility of precipitation"));
    }

    #[test]
    fn test_precip_flag_from_condition() {
        // 概率字段缺失，但状况标签本身是降水
        let entries = vec![entry(20.0, 19.0, "Drizzle", None)];
        let summary = summarize_forecast(&entries, "Paris");
        assert!(summary.contains("Possibility of precipitation"));
    }

    #[test]
    fn test_pop_at_threshold_is_dry() {
        // 阈值是严格大于
        let entries = vec![entry(20.0, 19.0, "Clouds", Some(0.3))];
        let summary = summarize_forecast(&entries, "Paris");
        assert!(summary.contains("Likely dry."));
    }

    #[test]
    fn test_dominant_conditions_top_two() {
        let entries = vec![
            entry(20.0, 19.0, "Clouds", None),
            entry(20.0, 19.0, "Clouds", None),
            entry(20.0, 19.0, "Clear", None),
            entry(20.0, 19.0, "Clear", None),
            entry(20.0, 19.0, "Clear", None),
            entry(20.0, 19.0, "Mist", None),
        ];
        assert_eq!(dominant_conditions(&entries), "Clear, Clouds");
    }

    #[test]
    fn test_dominant_conditions_tie_keeps_first_seen() {
        let entries = vec![
            entry(20.0, 19.0, "Mist", None),
            entry(20.0, 19.0, "Clear", None),
            entry(20.0, 19.0, "Clouds", None),
            entry(20.0, 19.0, "Clear", None),
            entry(20.0, 19.0, "Mist", None),
            entry(20.0, 19.0, "Clouds", None),
        ];
        // 三者并列，按首次出现顺序取前两个
        assert_eq!(dominant_conditions(&entries), "Mist, Clear");
    }
}
