//! Weather comfort calculations.
//!
//! All inputs are metric: temperature in °C, relative humidity in percent,
//! wind speed in km/h. Results are rounded to two decimals.

use std::sync::LazyLock;

use regex::Regex;

use super::format_float;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]?\d*\.\d+|\d+").expect("number pattern is valid"));

/// Usage text returned when fewer than three numbers are supplied.
pub const USAGE: &str = "Weather tool needs numbers: temperature (°C), humidity (%) and wind speed (km/h). \
Example: 'weather 32 65 8' (means 32°C, 65% humidity, 8 km/h wind).";

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Dew point using the Magnus approximation.
pub fn dew_point_celsius(t_c: f64, rh_percent: f64) -> f64 {
    let a = 17.27;
    let b = 237.7;
    let alpha = (a * t_c) / (b + t_c) + (rh_percent.max(0.0001) / 100.0).ln();
    round2((b * alpha) / (a - alpha))
}

/// Heat index from the Rothfusz regression, computed in °F.
pub fn heat_index_celsius(t_c: f64, rh_percent: f64) -> f64 {
    let t = t_c * 9.0 / 5.0 + 32.0;
    let rh = rh_percent;
    let hi_f = -42.379 + 2.049_015_23 * t + 10.143_331_27 * rh
        - 0.224_755_41 * t * rh
        - 0.006_837_83 * t * t
        - 0.054_817_17 * rh * rh
        + 0.001_228_74 * t * t * rh
        + 0.000_852_82 * t * rh * rh
        - 0.000_001_99 * t * t * rh * rh;
    round2((hi_f - 32.0) * 5.0 / 9.0)
}

/// Wind chill; equal to the air temperature in calm or warm conditions.
pub fn wind_chill_celsius(t_c: f64, wind_kmh: f64) -> f64 {
    if wind_kmh <= 4.8 || t_c > 10.0 {
        return round2(t_c);
    }
    let v = wind_kmh.powf(0.16);
    round2(13.12 + 0.6215 * t_c - 11.37 * v + 0.3965 * t_c * v)
}

/// One-line description of how the conditions feel.
pub fn feels_like(t_c: f64, rh_percent: f64, wind_kmh: f64) -> String {
    let dp = format_float(dew_point_celsius(t_c, rh_percent));
    if t_c >= 27.0 {
        let hi = format_float(heat_index_celsius(t_c, rh_percent));
        return format!("Heat index: {hi}°C (dew point {dp}°C)");
    }
    if t_c <= 10.0 && wind_kmh > 4.8 {
        let wc = format_float(wind_chill_celsius(t_c, wind_kmh));
        return format!("Wind chill: {wc}°C (dew point {dp}°C)");
    }
    format!("Feels like: {}°C (dew point {dp}°C)", format_float(t_c))
}

/// Full report for the given conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub temperature_c: f64,
    pub humidity_percent: f64,
    pub dew_point_c: f64,
    pub heat_index_c: f64,
    pub wind_chill_c: f64,
    pub feels_like: String,
}

impl WeatherReport {
    pub fn new(t_c: f64, rh_percent: f64, wind_kmh: f64) -> Self {
        Self {
            temperature_c: round2(t_c),
            humidity_percent: round2(rh_percent),
            dew_point_c: dew_point_celsius(t_c, rh_percent),
            heat_index_c: heat_index_celsius(t_c, rh_percent),
            wind_chill_c: wind_chill_celsius(t_c, wind_kmh),
            feels_like: feels_like(t_c, rh_percent, wind_kmh),
        }
    }

    /// Labelled lines in display order.
    pub fn fields(&self) -> Vec<(String, String)> {
        vec![
            ("Temperature".into(), format!("{}°C", format_float(self.temperature_c))),
            (
                "Relative Humidity".into(),
                format!("{}%", format_float(self.humidity_percent)),
            ),
            ("Dew Point".into(), format!("{}°C", format_float(self.dew_point_c))),
            (
                "Heat Index (approx)".into(),
                format!("{}°C", format_float(self.heat_index_c)),
            ),
            (
                "Wind Chill (approx)".into(),
                format!("{}°C", format_float(self.wind_chill_c)),
            ),
            ("Feels Like".into(), self.feels_like.clone()),
        ]
    }
}

/// Build a report from the first three numbers found in `input`.
pub fn report_from_text(input: &str) -> Option<WeatherReport> {
    let numbers: Vec<f64> = NUMBER
        .find_iter(input)
        .filter_map(|m| m.as_str().parse().ok())
        .take(3)
        .collect();
    match numbers[..] {
        [t_c, rh, wind] => Some(WeatherReport::new(t_c, rh, wind)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hot_humid_report() {
        let report = report_from_text("weather 32 65 8").unwrap();
        assert_eq!(report.dew_point_c, 24.58);
        assert_eq!(report.heat_index_c, 38.66);
        assert_eq!(report.wind_chill_c, 32.0);
        assert_eq!(report.feels_like, "Heat index: 38.66°C (dew point 24.58°C)");
    }

    #[test]
    fn test_cold_windy_report() {
        let report = report_from_text("wind chill for 5 degrees, 80% and 20 km/h").unwrap();
        assert_eq!(report.dew_point_c, 1.84);
        assert_eq!(report.wind_chill_c, 1.07);
        assert_eq!(report.feels_like, "Wind chill: 1.07°C (dew point 1.84°C)");
    }

    #[test]
    fn test_mild_conditions() {
        assert_eq!(
            feels_like(20.0, 50.0, 10.0),
            format!("Feels like: 20.0°C (dew point {}°C)", format_float(dew_point_celsius(20.0, 50.0)))
        );
        assert_eq!(wind_chill_celsius(5.0, 3.0), 5.0);
    }

    #[test]
    fn test_fields_order() {
        let labels: Vec<String> = WeatherReport::new(32.0, 65.0, 8.0)
            .fields()
            .into_iter()
            .map(|(label, _)| label)
            .collect();
        assert_eq!(
            labels,
            [
                "Temperature",
                "Relative Humidity",
                "Dew Point",
                "Heat Index (approx)",
                "Wind Chill (approx)",
                "Feels Like"
            ]
        );
    }

    #[test]
    fn test_needs_three_numbers() {
        assert!(report_from_text("weather 32 65").is_none());
    }
}
