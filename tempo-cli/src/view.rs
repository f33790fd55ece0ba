//! Display-level formatting: unit suffixes, the condition translation
//! table, air-quality ratings and pt-BR date formatting. Everything here is
//! pure string building; printing happens in `cli`.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use std::borrow::Cow;
use std::fmt::Write as _;

use tempo_core::model::{FavoriteCity, Hour, SearchLocation, WeatherResponse};

/// How many hourly slots the forecast strip shows.
const HOURLY_SLOTS: usize = 6;

/// How many daily rows the forecast block shows (today excluded).
const DAILY_ROWS: usize = 7;

/// Translate a WeatherAPI condition text to pt-BR. Unknown strings pass
/// through untranslated.
pub fn translate_condition(condition: &str) -> Cow<'_, str> {
    let translated = match condition.to_lowercase().as_str() {
        "sunny" => "Ensolarado",
        "clear" => "Céu Limpo",
        "partly cloudy" => "Pouco Nublado",
        "cloudy" => "Nublado",
        "overcast" => "Encoberto",
        "mist" => "Névoa",
        "fog" => "Nevoeiro",
        "freezing fog" => "Nevoeiro Congelante",
        "patchy rain possible" => "Possível Chuva",
        "patchy snow possible" => "Possível Neve",
        "patchy sleet possible" => "Possível Granizo",
        "patchy freezing drizzle possible" => "Possível Garoa Gelada",
        "thundery outbreaks possible" => "Possíveis Trovoadas",
        "blowing snow" => "Rajadas de Neve",
        "blizzard" => "Nevasca",
        "patchy light drizzle" => "Garoa Leve",
        "light drizzle" => "Garoa Leve",
        "freezing drizzle" => "Garoa Congelante",
        "heavy freezing drizzle" => "Garoa Congelante Forte",
        "patchy light rain" => "Chuva Leve",
        "light rain" => "Chuva Leve",
        "rain" => "Chuva",
        "moderate rain at times" => "Chuva Moderada",
        "moderate rain" => "Chuva Moderada",
        "heavy rain at times" => "Chuva Forte",
        "heavy rain" => "Chuva Forte",
        "light freezing rain" => "Chuva Congelante",
        "moderate or heavy freezing rain" => "Chuva Congelante Forte",
        "light sleet" => "Granizo Leve",
        "moderate or heavy sleet" => "Granizo Forte",
        "patchy light snow" => "Neve Leve",
        "light snow" => "Neve Leve",
        "patchy moderate snow" => "Neve Moderada",
        "moderate snow" => "Neve Moderada",
        "patchy heavy snow" => "Neve Forte",
        "heavy snow" => "Neve Forte",
        "ice pellets" => "Pelotas de Gelo",
        "light rain shower" => "Pancada de Chuva",
        "moderate or heavy rain shower" => "Pancada de Chuva Forte",
        "torrential rain shower" => "Chuva Torrencial",
        "light sleet showers" => "Granizo Leve",
        "moderate or heavy sleet showers" => "Granizo Forte",
        "light snow showers" => "Neve Leve",
        "moderate or heavy snow showers" => "Neve Forte",
        "light showers of ice pellets" => "Granizo Leve",
        "moderate or heavy showers of ice pellets" => "Granizo Forte",
        "patchy light rain with thunder" => "Chuva com Trovões",
        "moderate or heavy rain with thunder" => "Chuva Forte com Trovões",
        "patchy light snow with thunder" => "Neve com Trovões",
        "moderate or heavy snow with thunder" => "Neve Forte com Trovões",
        _ => return Cow::Borrowed(condition),
    };

    Cow::Borrowed(translated)
}

/// US EPA index (1..=6) to a rating label.
pub fn air_quality_rating(index: u8) -> &'static str {
    match index {
        1 => "Boa",
        2 => "Moderada",
        3 => "Insalubre para Grupos Sensíveis",
        4 => "Insalubre",
        5 => "Muito Insalubre",
        _ => "Perigosa",
    }
}

fn weekday_full_pt(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "segunda-feira",
        Weekday::Tue => "terça-feira",
        Weekday::Wed => "quarta-feira",
        Weekday::Thu => "quinta-feira",
        Weekday::Fri => "sexta-feira",
        Weekday::Sat => "sábado",
        Weekday::Sun => "domingo",
    }
}

fn weekday_abbr_pt(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Seg",
        Weekday::Tue => "Ter",
        Weekday::Wed => "Qua",
        Weekday::Thu => "Qui",
        Weekday::Fri => "Sex",
        Weekday::Sat => "Sáb",
        Weekday::Sun => "Dom",
    }
}

fn month_pt(month: u32) -> &'static str {
    match month {
        1 => "janeiro",
        2 => "fevereiro",
        3 => "março",
        4 => "abril",
        5 => "maio",
        6 => "junho",
        7 => "julho",
        8 => "agosto",
        9 => "setembro",
        10 => "outubro",
        11 => "novembro",
        _ => "dezembro",
    }
}

/// Header line from the API's local wall-clock string
/// (`2024-05-12 11:50` → `domingo, 12 de maio, 11:50`). Unparseable input
/// passes through as-is.
pub fn format_local_datetime(localtime: &str) -> String {
    match NaiveDateTime::parse_from_str(localtime, "%Y-%m-%d %H:%M") {
        Ok(dt) => format!(
            "{}, {} de {}, {}",
            weekday_full_pt(dt.weekday()),
            dt.day(),
            month_pt(dt.month()),
            dt.format("%H:%M"),
        ),
        Err(_) => localtime.to_string(),
    }
}

/// Daily row label (`2024-05-12` → `Dom, 12/05`).
pub fn format_forecast_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => format!("{}, {:02}/{:02}", weekday_abbr_pt(d.weekday()), d.day(), d.month()),
        Err(_) => date.to_string(),
    }
}

/// Hour slot label (`HH:mm`), prefixed with the weekday when the slot falls
/// on a different day than the location's current local date.
pub fn format_hour_label(hour: &Hour, local_date: &str) -> String {
    match NaiveDateTime::parse_from_str(&hour.time, "%Y-%m-%d %H:%M") {
        Ok(dt) => {
            let time = dt.format("%H:%M");
            if hour.time.starts_with(local_date) {
                time.to_string()
            } else {
                format!("{} {}", weekday_abbr_pt(dt.weekday()), time)
            }
        }
        Err(_) => hour.time.clone(),
    }
}

/// Hour slots to display: the remaining hours of the first forecast day
/// relative to the location's local time, topped up from the second day,
/// capped at [`HOURLY_SLOTS`].
pub fn upcoming_hours(response: &WeatherResponse) -> Vec<&Hour> {
    let Some(forecast) = &response.forecast else { return Vec::new() };
    let Some(first_day) = forecast.forecastday.first() else { return Vec::new() };

    let now = response.location.localtime_epoch;
    let mut hours: Vec<&Hour> =
        first_day.hour.iter().filter(|h| h.time_epoch >= now).take(HOURLY_SLOTS).collect();

    if hours.len() < HOURLY_SLOTS {
        if let Some(next_day) = forecast.forecastday.get(1) {
            hours.extend(next_day.hour.iter().take(HOURLY_SLOTS - hours.len()));
        }
    }

    hours
}

pub fn render_current(response: &WeatherResponse) -> String {
    let location = &response.location;
    let current = &response.current;

    let mut out = String::new();
    let _ = writeln!(out, "{}, {}", location.name, location.country);
    let _ = writeln!(out, "{}", format_local_datetime(&location.localtime));
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  {:.0}°C  {}",
        current.temp_c,
        translate_condition(&current.condition.text)
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "  Sensação:     {:.0}°C", current.feelslike_c);
    let _ = writeln!(out, "  Umidade:      {}%", current.humidity);
    let _ = writeln!(out, "  Vento:        {:.0} km/h", current.wind_kph);
    let _ = writeln!(out, "  Pressão:      {:.0} mb", current.pressure_mb);
    let _ = writeln!(out, "  Precipitação: {} mm", current.precip_mm);
    let _ = writeln!(out, "  Índice UV:    {:.0}", current.uv);

    if let Some(aqi) = &current.air_quality {
        let _ = writeln!(out);
        let _ = writeln!(out, "  Qualidade do Ar: {}", air_quality_rating(aqi.us_epa_index));
        let _ = writeln!(
            out,
            "    PM2.5 {:.1}  PM10 {:.1}  CO {:.1}  NO2 {:.1}  O3 {:.1} µg/m³",
            aqi.pm2_5, aqi.pm10, aqi.co, aqi.no2, aqi.o3
        );
    }

    out
}

pub fn render_forecast(response: &WeatherResponse) -> String {
    let Some(forecast) = &response.forecast else {
        return "Nenhuma previsão disponível\n".to_string();
    };

    let mut out = String::new();

    let hours = upcoming_hours(response);
    if !hours.is_empty() {
        let _ = writeln!(out, "Previsão por hora");
        for hour in hours {
            let mut line = format!(
                "  {:>9}  {:>4.0}°C  {}",
                format_hour_label(hour, first_date(response)),
                hour.temp_c,
                translate_condition(&hour.condition.text),
            );
            if hour.chance_of_rain > 0 {
                let _ = write!(line, "  (chuva {}%)", hour.chance_of_rain);
            }
            let _ = writeln!(out, "{line}");
        }
        let _ = writeln!(out);
    }

    // Skip today; the current-conditions card already covers it.
    let future_days: Vec<_> = forecast.forecastday.iter().skip(1).take(DAILY_ROWS).collect();
    if !future_days.is_empty() {
        let label = if future_days.len() == 1 { "dia" } else { "dias" };
        let _ = writeln!(out, "Previsão para {} {label}", future_days.len());
        for day in future_days {
            let mut line = format!(
                "  {}  {:>3.0}°C / {:>3.0}°C  {}",
                format_forecast_date(&day.date),
                day.day.maxtemp_c,
                day.day.mintemp_c,
                translate_condition(&day.day.condition.text),
            );
            if day.day.daily_chance_of_rain > 0 {
                let _ = write!(line, "  chuva {}%", day.day.daily_chance_of_rain);
            }
            let _ = write!(line, "  umidade {:.0}%", day.day.avghumidity);
            let _ = writeln!(out, "{line}");
        }
    }

    if out.is_empty() { "Nenhuma previsão disponível\n".to_string() } else { out }
}

/// One-line description for the interactive search picker.
pub fn describe_search_location(location: &SearchLocation) -> String {
    if location.region.is_empty() {
        format!("{}, {}", location.name, location.country)
    } else {
        format!("{}, {}, {}", location.name, location.region, location.country)
    }
}

pub fn render_favorites(cities: &[FavoriteCity]) -> String {
    if cities.is_empty() {
        return "Nenhuma cidade favorita adicionada\n".to_string();
    }

    let mut out = String::new();
    for city in cities {
        let saved = chrono::DateTime::from_timestamp_millis(city.timestamp)
            .map(|dt| format!("{}", dt.format("%d/%m/%Y")))
            .unwrap_or_default();

        let _ = writeln!(out, "  {} — {}, {}  (salva em {})", city.name, city.region, city.country, saved);
    }
    out
}

/// Local date (`YYYY-MM-DD`) of the location, for day-change detection in
/// the hourly strip.
fn first_date(response: &WeatherResponse) -> &str {
    response.location.localtime.split(' ').next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempo_core::model::{
        Condition, Current, Day, Forecast, ForecastDay, Location, WeatherResponse,
    };

    fn condition(text: &str) -> Condition {
        Condition { text: text.to_string(), icon: String::new() }
    }

    fn hour(time_epoch: i64, time: &str, temp_c: f64, chance_of_rain: u8) -> Hour {
        Hour {
            time_epoch,
            time: time.to_string(),
            temp_c,
            chance_of_rain,
            condition: condition("Sunny"),
        }
    }

    fn sample_response() -> WeatherResponse {
        // Local time 2024-05-12 21:00 (epoch 1715547600 in UTC terms; only
        // relative ordering against hour epochs matters here).
        let day_one_hours: Vec<Hour> = (0..24)
            .map(|h| hour(1715472000 + h * 3600, &format!("2024-05-12 {h:02}:00"), 15.0, 0))
            .collect();
        let day_two_hours: Vec<Hour> = (0..24)
            .map(|h| hour(1715558400 + h * 3600, &format!("2024-05-13 {h:02}:00"), 14.0, 30))
            .collect();

        WeatherResponse {
            location: Location {
                name: "Santos".to_string(),
                region: "São Paulo".to_string(),
                country: "Brazil".to_string(),
                lat: -23.96,
                lon: -46.33,
                tz_id: "America/Sao_Paulo".to_string(),
                localtime_epoch: 1715472000 + 21 * 3600,
                localtime: "2024-05-12 21:00".to_string(),
            },
            current: Current {
                temp_c: 18.4,
                feelslike_c: 18.0,
                humidity: 77,
                wind_kph: 12.0,
                pressure_mb: 1020.0,
                precip_mm: 0.2,
                uv: 1.0,
                condition: condition("Partly cloudy"),
                last_updated_epoch: None,
                air_quality: None,
            },
            forecast: Some(Forecast {
                forecastday: vec![
                    ForecastDay {
                        date: "2024-05-12".to_string(),
                        date_epoch: 1715472000,
                        day: Day {
                            maxtemp_c: 22.0,
                            mintemp_c: 14.0,
                            avghumidity: 70.0,
                            daily_chance_of_rain: 0,
                            condition: condition("Sunny"),
                        },
                        hour: day_one_hours,
                    },
                    ForecastDay {
                        date: "2024-05-13".to_string(),
                        date_epoch: 1715558400,
                        day: Day {
                            maxtemp_c: 20.0,
                            mintemp_c: 13.0,
                            avghumidity: 80.0,
                            daily_chance_of_rain: 60,
                            condition: condition("Moderate rain"),
                        },
                        hour: day_two_hours,
                    },
                ],
            }),
        }
    }

    #[test]
    fn known_conditions_translate() {
        assert_eq!(translate_condition("Sunny"), "Ensolarado");
        assert_eq!(translate_condition("PARTLY CLOUDY"), "Pouco Nublado");
        assert_eq!(translate_condition("Moderate or heavy rain with thunder"), "Chuva Forte com Trovões");
    }

    #[test]
    fn unknown_conditions_pass_through() {
        assert_eq!(translate_condition("Raining frogs"), "Raining frogs");
    }

    #[test]
    fn air_quality_ratings_cover_the_scale() {
        assert_eq!(air_quality_rating(1), "Boa");
        assert_eq!(air_quality_rating(3), "Insalubre para Grupos Sensíveis");
        assert_eq!(air_quality_rating(6), "Perigosa");
        assert_eq!(air_quality_rating(0), "Perigosa");
    }

    #[test]
    fn header_date_is_portuguese() {
        // 2024-05-12 is a Sunday.
        assert_eq!(format_local_datetime("2024-05-12 11:50"), "domingo, 12 de maio, 11:50");
        assert_eq!(format_local_datetime("garbage"), "garbage");
    }

    #[test]
    fn forecast_date_is_abbreviated() {
        assert_eq!(format_forecast_date("2024-05-13"), "Seg, 13/05");
    }

    #[test]
    fn hour_label_marks_day_changes() {
        let today = hour(0, "2024-05-12 23:00", 15.0, 0);
        let tomorrow = hour(0, "2024-05-13 01:00", 14.0, 0);

        assert_eq!(format_hour_label(&today, "2024-05-12"), "23:00");
        assert_eq!(format_hour_label(&tomorrow, "2024-05-12"), "Seg 01:00");
    }

    #[test]
    fn upcoming_hours_top_up_from_the_next_day() {
        let response = sample_response();

        // Local time is 21:00: three hours remain today (21, 22, 23), the
        // other three slots come from the next day.
        let hours = upcoming_hours(&response);
        assert_eq!(hours.len(), 6);
        assert_eq!(hours[0].time, "2024-05-12 21:00");
        assert_eq!(hours[3].time, "2024-05-13 00:00");
    }

    #[test]
    fn render_current_has_units_and_translation() {
        let text = render_current(&sample_response());

        assert!(text.contains("Santos, Brazil"));
        assert!(text.contains("18°C  Pouco Nublado"));
        assert!(text.contains("77%"));
        assert!(text.contains("12 km/h"));
        assert!(text.contains("1020 mb"));
        assert!(text.contains("domingo, 12 de maio, 21:00"));
    }

    #[test]
    fn render_forecast_skips_today_in_daily_block() {
        let text = render_forecast(&sample_response());

        assert!(text.contains("Previsão para 1 dia"));
        assert!(text.contains("Seg, 13/05"));
        assert!(!text.contains("Dom, 12/05"));
        assert!(text.contains("chuva 60%"));
        assert!(text.contains("Chuva Moderada"));
    }

    #[test]
    fn render_favorites_handles_empty_list() {
        assert_eq!(render_favorites(&[]), "Nenhuma cidade favorita adicionada\n");
    }
}
