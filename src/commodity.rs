// src/commodity.rs
//! Commodity normalizer for the free-text crop filter.

use once_cell::sync::OnceCell;
use regex::Regex;

/// Commodity names as spelled by the mandi dataset. Only plain names are listed;
/// qualified ones like "Rice (Basmati)" pass through as typed.
const KNOWN_COMMODITIES: &[&str] = &[
    "Apple",
    "Banana",
    "Brinjal",
    "Cabbage",
    "Carrot",
    "Cauliflower",
    "Cotton",
    "Garlic",
    "Grapes",
    "Green Chilli",
    "Groundnut",
    "Lemon",
    "Maize",
    "Mango",
    "Mustard",
    "Onion",
    "Pomegranate",
    "Potato",
    "Pumpkin",
    "Rice",
    "Soyabean",
    "Sugarcane",
    "Tomato",
    "Turmeric",
    "Wheat",
];

const FUZZY_THRESHOLD: f64 = 0.93;
const FUZZY_MIN_LEN: usize = 4;

/// Trim, collapse whitespace and map to the dataset spelling when the input is a
/// known commodity (or a close typo of one). Empty output means "no filter".
pub fn normalize_commodity(raw: &str) -> String {
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"));
    let cleaned = re_ws.replace_all(raw.trim(), " ").to_string();
    if cleaned.is_empty() {
        return cleaned;
    }

    canonical_name(&cleaned)
        .map(str::to_string)
        .unwrap_or(cleaned)
}

fn canonical_name(cleaned: &str) -> Option<&'static str> {
    if let Some(exact) = KNOWN_COMMODITIES
        .iter()
        .find(|k| k.eq_ignore_ascii_case(cleaned))
    {
        return Some(exact);
    }
    if cleaned.chars().count() < FUZZY_MIN_LEN {
        return None;
    }

    let lower = cleaned.to_lowercase();
    KNOWN_COMMODITIES
        .iter()
        .map(|k| (*k, strsim::jaro_winkler(&lower, &k.to_lowercase())))
        .filter(|(_, score)| *score >= FUZZY_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(k, _)| k)
}
