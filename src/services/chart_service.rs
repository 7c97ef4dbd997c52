use lazy_static::lazy_static;
use regex::Regex;

use crate::models::chart::{ChartSpec, ChartType};

const MAX_CHART_CATEGORIES: usize = 10;

/// Phrases that explicitly ask for a chart. Anything less direct gets
/// a text answer.
const VISUALIZATION_KEYWORDS: &[&str] = &[
    "create chart",
    "make chart",
    "show chart",
    "display chart",
    "create graph",
    "make graph",
    "show graph",
    "display graph",
    "create plot",
    "make plot",
    "show plot",
    "display plot",
    "draw chart",
    "draw graph",
    "draw plot",
    "visualize",
    "visualise",
    "visualization",
    "visualisation",
    "chart of",
    "graph of",
    "plot of",
    "bar chart",
    "pie chart",
    "line chart",
    "scatter plot",
    "heatmap",
    "histogram",
];

/// Question phrasings that always get a text answer, even when a chart
/// keyword is also present.
const TEXT_ONLY_KEYWORDS: &[&str] = &[
    "what is",
    "what are",
    "how much",
    "how many",
    "when",
    "where",
    "why",
    "summarize",
    "summary",
    "explain",
    "describe",
    "tell me about",
    "average",
    "total",
    "price",
    "rent",
    "cost",
    "value",
    "trends",
    "analysis",
    "overview",
    "insights",
    "details",
    "information",
];

const DEFINITION_KEYWORDS: &[&str] = &[
    "what is",
    "what are",
    "definition",
    "define",
    "what does mean",
    "what does this mean",
    "explain",
    "describe",
    "tell me about",
    "meaning of",
    "concept of",
    "understanding",
];

/// Fallback terms for context that mentions the market without any
/// parseable category/value pair.
const REAL_ESTATE_KEYWORDS: &[&str] = &[
    "real estate",
    "construction",
    "housing",
    "credit",
    "facilities",
    "instalment",
    "private",
    "model",
    "total",
    "residential",
    "commercial",
    "investment",
    "development",
    "market",
    "price",
    "value",
];

lazy_static! {
    // Category/value shapes seen in the report, most specific forms
    // after the generic "Category: Value" ones.
    static ref VALUE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"([^:=\n]+)[:=]\s*([\d,]+\.?\d*)").unwrap(),
        Regex::new(r"([^=\n]+)=\s*([\d,]+\.?\d*)").unwrap(),
        Regex::new(r"([^,\n]+),\s*([\d,]+\.?\d*)").unwrap(),
        Regex::new(r"([^:]+?)\s*Credit\s*directed:\s*KD\s*([\d,]+\.?\d*)\s*billion").unwrap(),
        Regex::new(r"([^:]+?)\s*Credit\s*directed:\s*([\d,]+\.?\d*)").unwrap(),
        Regex::new(r"([^:]+?)\s*Share:\s*([\d,]+\.?\d*)%").unwrap(),
        Regex::new(r"([^:]+?)\s*Total:\s*KD\s*([\d,]+\.?\d*)\s*billion").unwrap(),
        Regex::new(r"([^:]+?)\s*Total:\s*([\d,]+\.?\d*)\s*billion").unwrap(),
        Regex::new(r"([^:]+?)\s*KD\s*([\d,]+\.?\d*)\s*billion").unwrap(),
        Regex::new(r"([^:]+?)\s*([\d,]+\.?\d*)\s*billion").unwrap(),
        Regex::new(r"([^:]+?)\s*([\d,]+\.?\d*)\s*million").unwrap(),
        Regex::new(r"([^:]+?)\s*([\d,]+\.?\d*)\s*thousand").unwrap(),
        Regex::new(r"([^:]+?)\s*([\d,]+\.?\d*)%").unwrap(),
        Regex::new(r"([^:]+?)\s*([\d,]+\.?\d*)\s*units").unwrap(),
        Regex::new(r"([^:]+?)\s*([\d,]+\.?\d*)\s*properties").unwrap(),
    ];
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    // Keep word characters, whitespace, '&' and '-' in category names.
    static ref CATEGORY_JUNK: Regex = Regex::new(r"[^\w\s&-]").unwrap();
    static ref NUMBER: Regex = Regex::new(r"\d+\.?\d*").unwrap();
}

/// True only for explicit chart requests: a visualization keyword must
/// be present and none of the text-only phrasings may appear.
pub fn detect_visualization_request(user_input: &str) -> bool {
    let input = user_input.to_lowercase();
    let wants_chart = VISUALIZATION_KEYWORDS
        .iter()
        .any(|keyword| input.contains(keyword));
    let wants_text = TEXT_ONLY_KEYWORDS
        .iter()
        .any(|keyword| input.contains(keyword));
    wants_chart && !wants_text
}

pub fn detect_chart_type(user_input: &str) -> ChartType {
    let input = user_input.to_lowercase();

    // Explicit two-word forms win.
    if input.contains("bar chart") || input.contains("bar graph") {
        return ChartType::Bar;
    }
    if input.contains("pie chart") || input.contains("pie graph") {
        return ChartType::Pie;
    }
    if input.contains("line chart") || input.contains("line graph") {
        return ChartType::Line;
    }
    if input.contains("scatter plot") || input.contains("scatter chart") {
        return ChartType::Scatter;
    }

    if ["bar", "column", "vertical", "horizontal"]
        .iter()
        .any(|word| input.contains(word))
    {
        ChartType::Bar
    } else if ["pie", "circle", "donut", "sector"]
        .iter()
        .any(|word| input.contains(word))
    {
        ChartType::Pie
    } else if input.contains("line") {
        ChartType::Line
    } else if ["scatter", "point", "correlation"]
        .iter()
        .any(|word| input.contains(word))
    {
        ChartType::Scatter
    } else {
        ChartType::Bar
    }
}

pub fn detect_definition_request(user_input: &str) -> bool {
    let input = user_input.to_lowercase();
    DEFINITION_KEYWORDS
        .iter()
        .any(|keyword| input.contains(keyword))
}

/// Normalizes bullets and prepends a definition header so definition
/// answers render consistently.
pub fn format_definition_response(response: &str) -> String {
    if response.contains('\u{2022}') || response.contains('*') {
        let formatted = response.replace('*', "\u{2022}");
        if response.starts_with("##") {
            formatted
        } else {
            format!("## Definition\n\n{}", formatted)
        }
    } else {
        let sentences: Vec<&str> = response
            .split(". ")
            .filter(|sentence| !sentence.trim().is_empty())
            .collect();
        if sentences.len() > 1 {
            let mut formatted = String::from("## Definition\n\n");
            for sentence in sentences {
                formatted.push_str(&format!("\u{2022} {}\n", sentence.trim()));
            }
            formatted
        } else {
            response.to_string()
        }
    }
}

/// Pulls category/value series out of the retrieved context, ordered
/// by descending value and capped at ten categories.
pub fn extract_chart_data(text: &str, chart_type: ChartType) -> ChartSpec {
    let mut categories: Vec<String> = Vec::new();
    let mut values: Vec<f64> = Vec::new();

    for pattern in VALUE_PATTERNS.iter() {
        for caps in pattern.captures_iter(text) {
            let raw_category = match caps.get(1) {
                Some(capture) => capture.as_str().trim(),
                None => continue,
            };
            let raw_value = match caps.get(2) {
                Some(capture) => capture.as_str().replace(',', ""),
                None => continue,
            };
            let value: f64 = match raw_value.parse() {
                Ok(value) => value,
                Err(_) => continue,
            };
            if value <= 0.0 {
                continue;
            }

            let category = clean_category(raw_category);
            if category.chars().count() <= 3 || is_generic_category(&category) {
                continue;
            }
            if !categories.contains(&category) {
                categories.push(category);
                values.push(value);
            }
        }
    }

    // No structured pairs: fall back to market terms paired with the
    // first number in the context.
    if values.is_empty() {
        let lowered = text.to_lowercase();
        for keyword in REAL_ESTATE_KEYWORDS.iter() {
            if !lowered.contains(keyword) {
                continue;
            }
            let value = NUMBER
                .find(text)
                .and_then(|m| m.as_str().parse::<f64>().ok());
            if let Some(value) = value {
                if value > 0.0 {
                    let category = title_case(keyword);
                    if !categories.contains(&category) {
                        categories.push(category);
                        values.push(value);
                    }
                }
            }
        }
    }

    let mut pairs: Vec<(String, f64)> = categories.into_iter().zip(values).collect();
    pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    pairs.truncate(MAX_CHART_CATEGORIES);

    let labels = pairs
        .iter()
        .map(|(category, value)| format!("{}: {}", category, format_value(*value)))
        .collect();

    ChartSpec {
        chart_type,
        title: format!(
            "{} Chart - Real Estate Data",
            title_case(&chart_type.to_string())
        ),
        categories: pairs.iter().map(|(category, _)| category.clone()).collect(),
        values: pairs.iter().map(|(_, value)| *value).collect(),
        labels,
    }
}

fn clean_category(raw: &str) -> String {
    let collapsed = WHITESPACE.replace_all(raw, " ");
    CATEGORY_JUNK.replace_all(&collapsed, "").trim().to_string()
}

fn is_generic_category(category: &str) -> bool {
    let lowered = category.to_lowercase();
    ["source:", "page", "file", "pdf", "report", "title"]
        .iter()
        .any(|skip| lowered.contains(skip))
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// "1234567.5" -> "1,234,567.50", matching the label format users see.
fn format_value(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));
    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::new();
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*digit);
    }
    format!("{}.{}", grouped, frac_part)
}
