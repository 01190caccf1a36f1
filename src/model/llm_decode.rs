use serde_json::{Map, Value};

use crate::engine::content::GenerationError;
use crate::model::mission::{Category, Difficulty, Mission};
use crate::model::scenario::{Scenario, ScenarioOption};

/// Pull the JSON object out of a completion, tolerating code fences and
/// chatter around it.
pub fn extract_json_object(content: &str) -> Result<&str, GenerationError> {
    let start = content
        .find('{')
        .ok_or_else(|| GenerationError::Malformed("no JSON object in completion".into()))?;
    let end = content
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| GenerationError::Malformed("unterminated JSON object".into()))?;
    Ok(&content[start..=end])
}

fn parse_object(content: &str) -> Result<Map<String, Value>, GenerationError> {
    let json = extract_json_object(content)?;
    let value: Value = serde_json::from_str(json)
        .map_err(|e| GenerationError::Malformed(format!("invalid JSON: {}", e)))?;

    let Value::Object(map) = value else {
        return Err(GenerationError::Malformed("expected a JSON object".into()));
    };
    Ok(map)
}

fn field<'a>(map: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|n| map.get(*n)).filter(|v| !v.is_null())
}

fn string_field(map: &Map<String, Value>, names: &[&str]) -> Result<String, GenerationError> {
    match field(map, names) {
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(_) => Err(GenerationError::Malformed(format!("'{}' must be a string", names[0]))),
        None => Err(GenerationError::Malformed(format!("missing '{}'", names[0]))),
    }
}

/// Numbers sometimes arrive quoted or with a trailing percent sign.
fn number_field(map: &Map<String, Value>, names: &[&str]) -> Result<f64, GenerationError> {
    let parsed = match field(map, names) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|n| n.is_finite())
        .ok_or_else(|| GenerationError::Malformed(format!("'{}' must be a number", names[0])))
}

fn percent(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

pub fn decode_mission(content: &str, turn_count: u32) -> Result<Mission, GenerationError> {
    let map = parse_object(content)?;

    let id = match string_field(&map, &["id"]) {
        Ok(id) if !id.is_empty() => id,
        _ => format!("mission-{}", turn_count + 1),
    };

    let title = string_field(&map, &["title"])?;
    if title.is_empty() {
        return Err(GenerationError::InvalidContent("mission title is empty".into()));
    }

    let difficulty = string_field(&map, &["difficulty"])?
        .parse::<Difficulty>()
        .map_err(GenerationError::Malformed)?;
    let category = string_field(&map, &["type", "category"])?
        .parse::<Category>()
        .map_err(GenerationError::Malformed)?;

    Ok(Mission {
        id,
        title,
        description: string_field(&map, &["description"])?,
        difficulty,
        reward: number_field(&map, &["reward"])?.max(0.0),
        risk: percent(number_field(&map, &["risk"])?),
        category,
    })
}

fn decode_option(value: &Value, index: usize) -> Result<ScenarioOption, GenerationError> {
    let Value::Object(map) = value else {
        return Err(GenerationError::Malformed(format!("option {} is not an object", index)));
    };

    let text = string_field(map, &["text"])?;
    if text.is_empty() {
        return Err(GenerationError::InvalidContent(format!("option {} has no text", index)));
    }

    Ok(ScenarioOption {
        text,
        risk: percent(number_field(map, &["risk"])?),
        success_chance: percent(number_field(map, &["successChance", "success_chance"])?),
        outcome: string_field(map, &["outcome"])?,
        aggressive: matches!(
            field(map, &["aggressive", "isAggressive"]),
            Some(Value::Bool(true))
        ),
    })
}

pub fn decode_scenario(content: &str) -> Result<Scenario, GenerationError> {
    let map = parse_object(content)?;

    let narrative = string_field(&map, &["scenario", "narrative"])?;

    let Some(Value::Array(items)) = field(&map, &["options"]) else {
        return Err(GenerationError::Malformed("'options' must be an array".into()));
    };

    if !(Scenario::MIN_OPTIONS..=Scenario::MAX_OPTIONS).contains(&items.len()) {
        return Err(GenerationError::InvalidContent(format!(
            "expected {}-{} options, got {}",
            Scenario::MIN_OPTIONS,
            Scenario::MAX_OPTIONS,
            items.len()
        )));
    }

    let options = items
        .iter()
        .enumerate()
        .map(|(i, item)| decode_option(item, i))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Scenario { narrative, options })
}
