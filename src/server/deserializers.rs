use serde::{Deserialize, Deserializer};

// browsers send select values as strings, so ids may arrive as "3" as well as 3
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(i64),
    String(String),
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(try_from = "NumberOrString")]
pub struct Stri64(pub i64);

impl TryFrom<NumberOrString> for Stri64 {
    type Error = String;

    fn try_from(value: NumberOrString) -> Result<Self, Self::Error> {
        match value {
            NumberOrString::Number(v) => Ok(Stri64(v)),
            NumberOrString::String(s) => match s.trim().parse::<i64>() {
                Ok(v) => Ok(Stri64(v)),
                Err(_) => Err(format!("Wrong value {s}, can not parse to i64")),
            },
        }
    }
}

pub fn first_page() -> i64 {
    1
}

// a page that doesn't parse falls back to the first one instead of failing the request
pub fn deserialize_page<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or_else(first_page))
}
