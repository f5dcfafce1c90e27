use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{self, Deserialize, Deserializer, Serializer};

/*-------------------------------------------------------------------------------------------------
  DateTime Format
-------------------------------------------------------------------------------------------------*/

// The AWS IP Ranges feed uses a non-standard timestamp format for `createDate`. The field is
// optional here; the sync path only consumes the prefix lists.

const AWS_IP_RANGES_DATETIME_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

pub fn serialize<S>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match date {
        Some(date) => {
            let s = format!("{}", date.format(AWS_IP_RANGES_DATETIME_FORMAT));
            serializer.serialize_some(&s)
        }
        None => serializer.serialize_none(),
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    s.map(|s| {
        NaiveDateTime::parse_from_str(&s, AWS_IP_RANGES_DATETIME_FORMAT)
            .map(|naive_date_time| naive_date_time.and_utc())
            .map_err(serde::de::Error::custom)
    })
    .transpose()
}
