/// Some services encode coordinates as JSON strings (`"lat": "54.32"`).
/// These helpers accept both strings and plain numbers.
pub mod number_or_string {
    use core::fmt;

    use serde::{
        de::{self, Unexpected, Visitor},
        Deserializer,
    };

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct NumberVisitor;

        impl<'de> Visitor<'de> for NumberVisitor {
            type Value = f64;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a number or a string containing a number")
            }

            fn visit_f64<E>(self, value: f64) -> Result<f64, E>
            where
                E: de::Error,
            {
                Ok(value)
            }

            fn visit_i64<E>(self, value: i64) -> Result<f64, E>
            where
                E: de::Error,
            {
                Ok(value as f64)
            }

            fn visit_u64<E>(self, value: u64) -> Result<f64, E>
            where
                E: de::Error,
            {
                Ok(value as f64)
            }

            fn visit_str<E>(self, value: &str) -> Result<f64, E>
            where
                E: de::Error,
            {
                value.trim().parse().map_err(|_| {
                    de::Error::invalid_value(Unexpected::Str(value), &self)
                })
            }
        }

        deserializer.deserialize_any(NumberVisitor)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Place {
        #[serde(with = "super::number_or_string")]
        lat: f64,
        #[serde(with = "super::number_or_string")]
        lon: f64,
    }

    #[test]
    fn accepts_strings_and_numbers() {
        let place: Place =
            serde_json::from_str(r#"{"lat": "37.4220", "lon": -122.0841}"#).unwrap();
        assert_eq!(place.lat, 37.422);
        assert_eq!(place.lon, -122.0841);
    }

    #[test]
    fn rejects_garbage() {
        let result = serde_json::from_str::<Place>(r#"{"lat": "north", "lon": 1}"#);
        assert!(result.is_err());
    }
}
