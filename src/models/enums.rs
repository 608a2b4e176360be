use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ModelError;

/// Macro to generate a closed enum whose wire form is its label
/// (`as_str` + `FromStr` + string serde).
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

str_enum!(TimeSpan {
    UnderADay => "< 24 hours",
    OneToThreeDays => "1-3 days",
    FourToSevenDays => "4-7 days",
    OneToTwoWeeks => "1-2 weeks",
    TwoToFourWeeks => "2-4 weeks",
    OverAMonth => "1+ month",
});

impl Default for TimeSpan {
    fn default() -> Self {
        Self::OneToThreeDays
    }
}

str_enum!(SeverityLevel {
    Mild => "Mild",
    Moderate => "Moderate",
    Severe => "Severe",
});

impl SeverityLevel {
    /// Colour scale consumed by the front-end's severity slider and chips.
    pub fn color_scale(&self) -> &'static str {
        match self {
            Self::Mild => "from-emerald-500 to-lime-400",
            Self::Moderate => "from-yellow-500 to-amber-400",
            Self::Severe => "from-rose-600 to-pink-500",
        }
    }
}

str_enum!(Theme {
    Light => "light",
    Dark => "dark",
});

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::Light
    }
}

str_enum!(MicrophonePermission {
    Granted => "granted",
    Denied => "denied",
});
