use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

macro_rules! filter_vocabulary {
    ($name:ident, $what:literal { $($variant:ident => $key:literal, $label:literal;)+ }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $key)] $variant,)+
        }

        impl $name {
            pub fn iter() -> impl Iterator<Item = $name> {
                [$($name::$variant),+].into_iter()
            }

            pub fn key(self) -> &'static str {
                match self {
                    $($name::$variant => $key,)+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.key())
            }
        }

        impl FromStr for $name {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> Result<Self> {
                let raw = s.trim();
                match $name::iter().find(|value| value.key().eq_ignore_ascii_case(raw)) {
                    Some(value) => Ok(value),
                    None => bail!("未知の{}です: {}", $what, raw),
                }
            }
        }
    };
}

filter_vocabulary!(BuildingType, "建物種別" {
    House => "house", "一戸建て";
    Condo => "condo", "マンション等";
});

filter_vocabulary!(StationDistance, "駅距離" {
    Within15 => "0_15", "15分以下";
    From15To30 => "15_30", "15～30分";
    Over30 => "30_", "30分以上";
});

filter_vocabulary!(Material, "構造" {
    Wood => "wood", "木造";
    SteelFrame => "stFrame", "鉄骨造";
    ReinforcedConcrete => "reCon", "鉄筋コンクリート造";
    ConcreteBlock => "con", "コンクリートブロック造";
});

filter_vocabulary!(BuildingAge, "建築年" {
    Before1960 => "1920_1960", "1960年前";
    From1960 => "1960_1980", "1960～1980年";
    From1980 => "1980_1990", "1980～1990年";
    From1990 => "1990_2000", "1990～2000年";
    From2000 => "2000_2010", "2000～2010年";
    From2010 => "2010_2020", "2010～2020年";
});

filter_vocabulary!(FloorArea, "延床面積" {
    From10 => "10_50", "10～50m²";
    From50 => "50_75", "50～75m²";
    From75 => "75_100", "75～100m²";
    From100 => "100_150", "100～150m²";
    From150 => "150_200", "150～200m²";
    From200 => "200_250", "200～250m²";
    From250 => "250_300", "250～300m²";
    From300 => "300_350", "300～350m²";
    From350 => "350_400", "350～400m²";
    From400 => "400_500", "400～500m²";
    From500 => "500_600", "500～600m²";
    Over600 => "600_", "600m² 以上";
});

/// Filter choices from the sidebar sliders; they pick which dataset is charted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    pub building_type: BuildingType,
    pub station_dist: StationDistance,
    pub material: Material,
    pub age: BuildingAge,
    pub floor_area: FloorArea,
}

impl QueryOptions {
    /// Dataset collection name, one per building-age bucket.
    pub fn collection_key(&self) -> &'static str {
        self.age.key()
    }

    pub fn options_key(&self) -> String {
        format!("{}-{}", self.material.key(), self.floor_area.key())
    }

    /// Updates one slider by name (`buildingType`, `stationDist`, `material`, `age`, `floorArea`).
    pub fn set(&mut self, slider: &str, value: &str) -> Result<()> {
        match slider.trim() {
            "buildingType" => self.building_type = value.parse()?,
            "stationDist" => self.station_dist = value.parse()?,
            "material" => self.material = value.parse()?,
            "age" => self.age = value.parse()?,
            "floorArea" => self.floor_area = value.parse()?,
            other => bail!("未知の検索条件です: {}", other),
        }
        Ok(())
    }

    pub fn describe(&self) -> String {
        format!(
            "{} / 駅から{} / {} / {} / {}",
            self.building_type.label(),
            self.station_dist.label(),
            self.material.label(),
            self.age.label(),
            self.floor_area.label()
        )
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            building_type: BuildingType::House,
            station_dist: StationDistance::Within15,
            material: Material::Wood,
            age: BuildingAge::Before1960,
            floor_area: FloorArea::From10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_follow_data_layer_naming() {
        let mut options = QueryOptions::default();
        options.set("material", "stFrame").unwrap();
        options.set("floorArea", "100_150").unwrap();
        options.set("age", "1980_1990").unwrap();
        assert_eq!(options.collection_key(), "1980_1990");
        assert_eq!(options.options_key(), "stFrame-100_150");
    }

    #[test]
    fn unknown_slider_or_value_is_rejected() {
        let mut options = QueryOptions::default();
        let err = options.set("material", "glass").expect_err("unknown material");
        assert!(err.to_string().contains("構造"));
        assert!(options.set("colour", "red").is_err());
        assert_eq!(options, QueryOptions::default());
    }

    #[test]
    fn parses_keys_case_insensitively() {
        assert_eq!("STFRAME".parse::<Material>().unwrap(), Material::SteelFrame);
        assert_eq!("600_".parse::<FloorArea>().unwrap(), FloorArea::Over600);
        assert_eq!(FloorArea::iter().count(), 12);
    }

    #[test]
    fn serializes_with_slider_names() {
        let json = serde_json::to_value(QueryOptions::default()).unwrap();
        assert_eq!(json["buildingType"], "house");
        assert_eq!(json["stationDist"], "0_15");
        assert_eq!(json["floorArea"], "10_50");
    }
}
