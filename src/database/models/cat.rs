use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

pub const NAME_MAX_LEN: usize = 64;
pub const GENDER_MAX_LEN: usize = 32;

/// A stored cat. `id` is assigned by the store and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Cat {
    #[schema(read_only, example = 1)]
    pub id: i64,
    #[schema(max_length = 64, example = "Tom")]
    pub name: String,
    #[schema(example = 3)]
    pub age: i32,
    #[schema(max_length = 32, example = "male")]
    pub gender: String,
}

/// Validated field set for create and full update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CatFields {
    #[schema(max_length = 64, example = "Tom")]
    pub name: String,
    #[schema(example = 3)]
    pub age: i32,
    #[schema(max_length = 32, example = "male")]
    pub gender: String,
}

/// Validated field set for partial update; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CatPatch {
    #[schema(max_length = 64)]
    pub name: Option<String>,
    pub age: Option<i32>,
    #[schema(max_length = 32)]
    pub gender: Option<String>,
}

/// Exact-match filters accepted by the list operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CatFilter {
    /// Only cats with exactly this name
    pub name: Option<String>,
    /// Only cats of exactly this age
    pub age: Option<i32>,
    /// Only cats with exactly this gender
    pub gender: Option<String>,
}

impl Cat {
    pub fn from_fields(id: i64, fields: CatFields) -> Self {
        Self {
            id,
            name: fields.name,
            age: fields.age,
            gender: fields.gender,
        }
    }
}

impl CatPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none() && self.gender.is_none()
    }

    /// Overlays the supplied fields on an existing cat.
    pub fn apply_to(self, cat: &Cat) -> CatFields {
        CatFields {
            name: self.name.unwrap_or_else(|| cat.name.clone()),
            age: self.age.unwrap_or(cat.age),
            gender: self.gender.unwrap_or_else(|| cat.gender.clone()),
        }
    }
}

impl CatFilter {
    pub fn matches(&self, cat: &Cat) -> bool {
        self.name.as_ref().map_or(true, |name| *name == cat.name)
            && self.age.map_or(true, |age| age == cat.age)
            && self.gender.as_ref().map_or(true, |gender| *gender == cat.gender)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tom() -> Cat {
        Cat { id: 7, name: "Tom".into(), age: 3, gender: "male".into() }
    }

    #[test]
    fn patch_only_touches_supplied_fields() {
        let patch = CatPatch { age: Some(4), ..Default::default() };
        let fields = patch.apply_to(&tom());
        assert_eq!(fields, CatFields { name: "Tom".into(), age: 4, gender: "male".into() });
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(CatFilter::default().matches(&tom()));
    }

    #[test]
    fn filter_requires_every_supplied_field() {
        let filter = CatFilter { name: Some("Tom".into()), age: Some(5), gender: None };
        assert!(!filter.matches(&tom()));
        let filter = CatFilter { name: Some("Tom".into()), age: Some(3), gender: Some("male".into()) };
        assert!(filter.matches(&tom()));
    }
}
