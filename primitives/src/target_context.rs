use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Audience restrictions of a request or a content, across four independent
/// categories.
///
/// An empty category set means "no restriction" - it matches every flag of
/// the category. Requests may leave any category empty; a stored [`Content`]
/// context must carry at least one flag per category (see
/// [`Content::new`]).
///
/// An absent category in the serialized form deserializes to the empty set,
/// so "field missing" and "field present but empty" are the same,
/// unrestricted shape.
///
/// [`Content`]: crate::Content
/// [`Content::new`]: crate::Content::new
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TargetContext {
    pub age: HashSet<AgeGroup>,
    pub gender: HashSet<Gender>,
    pub marital_status: HashSet<MaritalStatus>,
    pub purpose_of_use: HashSet<PurposeOfUse>,
}

impl TargetContext {
    /// The context with every category left unrestricted.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn is_unrestricted(&self) -> bool {
        self.age.is_empty()
            && self.gender.is_empty()
            && self.marital_status.is_empty()
            && self.purpose_of_use.is_empty()
    }

    /// Whether every category carries at least one flag - the shape required
    /// of a stored content's context.
    pub fn is_fully_specified(&self) -> bool {
        !self.age.is_empty()
            && !self.gender.is_empty()
            && !self.marital_status.is_empty()
            && !self.purpose_of_use.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AgeGroup {
    UpTo17,
    From18To24,
    From25To34,
    From35To49,
    From50To64,
    From65,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 6] = [
        AgeGroup::UpTo17,
        AgeGroup::From18To24,
        AgeGroup::From25To34,
        AgeGroup::From35To49,
        AgeGroup::From50To64,
        AgeGroup::From65,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Gender {
    Female,
    Male,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Female, Gender::Male, Gender::Other];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MaritalStatus {
    Single,
    Married,
    Divorced,
    Widowed,
}

impl MaritalStatus {
    pub const ALL: [MaritalStatus; 4] = [
        MaritalStatus::Single,
        MaritalStatus::Married,
        MaritalStatus::Divorced,
        MaritalStatus::Widowed,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PurposeOfUse {
    Private,
    Business,
}

impl PurposeOfUse {
    pub const ALL: [PurposeOfUse; 2] = [PurposeOfUse::Private, PurposeOfUse::Business];
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn absent_categories_deserialize_to_unrestricted() {
        let context = serde_json::from_value::<TargetContext>(json!({
            "age": ["from18To24"],
        }))
        .expect("Should deserialize");

        assert_eq!(
            [AgeGroup::From18To24].into_iter().collect::<HashSet<_>>(),
            context.age
        );
        assert!(context.gender.is_empty());
        assert!(!context.is_unrestricted());
        assert!(!context.is_fully_specified());

        let empty = serde_json::from_value::<TargetContext>(json!({})).expect("Should deserialize");
        assert!(empty.is_unrestricted());
        assert_eq!(TargetContext::unrestricted(), empty);
    }

    #[test]
    fn fully_specified_requires_every_category() {
        let context = TargetContext {
            age: AgeGroup::ALL.into_iter().collect(),
            gender: Gender::ALL.into_iter().collect(),
            marital_status: MaritalStatus::ALL.into_iter().collect(),
            purpose_of_use: PurposeOfUse::ALL.into_iter().collect(),
        };
        assert!(context.is_fully_specified());

        let mut missing_gender = context;
        missing_gender.gender.clear();
        assert!(!missing_gender.is_fully_specified());
    }
}
