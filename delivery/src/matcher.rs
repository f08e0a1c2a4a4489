//! Scoring of content targeting against a request's target context.

use std::collections::HashSet;
use std::hash::Hash;

use adserver_primitives::{Content, TargetContext};

/// How specific a candidate's targeting is to the request.
///
/// `group_matches` counts the categories the request explicitly restricted
/// and the content overlapped; `matches_in_group` counts the overlapping
/// flags across all categories. More matched flags across more restricted
/// categories mean a more relevant result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchScore {
    pub group_matches: u32,
    pub matches_in_group: u32,
}

/// A content accepted as a candidate, with its [`MatchScore`].
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub content: Content,
    pub score: MatchScore,
}

impl MatchResult {
    /// The auction weight: specificity times price in minor units.
    ///
    /// An unrestricted request scores `group_matches = 0` for every
    /// candidate, so all weights collapse to 0 and the auction degrades to a
    /// uniform draw.
    pub fn weight(&self) -> u128 {
        self.score.group_matches as u128
            * self.score.matches_in_group as u128
            * self.content.price_per_request.to_minor() as u128
    }
}

/// Scores a content against the request context, `None` when the content is
/// no candidate at all.
pub fn match_content(request: &TargetContext, content: &Content) -> Option<MatchResult> {
    score(request, &content.target_context).map(|score| MatchResult {
        content: content.clone(),
        score,
    })
}

/// Pure scoring of two contexts.
///
/// All four categories must intersect for the content to be a candidate; a
/// single non-intersecting category excludes it entirely, with no partial
/// credit. An empty request-side category is the universal set: it always
/// intersects and contributes nothing to either count.
pub fn score(request: &TargetContext, content: &TargetContext) -> Option<MatchScore> {
    let overlaps = [
        category_overlap(&request.age, &content.age)?,
        category_overlap(&request.gender, &content.gender)?,
        category_overlap(&request.marital_status, &content.marital_status)?,
        category_overlap(&request.purpose_of_use, &content.purpose_of_use)?,
    ];

    let mut result = MatchScore {
        group_matches: 0,
        matches_in_group: 0,
    };
    for overlapping_flags in overlaps {
        if overlapping_flags > 0 {
            result.group_matches += 1;
            result.matches_in_group += overlapping_flags;
        }
    }

    Some(result)
}

/// `None` when a restricted request category shares no flag with the
/// content's; otherwise the number of shared flags (0 for an unrestricted
/// request category).
fn category_overlap<T: Eq + Hash>(request: &HashSet<T>, content: &HashSet<T>) -> Option<u32> {
    if request.is_empty() {
        return Some(0);
    }

    match request.intersection(content).count() as u32 {
        0 => None,
        overlapping => Some(overlapping),
    }
}

#[cfg(test)]
mod test {
    use adserver_primitives::{
        target_context::{AgeGroup, Gender, MaritalStatus, PurposeOfUse},
        test_util::{broad_context, targeted_content},
        CampaignId, ContentFormat,
    };
    use pretty_assertions::assert_eq;

    use super::*;

    fn request(age: &[AgeGroup], gender: &[Gender]) -> TargetContext {
        TargetContext {
            age: age.iter().copied().collect(),
            gender: gender.iter().copied().collect(),
            ..TargetContext::unrestricted()
        }
    }

    #[test]
    fn unrestricted_request_accepts_everything_with_zero_score() {
        let result = score(&TargetContext::unrestricted(), &broad_context())
            .expect("Should be a candidate");

        assert_eq!(
            MatchScore {
                group_matches: 0,
                matches_in_group: 0
            },
            result
        );
    }

    #[test]
    fn one_failing_category_excludes_the_content() {
        let content_context = TargetContext {
            gender: [Gender::Male].into_iter().collect(),
            ..broad_context()
        };

        // age overlaps fully, gender does not intersect at all
        let request = request(&[AgeGroup::From18To24], &[Gender::Female]);

        assert_eq!(None, score(&request, &content_context));
    }

    #[test]
    fn counts_restricted_groups_and_overlapping_flags() {
        let content_context = TargetContext {
            age: [AgeGroup::From18To24, AgeGroup::From25To34]
                .into_iter()
                .collect(),
            ..broad_context()
        };

        // 3 requested age flags of which 2 overlap, 1 gender flag overlapping
        let request = request(
            &[
                AgeGroup::From18To24,
                AgeGroup::From25To34,
                AgeGroup::From35To49,
            ],
            &[Gender::Female],
        );

        let result = score(&request, &content_context).expect("Should be a candidate");
        assert_eq!(
            MatchScore {
                group_matches: 2,
                matches_in_group: 3
            },
            result
        );
    }

    #[test]
    fn weight_multiplies_specificity_and_price() {
        let campaign = CampaignId::new();
        let content = targeted_content(campaign, ContentFormat::Leaderboard, broad_context(), 4, 10);

        let request = TargetContext {
            age: [AgeGroup::From18To24].into_iter().collect(),
            marital_status: [MaritalStatus::Single, MaritalStatus::Married]
                .into_iter()
                .collect(),
            purpose_of_use: [PurposeOfUse::Business].into_iter().collect(),
            ..TargetContext::unrestricted()
        };

        let result = match_content(&request, &content).expect("Should be a candidate");
        // 3 restricted groups, 4 overlapping flags, price of 4 minor units
        assert_eq!(3 * 4 * 4, result.weight());
    }

    #[test]
    fn unrestricted_request_weights_collapse_to_zero() {
        let content = targeted_content(
            CampaignId::new(),
            ContentFormat::Skyscraper,
            broad_context(),
            40,
            10,
        );

        let result = match_content(&TargetContext::unrestricted(), &content)
            .expect("Should be a candidate");
        assert_eq!(0, result.weight());
    }
}
