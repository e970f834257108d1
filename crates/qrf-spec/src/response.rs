use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::answer::AnswerValue;
use crate::path::{FieldPath, Segment};

/// One answer slot of a persisted response item.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ResponseAnswer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<AnswerValue>,
}

impl ResponseAnswer {
    pub fn new(value: AnswerValue) -> Self {
        Self { value: Some(value) }
    }
}

/// A node of a previously populated response tree. Read-only input to the
/// resolver and the repeat-count logic; repeating groups appear as sibling
/// nodes sharing one linkId.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseItem {
    pub link_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub answer: Vec<ResponseAnswer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub item: Vec<ResponseItem>,
}

impl ResponseItem {
    pub fn new(link_id: impl Into<String>) -> Self {
        Self {
            link_id: link_id.into(),
            answer: Vec::new(),
            item: Vec::new(),
        }
    }
}

/// The persisted response resource, reduced to the fields this engine
/// touches.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questionnaire: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authored: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub item: Vec<ResponseItem>,
}

/// Resolves a structural path to the candidate items at that location.
///
/// The path is reduced left to right over a candidate set that starts as
/// `root`. `Items` segments are structural no-ops. A `Key` segment filters
/// the candidates by linkId and then selects one of the filtered set: the
/// instance named by a directly following `items.<n>` pair, or the first
/// one otherwise; resolution then descends into the selected item's
/// children. Any miss (no matching linkId, index out of range) empties the
/// candidate set for the rest of the walk. Pure; never mutates its input.
pub fn resolve<'a>(root: &'a [ResponseItem], path: &FieldPath) -> Vec<&'a ResponseItem> {
    let mut current: Vec<&ResponseItem> = root.iter().collect();
    let segments = path.segments();
    let mut position = 0;

    while position < segments.len() {
        let link_id = match &segments[position] {
            Segment::Key(link_id) => link_id,
            // Stray separators and indexes carry no structure of their own.
            Segment::Items | Segment::Index(_) => {
                position += 1;
                continue;
            }
        };

        let matched: Vec<&ResponseItem> = current
            .into_iter()
            .filter(|item| item.link_id == *link_id)
            .collect();

        let selected = if let (Some(Segment::Items), Some(Segment::Index(index))) =
            (segments.get(position + 1), segments.get(position + 2))
        {
            position += 3;
            matched.get(*index).copied()
        } else {
            position += 1;
            matched.first().copied()
        };

        current = match selected {
            Some(item) => item.item.iter().collect(),
            None => Vec::new(),
        };
    }

    current
}

/// Counts how many sibling instances of `link_id` already exist under
/// `parent_path`, used to seed the rendered instance count of a repeating
/// group.
///
/// Returns 0 both when the parent path resolves to nothing and when it
/// resolves but holds no matching children; callers cannot tell the two
/// apart by design.
pub fn initial_item_count(root: &[ResponseItem], parent_path: &FieldPath, link_id: &str) -> usize {
    if parent_path.is_empty() {
        return root.iter().filter(|item| item.link_id == link_id).count();
    }

    resolve(root, parent_path)
        .into_iter()
        .filter(|item| item.link_id == link_id)
        .count()
}
