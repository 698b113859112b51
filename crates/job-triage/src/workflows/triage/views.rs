use serde::Serialize;

use super::board::JobBoard;
use super::domain::{Category, Posting};
use super::partition::{parse_created, BucketCounts};
use super::store::{IdentifierSets, KeyValueStore};

/// Presentation-ready listing of one bucket.
#[derive(Debug, Clone, Serialize)]
pub struct BoardView {
    pub category: Category,
    pub active_category: Category,
    pub heading: String,
    pub counts: BucketCounts,
    pub purge_recommended: bool,
    pub postings: Vec<PostingView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostingView {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_label: Option<String>,
    pub redirect_url: String,
    pub category: Category,
    pub relevant: bool,
    pub actions: Vec<ActionView>,
}

/// One toggle control; posting it to the move endpoint either classifies the
/// posting under `target` or, when it is already there, returns it to `new`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionView {
    pub target: Category,
    pub label: &'static str,
}

impl BoardView {
    pub fn from_board<S: KeyValueStore>(board: &JobBoard<S>, category: Category) -> Self {
        let bucket = board.buckets().bucket(category);
        let sets = board.identifier_sets();
        let heading = if bucket.is_empty() {
            format!("No {category} jobs available")
        } else {
            format!("{} {category} jobs", bucket.len())
        };

        Self {
            category,
            active_category: board.category(),
            heading,
            counts: board.buckets().counts(),
            purge_recommended: board.purge_recommended(),
            postings: bucket
                .iter()
                .map(|posting| {
                    PostingView::new(posting, sets, board.classifier().is_relevant(&posting.title))
                })
                .collect(),
        }
    }
}

impl PostingView {
    fn new(posting: &Posting, sets: &IdentifierSets, relevant: bool) -> Self {
        let category = sets.category_of(&posting.id);
        let actions = Category::classified()
            .into_iter()
            .filter_map(|target| {
                let label = if target == category {
                    target.remove_label()
                } else {
                    target.add_label()
                };
                label.map(|label| ActionView { target, label })
            })
            .collect();

        Self {
            id: posting.id.clone(),
            title: posting.title.clone(),
            company: posting.company.display_name.clone(),
            location: posting.location.display_name.clone(),
            description: posting.description.clone(),
            created_label: posting.created.as_deref().and_then(created_label),
            contract_label: posting
                .contract_type
                .as_deref()
                .map(|contract| format!("Contract: {contract}")),
            redirect_url: posting.redirect_url.clone(),
            category,
            relevant,
            actions,
        }
    }
}

/// `2 Jan 2024, 10:00` style label; `None` when the timestamp does not parse.
pub(crate) fn created_label(created: &str) -> Option<String> {
    parse_created(created).map(|dt| dt.format("%-d %b %Y, %H:%M").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_label_uses_short_month_format() {
        assert_eq!(
            created_label("2024-01-02T10:05:00Z").as_deref(),
            Some("2 Jan 2024, 10:05")
        );
        assert!(created_label("soon").is_none());
    }

    #[test]
    fn posting_actions_toggle_on_current_category() {
        let posting = Posting {
            id: "a".to_string(),
            title: "Frontend Engineer".to_string(),
            redirect_url: "https://example.test/a".to_string(),
            company: "Acme".into(),
            location: "London".into(),
            description: String::new(),
            created: None,
            contract_type: Some("permanent".to_string()),
        };
        let sets = IdentifierSets::default().moved(Category::Saved, "a");

        let view = PostingView::new(&posting, &sets, true);
        assert_eq!(view.category, Category::Saved);
        assert_eq!(view.contract_label.as_deref(), Some("Contract: permanent"));
        assert_eq!(
            view.actions,
            vec![
                ActionView {
                    target: Category::Saved,
                    label: "Unsave"
                },
                ActionView {
                    target: Category::Applied,
                    label: "Applied"
                },
                ActionView {
                    target: Category::Archived,
                    label: "Archive"
                },
            ]
        );
    }
}
