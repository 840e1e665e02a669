use marginalia_core::domain::form::FieldErrors;
use marginalia_core::domain::item::ItemMode;

use crate::widget::controller::CommentsController;

pub fn render_feed(controller: &CommentsController) -> String {
    let feed = controller.feed();
    let total = feed.total();
    let mut out = format!("{total} comment{}\n", if total == 1 { "" } else { "s" });
    for comment in feed.comments() {
        let date = comment.published_at.format("%b %e, %Y %H:%M");
        out.push_str(&format!(
            "#{} {} ({date})\n",
            comment.id, comment.author.username
        ));
        match controller.item_mode(comment.id) {
            ItemMode::Edit => {
                let draft = controller
                    .edit_form(comment.id)
                    .map(|form| form.draft())
                    .unwrap_or_default();
                out.push_str(&format!("  [editing] {draft}\n"));
            }
            ItemMode::View => {
                out.push_str(&format!("  {}\n", comment.content));
                if controller.can_edit(comment.id) {
                    out.push_str("  (edit/delete available)\n");
                }
            }
        }
    }
    if feed.has_more() {
        out.push_str("more comments available\n");
    }
    out
}

pub fn render_errors(errors: &FieldErrors) -> String {
    let mut out = String::new();
    for (field, message) in errors.iter() {
        out.push_str(&format!("{field}: {message}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{render_errors, render_feed};
    use crate::testsupport::spawn_fixture;
    use crate::widget::controller::CommentsController;
    use marginalia_core::domain::comment::Author;
    use marginalia_core::domain::form::FieldErrors;
    use marginalia_core::types::post_id::PostId;
    use marginalia_infra::api::ApiClient;

    #[tokio::test]
    async fn feed_rendering_marks_only_own_comments_editable() {
        let fixture = spawn_fixture(10).await;
        let post = PostId::try_from(42).unwrap();
        {
            let mut store = fixture.state.store.write().await;
            store.create(
                post,
                Author {
                    id: 1,
                    username: "user-1".to_string(),
                },
                "mine to edit",
                Utc::now(),
            );
            store.create(
                post,
                Author {
                    id: 2,
                    username: "user-2".to_string(),
                },
                "not yours though",
                Utc::now(),
            );
        }
        let client = ApiClient::new(reqwest::Client::new(), &fixture.base_url).with_viewer(Some(1));
        let mut controller = CommentsController::new(client, post, Some(1));
        controller.activate().await.unwrap();

        let text = render_feed(&controller);
        assert!(text.starts_with("2 comments"));
        assert!(text.contains("mine to edit"));
        assert!(text.contains("not yours though"));
        // Exactly one comment belongs to the viewer.
        assert_eq!(text.matches("(edit/delete available)").count(), 1);
    }

    #[test]
    fn errors_render_one_line_per_field() {
        let mut errors = FieldErrors::new();
        errors.insert("content", "too short");
        let text = render_errors(&errors);
        assert_eq!(text, "content: too short\n");
    }
}
