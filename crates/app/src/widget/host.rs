use tracing::info;

use marginalia_core::domain::mount::MountState;
use marginalia_core::types::post_id::PostId;

use super::WidgetError;
use super::controller::CommentsController;
use super::visibility::Visibility;
use crate::state::AppState;

/// Owns one mounted widget. Connecting parks the mount until the injected
/// visibility source fires; only then is the controller built and the
/// initial page loaded. Disconnecting drops the controller; an in-flight
/// request is not cancelled.
pub struct WidgetHost {
    mount: MountState,
    controller: Option<CommentsController>,
}

impl WidgetHost {
    pub fn new() -> Self {
        Self {
            mount: MountState::default(),
            controller: None,
        }
    }

    pub async fn connect<V: Visibility>(
        &mut self,
        app: &AppState,
        visibility: &mut V,
        post: PostId,
        viewer: Option<i64>,
    ) -> Result<(), WidgetError> {
        self.mount = self.mount.connect();
        visibility.wait_until_visible().await;
        self.mount = self.mount.visible();
        if !self.mount.is_active() {
            return Ok(());
        }
        let mut controller = CommentsController::new(app.api_client(viewer), post, viewer);
        controller.activate().await?;
        info!(post = %post, viewer = ?viewer, "widget activated");
        self.controller = Some(controller);
        Ok(())
    }

    pub fn controller_mut(&mut self) -> Option<&mut CommentsController> {
        self.controller.as_mut()
    }

    pub fn disconnect(&mut self) {
        self.mount = self.mount.disconnect();
        self.controller = None;
        info!("widget disconnected");
    }
}

impl Default for WidgetHost {
    fn default() -> Self {
        Self::new()
    }
}
