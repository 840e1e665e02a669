/// Widget mount lifecycle. The host connects first, rendering starts only
/// once the injected visibility source fires, and disconnecting tears the
/// widget down from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MountState {
    #[default]
    Disconnected,
    Pending,
    Active,
}

impl MountState {
    pub fn connect(self) -> Self {
        match self {
            MountState::Disconnected => MountState::Pending,
            other => other,
        }
    }

    pub fn visible(self) -> Self {
        match self {
            MountState::Pending => MountState::Active,
            other => other,
        }
    }

    pub fn disconnect(self) -> Self {
        MountState::Disconnected
    }

    pub fn is_active(self) -> bool {
        self == MountState::Active
    }
}

#[cfg(test)]
mod tests {
    use super::MountState;

    #[test]
    fn connect_waits_for_visibility() {
        let state = MountState::default().connect();
        assert_eq!(state, MountState::Pending);
        assert!(!state.is_active());
    }

    #[test]
    fn visibility_activates_pending_mount() {
        let state = MountState::default().connect().visible();
        assert!(state.is_active());
    }

    #[test]
    fn stale_visibility_event_does_not_activate() {
        // Observer callback firing after teardown must not resurrect the widget.
        let state = MountState::default().connect().disconnect().visible();
        assert_eq!(state, MountState::Disconnected);
    }

    #[test]
    fn disconnect_tears_down_from_any_state() {
        assert_eq!(
            MountState::default().connect().visible().disconnect(),
            MountState::Disconnected
        );
        assert_eq!(MountState::default().connect().disconnect(), MountState::Disconnected);
    }

    #[test]
    fn repeated_connect_is_idempotent() {
        let state = MountState::default().connect().visible().connect();
        assert!(state.is_active());
    }
}
