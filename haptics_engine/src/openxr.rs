//! OpenXR backend
//!
//! The host application owns the OpenXR instance and session; this backend
//! only records the handles it is given and drives haptic output through an
//! [`OpenXrRuntime`]. Output flows once a session, an action set and the
//! `Focused` session state are all present.

use crate::backend::{BackendKind, HapticsBackend};
use crate::mixer::RenderedFrame;
use haptics_shared::{Channel, HapticsError, HapticsResult};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Extensions the host must enable on its OpenXR instance
pub const OPENXR_EXTENSIONS: [&str; 2] = ["XR_FB_haptic_amplitude_envelope", "XR_FB_haptic_pcm"];

/// Raw `XrSession` handle
pub type SessionHandle = u64;
/// Raw `XrActionSet` handle
pub type ActionSetHandle = u64;

/// Mirrors `XrSessionState`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum SessionState {
    #[default]
    Unknown = 0,
    Idle = 1,
    Ready = 2,
    Synchronized = 3,
    Visible = 4,
    Focused = 5,
    Stopping = 6,
    LossPending = 7,
    Exiting = 8,
}

impl SessionState {
    pub fn from_raw(value: i32) -> Option<Self> {
        Some(match value {
            0 => SessionState::Unknown,
            1 => SessionState::Idle,
            2 => SessionState::Ready,
            3 => SessionState::Synchronized,
            4 => SessionState::Visible,
            5 => SessionState::Focused,
            6 => SessionState::Stopping,
            7 => SessionState::LossPending,
            8 => SessionState::Exiting,
            _ => return None,
        })
    }
}

pub trait OpenXrRuntime: Send {
    fn create_action_set(&mut self, session: SessionHandle) -> HapticsResult<ActionSetHandle>;
    fn destroy_action_set(&mut self, action_set: ActionSetHandle) -> HapticsResult<()>;
    fn apply_haptic_feedback(&mut self, action_set: ActionSetHandle, frame: &RenderedFrame) -> HapticsResult<()>;
    fn stop_haptic_feedback(&mut self, action_set: ActionSetHandle, channel: Channel) -> HapticsResult<()>;
}

pub struct OpenXrBackend {
    runtime: Box<dyn OpenXrRuntime>,
    session: Option<SessionHandle>,
    action_set: Option<ActionSetHandle>,
    owned_action_sets: HashSet<ActionSetHandle>,
    session_state: SessionState,
}

impl OpenXrBackend {
    pub fn new(runtime: Box<dyn OpenXrRuntime>) -> Self {
        Self {
            runtime,
            session: None,
            action_set: None,
            owned_action_sets: HashSet::new(),
            session_state: SessionState::Unknown,
        }
    }

    pub fn set_session(&mut self, session: SessionHandle) {
        debug!(session, "openxr session set");
        self.session = Some(session);
    }

    pub fn create_action_set(&mut self) -> HapticsResult<ActionSetHandle> {
        let session = self
            .session
            .ok_or_else(|| HapticsError::Error("no OpenXR session has been set".to_string()))?;
        let action_set = self.runtime.create_action_set(session)?;
        self.owned_action_sets.insert(action_set);
        debug!(action_set, "created openxr action set");
        Ok(action_set)
    }

    /// Destroys an action set created by [`Self::create_action_set`]
    pub fn destroy_action_set(&mut self, action_set: ActionSetHandle) -> HapticsResult<()> {
        if !self.owned_action_sets.remove(&action_set) {
            return Err(HapticsError::Error(format!(
                "action set {} was not created by this instance",
                action_set
            )));
        }
        if self.action_set == Some(action_set) {
            self.action_set = None;
        }
        self.runtime.destroy_action_set(action_set)
    }

    pub fn set_action_set(&mut self, action_set: ActionSetHandle) {
        debug!(action_set, "openxr action set attached");
        self.action_set = Some(action_set);
    }

    pub fn set_session_state(&mut self, state: SessionState) {
        debug!(?state, "openxr session state changed");
        self.session_state = state;
    }

    /// The action set frames go to, if output is possible right now
    fn output_target(&self) -> Option<ActionSetHandle> {
        if self.session.is_none() || self.session_state != SessionState::Focused {
            return None;
        }
        self.action_set
    }
}

impl HapticsBackend for OpenXrBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::OpenXr
    }

    fn render(&mut self, frame: &RenderedFrame) -> HapticsResult<()> {
        match self.output_target() {
            Some(action_set) => self.runtime.apply_haptic_feedback(action_set, frame),
            None => Ok(()),
        }
    }

    fn silence(&mut self, channel: Channel) -> HapticsResult<()> {
        match self.output_target() {
            Some(action_set) => self.runtime.stop_haptic_feedback(action_set, channel),
            None => Ok(()),
        }
    }

    fn shutdown(&mut self) {
        for action_set in self.owned_action_sets.drain() {
            if let Err(e) = self.runtime.destroy_action_set(action_set) {
                warn!(action_set, error = %e, "failed to destroy openxr action set");
            }
        }
        self.action_set = None;
        info!("openxr backend shut down");
    }

    fn as_openxr(&mut self) -> Option<&mut OpenXrBackend> {
        Some(self)
    }
}
