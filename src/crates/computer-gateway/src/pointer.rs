//! Move-then-act choreography for pointer actions.

use crate::action::{ActionKind, ClickButton, Coordinate};
use crate::client::RemoteCallClient;
use crate::client::CallError;
use serde_json::{Map, Value};
use std::time::Duration;

/// Build the `/input/*` payload: `text` only when non-empty, `coordinate`
/// as a two-element list.
pub fn input_payload(text: Option<&str>, coordinate: Option<Coordinate>) -> Value {
    let mut payload = Map::new();
    if let Some(text) = text.filter(|t| !t.is_empty()) {
        payload.insert("text".to_string(), Value::String(text.to_string()));
    }
    if let Some(coordinate) = coordinate {
        payload.insert("coordinate".to_string(), coordinate.to_value());
    }
    Value::Object(payload)
}

/// Issues pointer calls against the daemon's `/input` surface.
pub struct PointerDispatcher<'a> {
    client: &'a RemoteCallClient,
    settle_delay: Duration,
}

impl<'a> PointerDispatcher<'a> {
    pub fn new(client: &'a RemoteCallClient, settle_delay: Duration) -> Self {
        Self {
            client,
            settle_delay,
        }
    }

    /// POST `/input/mouse_move`.
    pub async fn move_to(&self, to: Coordinate) -> Result<Value, CallError> {
        self.client
            .post(&ActionKind::MouseMove.input_path(), &input_payload(None, Some(to)))
            .await
    }

    /// Click, moving the pointer to `at` first when the button needs it.
    ///
    /// A failed pre-move aborts the click.
    pub async fn click(
        &self,
        button: ClickButton,
        at: Option<Coordinate>,
        modifiers: Option<&str>,
    ) -> Result<Value, CallError> {
        if let Some(target) = at.filter(|_| button.moves_first()) {
            self.move_to(target).await?;
            self.settle().await;
        }

        self.forward(button.kind(), modifiers, at).await
    }

    /// Move, settle, left click, settle. Used to focus a scroll container.
    pub async fn focus_click(&self, at: Coordinate) -> Result<(), CallError> {
        self.move_to(at).await?;
        self.settle().await;
        self.client
            .post(&ActionKind::LeftClick.input_path(), &input_payload(None, Some(at)))
            .await?;
        self.settle().await;
        Ok(())
    }

    /// Single direct POST to `/input/<action>`.
    pub async fn forward(
        &self,
        kind: ActionKind,
        text: Option<&str>,
        coordinate: Option<Coordinate>,
    ) -> Result<Value, CallError> {
        self.client
            .post(&kind.input_path(), &input_payload(text, coordinate))
            .await
    }

    pub async fn settle(&self) {
        self.client.sleeper().sleep(self.settle_delay).await;
    }
}
