//! `ping` plugin: answers "ping" with "pong" (and "ding" with "dong", and
//! so on). The canonical liveness check for the whole pipeline.

use {anyhow::Result, async_trait::async_trait};

use chronicle_store::{Message, User};

use crate::{
    capability::Capability,
    plugin::{ChatPlugin, PluginContext},
};

pub struct Ping;

#[async_trait]
impl ChatPlugin for Ping {
    fn name(&self) -> &str {
        "ping"
    }

    fn capabilities(&self) -> &[Capability] {
        &[Capability::OnMessage]
    }

    async fn on_message(
        &self,
        cx: &PluginContext,
        _author: &User,
        message: &Message,
    ) -> Result<bool> {
        let Some(text) = message.text.as_deref() else {
            return Ok(false);
        };
        let formatted = text.trim().to_lowercase();
        let mut chars = formatted.chars();
        let Some(first) = chars.next() else {
            return Ok(false);
        };
        if chars.as_str() != "ing" {
            return Ok(false);
        }
        cx.outbound
            .send_reply(&message.id, &format!("{first}ong"))
            .await?;
        Ok(true)
    }
}
