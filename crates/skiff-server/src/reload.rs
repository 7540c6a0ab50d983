//! WebSocket-based live reload for development builds.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Messages sent to connected pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReloadMessage {
    /// Full page reload after a rebuild
    Reload,

    /// Connection established
    Connected,
}

/// Hub for broadcasting reload messages to all connected pages.
#[derive(Debug, Clone)]
pub struct ReloadHub {
    sender: broadcast::Sender<ReloadMessage>,
}

impl ReloadHub {
    /// Create a new hub.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Send a message to all connected pages.
    pub fn send(&self, msg: ReloadMessage) {
        // Ignore send errors (no receivers)
        let _ = self.sender.send(msg);
    }

    /// Subscribe to reload messages.
    pub fn subscribe(&self) -> broadcast::Receiver<ReloadMessage> {
        self.sender.subscribe()
    }

    /// Get the number of connected pages.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate the client-side reload script.
///
/// Development-only: the script connects back to the dev server that served
/// the page and reloads on rebuild notifications. Production builds do not
/// include it.
pub fn reload_client_script() -> String {
    r#"
(function() {
  'use strict';

  var ws = new WebSocket('ws://' + location.host + '/__reload');
  var reconnectAttempts = 0;
  var maxReconnectAttempts = 10;

  ws.onopen = function() {
    console.log('[reload] Connected');
    reconnectAttempts = 0;
  };

  ws.onmessage = function(event) {
    var msg = JSON.parse(event.data);

    switch (msg.type) {
      case 'reload':
        location.reload();
        break;

      case 'connected':
        console.log('[reload] Server acknowledged connection');
        break;
    }
  };

  ws.onclose = function() {
    console.log('[reload] Disconnected');
    if (reconnectAttempts < maxReconnectAttempts) {
      reconnectAttempts++;
      setTimeout(function() {
        console.log('[reload] Reconnecting...');
        location.reload();
      }, 1000 * reconnectAttempts);
    }
  };

  ws.onerror = function(e) {
    console.error('[reload] WebSocket error:', e);
  };
})();
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hub_broadcasts_messages() {
        let hub = ReloadHub::new();
        let mut rx = hub.subscribe();

        hub.send(ReloadMessage::Reload);

        match rx.try_recv() {
            Ok(ReloadMessage::Reload) => {}
            _ => panic!("Expected Reload message"),
        }
    }

    #[test]
    fn send_without_subscribers_is_ignored() {
        let hub = ReloadHub::new();
        assert_eq!(hub.subscriber_count(), 0);

        hub.send(ReloadMessage::Reload);
    }

    #[test]
    fn serializes_messages() {
        let json = serde_json::to_string(&ReloadMessage::Reload).unwrap();
        assert_eq!(json, r#"{"type":"reload"}"#);

        let json = serde_json::to_string(&ReloadMessage::Connected).unwrap();
        assert_eq!(json, r#"{"type":"connected"}"#);
    }

    #[test]
    fn client_script_targets_serving_host() {
        let script = reload_client_script();

        assert!(script.contains("location.host"));
        assert!(script.contains("/__reload"));
        assert!(script.contains("location.reload()"));
    }
}
