//! Browser-side bootstrap script generation.
//!
//! The generated snippet runs in the page: it instantiates the
//! authentication widget and wires it to the compiled application's message
//! ports, mirroring the relay in [`crate::bridge`].

/// Authentication widget configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    /// Application client id registered with the provider
    pub client_id: String,

    /// Provider tenant domain
    pub domain: String,
}

/// Generate the bootstrap script embedded in index.html.
///
/// The script subscribes to the application's `showSignIn` port, invokes the
/// widget's sign-in prompt with the caller-supplied options, and sends the
/// two-shape result record on the `signInResult` port. One attempt per
/// request; provider errors are forwarded as data.
pub fn bootstrap_script(config: &WidgetConfig) -> String {
    format!(
        r#"
(function() {{
  'use strict';

  var lock = Auth0Lock('{client_id}', '{domain}');
  var app = window.App.fullscreen();

  app.ports.showSignIn.subscribe(function(opts) {{
    lock.showSignin(opts, function(err, profile, token) {{
      var result = {{ err: null, ok: null }};
      if (err) {{
        result.err = err.details;
      }} else {{
        result.ok = {{ profile: profile, token: token }};
      }}
      app.ports.signInResult.send(result);
    }});
  }});
}})();
"#,
        client_id = config.client_id,
        domain = config.domain,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WidgetConfig {
        WidgetConfig {
            client_id: "client-abc".to_string(),
            domain: "tenant.auth.example.com".to_string(),
        }
    }

    #[test]
    fn script_carries_widget_configuration() {
        let script = bootstrap_script(&config());

        assert!(script.contains("Auth0Lock('client-abc', 'tenant.auth.example.com')"));
    }

    #[test]
    fn script_wires_both_ports() {
        let script = bootstrap_script(&config());

        assert!(script.contains("app.ports.showSignIn.subscribe"));
        assert!(script.contains("app.ports.signInResult.send(result)"));
    }

    #[test]
    fn script_forwards_error_details_only_on_failure() {
        let script = bootstrap_script(&config());

        assert!(script.contains("result.err = err.details;"));
        assert!(script.contains("result.ok = { profile: profile, token: token };"));
        assert!(script.contains("var result = { err: null, ok: null };"));
    }
}
