//! Sign-in bridge for skiff applications.
//!
//! Relays sign-in requests from the compiled application to an external
//! authentication widget and forwards the outcome back through message
//! ports. Also generates the browser-side bootstrap script that performs
//! the same wiring inside the page.

pub mod bridge;
pub mod script;

pub use bridge::{
    AuthBridge, AuthResult, BridgePorts, Session, SignInError, SignInOptions, SignInProvider,
};
pub use script::{bootstrap_script, WidgetConfig};
