//! Standard action library for stagehand scripts.
//!
//! Every action here follows the mapping convention established by the
//! compiler: the first key names the action and carries its principal
//! argument, and the remaining keys are parameters. For example:
//!
//! ```yaml
//! - set: { attempts: "0" }
//! - while: "attempts < 3"
//!   do:
//!     - exec: "deploy --app ${{ app }}"
//!       capture: result
//!     - set: { attempts: "attempts + 1" }
//! - if: "result.status == 0"
//!   then:
//!     - echo: "deployed ${{ app }}"
//!   else:
//!     - echo: "giving up after ${{ attempts }} attempts"
//! ```

pub mod conditional;
pub mod include;
pub mod output;
pub mod repeat;
pub mod shell;
mod template;
pub mod variable;

pub use conditional::IfAction;
pub use include::IncludeAction;
pub use output::EchoAction;
pub use repeat::{ForEachAction, WhileAction};
pub use shell::ExecAction;
pub use variable::SetAction;

use stagehand_engine::{ActionRegistry, Noop, Series, ServiceContainer};

/// A registry with every standard action installed under its script name.
///
/// The structural actions are registered too, so bare references like `noop`
/// resolve the same way user-defined names do.
pub fn standard_registry() -> ActionRegistry {
    let mut registry = ActionRegistry::new();
    registry.register_constructor("noop", || Box::new(Noop));
    registry.register_constructor("series", || Box::new(Series::default()));
    registry.register_constructor("if", || Box::new(IfAction::default()));
    registry.register_constructor("while", || Box::new(WhileAction::default()));
    registry.register_constructor("foreach", || Box::new(ForEachAction::default()));
    registry.register_constructor("set", || Box::new(SetAction::default()));
    registry.register_constructor("echo", || Box::new(EchoAction::default()));
    registry.register_constructor("exec", || Box::new(ExecAction::default()));
    registry.register_constructor("include", || Box::new(IncludeAction::default()));
    registry
}

/// A service container wired with the default expression engine.
pub fn standard_services() -> ServiceContainer {
    stagehand_expr::default_services()
}
