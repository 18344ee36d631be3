/*!
# BigBrother DevKit - Stubs and helpers for monitor development

Lets the collection pipeline run without any real machine:
- A scripted `CommandRunner` that answers from canned outputs and records calls
- Sample outputs of every diagnostic tool
- A target-list builder
- A harness running one pass in a temporary directory
*/

pub mod fixtures;
pub mod runner_stub;
pub mod test_utils;

pub use fixtures::TargetListBuilder;
pub use runner_stub::{Invocation, ScriptedRunner};
pub use test_utils::TestHarness;
