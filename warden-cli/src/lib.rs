//! # warden-cli
//!
//! Command-line tool for inspecting Warden policies and evaluating decisions.
//!
//! | Command | Description |
//! |---------|-------------|
//! | `warden validate` | Load and validate a policy file, print a summary |
//! | `warden check` | Evaluate one authorization decision |
//! | `warden roles [ROLE]` | Print the role grant table |
//! | `warden expiring` | List role assignments about to lapse |
//!
//! Every command reads the policy from `--policy`, `$WARDEN_POLICY`, or
//! `policy.yaml` in the current directory.

pub mod commands;
