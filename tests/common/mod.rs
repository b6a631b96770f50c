//! Shared test doubles.

#![allow(dead_code)]

use erpstack::shell::{CommandResult, CommandRunner};
use erpstack::Result;
use std::cell::RefCell;
use std::collections::BTreeSet;

/// A host whose accounts and database roles live in memory.
///
/// `useradd`/`userdel` and `createuser`/`dropuser` change the state that
/// `getent` and the `pg_roles` query report. Every other command succeeds.
/// Commands containing a configured fragment fail with exit 1.
#[derive(Default)]
pub struct FakeHost {
    users: RefCell<BTreeSet<String>>,
    roles: RefCell<BTreeSet<String>>,
    failing: Vec<String>,
    commands: RefCell<Vec<String>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user: &str) -> Self {
        self.users.borrow_mut().insert(user.to_string());
        self
    }

    pub fn with_role(self, role: &str) -> Self {
        self.roles.borrow_mut().insert(role.to_string());
        self
    }

    pub fn failing_on(mut self, fragment: &str) -> Self {
        self.failing.push(fragment.to_string());
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.commands
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn has_user(&self, user: &str) -> bool {
        self.users.borrow().contains(user)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.borrow().contains(role)
    }
}

fn last_word(command: &str) -> String {
    command
        .split_whitespace()
        .last()
        .unwrap_or_default()
        .trim_matches('\'')
        .to_string()
}

impl CommandRunner for FakeHost {
    fn run(&self, command: &str) -> Result<CommandResult> {
        self.commands.borrow_mut().push(command.to_string());

        if self.failing.iter().any(|f| command.contains(f.as_str())) {
            return Ok(CommandResult::with_code(1));
        }

        if command.starts_with("getent passwd") {
            let code = if self.users.borrow().contains(&last_word(command)) {
                0
            } else {
                2
            };
            return Ok(CommandResult::with_code(code));
        }
        if command.contains("pg_roles") {
            let present = self
                .roles
                .borrow()
                .iter()
                .any(|r| command.contains(&format!("rolname='\\''{}'\\''", r)));
            let stdout = if present { "1\n" } else { "" };
            return Ok(CommandResult::with_code(0).with_stdout(stdout));
        }
        if command.starts_with("useradd") {
            self.users.borrow_mut().insert(last_word(command));
        } else if command.starts_with("userdel") {
            self.users.borrow_mut().remove(&last_word(command));
        } else if command.contains("createuser") {
            self.roles.borrow_mut().insert(last_word(command));
        } else if command.contains("dropuser") {
            self.roles.borrow_mut().remove(&last_word(command));
        }
        Ok(CommandResult::with_code(0))
    }
}
