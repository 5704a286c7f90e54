use colored::*;
use std::io::{self, Write};

use crate::permissions::LocationPermissionEntity;
use crate::viewmodel::{Command, ViewState};

/// Console renders the location settings screen with colored formatting
pub struct Console {
    allow_color: Color,
    deny_color: Color,
}

impl Console {
    /// Create a new Console with default colors
    pub fn new() -> Self {
        Self {
            allow_color: Color::Green,
            deny_color: Color::Red,
        }
    }

    /// Create a new Console with custom colors
    pub fn with_colors(allow_color: Color, deny_color: Color) -> Self {
        Self {
            allow_color,
            deny_color,
        }
    }

    /// Format a single grant row
    pub fn format_entity(&self, entity: &LocationPermissionEntity) -> String {
        let color = if entity.permission.is_allowed() {
            self.allow_color
        } else {
            self.deny_color
        };
        format!(
            "  {:<40} {}",
            entity.domain,
            entity.permission.to_string().color(color)
        )
    }

    /// Format the whole screen
    pub fn format_view_state(&self, state: &ViewState) -> String {
        let toggle = if state.location_permission_enabled {
            "on".color(self.allow_color).bold()
        } else {
            "off".color(self.deny_color).bold()
        };

        let mut output = format!("Location access: {}\n", toggle);
        if state.location_permission_entities.is_empty() {
            output.push_str("  No sites have location permissions.\n");
            return output;
        }
        for entity in &state.location_permission_entities {
            output.push_str(&self.format_entity(entity));
            output.push('\n');
        }
        output
    }

    /// Print the current screen
    pub fn print_view_state(&self, state: &ViewState) {
        print!("{}", self.format_view_state(state));
    }

    /// Print a system message (errors, info, etc.)
    pub fn print_system(&self, message: &str) {
        println!("{} {}", "System:".yellow().bold(), message);
    }

    /// Print an error message
    pub fn print_error(&self, error: &str) {
        eprintln!("{} {}", "Error:".red().bold(), error);
    }

    /// Read a line of input from the user
    pub fn read_input(&self) -> io::Result<String> {
        print!("{} ", ">".cyan().bold());
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }

    /// Prompt for a command that needs the user's answer
    ///
    /// Returns true if the user confirmed.
    pub fn confirm(&self, command: &Command) -> io::Result<bool> {
        match command {
            Command::ConfirmDeleteLocationPermission(entity) => {
                print!(
                    "{} Remove location permission for {}? [y/N] ",
                    "Confirm:".yellow().bold(),
                    entity.domain.bold()
                );
            }
        }
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
    }

    /// Print a welcome banner
    pub fn print_banner(&self) {
        println!("{}", "=".repeat(60).bright_blue());
        println!("{}", "  Site Location Permissions".bright_blue().bold());
        println!("{}", "=".repeat(60).bright_blue());
        println!();
        println!("Commands: list | on | off | allow <domain> | deny <domain> | delete <domain> | exit");
        println!();
    }

    /// Print a separator line
    pub fn print_separator(&self) {
        println!("{}", "-".repeat(60).bright_black());
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::LocationPermissionType;

    #[test]
    fn test_format_empty_state() {
        colored::control::set_override(false);
        let console = Console::new();

        let output = console.format_view_state(&ViewState::default());
        assert!(output.contains("Location access: off"));
        assert!(output.contains("No sites have location permissions."));
    }

    #[test]
    fn test_format_lists_grants_in_order() {
        colored::control::set_override(false);
        let console = Console::new();
        let state = ViewState {
            location_permission_enabled: true,
            location_permission_entities: vec![
                LocationPermissionEntity::new("b.com", LocationPermissionType::DenyAlways),
                LocationPermissionEntity::new("a.com", LocationPermissionType::AllowOnce),
            ],
        };

        let output = console.format_view_state(&state);
        assert!(output.contains("Location access: on"));
        let b = output.find("b.com").unwrap();
        let a = output.find("a.com").unwrap();
        assert!(b < a);
        assert!(output.contains("Always deny"));
        assert!(output.contains("Allow once"));
    }
}
