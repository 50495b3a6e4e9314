//! Colored output helpers for CLI
//!
//! All terminal rendering lives here; the library never prints.

use crate::research::{ProgressEvent, Report, Stage};
use owo_colors::OwoColorize;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print the banner
    pub fn banner(&self) {
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));
        if self.colored {
            println!(
                "\n   {} {}\n",
                "agentry".bright_cyan().bold(),
                version.dimmed()
            );
        } else {
            println!("\n   agentry {}\n", version);
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a header for a section
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a subheader
    pub fn subheader(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.cyan().bold());
        } else {
            println!("\n  --- {} ---", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// Print a list item
    pub fn list_item(&self, item: &str) {
        if self.colored {
            println!("    {} {}", "•".blue(), item);
        } else {
            println!("    - {}", item);
        }
    }

    /// Print a hint/tip message
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {}", message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// Print a block of text verbatim
    pub fn body(&self, text: &str) {
        println!("\n{}\n", text);
    }

    /// One line per pipeline progress event
    pub fn progress(&self, event: &ProgressEvent) {
        let label = progress_label(event);
        let counter = format!("[{}/{}]", event.completed, event.total);
        if self.colored {
            println!("  {} {}", counter.dimmed(), label.bright_white());
        } else {
            println!("  {} {}", counter, label);
        }
    }

    /// Render a finished research report
    pub fn report(&self, report: &Report) {
        self.header("Report summary");
        println!("\n  {}", report.short_summary);
        self.header("Report");
        self.body(&report.markdown_body);
        self.header("Follow up questions");
        for question in &report.follow_up_questions {
            self.list_item(question);
        }
        println!();
    }
}

/// Human wording for a progress event
pub fn progress_label(event: &ProgressEvent) -> String {
    match (event.stage, event.is_done()) {
        (Stage::Planning, false) => "Planning searches...".to_string(),
        (Stage::Planning, true) => "Planning complete".to_string(),
        (Stage::Searching, false) => {
            format!("Searching... {}/{} completed", event.completed, event.total)
        }
        (Stage::Searching, true) => "Searches complete".to_string(),
        (Stage::Writing, false) => "Thinking about report...".to_string(),
        (Stage::Writing, true) => "Report complete".to_string(),
    }
}
