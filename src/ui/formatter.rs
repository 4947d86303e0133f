use console::style;

use crate::boundary::BoundaryWarning;
use crate::domain::Version;

pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Echo an operation that reads or mutates repository state, with its output.
///
/// Every git and API call is shown this way so an operator can audit exactly
/// what touched the remote.
pub fn display_operation(operation: &str, output: &str) {
    println!("{} {}", style("RUN:").cyan().bold(), operation);
    if !output.trim().is_empty() {
        println!("{}", super::indent(output));
    }
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

pub fn display_promotion_header(source: &str, destination: &str, dry_run: bool) {
    let suffix = if dry_run { " (dry run)" } else { "" };
    println!(
        "\n{}",
        style(format!("Releasing {} to {}{}", source, destination, suffix)).bold()
    );
}

pub fn display_release_notes(notes: &str) {
    println!("\n{}", style("Release notes:").bold().underlined());
    if notes.is_empty() {
        println!("  (no commits)");
    } else {
        println!("{}", super::indent(notes));
    }
}

pub fn display_version_change(current: &Version, next: &Version) {
    println!(
        "\n{} {} -> {}",
        style("Upgrading:").bold(),
        style(current).red(),
        style(next).green()
    );
}
