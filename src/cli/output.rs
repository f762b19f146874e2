//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

use crate::application::BeamTorque;
use crate::domain::Resolution;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Print the weight inference filled in (green label)
pub fn resolution(resolution: &Resolution) {
    println!(
        "{}: weight of the missing pan on {} at {} is set to {}",
        "Inferred".green(),
        resolution.beam,
        resolution.distance,
        resolution.mass
    );
}

/// Print one beam's torques, checkmark or X by its own equilibrium
pub fn torque(entry: &BeamTorque) {
    let line = format!(
        "torque at {} => left: {} right: {}",
        entry.name, entry.left, entry.right
    );
    if entry.balanced {
        println!("  {} {}", "✓".green(), line);
    } else {
        println!("  {} {}", "✗".red(), line);
    }
}

/// Print the overall verdict
pub fn verdict(balanced: bool) {
    if balanced {
        println!("{} {}", "✓".green(), "The puzzle is balanced!".bold());
    } else {
        println!("{} {}", "✗".red(), "The puzzle is unbalanced!".bold());
    }
}
