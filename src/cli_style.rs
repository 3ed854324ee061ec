use clap::builder::styling::{AnsiColor, Color, Style};
use clap::builder::Styles;
use crossterm::style::Stylize;

use crate::hunter::HuntReport;

// ═══════════════════════════════════════════════════════════════════════════════
// Clap Styles
// ═══════════════════════════════════════════════════════════════════════════════

pub fn get_styles() -> Styles {
    clap::builder::Styles::styled()
        .usage(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Magenta))),
        )
        .header(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Magenta))),
        )
        .literal(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .invalid(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .error(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::White))))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Run Summary
// ═══════════════════════════════════════════════════════════════════════════════

/// One line per album: the winning image or a "not found" marker.
pub fn summary_lines(report: &HuntReport) -> Vec<String> {
    report
        .albums
        .iter()
        .map(|album| match album.winner() {
            Some(image) => format!(
                "{} - {}: {}x{} {}",
                album.artist, album.album, image.dimensions.0, image.dimensions.1, image.url
            ),
            None => format!("{} - {}: no cover art found", album.artist, album.album),
        })
        .collect()
}

pub fn print_summary(report: &HuntReport) {
    println!();
    println!("{}", "Highest resolution covers".bold().magenta());
    for (album, line) in report.albums.iter().zip(summary_lines(report)) {
        if album.winner().is_some() {
            println!("  {} {}", "✓".green(), line);
        } else {
            println!("  {} {}", "✗".red(), line.dark_grey());
        }
    }
    if let Some(path) = &report.summary_path {
        println!("{} {}", "Summary saved to".dim(), path.display());
    }
}
