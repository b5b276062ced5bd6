use crate::analysis::heroes::{side_labels, Side};
use crate::analysis::matrix::{PercentageMatrix, VIEW_SIZE};
use crate::analysis::tally::TallyMatrix;
use colored::*;
use tabled::{builder::Builder, settings::Style};

use super::colors::color_for_percentage;

fn colored_percent(value: f64) -> String {
    let (r, g, b) = color_for_percentage(value);
    format!("{:.1}%", value).truecolor(r, g, b).to_string()
}

fn header_row() -> Vec<String> {
    let mut header = vec![String::new()];
    header.extend(side_labels(Side::Defender));
    header.push("AVG".to_string());
    header
}

fn row_labels() -> Vec<String> {
    let mut labels = side_labels(Side::Attacker);
    labels.push("AVG".to_string());
    labels
}

pub fn display_matrix(matrix: &PercentageMatrix, title: &str) {
    println!("\n{}", format!("📊 {}", title).bold().cyan());
    println!("{}\n", "=".repeat(80).cyan());

    let mut builder = Builder::default();
    builder.push_record(header_row());

    for (r, label) in row_labels().into_iter().enumerate() {
        let mut record = vec![label.bold().to_string()];
        for c in 1..=VIEW_SIZE {
            let pair = matrix.get(r + 1, c).unwrap_or_default();
            record.push(format!(
                "{} / {}",
                colored_percent(pair.top),
                colored_percent(pair.bottom)
            ));
        }
        builder.push_record(record);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    println!("{}", table);

    println!("\n{}", "Reading the table".bold().yellow());
    println!("• Rows are attacker heroes, columns are defender heroes");
    println!("• Left value: attacker win rate, right value: defender win rate");
    println!("• AVG averages only the pairings that have games\n");
}

pub fn display_tallies(tally: &TallyMatrix) {
    println!("\n{}", "🔢 RAW TALLIES (attacker wins/games | defender wins/games)".bold().cyan());
    println!("{}\n", "=".repeat(80).cyan());

    let mut header = header_row();
    header.pop();

    let mut builder = Builder::default();
    builder.push_record(header);

    for (label, row) in side_labels(Side::Attacker).into_iter().zip(tally.rows()) {
        let mut record = vec![label.bold().to_string()];
        for cell in row {
            record.push(format!(
                "{}/{} | {}/{}",
                cell.attacker_wins, cell.attacker_games, cell.defender_wins, cell.defender_games
            ));
        }
        builder.push_record(record);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    println!("{}\n", table);
}

pub fn display_listing(patches: &[String], tournaments: &[String], players: &[&String]) {
    println!("\n{}", "📁 PATCHES".bold().cyan());
    for patch in patches {
        println!("  {}", patch);
    }

    println!("\n{}", "🏆 TOURNAMENTS".bold().cyan());
    for tournament in tournaments {
        println!("  {}", tournament);
    }

    println!("\n{}", format!("👤 PLAYERS ({})", players.len()).bold().cyan());
    for player in players {
        println!("  {}", player);
    }
    println!();
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn display_warning(message: &str) {
    println!("{} {}", "⚠️".yellow(), message);
}
