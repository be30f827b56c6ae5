//! Terminal summary of a training run

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::pipeline::ScoreReport;

fn score_color(score: f64) -> Color {
    if score >= 0.8 {
        Color::Green
    } else if score >= 0.6 {
        Color::Yellow
    } else {
        Color::Red
    }
}

fn score_cell(score: f64) -> Cell {
    Cell::new(format!("{:.4}", score))
        .fg(score_color(score))
        .set_alignment(CellAlignment::Right)
}

impl ScoreReport {
    /// Table of every candidate; the best one is marked and bold.
    pub fn to_table(&self) -> Table {
        let best = self.best().map(|b| b.name.as_str());

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Model").add_attribute(Attribute::Bold),
            Cell::new("Best Params").add_attribute(Attribute::Bold),
            Cell::new("CV R²").add_attribute(Attribute::Bold),
            Cell::new("Train R²").add_attribute(Attribute::Bold),
            Cell::new("Test R²").add_attribute(Attribute::Bold),
        ]);

        for entry in self.entries() {
            let is_best = best == Some(entry.name.as_str());
            let name = if is_best {
                Cell::new(format!("★ {}", entry.name)).add_attribute(Attribute::Bold)
            } else {
                Cell::new(format!("  {}", entry.name))
            };
            let mut test = score_cell(entry.test_r2);
            if is_best {
                test = test.add_attribute(Attribute::Bold);
            }
            table.add_row(vec![
                name,
                Cell::new(entry.best_params.to_string()),
                score_cell(entry.cv_score),
                Cell::new(format!("{:.4}", entry.train_r2)).set_alignment(CellAlignment::Right),
                test,
            ]);
        }
        table
    }

    pub fn display(&self) {
        println!();
        println!("    {}", style("MODEL SELECTION").white().bold());
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        for line in self.to_table().to_string().lines() {
            println!("    {}", line);
        }
    }
}

/// Stage timings and headline numbers of a run
#[derive(Debug, Default)]
pub struct TrainingSummary {
    pub train_rows: usize,
    pub test_rows: usize,
    pub n_features: usize,
    pub best_model: Option<String>,
    pub best_score: Option<f64>,
    pub ingestion_time: Duration,
    pub transformation_time: Duration,
    pub training_time: Duration,
}

impl TrainingSummary {
    pub fn total_time(&self) -> Duration {
        self.ingestion_time + self.transformation_time + self.training_time
    }

    pub fn display(&self) {
        println!();
        println!("    {}", style("RUN SUMMARY").white().bold());
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![Cell::new("Train rows"), Cell::new(self.train_rows)]);
        table.add_row(vec![Cell::new("Test rows"), Cell::new(self.test_rows)]);
        table.add_row(vec![Cell::new("Features"), Cell::new(self.n_features)]);

        if let (Some(name), Some(score)) = (&self.best_model, self.best_score) {
            table.add_row(vec![
                Cell::new("Best model"),
                Cell::new(name).fg(Color::Green).add_attribute(Attribute::Bold),
            ]);
            table.add_row(vec![
                Cell::new("Test R²"),
                Cell::new(format!("{:.4}", score))
                    .fg(score_color(score))
                    .add_attribute(Attribute::Bold),
            ]);
        }

        let timings = [
            ("Ingestion", self.ingestion_time),
            ("Transformation", self.transformation_time),
            ("Training", self.training_time),
            ("Total", self.total_time()),
        ];
        for (label, elapsed) in timings {
            table.add_row(vec![
                Cell::new(format!("{} time", label)),
                Cell::new(format!("{:.2}s", elapsed.as_secs_f64())).fg(Color::Cyan),
            ]);
        }

        for line in table.to_string().lines() {
            println!("    {}", line);
        }
    }
}
