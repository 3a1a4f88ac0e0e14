//! Command-line shell for the loaf portioning engine.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Parser;
use portion_core::{
    export, IntegrationRule, InterpolationMode, PortionRun, PortionSettings, ScanDirection,
};
use tracer::init_tracing;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "portion")]
#[command(about = "Simulate slicing a loaf into weight-targeted portions")]
struct Args {
    /// JSON settings file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Measured loaf weight (g)
    #[arg(long)]
    total_weight: Option<f64>,

    /// Nominal portion weight (g)
    #[arg(long)]
    target_weight: Option<f64>,

    /// Average cross-section width (mm)
    #[arg(long)]
    width: Option<f64>,

    /// Average cross-section height (mm)
    #[arg(long)]
    height: Option<f64>,

    /// Cross-section thickness (mm)
    #[arg(long)]
    thickness: Option<f64>,

    /// Number of cross-sections along the loaf
    #[arg(long)]
    slices: Option<usize>,

    /// Close portions at this percentage of the target (90-100)
    #[arg(long)]
    tolerance_percent: Option<f64>,

    /// Fold the leftover weight back into the portions (`=false` overrides the config file)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    redistribute_waste: Option<bool>,

    /// Split the slice that crosses the threshold (`=false` overrides the config file)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    interpolate: Option<bool>,

    /// Scan from the last slice so waste collects at the front (`=false` overrides the config file)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    reverse: Option<bool>,

    /// Integrate volume with the trapezoidal rule (`=false` overrides the config file)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    trapezoidal: Option<bool>,

    /// Seed for reproducible cross-sections
    #[arg(long)]
    seed: Option<u64>,

    /// Print every slice weight
    #[arg(long)]
    show_slices: bool,

    /// Print the whole run as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Write the cut plan as CSV
    #[arg(long)]
    export_csv: Option<PathBuf>,
}

impl Args {
    fn settings(&self) -> Result<PortionSettings> {
        let mut settings = match &self.config {
            Some(path) => PortionSettings::from_json_file(path)?,
            None => PortionSettings::default(),
        };

        if let Some(v) = self.total_weight {
            settings.total_weight_g = v;
        }
        if let Some(v) = self.target_weight {
            settings.target_portion_weight_g = v;
        }
        if let Some(v) = self.width {
            settings.average_width_mm = v;
        }
        if let Some(v) = self.height {
            settings.average_height_mm = v;
        }
        if let Some(v) = self.thickness {
            settings.slice_thickness_mm = v;
        }
        if let Some(v) = self.slices {
            settings.slice_count = v;
        }
        if let Some(v) = self.tolerance_percent {
            settings.tolerance_fraction = v / 100.0;
        }
        if let Some(on) = self.redistribute_waste {
            settings.redistribute_waste = on;
        }
        if let Some(on) = self.interpolate {
            settings.interpolation = InterpolationMode::from_flag(on);
        }
        if let Some(on) = self.reverse {
            settings.scan_direction = if on {
                ScanDirection::Reverse
            } else {
                ScanDirection::Forward
            };
        }
        if let Some(on) = self.trapezoidal {
            settings.integration_rule = if on {
                IntegrationRule::Trapezoidal
            } else {
                IntegrationRule::Rectangular
            };
        }
        if self.seed.is_some() {
            settings.seed = self.seed;
        }
        Ok(settings)
    }
}

fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let settings = args.settings()?;
    let run = portion_core::run(&settings).context("portioning run failed")?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&run).context("failed to serialize run")?
        );
    } else {
        print_report(&run, args.show_slices);
    }

    if let Some(path) = &args.export_csv {
        export::export_portion_table(path, &run.portions, &run.waste)?;
        info!(path = %path.display(), "exported portion table");
    }
    Ok(())
}

fn print_report(run: &PortionRun, show_slices: bool) {
    if show_slices {
        println!("--- Slice Weights ---");
        for (idx, weight) in run.slice_weights().iter().enumerate() {
            println!("Slice {}: Weight = {weight:.2} g", idx + 1);
        }
        println!();
    }

    let report = &run.report;
    let verdict = |pass: bool| if pass { "PASS" } else { "FAIL" };
    println!("--- Three Packers Rule Compliance ---");
    println!(
        "Rule 1 (Average Weight >= Nominal): {}",
        verdict(report.rule1_pass)
    );
    println!("  - Average Weight: {:.2} g", report.average_weight_g);
    println!(
        "Rule 2 (T1 Violations <= 2.5%): {}",
        verdict(report.rule2_pass)
    );
    if !report.rule2_pass {
        println!(
            "  - T1 Violations: {} / {}",
            report.t1_violation_count, report.portion_count
        );
    }
    println!("Rule 3 (No T2 Violations): {}", verdict(report.rule3_pass));
    if !report.rule3_pass {
        println!("  - T2 Violations: {}", report.t2_violation_count);
    }
    println!(
        "  TNE = {:.2} g, T1 limit = {:.2} g, T2 limit = {:.2} g",
        report.bands.tne_g,
        report.bands.t1_limit_g(),
        report.bands.t2_limit_g()
    );

    println!("\nTotal Loaf Length: {:.2} mm", run.accounted_length_mm());

    for (idx, portion) in run.portions.iter().enumerate() {
        println!(
            "\nPortion {}:\n  Start Slice = {}\n  End Slice = {}\n  Length = {:.2} mm\n  Weight = {:.2} g",
            idx + 1,
            portion.start_index,
            portion.end_index,
            portion.length_mm,
            portion.weight_g
        );
    }

    let waste = &run.waste;
    if waste.is_discarded() {
        println!(
            "\nWaste (discarded):\n  Start Slice = {}\n  End Slice = {}\n  Length = {:.2} mm\n  Weight = {:.2} g",
            fmt_index(waste.start_index),
            fmt_index(waste.end_index),
            waste.length_mm,
            waste.weight_g
        );
    }
    if waste.redistributed {
        println!(
            "\nHypothetical Waste (if not included): {:.2} g",
            waste.absorbed_weight_g
        );
    } else {
        println!("\nTotal Waste: {:.2} g", waste.weight_g);
    }
}

fn fmt_index(index: Option<usize>) -> String {
    index.map_or_else(|| "-".to_string(), |i| i.to_string())
}

mod tracer {
    use tracing_subscriber::EnvFilter;

    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
}
