use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Result;
use colored::*;

use crate::cli::OutputFormat;
use crate::sniffer::{MultiTargetReport, SnifferOutcome};

pub struct OutputWriter {
    format: OutputFormat,
    file: Option<PathBuf>,
    verbose: bool,
}

impl OutputWriter {
    pub fn new(format: OutputFormat, file: Option<PathBuf>, verbose: bool) -> Result<Self> {
        Ok(Self {
            format,
            file,
            verbose,
        })
    }

    pub fn write(&self, report: MultiTargetReport) -> Result<()> {
        let output = match self.format {
            OutputFormat::Human => self.format_human(report)?,
            OutputFormat::Json => self.format_json(report)?,
            OutputFormat::Csv => self.format_csv(report)?,
        };

        match &self.file {
            Some(path) => {
                let file = File::create(path)?;
                let mut writer = BufWriter::new(file);
                writer.write_all(output.as_bytes())?;
                writer.flush()?;
            }
            None => {
                print!("{}", output);
                io::stdout().flush()?;
            }
        }

        Ok(())
    }

    fn format_human(&self, report: MultiTargetReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&format!(
            "\n{}\n\n",
            "VPN FINGERPRINT SCAN COMPLETE".truecolor(0, 255, 65).bold()
        ));
        output.push_str(&format!(
            "{} {} {} {} {} {}\n\n",
            "⟦".truecolor(64, 64, 64),
            format!(
                "{}ms",
                (report.end_time - report.start_time).num_milliseconds()
            )
            .truecolor(0, 212, 255)
            .bold(),
            "•".truecolor(0, 255, 65),
            format!("{} targets", report.total_targets)
                .truecolor(191, 64, 191)
                .bold(),
            "•".truecolor(0, 255, 65),
            report.target_spec.truecolor(255, 255, 255).bold()
        ));

        let mut total_detections = 0;

        for target in &report.targets {
            let detections = target.detections();
            let errors = target.errors();
            total_detections += detections.len();

            output.push_str(&format!(
                "{} {} {} {}\n",
                "▶".truecolor(0, 255, 65).bold(),
                target.target.truecolor(255, 255, 255).bold(),
                "•".truecolor(64, 64, 64),
                format!("{} detections", detections.len())
                    .truecolor(0, 212, 255)
                    .bold()
            ));

            for (label, hit) in &detections {
                let details = hit.details();
                let details = if details.is_empty() {
                    "detected".to_string()
                } else {
                    details
                };
                output.push_str(&format!(
                    "  {} {} {}\n",
                    label.truecolor(255, 255, 255).bold(),
                    "●".truecolor(0, 255, 65),
                    details.truecolor(128, 128, 128)
                ));
            }

            for (label, message) in &errors {
                output.push_str(&format!(
                    "  {} {} {}\n",
                    label.truecolor(255, 255, 255).bold(),
                    "✗".truecolor(255, 140, 0),
                    format!("probe failed: {}", message).truecolor(128, 128, 128)
                ));
            }

            if self.verbose {
                for sniffer in &target.sniffers {
                    if sniffer.outcome == SnifferOutcome::NotDetected {
                        output.push_str(&format!(
                            "  {} {} {}\n",
                            sniffer.sniffer.truecolor(96, 96, 96),
                            "·".truecolor(64, 64, 64),
                            "no match".truecolor(96, 96, 96)
                        ));
                    }
                }
            }

            if detections.is_empty() && errors.is_empty() {
                output.push_str(&format!(
                    "  {}\n",
                    "no VPN detected".truecolor(128, 128, 128)
                ));
            }

            output.push('\n');
        }

        output.push_str(&format!(
            "{}\n",
            format!("{} total detections", total_detections)
                .truecolor(0, 255, 65)
                .bold()
        ));

        Ok(output)
    }

    fn format_json(&self, report: MultiTargetReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(&report)? + "\n")
    }

    fn format_csv(&self, report: MultiTargetReport) -> Result<String> {
        let mut output = String::new();
        output.push_str("target,sniffer,outcome,confidence,details\n");

        for target in &report.targets {
            for sniffer in &target.sniffers {
                let (outcome, confidence, details) = match &sniffer.outcome {
                    SnifferOutcome::Detected(hit) => (
                        "detected",
                        format!("{:.2}", hit.confidence),
                        hit.details().replace(',', ";"),
                    ),
                    SnifferOutcome::NotDetected => {
                        if !self.verbose {
                            continue;
                        }
                        ("not-detected", String::new(), String::new())
                    }
                    SnifferOutcome::Error(message) => {
                        ("error", String::new(), message.replace(',', ";"))
                    }
                };
                output.push_str(&format!(
                    "{},{},{},{},{}\n",
                    target.target, sniffer.sniffer, outcome, confidence, details
                ));
            }
        }

        Ok(output)
    }
}
