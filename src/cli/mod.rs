//! Command-line parsing for the resale flat price predictor.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the encoding/inference code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{FormRecord, IntField};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "rfp", version, about = "Singapore Resale Flat Price Prediction")]
pub struct Cli {
    /// Model artifact JSON (overrides RFP_MODEL_PATH).
    #[arg(long, global = true, value_name = "JSON")]
    pub model: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive form (default).
    Tui,
    /// Predict one price from flags and print it.
    Predict(PredictArgs),
    /// Load the model artifact and summarise it.
    Inspect,
}

fn month(raw: &str) -> Result<u32, String> {
    IntField::Month.parse_value(raw)
}
fn town(raw: &str) -> Result<u32, String> {
    IntField::Town.parse_value(raw)
}
fn flat_type(raw: &str) -> Result<u32, String> {
    IntField::FlatType.parse_value(raw)
}
fn block(raw: &str) -> Result<u32, String> {
    IntField::Block.parse_value(raw)
}
fn street_name(raw: &str) -> Result<u32, String> {
    IntField::StreetName.parse_value(raw)
}
fn floor_area_sqm(raw: &str) -> Result<u32, String> {
    IntField::FloorAreaSqm.parse_value(raw)
}
fn flat_model(raw: &str) -> Result<u32, String> {
    IntField::FlatModel.parse_value(raw)
}
fn lease_commence_date(raw: &str) -> Result<u32, String> {
    IntField::LeaseCommenceDate.parse_value(raw)
}
fn reg_year(raw: &str) -> Result<u32, String> {
    IntField::RegYear.parse_value(raw)
}

/// One form submission given as flags.
#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    /// Month (1-12).
    #[arg(long, value_parser = month)]
    pub month: u32,

    /// Town code (0-26).
    #[arg(long, value_parser = town)]
    pub town: u32,

    /// Flat type code (0-6).
    #[arg(long, value_parser = flat_type)]
    pub flat_type: u32,

    /// Block code (1-999).
    #[arg(long, value_parser = block)]
    pub block: u32,

    /// Street name code (0-583).
    #[arg(long, value_parser = street_name)]
    pub street_name: u32,

    /// Storey range label, e.g. "10 TO 12".
    #[arg(long)]
    pub storey_range: String,

    /// Floor area in square metres (28-306).
    #[arg(long, value_parser = floor_area_sqm)]
    pub floor_area_sqm: u32,

    /// Flat model code (1-12).
    #[arg(long, value_parser = flat_model)]
    pub flat_model: u32,

    /// Lease commencement year (1966-2022).
    #[arg(long, value_parser = lease_commence_date)]
    pub lease_commence_date: u32,

    /// Registration year (1990-2022).
    #[arg(long, value_parser = reg_year)]
    pub reg_year: u32,

    /// Also write a markdown debug bundle for this request.
    #[arg(long)]
    pub debug_bundle: bool,
}

impl PredictArgs {
    pub fn to_record(&self) -> FormRecord {
        FormRecord {
            month: self.month,
            town: self.town,
            flat_type: self.flat_type,
            block: self.block,
            street_name: self.street_name,
            storey_range: self.storey_range.clone(),
            floor_area_sqm: self.floor_area_sqm,
            flat_model: self.flat_model,
            lease_commence_date: self.lease_commence_date,
            reg_year: self.reg_year,
        }
    }
}
